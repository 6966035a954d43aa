//! Direction classes and run segmentation
//!
//! Classification is per Unicode scalar value: strong right-to-left
//! blocks, always-LTR digits, and a neutral set that inherits the open
//! run. A new run starts whenever the resolved direction or the chosen
//! font differs from the previous non-neutral character.

/// Strong right-to-left blocks: Hebrew, Arabic, Syriac, Arabic
/// Supplement, Thaana, Arabic Extended-A, and both Arabic Presentation
/// Forms blocks.
pub fn is_strong_rtl(ch: char) -> bool {
    // Digits embedded in these blocks read left-to-right.
    if is_ltr_digit(ch) {
        return false;
    }
    matches!(ch as u32,
        0x0590..=0x05FF
        | 0x0600..=0x06FF
        | 0x0700..=0x074F
        | 0x0750..=0x077F
        | 0x0780..=0x07BF
        | 0x08A0..=0x08FF
        | 0xFB50..=0xFDFF
        | 0xFE70..=0xFEFF)
}

/// ASCII, Arabic-Indic, and Extended Arabic-Indic digits are always
/// left-to-right regardless of the surrounding script.
pub fn is_ltr_digit(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch as u32, 0x0660..=0x0669 | 0x06F0..=0x06F9)
}

/// Whitespace and a fixed punctuation set that inherit the direction and
/// font of the currently open run rather than fragmenting it.
pub fn is_neutral(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '.' | '-' | '/' | '(' | ')' | ':' | '\u{2022}')
}

/// A run before shaping: contiguous text, one font, one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRun {
    pub font_index: usize,
    pub text: String,
    pub rtl: bool,
}

/// Splits `text` into runs, resolving each non-neutral character's font
/// through `font_for`.
///
/// Leading neutrals attach to the first run; every other neutral joins
/// the run that is open when it appears. An all-neutral string becomes a
/// single left-to-right run in the default font (index 0 from
/// `font_for(None)` semantics is the caller's default).
pub(crate) fn segment_with(
    text: &str,
    default_font: usize,
    mut font_for: impl FnMut(char) -> usize,
) -> Vec<RawRun> {
    let mut runs: Vec<RawRun> = Vec::new();
    let mut current: Option<RawRun> = None;
    let mut pending = String::new();

    for ch in text.chars() {
        if is_neutral(ch) {
            match current.as_mut() {
                Some(run) => run.text.push(ch),
                None => pending.push(ch),
            }
            continue;
        }

        let rtl = is_strong_rtl(ch);
        let font_index = font_for(ch);

        match current.as_mut() {
            Some(run) if run.font_index == font_index && run.rtl == rtl => {
                run.text.push(ch);
            }
            _ => {
                if let Some(run) = current.take() {
                    runs.push(run);
                }
                let mut text = std::mem::take(&mut pending);
                text.push(ch);
                current = Some(RawRun {
                    font_index,
                    text,
                    rtl,
                });
            }
        }
    }

    if let Some(run) = current {
        runs.push(run);
    } else if !pending.is_empty() {
        runs.push(RawRun {
            font_index: default_font,
            text: pending,
            rtl: false,
        });
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latin_only(ch: char) -> usize {
        if is_strong_rtl(ch) {
            1
        } else {
            0
        }
    }

    #[test]
    fn test_strong_rtl_blocks() {
        assert!(is_strong_rtl('\u{0645}'), "Arabic م");
        assert!(is_strong_rtl('\u{05D0}'), "Hebrew א");
        assert!(is_strong_rtl('\u{0695}'), "Sorani ڕ");
        assert!(is_strong_rtl('\u{FEFB}'), "presentation form");
        assert!(!is_strong_rtl('a'));
        assert!(!is_strong_rtl('!'));
    }

    #[test]
    fn test_digits_are_ltr_in_every_script() {
        assert!(is_ltr_digit('3'));
        assert!(is_ltr_digit('\u{0663}'), "Arabic-Indic ٣");
        assert!(is_ltr_digit('\u{06F3}'), "Extended Arabic-Indic ۳");
        assert!(!is_strong_rtl('\u{0663}'), "digit never reads RTL");
        assert!(!is_ltr_digit('x'));
    }

    #[test]
    fn test_neutral_set() {
        for ch in [' ', '\t', '.', '-', '/', '(', ')', ':', '\u{2022}'] {
            assert!(is_neutral(ch), "{:?} should be neutral", ch);
        }
        assert!(!is_neutral('a'));
        assert!(!is_neutral('\u{0645}'));
    }

    #[test]
    fn test_single_script_is_one_run() {
        let runs = segment_with("hello world.", 0, latin_only);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "hello world.");
        assert!(!runs[0].rtl);
    }

    #[test]
    fn test_direction_change_splits_runs() {
        let runs = segment_with("abc \u{0645}\u{0631}", 0, latin_only);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "abc ", "space stays with the open run");
        assert!(!runs[0].rtl);
        assert_eq!(runs[1].text, "\u{0645}\u{0631}");
        assert!(runs[1].rtl);
    }

    #[test]
    fn test_digits_split_out_of_rtl_text() {
        let runs = segment_with("\u{0645}\u{0631} 36", 0, latin_only);
        assert_eq!(runs.len(), 2);
        assert!(runs[0].rtl);
        assert_eq!(runs[0].text, "\u{0645}\u{0631} ");
        assert_eq!(runs[1].text, "36");
        assert!(!runs[1].rtl);
    }

    #[test]
    fn test_leading_neutrals_attach_to_first_run() {
        let runs = segment_with("(\u{0645})", 0, latin_only);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "(\u{0645})");
        assert!(runs[0].rtl, "direction comes from the strong character");
    }

    #[test]
    fn test_font_change_splits_runs() {
        // Every 'x' to font 1, everything else font 0, all LTR.
        let runs = segment_with("aaxa", 0, |ch| if ch == 'x' { 1 } else { 0 });
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].text, "aa");
        assert_eq!(runs[1].text, "x");
        assert_eq!(runs[2].text, "a");
    }

    #[test]
    fn test_all_neutral_string_is_one_default_run() {
        let runs = segment_with("...  ", 7, latin_only);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font_index, 7);
        assert_eq!(runs[0].text, "...  ");
        assert!(!runs[0].rtl);
    }

    #[test]
    fn test_empty_string_has_no_runs() {
        assert!(segment_with("", 0, latin_only).is_empty());
    }

    #[test]
    fn test_supplementary_plane_treated_as_one_unit() {
        // U+1D11E is outside the BMP; it must not split into surrogates.
        let runs = segment_with("a\u{1D11E}b", 0, latin_only);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text.chars().count(), 3);
    }
}
