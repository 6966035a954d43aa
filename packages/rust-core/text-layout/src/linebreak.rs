//! Word-based line breaking
//!
//! Greedy accumulation: words join the current line until the next one
//! would push the measured width past the limit. A single word longer
//! than the line keeps its own line; there is no hyphenation and no
//! mid-word break.

/// Wraps `text` into lines no wider than `max_width` under `measure`.
///
/// Words are separated by ASCII spaces; runs of spaces collapse. Empty
/// input yields one empty line so callers still step the baseline.
pub fn wrap_text(measure: impl Fn(&str) -> f64, text: &str, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ').filter(|word| !word.is_empty()) {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if measure(&candidate) > max_width && !current.is_empty() {
            lines.push(current);
            current = word.to_string();
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
