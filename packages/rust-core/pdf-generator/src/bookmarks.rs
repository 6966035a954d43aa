//! PDF outline (bookmark) generation
//!
//! Outline entries accumulate as `(title, page index)` pairs while the
//! document is driven and become the Outlines tree at save time: one
//! root, one flat level of entries, siblings doubly linked with
//! `Prev`/`Next`, each destination `[page /Fit]`.

use pdf_writer::{dict, Object, ObjectId, ObjectWriter};

/// One pending bookmark.
#[derive(Debug, Clone)]
pub struct OutlineEntry {
    pub title: String,
    /// Zero-based index of the target page.
    pub page_index: usize,
}

/// Builds the outline tree and returns the root id for the catalog, or
/// `None` when there is nothing to wire.
///
/// Entries pointing at pages that never existed are dropped with a
/// warning rather than emitting a dangling destination.
pub fn build_outline_tree(
    writer: &mut ObjectWriter,
    entries: &[OutlineEntry],
    page_refs: &[ObjectId],
) -> Option<ObjectId> {
    let resolved: Vec<(&OutlineEntry, ObjectId)> = entries
        .iter()
        .filter_map(|entry| match page_refs.get(entry.page_index) {
            Some(&page_ref) => Some((entry, page_ref)),
            None => {
                tracing::warn!(
                    title = entry.title.as_str(),
                    page_index = entry.page_index,
                    "outline entry targets a page that does not exist"
                );
                None
            }
        })
        .collect();

    if resolved.is_empty() {
        return None;
    }

    let root_id = writer.alloc_id();
    let ids: Vec<ObjectId> = resolved.iter().map(|_| writer.alloc_id()).collect();

    for (index, ((entry, page_ref), &id)) in resolved.iter().zip(&ids).enumerate() {
        let mut node = dict! {
            "Title" => Object::string_literal(entry.title.clone()),
            "Parent" => root_id,
            "Dest" => vec![Object::Reference(*page_ref), Object::name("Fit")],
        };
        if index > 0 {
            node.set("Prev", ids[index - 1]);
        }
        if index + 1 < ids.len() {
            node.set("Next", ids[index + 1]);
        }
        writer.store_dict(id, node);
    }

    writer.store_dict(
        root_id,
        dict! {
            "Type" => "Outlines",
            "First" => ids[0],
            "Last" => ids[ids.len() - 1],
            "Count" => ids.len() as i64,
        },
    );
    Some(root_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, page_index: usize) -> OutlineEntry {
        OutlineEntry {
            title: title.to_string(),
            page_index,
        }
    }

    #[test]
    fn test_no_entries_no_tree() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        assert!(build_outline_tree(&mut writer, &[], &[ObjectId(1)]).is_none());
    }

    #[test]
    fn test_single_entry_tree() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        let page = writer.add_dict(dict! { "Type" => "Page" });

        let root_id = build_outline_tree(&mut writer, &[entry("Intro", 0)], &[page])
            .expect("one entry builds a tree");
        let root = writer.dict_mut(root_id).expect("root stored").clone();

        assert_eq!(root.get("Type"), Some(&Object::Name("Outlines".into())));
        assert_eq!(root.get("Count"), Some(&Object::Integer(1)));
        assert_eq!(root.get("First"), root.get("Last"));

        let first_id = root
            .get("First")
            .and_then(Object::as_reference)
            .expect("first child");
        let node = writer.dict_mut(first_id).expect("node stored");
        assert_eq!(
            node.get("Title"),
            Some(&Object::LiteralString(b"Intro".to_vec()))
        );
        assert_eq!(
            node.get("Dest"),
            Some(&Object::Array(vec![
                Object::Reference(page),
                Object::Name("Fit".into())
            ]))
        );
        assert!(node.get("Prev").is_none());
        assert!(node.get("Next").is_none());
    }

    #[test]
    fn test_siblings_doubly_linked() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        let page_a = writer.add_dict(dict! { "Type" => "Page" });
        let page_b = writer.add_dict(dict! { "Type" => "Page" });

        let entries = [entry("One", 0), entry("Two", 1), entry("Three", 0)];
        let root_id = build_outline_tree(&mut writer, &entries, &[page_a, page_b])
            .expect("tree builds");
        let root = writer.dict_mut(root_id).expect("root stored").clone();
        assert_eq!(root.get("Count"), Some(&Object::Integer(3)));

        let first = root.get("First").and_then(Object::as_reference).expect("first");
        let last = root.get("Last").and_then(Object::as_reference).expect("last");
        assert_ne!(first, last);

        let middle_id = writer
            .dict_mut(first)
            .and_then(|node| node.get("Next").and_then(Object::as_reference))
            .expect("middle sibling");
        let middle = writer.dict_mut(middle_id).expect("middle stored");
        assert_eq!(middle.get("Prev"), Some(&Object::Reference(first)));
        assert_eq!(middle.get("Next"), Some(&Object::Reference(last)));
        assert_eq!(middle.get("Parent"), Some(&Object::Reference(root_id)));
    }

    #[test]
    fn test_out_of_range_entries_are_dropped() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        let page = writer.add_dict(dict! { "Type" => "Page" });

        let root_id = build_outline_tree(
            &mut writer,
            &[entry("Valid", 0), entry("Dangling", 9)],
            &[page],
        )
        .expect("valid entry remains");
        let root = writer.dict_mut(root_id).expect("root stored");
        assert_eq!(root.get("Count"), Some(&Object::Integer(1)));
    }

    #[test]
    fn test_only_invalid_entries_build_nothing() {
        let mut writer = ObjectWriter::new([0u8; 16]);
        assert!(build_outline_tree(&mut writer, &[entry("Gone", 3)], &[]).is_none());
    }
}
