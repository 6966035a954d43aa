//! Link annotations
//!
//! Two link flavors: external URIs (an `/A` URI action) and internal
//! page destinations (`/Dest [page /Fit]`, resolved from the stored page
//! index at save time). Both draw no visible border.

use pdf_writer::{dict, Dictionary, Object, ObjectId};

/// Where a link leads.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    Uri(String),
    /// Zero-based index of the destination page.
    Page(usize),
}

/// A pending link annotation on some page.
#[derive(Debug, Clone)]
pub struct LinkAnnotation {
    /// `[x1 y1 x2 y2]` in user-space points.
    pub rect: [f64; 4],
    pub target: LinkTarget,
}

/// Materializes the annotation dictionary; `None` when an internal link
/// points at a page that does not exist.
pub fn build_link_dict(annotation: &LinkAnnotation, page_refs: &[ObjectId]) -> Option<Dictionary> {
    let mut link = dict! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => annotation
            .rect
            .iter()
            .map(|&value| Object::Real(value))
            .collect::<Vec<_>>(),
        "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
    };

    match &annotation.target {
        LinkTarget::Uri(url) => {
            link.set(
                "A",
                dict! {
                    "Type" => "Action",
                    "S" => "URI",
                    "URI" => Object::string_literal(url.clone()),
                },
            );
        }
        LinkTarget::Page(index) => {
            let page_ref = match page_refs.get(*index) {
                Some(&page_ref) => page_ref,
                None => {
                    tracing::warn!(page_index = index, "link targets a page that does not exist");
                    return None;
                }
            };
            link.set(
                "Dest",
                vec![Object::Reference(page_ref), Object::name("Fit")],
            );
        }
    }
    Some(link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_link_shape() {
        let link = build_link_dict(
            &LinkAnnotation {
                rect: [10.0, 20.0, 110.0, 40.0],
                target: LinkTarget::Uri("https://example.com/docs".to_string()),
            },
            &[],
        )
        .expect("URI links need no pages");

        assert_eq!(link.get("Subtype"), Some(&Object::Name("Link".into())));
        assert_eq!(
            link.get("Border"),
            Some(&Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(0)
            ]))
        );
        let action = link.get("A").and_then(Object::as_dict).expect("action");
        assert_eq!(action.get("S"), Some(&Object::Name("URI".into())));
        assert_eq!(
            action.get("URI"),
            Some(&Object::LiteralString(
                b"https://example.com/docs".to_vec()
            ))
        );
        assert!(link.get("Dest").is_none());
    }

    #[test]
    fn test_page_link_resolves_to_fit_destination() {
        let pages = [ObjectId(4), ObjectId(9)];
        let link = build_link_dict(
            &LinkAnnotation {
                rect: [0.0, 0.0, 50.0, 12.0],
                target: LinkTarget::Page(1),
            },
            &pages,
        )
        .expect("valid page index");

        assert_eq!(
            link.get("Dest"),
            Some(&Object::Array(vec![
                Object::Reference(ObjectId(9)),
                Object::Name("Fit".into())
            ]))
        );
        assert!(link.get("A").is_none());
    }

    #[test]
    fn test_dangling_page_link_is_dropped() {
        let link = build_link_dict(
            &LinkAnnotation {
                rect: [0.0, 0.0, 1.0, 1.0],
                target: LinkTarget::Page(7),
            },
            &[ObjectId(1)],
        );
        assert!(link.is_none());
    }
}
