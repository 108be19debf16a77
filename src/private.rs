//! Detection of opaque record types that should stay out of the docs.

use crate::tree::{GirDocument, Node};
use std::collections::BTreeSet;
use tracing::warn;

fn is_disguised(record: Node<'_>) -> bool {
    match record.attr("disguised") {
        None => false,
        Some(value) => match value.trim().parse::<i64>() {
            Ok(n) => n != 0,
            Err(_) => {
                warn!(
                    record = record.attr("name").unwrap_or_default(),
                    value, "unparsable disguised attribute, treating as false"
                );
                false
            }
        },
    }
}

/// Dotted names of disguised records whose only content is a text node.
///
/// A heuristic: GIR has no explicit "private" marker, but a disguised
/// record with no fields is only ever handled through pointers.
pub fn find_private_types(doc: &GirDocument, namespace: &str) -> BTreeSet<String> {
    let mut private = BTreeSet::new();
    for record in doc.descendants_by_tag("record") {
        if !is_disguised(record) {
            continue;
        }
        let only_text = record.child_count() == 1
            && record.first_child().is_some_and(|c| c.is_text());
        if only_text {
            let name = record.attr("name").unwrap_or_default();
            private.insert(format!("{namespace}.{name}"));
        }
    }
    private
}
