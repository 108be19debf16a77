//! Documentation tree extraction.
//!
//! Every documented element is stored under its dotted name
//! (`Gtk.Dialog.run`, `Gtk.Dialog.run.response_id`, …) in one of six
//! buckets chosen by the element's tag.

use crate::escape::escape_identifier;
use crate::tree::{GirDocument, Node};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    General,
    Parameters,
    Returns,
    Signals,
    Properties,
    Fields,
}

impl Bucket {
    pub const ALL: [Bucket; 6] = [
        Bucket::General,
        Bucket::Parameters,
        Bucket::Returns,
        Bucket::Signals,
        Bucket::Properties,
        Bucket::Fields,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::General => "general",
            Bucket::Parameters => "parameters",
            Bucket::Returns => "returns",
            Bucket::Signals => "signals",
            Bucket::Properties => "properties",
            Bucket::Fields => "fields",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| {
                format!("unknown bucket: {s}. Use general, parameters, returns, signals, properties, or fields")
            })
    }
}

/// Tags visited, in this order, and where their entries go. Later entries
/// overwrite earlier ones on key clashes, so the order is part of the output.
///
/// `virtual-method` is left out: its names clash with the regular methods.
pub const DOC_TAGS: &[(&str, Bucket)] = &[
    ("glib:signal", Bucket::Signals),
    ("field", Bucket::Fields),
    ("property", Bucket::Properties),
    ("parameter", Bucket::Parameters),
    ("instance-parameter", Bucket::Parameters),
    ("return-value", Bucket::Returns),
    ("interface", Bucket::General),
    ("method", Bucket::General),
    ("function", Bucket::General),
    ("constant", Bucket::General),
    ("record", Bucket::General),
    ("enumeration", Bucket::General),
    ("member", Bucket::General),
    ("callback", Bucket::General),
    ("alias", Bucket::General),
    ("constructor", Bucket::General),
    ("class", Bucket::General),
    ("bitfield", Bucket::General),
];

/// Raw documentation attached to one element. Absent values are empty.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DocEntry {
    pub docs: String,
    pub version: String,
    pub deprecated_version: String,
    pub deprecated: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DocTree {
    pub general: BTreeMap<String, DocEntry>,
    pub parameters: BTreeMap<String, DocEntry>,
    pub returns: BTreeMap<String, DocEntry>,
    pub signals: BTreeMap<String, DocEntry>,
    pub properties: BTreeMap<String, DocEntry>,
    pub fields: BTreeMap<String, DocEntry>,
}

impl DocTree {
    pub fn bucket(&self, bucket: Bucket) -> &BTreeMap<String, DocEntry> {
        match bucket {
            Bucket::General => &self.general,
            Bucket::Parameters => &self.parameters,
            Bucket::Returns => &self.returns,
            Bucket::Signals => &self.signals,
            Bucket::Properties => &self.properties,
            Bucket::Fields => &self.fields,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut BTreeMap<String, DocEntry> {
        match bucket {
            Bucket::General => &mut self.general,
            Bucket::Parameters => &mut self.parameters,
            Bucket::Returns => &mut self.returns,
            Bucket::Signals => &mut self.signals,
            Bucket::Properties => &mut self.properties,
            Bucket::Fields => &mut self.fields,
        }
    }

    pub fn total_len(&self) -> usize {
        Bucket::ALL.iter().map(|b| self.bucket(*b).len()).sum()
    }
}

/// Dotted key of `node` plus the tags passed on the way up to `<namespace>`.
struct KeyPath<'a> {
    segments: Vec<&'a str>,
    tags: Vec<&'a str>,
}

impl KeyPath<'_> {
    fn passed_through(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }

    fn key(mut self) -> String {
        // e.g. GLib.IConv has a nameless conversion function
        if let Some(last) = self.segments.last_mut() {
            if last.is_empty() {
                *last = "_";
            }
        }
        self.segments
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| escape_identifier(s))
            .collect::<Vec<_>>()
            .join(".")
    }
}

fn key_path(node: Node<'_>) -> KeyPath<'_> {
    let mut segments = vec![node.attr("name").unwrap_or_default()];
    let mut tags = Vec::new();
    let mut current = node;
    while !current.is_tag("namespace") {
        tags.push(current.tag().unwrap_or_default());
        let Some(parent) = current.parent() else {
            break;
        };
        current = parent;
        // some documents put elements directly under <repository>
        if current.is_tag("repository") {
            break;
        }
        segments.push(current.attr("name").unwrap_or_default());
    }
    segments.reverse();
    KeyPath { segments, tags }
}

fn doc_entry(node: Node<'_>) -> DocEntry {
    let docs = node
        .first_child_element("doc")
        .and_then(|d| d.first_text())
        .unwrap_or_default();
    DocEntry {
        docs: docs.to_string(),
        version: node.attr("version").unwrap_or_default().to_string(),
        deprecated_version: node.attr("deprecated-version").unwrap_or_default().to_string(),
        deprecated: node.attr("deprecated").unwrap_or_default().to_string(),
    }
}

/// Extract the six documentation buckets from a parsed document.
pub fn extract_docs(doc: &GirDocument) -> DocTree {
    let mut tree = DocTree::default();

    for &(tag, bucket) in DOC_TAGS {
        for node in doc.descendants_by_tag(tag) {
            let path = key_path(node);
            if path.passed_through("virtual-method") {
                continue;
            }
            // signal parameters are not modelled yet
            if matches!(bucket, Bucket::Parameters | Bucket::Returns)
                && path.passed_through("glib:signal")
            {
                continue;
            }
            let entry = doc_entry(node);
            tree.bucket_mut(bucket).insert(path.key(), entry);
        }
    }

    debug!(entries = tree.total_len(), "extracted documentation tree");
    tree
}
