//! Attribute names exported by the two foundational runtime namespaces.
//!
//! `GObject` and `GLib` expose constants (`TYPE_INT`, `MAXINT64`, …) that come
//! from the binding's overrides rather than the GIR. The caller supplies the
//! names it knows about; nothing here introspects a live runtime.
//!
//! JSON form: `{"GObject": ["TYPE_INT", "G_MAXINT"], "GLib": ["MAXINT64"]}`

use crate::error::Result;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const GOBJECT: &str = "GObject";
pub const GLIB: &str = "GLib";

static RE_GLIB_LIMIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:MIN|MAX)U?INT\d+").unwrap());

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(transparent)]
pub struct Reflection {
    namespaces: HashMap<String, Vec<String>>,
}

impl Reflection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn with_namespace<I, S>(mut self, namespace: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn attribute_names(&self, namespace: &str) -> &[String] {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Synthetic `(c_name, dotted_name)` entries for `namespace`. Empty for
    /// every namespace other than `GObject` and `GLib`.
    pub fn synthetic_symbols(&self, namespace: &str) -> Vec<(String, String)> {
        let names = self.attribute_names(namespace);
        match namespace {
            GOBJECT => {
                let mut out = Vec::new();
                for key in names {
                    if key.starts_with("TYPE_") {
                        out.push((format!("G_{key}"), format!("{GOBJECT}.{key}")));
                    } else if key.starts_with("G_MAX") || key.starts_with("G_MIN") {
                        out.push((key.clone(), format!("{GOBJECT}.{key}")));
                    }
                }
                out.push(("GBoxed".to_string(), format!("{GOBJECT}.GBoxed")));
                out
            }
            GLIB => names
                .iter()
                .filter(|key| RE_GLIB_LIMIT.is_match(key))
                .map(|key| (format!("G_{key}"), format!("{GLIB}.{key}")))
                .collect(),
            _ => Vec::new(),
        }
    }
}
