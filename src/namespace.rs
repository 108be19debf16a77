//! Namespace descriptors and the caches that keep them alive for a run.
//!
//! A [`Namespace`] is built once per `(name, version)` and holds the symbol
//! table and include list. The documentation tree and private-type set are
//! computed on first request, re-reading the document through the
//! single-slot [`DocumentCache`].

use crate::docs::{extract_docs, DocTree};
use crate::error::Result;
use crate::locate::{namespace_key, GirLocator};
use crate::private::find_private_types;
use crate::reflection::Reflection;
use crate::symbols::{build_symbol_table, SymbolTable};
use crate::tree::GirDocument;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Holds the most recently parsed document only. Parsed GIR trees are large
/// and consecutive passes almost always hit the same file.
#[derive(Debug, Default)]
pub struct DocumentCache {
    slot: Mutex<Option<(PathBuf, Arc<GirDocument>)>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Result<Arc<GirDocument>> {
        let mut slot = self.slot.lock();
        if let Some((cached, doc)) = slot.as_ref() {
            if cached == path {
                debug!(path = %path.display(), "document cache hit");
                return Ok(Arc::clone(doc));
            }
        }
        // drop the old tree before building the new one
        if let Some((old, _)) = slot.take() {
            debug!(path = %old.display(), "evicting parsed document");
        }
        let doc = Arc::new(GirDocument::load(path)?);
        *slot = Some((path.to_path_buf(), Arc::clone(&doc)));
        Ok(doc)
    }

    pub fn cached_path(&self) -> Option<PathBuf> {
        self.slot.lock().as_ref().map(|(path, _)| path.clone())
    }
}

#[derive(Debug)]
pub struct Namespace {
    name: String,
    version: String,
    path: PathBuf,
    symbols: SymbolTable,
    dependencies: Vec<(String, String)>,
    docs: OnceCell<DocTree>,
    private: OnceCell<BTreeSet<String>>,
}

impl Namespace {
    /// Build the descriptor from an already parsed document. `path` is where
    /// the lazy passes re-read it from.
    pub fn from_document(
        name: &str,
        version: &str,
        path: PathBuf,
        doc: &GirDocument,
        reflection: &Reflection,
    ) -> Result<Self> {
        info!(namespace = name, version, "parsing GIR");
        let symbols = build_symbol_table(doc, name, reflection)?;
        let dependencies = doc
            .descendants_by_tag("include")
            .map(|include| {
                (
                    include.attr("name").unwrap_or_default().to_string(),
                    include.attr("version").unwrap_or_default().to_string(),
                )
            })
            .collect();
        Ok(Namespace {
            name: name.to_string(),
            version: version.to_string(),
            path,
            symbols,
            dependencies,
            docs: OnceCell::new(),
            private: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// `(name, version)` of every `<include>`, in document order.
    pub fn dependencies(&self) -> Vec<(String, String)> {
        self.dependencies.clone()
    }

    pub fn docs(&self, documents: &DocumentCache) -> Result<&DocTree> {
        self.docs.get_or_try_init(|| {
            let doc = documents.get(&self.path)?;
            Ok(extract_docs(&doc))
        })
    }

    pub fn private_types(&self, documents: &DocumentCache) -> Result<&BTreeSet<String>> {
        self.private.get_or_try_init(|| {
            let doc = documents.get(&self.path)?;
            Ok(find_private_types(&doc, &self.name))
        })
    }
}

/// Every namespace resolved during a run, constructed at most once per
/// `(name, version)` even when several threads ask at the same time.
pub struct NamespaceCache<L> {
    locator: L,
    reflection: Reflection,
    documents: DocumentCache,
    namespaces: DashMap<(String, String), Arc<Namespace>>,
}

impl<L: GirLocator> NamespaceCache<L> {
    pub fn new(locator: L, reflection: Reflection) -> Self {
        NamespaceCache {
            locator,
            reflection,
            documents: DocumentCache::new(),
            namespaces: DashMap::new(),
        }
    }

    pub fn get(&self, name: &str, version: &str) -> Result<Arc<Namespace>> {
        let key = (name.to_string(), version.to_string());
        if let Some(ns) = self.namespaces.get(&key) {
            return Ok(Arc::clone(ns.value()));
        }
        // the entry holds its shard lock until construction finishes, so a
        // racing caller waits and then sees the finished namespace
        let entry = self.namespaces.entry(key).or_try_insert_with(|| {
            let path = self.locator.locate(&namespace_key(name, version))?;
            let doc = self.documents.get(&path)?;
            Namespace::from_document(name, version, path, &doc, &self.reflection).map(Arc::new)
        })?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn docs<'n>(&self, namespace: &'n Namespace) -> Result<&'n DocTree> {
        namespace.docs(&self.documents)
    }

    pub fn private_types<'n>(&self, namespace: &'n Namespace) -> Result<&'n BTreeSet<String>> {
        namespace.private_types(&self.documents)
    }

    pub fn documents(&self) -> &DocumentCache {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
