//! girdoc — cross references and documentation from GObject-Introspection XML.
//!
//! For one `(namespace, version)` GIR document this crate produces:
//!
//! - a **symbol table** mapping C identifiers to dotted binding names
//!   (`gtk_dialog_run` → `Gtk.Dialog.run`), see [`symbols`];
//! - a **documentation tree** of raw doc strings and version/deprecation
//!   metadata in six buckets, see [`docs`];
//! - the set of **private types** (disguised opaque records), see [`private`];
//! - the `(name, version)` list of included namespaces.
//!
//! [`NamespaceCache`] ties these together for a documentation run: each
//! namespace is parsed once and the lazy passes are computed on demand.

pub mod docs;
pub mod error;
pub mod escape;
pub mod locate;
pub mod namespace;
pub mod private;
pub mod reflection;
pub mod symbols;
pub mod tree;

pub use docs::{extract_docs, Bucket, DocEntry, DocTree};
pub use error::{GirError, Result};
pub use locate::{GirDirectory, GirLocator};
pub use namespace::{DocumentCache, Namespace, NamespaceCache};
pub use private::find_private_types;
pub use reflection::Reflection;
pub use symbols::{build_symbol_table, SymbolTable};
pub use tree::GirDocument;
