//! Error type shared by every pass over a GIR document.
//!
//! Two families live here: contract violations (the document is well-formed
//! XML but breaks an assumption the GIR generator always honours) and
//! environmental failures (I/O, XML syntax, lookup misses). Contract
//! violations abort the current namespace; the caller decides whether the
//! rest of the run continues.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GirError>;

#[derive(Error, Debug)]
pub enum GirError {
    /// The input is not well-formed XML.
    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `<function>`, `<method>`, `<member>`… lacks an attribute the GIR
    /// schema requires, e.g. `c:identifier`.
    #[error("<{tag}> '{context}' is missing required attribute '{attribute}'")]
    MissingAttribute {
        tag: String,
        attribute: &'static str,
        context: String,
    },

    /// A callable declares `shadows="x"` but nothing named `x` was mapped.
    #[error("shadowed name '{name}' does not resolve to any symbol")]
    UnresolvedShadow { name: String },

    /// Every mapped name is namespace-qualified; a name without a dot means
    /// the walk that produced it went wrong.
    #[error("symbol name '{name}' is not namespace-qualified")]
    UnqualifiedName { name: String },

    /// The locator has no GIR file for `<namespace>-<version>`.
    #[error("no GIR file found for {key}")]
    NotFound { key: String },

    #[error("invalid GIR search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("invalid reflection table: {0}")]
    Reflection(#[from] serde_json::Error),
}

impl GirError {
    /// True for errors caused by a document this crate does not understand,
    /// as opposed to a missing file or unreadable input.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            GirError::MissingAttribute { .. }
                | GirError::UnresolvedShadow { .. }
                | GirError::UnqualifiedName { .. }
        )
    }
}
