//! Unified scanner error type used across all phases.

use thiserror::Error;

/// Errors surfaced by the scanner core.
///
/// Almost nothing in the core is fatal: malformed elements are skipped during
/// parsing, unknown rule names are skipped during resolution, and a failing
/// rule is isolated to its own result. The variants here cover the few places
/// where a caller still needs a hard failure to react to.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The raw source could not be decoded into a tree at all.
    #[error("malformed flow XML: {0}")]
    Xml(String),

    /// A rule name did not resolve against any catalog.
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    /// Unrecoverable scan-wide failure. Propagated to the caller as a single
    /// tagged error instead of partial results.
    #[error("scan aborted: {0}")]
    Fatal(String),
}
