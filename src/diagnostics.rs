//! Diagnostics
//!
//! Structured, non-fatal anomalies observed while registering contributions or
//! resolving documents. Every diagnostic is also emitted as a `warn` event.

use std::fmt;

/// A non-fatal anomaly recorded by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Contributions under one key disagree on their root type. The first-seen
    /// type is kept.
    TypeMismatch {
        key: String,
        expected: String,
        found: String,
    },
    /// A contributed document has no fragment definition to register.
    MissingFragmentDefinition { key: String },
    /// A document without source text was handed to the resolver and returned unchanged.
    UnsupportedDocument,
    /// A contribution arrived after initialization and was dropped.
    LateContribution { kind: ContributionKind, key: String },
    /// Transitive resolution stopped before every reachable spread was resolved.
    ResolveDepthExceeded { depth: usize, pending: Vec<String> },
}

/// Which add-function a late contribution went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributionKind {
    Fragment,
    Mutation,
    Query,
}

impl fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContributionKind::Fragment => write!(f, "fragment"),
            ContributionKind::Mutation => write!(f, "mutation options"),
            ContributionKind::Query => write!(f, "query options"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TypeMismatch {
                key,
                expected,
                found,
            } => write!(
                f,
                "Fragment '{}' registered on type '{}' but a later contribution targets '{}'",
                key, expected, found
            ),
            Diagnostic::MissingFragmentDefinition { key } => {
                write!(f, "Document registered under '{}' has no fragment definition", key)
            }
            Diagnostic::UnsupportedDocument => {
                write!(f, "Document has no source text; fragments were not resolved")
            }
            Diagnostic::LateContribution { kind, key } => write!(
                f,
                "Ignored {} '{}' contributed after the registry was initialized",
                kind, key
            ),
            Diagnostic::ResolveDepthExceeded { depth, pending } => write!(
                f,
                "Stopped resolving after {} passes with unresolved spreads: {}",
                depth,
                pending.join(", ")
            ),
        }
    }
}
