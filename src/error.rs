//! Error types for the geoblob library
//!
//! Every failure surfaced to a host falls into one of four kinds, named after
//! the ISO Prolog error terms the foreign predicates raise. The offending
//! value travels with the error as rendered text so that both the term-level
//! predicates and the C API can report it.

use crate::host::{Atom, Term};
use std::fmt;
use thiserror::Error;

/// Result type alias for geoblob operations
pub type GeoResult<T> = std::result::Result<T, GeoError>;

/// Main error type for geoblob operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// Argument has the wrong shape or kind
    #[error("Type error: `{expected}' expected, found `{culprit}'")]
    Type {
        /// Name of the expected type
        expected: &'static str,
        /// The offending value
        culprit: String,
    },

    /// Argument has the right kind but an invalid value
    #[error("Domain error: `{domain}' expected, found `{culprit}'")]
    Domain {
        /// Name of the expected domain
        domain: &'static str,
        /// The offending value
        culprit: String,
    },

    /// Operation is not allowed in the current state
    #[error("No permission to {action} {kind} `{culprit}'")]
    Permission {
        /// What was attempted (`open`, `access`, ...)
        action: &'static str,
        /// What it was attempted on
        kind: &'static str,
        /// The offending value
        culprit: String,
    },

    /// A named resource does not exist
    #[error("{kind} `{culprit}' does not exist")]
    Existence {
        /// Kind of the missing resource
        kind: &'static str,
        /// The missing resource
        culprit: String,
    },
}

/// Coarse classification of a [`GeoError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`GeoError::Type`]
    Type,
    /// See [`GeoError::Domain`]
    Domain,
    /// See [`GeoError::Permission`]
    Permission,
    /// See [`GeoError::Existence`]
    Existence,
}

impl GeoError {
    /// Build a type error
    pub fn type_error(expected: &'static str, culprit: impl fmt::Display) -> Self {
        GeoError::Type {
            expected,
            culprit: culprit.to_string(),
        }
    }

    /// Build a domain error
    pub fn domain(domain: &'static str, culprit: impl fmt::Display) -> Self {
        GeoError::Domain {
            domain,
            culprit: culprit.to_string(),
        }
    }

    /// Build a permission error
    pub fn permission(action: &'static str, kind: &'static str, culprit: impl fmt::Display) -> Self {
        GeoError::Permission {
            action,
            kind,
            culprit: culprit.to_string(),
        }
    }

    /// Build an existence error
    pub fn existence(kind: &'static str, culprit: impl fmt::Display) -> Self {
        GeoError::Existence {
            kind,
            culprit: culprit.to_string(),
        }
    }

    /// Which of the four kinds this error is
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeoError::Type { .. } => ErrorKind::Type,
            GeoError::Domain { .. } => ErrorKind::Domain,
            GeoError::Permission { .. } => ErrorKind::Permission,
            GeoError::Existence { .. } => ErrorKind::Existence,
        }
    }

    /// The offending value as text
    pub fn culprit(&self) -> &str {
        match self {
            GeoError::Type { culprit, .. }
            | GeoError::Domain { culprit, .. }
            | GeoError::Permission { culprit, .. }
            | GeoError::Existence { culprit, .. } => culprit,
        }
    }

    /// Render as `error(Formal, _)`, the shape a Prolog host throws
    ///
    /// The culprit becomes a string term since only its rendering survives.
    pub fn to_term(&self) -> Term {
        let culprit = Term::String(self.culprit().to_string());
        let formal = match self {
            GeoError::Type { expected, .. } => {
                Term::compound("type_error", vec![Term::atom(expected), culprit])
            }
            GeoError::Domain { domain, .. } => {
                Term::compound("domain_error", vec![Term::atom(domain), culprit])
            }
            GeoError::Permission { action, kind, .. } => Term::compound(
                "permission_error",
                vec![Term::atom(action), Term::atom(kind), culprit],
            ),
            GeoError::Existence { kind, .. } => {
                Term::compound("existence_error", vec![Term::atom(kind), culprit])
            }
        };
        Term::Compound {
            name: Atom::new("error"),
            args: vec![formal, Term::Var],
        }
    }
}
