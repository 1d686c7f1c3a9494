//! Error type for operator composition.

use thiserror::Error;

use crate::backend::Primitive;

/// Errors surfaced by the operator library.
///
/// Arity and shape mismatches are not represented here: they are caller bugs
/// and panic at the call boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The backend was asked for a primitive it does not provide.
    #[error("backend `{backend}` does not implement the `{primitive}` primitive")]
    Unimplemented {
        /// Backend name.
        backend: &'static str,
        /// The missing primitive.
        primitive: Primitive,
    },

    /// A value of a kind the engine cannot differentiate through.
    #[error("unsupported value kind `{kind}` as {context}")]
    UnsupportedKind {
        /// Kind of the offending value (`"tuple"`, `"matrix"`, ...).
        kind: &'static str,
        /// Where the value appeared.
        context: &'static str,
    },

    /// A scalar-only operator received a non-scalar argument.
    #[error("expected a scalar argument at position {index}, got `{kind}`")]
    NotScalar {
        /// Argument position.
        index: usize,
        /// Kind of the offending argument.
        kind: &'static str,
    },

    /// A gradient was requested for a function that is not scalar-valued.
    #[error("gradient requires a scalar-valued function, got an output of kind `{kind}`")]
    NonScalarOutput {
        /// Kind of the function's output.
        kind: &'static str,
    },

    /// A primitive name that the engine does not know.
    #[error("unknown primitive `{0}` (expected `jacobian`, `pushforward` or `pullback`)")]
    UnknownPrimitive(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = DiffError> = std::result::Result<T, E>;
