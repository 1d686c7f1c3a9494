//! Backend capability interface.
//!
//! A backend declares which of the three primitives it supplies natively
//! ([`Backend::primitive`]) and implements the matching `*_primitive` slot.
//! The provided methods [`Backend::jacobian`], [`Backend::pushforward`] and
//! [`Backend::value_and_pullback`] route on that declaration and derive the
//! other two through [`crate::derive`].
//!
//! Every backend also carries a [`BackendKind`] tag, used only for the primal
//! policy and for order reduction, never for dispatch.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use crate::derive;
use crate::error::{DiffError, Result};
use crate::function::Function;
use crate::jacobian::Jacobian;
use crate::scalar::Scalar;
use crate::value::Value;

/// Capability tag of a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackendKind {
    /// Cannot return the primal as a by-product.
    FiniteDifference,
    /// Efficient pushforwards.
    ForwardMode,
    /// Efficient pullbacks.
    ReverseMode,
    /// A composition of backends, outer to inner.
    HigherOrder,
}

/// The native primitive a backend supplies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Primitive {
    /// Full Jacobian.
    Jacobian,
    /// Jacobian-vector product.
    Pushforward,
    /// Vector-Jacobian product.
    Pullback,
}

impl Primitive {
    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Jacobian => "jacobian",
            Primitive::Pushforward => "pushforward",
            Primitive::Pullback => "pullback",
        }
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Primitive {
    type Err = DiffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jacobian" => Ok(Primitive::Jacobian),
            "pushforward" => Ok(Primitive::Pushforward),
            "pullback" => Ok(Primitive::Pullback),
            _ => Err(DiffError::UnknownPrimitive(s.to_owned())),
        }
    }
}

/// A cotangent-to-input-cotangents closure, one result per argument.
pub type PullbackFn<'a, S> = Box<dyn Fn(&Value<S>) -> Result<Vec<Value<S>>> + 'a>;

/// A differentiation backend.
///
/// Implement [`primitive`](Self::primitive) and the one matching slot; the
/// remaining slots keep their default, which fails with
/// [`DiffError::Unimplemented`] at first use.
///
/// ```
/// use adops::{Backend, BackendKind, ForwardDiff, Primitive};
///
/// let b = ForwardDiff;
/// assert_eq!(b.kind(), BackendKind::ForwardMode);
/// assert_eq!(b.primitive(), Primitive::Pushforward);
/// assert_eq!(b.order(), 1);
/// ```
pub trait Backend: Clone + Debug + 'static {
    /// Backend applied directly to the user function.
    type Lowest: Backend;
    /// Backend for the next differentiation layer out.
    type SecondLowest: Backend;
    /// This backend with its innermost layer removed.
    type Reduced: Backend;

    fn kind(&self) -> BackendKind;

    /// Short name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// The primitive this backend supplies natively.
    fn primitive(&self) -> Primitive;

    /// Number of composed layers.
    fn order(&self) -> usize {
        1
    }

    fn lowest(&self) -> Self::Lowest;
    fn second_lowest(&self) -> Self::SecondLowest;
    fn reduce_order(&self) -> Self::Reduced;

    /// Native Jacobian, with the primal if it was computed along the way.
    fn jacobian_primitive<F: Function, S: Scalar>(
        &self,
        _f: &F,
        _xs: &[Value<S>],
    ) -> Result<(Option<Value<S>>, Jacobian<S>)> {
        Err(DiffError::Unimplemented {
            backend: self.name(),
            primitive: Primitive::Jacobian,
        })
    }

    /// Native pushforward: `(f(xs), J·ds)`.
    fn pushforward_primitive<F: Function, S: Scalar>(
        &self,
        _f: &F,
        _xs: &[Value<S>],
        _ds: &[Value<S>],
    ) -> Result<(Value<S>, Value<S>)> {
        Err(DiffError::Unimplemented {
            backend: self.name(),
            primitive: Primitive::Pushforward,
        })
    }

    /// Native pullback: `f(xs)` and a closure computing `Jᴴ·w` for plain
    /// output-shaped cotangents.
    fn pullback_primitive<'a, F: Function, S: Scalar + 'a>(
        &self,
        _f: &F,
        _xs: &[Value<S>],
    ) -> Result<(Value<S>, PullbackFn<'a, S>)> {
        Err(DiffError::Unimplemented {
            backend: self.name(),
            primitive: Primitive::Pullback,
        })
    }

    /// Full Jacobian, derived from whichever primitive is native.
    fn jacobian<F: Function, S: Scalar>(
        &self,
        f: &F,
        xs: &[Value<S>],
    ) -> Result<(Option<Value<S>>, Jacobian<S>)> {
        match self.primitive() {
            Primitive::Jacobian => self.jacobian_primitive(f, xs),
            Primitive::Pushforward => derive::jacobian_from_pushforward(self, f, xs),
            Primitive::Pullback => derive::jacobian_from_pullback(self, f, xs),
        }
    }

    /// Pushforward of one tangent tuple.
    ///
    /// # Panics
    ///
    /// Panics if `ds` and `xs` have different lengths.
    fn pushforward<F: Function, S: Scalar>(
        &self,
        f: &F,
        xs: &[Value<S>],
        ds: &[Value<S>],
    ) -> Result<(Option<Value<S>>, Value<S>)> {
        assert_eq!(
            ds.len(),
            xs.len(),
            "tangent tuple length must match input arity"
        );
        match self.primitive() {
            Primitive::Pushforward => self
                .pushforward_primitive(f, xs, ds)
                .map(|(y, dy)| (Some(y), dy)),
            _ => derive::pushforward_from_jacobian(self, f, xs, ds),
        }
    }

    /// Primal (when available) and a pullback closure. The closure accepts
    /// plain cotangents and stacked linear-map cotangents alike.
    fn value_and_pullback<'a, F: Function, S: Scalar + 'a>(
        &self,
        f: &F,
        xs: &[Value<S>],
    ) -> Result<(Option<Value<S>>, PullbackFn<'a, S>)> {
        match self.primitive() {
            Primitive::Pullback => derive::native_pullback(self, f, xs),
            _ => derive::pullback_from_jacobian(self, f, xs),
        }
    }
}
