//! Derivative maps as functions.
//!
//! Wrapping a first-order operator in a [`Function`] is how higher-order
//! operators are built: the Hessian is the Jacobian of a [`GradientMap`], the
//! second derivative is the derivative of a [`DerivativeMap`]. The maps are
//! public so that third- and mixed-order derivatives can be composed the same
//! way.

use crate::api::{derivative, gradient, value_and_derivative, value_and_gradient};
use crate::backend::Backend;
use crate::error::Result;
use crate::function::Function;
use crate::scalar::Scalar;
use crate::value::Value;

/// `xs ↦ gradient(backend, f, xs)`.
///
/// A single argument yields its gradient bare; several yield a tuple.
///
/// ```
/// use adops::{jacobian, GradientMap, ForwardDiff, ReverseDiff, Function, Result, Scalar, Value};
///
/// struct Cube;
/// impl Function for Cube {
///     fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
///         Ok(Value::Scalar(xs[0].as_scalar()?.powi(3)))
///     }
/// }
///
/// // d²/dx² x³ at x = 2, forward over reverse.
/// let g = GradientMap::new(ReverseDiff, &Cube);
/// let h = jacobian(&ForwardDiff, &g, &[Value::Scalar(2.0)]).unwrap();
/// assert_eq!(h.matrix(0).unwrap()[[0, 0]], 12.0);
/// ```
#[derive(Clone, Debug)]
pub struct GradientMap<B, F> {
    backend: B,
    f: F,
}

impl<B: Backend, F: Function> GradientMap<B, F> {
    pub fn new(backend: B, f: F) -> Self {
        GradientMap { backend, f }
    }
}

impl<B: Backend, F: Function> Function for GradientMap<B, F> {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        gradient(&self.backend, &self.f, xs).map(collapse)
    }
}

/// `xs ↦ derivative(backend, f, xs)` over scalar arguments.
#[derive(Clone, Debug)]
pub struct DerivativeMap<B, F> {
    backend: B,
    f: F,
}

impl<B: Backend, F: Function> DerivativeMap<B, F> {
    pub fn new(backend: B, f: F) -> Self {
        DerivativeMap { backend, f }
    }
}

impl<B: Backend, F: Function> Function for DerivativeMap<B, F> {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        derivative(&self.backend, &self.f, xs).map(collapse)
    }
}

/// `xs ↦ (f(xs), gradient)`, so the outer layer threads the primal through.
pub(crate) struct ValueAndGradientMap<B, F> {
    pub(crate) backend: B,
    pub(crate) f: F,
}

impl<B: Backend, F: Function> Function for ValueAndGradientMap<B, F> {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let (y, grads) = value_and_gradient(&self.backend, &self.f, xs)?;
        Ok(Value::Tuple(vec![y, collapse(grads)]))
    }
}

/// `xs ↦ (f(xs), derivative)`.
pub(crate) struct ValueAndDerivativeMap<B, F> {
    pub(crate) backend: B,
    pub(crate) f: F,
}

impl<B: Backend, F: Function> Function for ValueAndDerivativeMap<B, F> {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let (y, ders) = value_and_derivative(&self.backend, &self.f, xs)?;
        Ok(Value::Tuple(vec![y, collapse(ders)]))
    }
}

/// One value per argument: bare for a single argument, a tuple otherwise.
pub(crate) fn collapse<S>(mut values: Vec<Value<S>>) -> Value<S> {
    if values.len() == 1 {
        values.swap_remove(0)
    } else {
        Value::Tuple(values)
    }
}
