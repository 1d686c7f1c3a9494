use crate::error::Result;
use crate::scalar::Scalar;
use crate::value::Value;

/// A differentiable function of a fixed number of positional arguments.
///
/// The engine never looks inside: each backend evaluates the function at its
/// own scalar type (`f64` for finite differences, [`Dual`](crate::Dual) for
/// forward mode, [`Reverse`](crate::Reverse) for reverse mode, or nestings of
/// these under a [`HigherOrder`](crate::HigherOrder) backend). Implementations
/// must therefore be written against the generic `T` and build constants with
/// [`Scalar::from_f64`].
///
/// ```
/// use adops::{Function, Result, Scalar, Value};
///
/// /// f(x, y) = x·y
/// struct Product;
///
/// impl Function for Product {
///     fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
///         Ok(Value::Scalar(xs[0].as_scalar()? * xs[1].as_scalar()?))
///     }
/// }
/// ```
pub trait Function {
    /// Evaluate at `xs`, one value per argument.
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>>;
}

impl<F: Function> Function for &F {
    #[inline]
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        (**self).eval(xs)
    }
}
