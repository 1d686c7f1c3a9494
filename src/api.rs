//! Operator library.
//!
//! Every operator is written once against [`Backend`] and works whichever
//! primitive the backend supplies natively. First-order operators use
//! `backend.lowest()`; second-order ones differentiate a [`GradientMap`] or
//! [`DerivativeMap`] with `backend.second_lowest()`.
//!
//! Results keep one slot per argument: a one-argument call returns a
//! one-element `Vec`, never a bare value.
//!
//! Arity and shape mismatches are caller bugs and panic. Unsupported value
//! kinds and missing primitives are returned as [`DiffError`].

use ndarray::Array2;

use crate::backend::{Backend, Primitive, PullbackFn};
use crate::error::{DiffError, Result};
use crate::function::Function;
use crate::jacobian::Jacobian;
use crate::maps::{GradientMap, ValueAndDerivativeMap, ValueAndGradientMap};
use crate::primal::primal_value;
use crate::scalar::Scalar;
use crate::value::{Shape, Value};

/// A tangent-tuple-to-output-tangent closure.
pub type PushforwardFn<'a, S> = Box<dyn Fn(&[Value<S>]) -> Result<Value<S>> + 'a>;

/// A tangent-tuple-to-`(value, output tangent)` closure.
pub type ValuePushforwardFn<'a, S> =
    Box<dyn Fn(&[Value<S>]) -> Result<(Value<S>, Value<S>)> + 'a>;

// ══════════════════════════════════════════════
//  First order
// ══════════════════════════════════════════════

/// Full Jacobian of `f` at `xs`.
///
/// ```
/// use adops::{jacobian, ForwardDiff, Function, Result, Scalar, Value};
/// use ndarray::array;
///
/// /// [x0², x0·x1]
/// struct F;
/// impl Function for F {
///     fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
///         let x = xs[0].as_array()?;
///         Ok(Value::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
///     }
/// }
///
/// let jac = jacobian(&ForwardDiff, &F, &[Value::from(array![1.0, 2.0])]).unwrap();
/// assert_eq!(jac.matrix(0).unwrap(), &array![[2.0, 0.0], [2.0, 1.0]]);
/// ```
pub fn jacobian<B, F, S>(backend: &B, f: &F, xs: &[Value<S>]) -> Result<Jacobian<S>>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    backend.lowest().jacobian(f, xs).map(|(_, jac)| jac)
}

/// The primal and the full Jacobian.
pub fn value_and_jacobian<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, Jacobian<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let (y, jac) = backend.lowest().jacobian(f, xs)?;
    Ok((primal_value(backend, y, f, xs)?, jac))
}

/// Derivative with respect to each scalar argument, shaped like the output.
pub fn derivative<B, F, S>(backend: &B, f: &F, xs: &[Value<S>]) -> Result<Vec<Value<S>>>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    scalar_jacobian(backend, f, xs).map(|(_, jac)| derivatives_of(&jac))
}

/// The primal and [`derivative`].
pub fn value_and_derivative<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, Vec<Value<S>>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let (y, jac) = scalar_jacobian(backend, f, xs)?;
    Ok((primal_value(backend, y, f, xs)?, derivatives_of(&jac)))
}

fn scalar_jacobian<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Option<Value<S>>, Jacobian<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    for (index, x) in xs.iter().enumerate() {
        if !matches!(x, Value::Scalar(_)) {
            return Err(DiffError::NotScalar {
                index,
                kind: x.kind(),
            });
        }
    }
    backend.lowest().jacobian(f, xs)
}

fn derivatives_of<S: Scalar>(jac: &Jacobian<S>) -> Vec<Value<S>> {
    jac.blocks()
        .iter()
        .map(|block| {
            jac.outputs()
                .assemble(block.outputs().iter().map(|m| m.column(0).to_vec()).collect())
        })
        .collect()
}

/// Gradient of a scalar-valued `f`, one entry per argument in its shape.
///
/// Fails with [`DiffError::NonScalarOutput`] when `f` returns anything but a
/// single scalar.
pub fn gradient<B, F, S>(backend: &B, f: &F, xs: &[Value<S>]) -> Result<Vec<Value<S>>>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let (_, jac) = backend.lowest().jacobian(f, xs)?;
    gradients_of(&jac)
}

/// The primal and [`gradient`].
pub fn value_and_gradient<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, Vec<Value<S>>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let (y, jac) = backend.lowest().jacobian(f, xs)?;
    let grads = gradients_of(&jac)?;
    Ok((primal_value(backend, y, f, xs)?, grads))
}

fn gradients_of<S: Scalar>(jac: &Jacobian<S>) -> Result<Vec<Value<S>>> {
    let outputs = jac.outputs();
    if outputs.is_multi() || outputs.shapes()[0] != Shape::Scalar {
        return Err(DiffError::NonScalarOutput {
            kind: outputs.kind(),
        });
    }
    Ok(jac
        .blocks()
        .iter()
        .zip(jac.inputs())
        .map(|(block, shape)| {
            let row = block.outputs()[0].row(0);
            shape.reshape(row.iter().map(|v| v.conj()).collect())
        })
        .collect())
}

// ══════════════════════════════════════════════
//  Second order
// ══════════════════════════════════════════════

/// The single argument of a second-order operator, unwrapping a 1-tuple.
pub(crate) fn single_argument<'x, S>(xs: &'x [Value<S>], op: &str) -> &'x Value<S> {
    assert_eq!(xs.len(), 1, "{op} takes a single argument");
    match &xs[0] {
        Value::Tuple(items) if items.len() == 1 => &items[0],
        x => x,
    }
}

/// Hessian of a scalar-valued `f` of one argument.
///
/// The gradient is taken with `backend.lowest()` and differentiated with
/// `backend.second_lowest()`; a plain backend differentiates itself.
///
/// # Panics
///
/// Panics if `xs` holds more than one argument.
pub fn hessian<B, F, S>(backend: &B, f: &F, xs: &[Value<S>]) -> Result<Array2<S>>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let x = single_argument(xs, "hessian");
    let map = GradientMap::new(backend.lowest(), f);
    let jac = jacobian(&backend.second_lowest(), &map, std::slice::from_ref(x))?;
    Ok(hessian_block(&jac, 0))
}

/// The primal and [`hessian`].
pub fn value_and_hessian<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, Array2<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    value_gradient_and_hessian(backend, f, xs).map(|(y, _, h)| (y, h))
}

/// The primal, the gradient (a 1-element `Vec`) and the Hessian in one pass.
pub fn value_gradient_and_hessian<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, Vec<Value<S>>, Array2<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let x = std::slice::from_ref(single_argument(xs, "value_gradient_and_hessian"));
    let map = ValueAndGradientMap {
        backend: backend.lowest(),
        f,
    };
    let outer = backend.second_lowest();
    let (inner, jac) = value_and_jacobian(&outer, &map, x)?;
    let mut parts = inner.into_parts().into_iter();
    match (parts.next(), parts.next()) {
        (Some(y), Some(grad)) => Ok((y, vec![grad], hessian_block(&jac, 1))),
        _ => unreachable!("value-and-gradient map returns a pair"),
    }
}

fn hessian_block<S: Scalar>(jac: &Jacobian<S>, output: usize) -> Array2<S> {
    jac[0].outputs()[output].clone()
}

/// Second derivative of `f` with respect to its single scalar argument.
///
/// # Panics
///
/// Panics if `xs` holds more than one argument.
pub fn second_derivative<B, F, S>(backend: &B, f: &F, xs: &[Value<S>]) -> Result<Value<S>>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    value_derivative_and_second_derivative(backend, f, xs).map(|(_, _, d2)| d2)
}

/// The primal and [`second_derivative`].
pub fn value_and_second_derivative<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, Value<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    value_derivative_and_second_derivative(backend, f, xs).map(|(y, _, d2)| (y, d2))
}

/// The primal, the first and the second derivative with respect to a single
/// scalar argument.
pub fn value_derivative_and_second_derivative<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, Value<S>, Value<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let x = std::slice::from_ref(single_argument(xs, "second_derivative"));
    let map = ValueAndDerivativeMap {
        backend: backend.lowest(),
        f,
    };
    let outer = backend.second_lowest();
    let (inner, mut ders) = value_and_derivative(&outer, &map, x)?;
    let mut parts = inner.into_parts().into_iter();
    let second = match ders.pop().map(Value::into_parts) {
        Some(mut d) if d.len() == 2 => d.swap_remove(1),
        _ => unreachable!("value-and-derivative map returns a pair"),
    };
    match (parts.next(), parts.next()) {
        (Some(y), Some(d)) => Ok((y, d, second)),
        _ => unreachable!("value-and-derivative map returns a pair"),
    }
}

// ══════════════════════════════════════════════
//  Products at a point
// ══════════════════════════════════════════════

/// A closure computing pushforwards at `xs`.
///
/// With a native pushforward each call runs one forward pass; otherwise the
/// Jacobian is computed once here and each call is a `J·ds` product.
pub fn pushforward_function<'a, B, F, S>(
    backend: &B,
    f: &'a F,
    xs: &[Value<S>],
) -> Result<PushforwardFn<'a, S>>
where
    B: Backend,
    F: Function,
    S: Scalar + 'a,
{
    let lowest = backend.lowest();
    if lowest.primitive() == Primitive::Pushforward {
        let xs = xs.to_vec();
        return Ok(Box::new(move |ds: &[Value<S>]| {
            lowest.pushforward(f, &xs, ds).map(|(_, dy)| dy)
        }));
    }
    let (_, jac) = lowest.jacobian(f, xs)?;
    Ok(Box::new(move |ds: &[Value<S>]| jac.jvp(ds)))
}

/// Like [`pushforward_function`], pairing each tangent with the primal.
pub fn value_and_pushforward_function<'a, B, F, S>(
    backend: &B,
    f: &'a F,
    xs: &[Value<S>],
) -> Result<ValuePushforwardFn<'a, S>>
where
    B: Backend,
    F: Function,
    S: Scalar + 'a,
{
    let lowest = backend.lowest();
    if lowest.primitive() == Primitive::Pushforward {
        let xs = xs.to_vec();
        return Ok(Box::new(move |ds: &[Value<S>]| {
            let (y, dy) = lowest.pushforward(f, &xs, ds)?;
            Ok((primal_value(&lowest, y, f, &xs)?, dy))
        }));
    }
    let (y, jac) = lowest.jacobian(f, xs)?;
    let y = primal_value(&lowest, y, f, xs)?;
    Ok(Box::new(move |ds: &[Value<S>]| Ok((y.clone(), jac.jvp(ds)?))))
}

/// A closure computing pullbacks at `xs`, one cotangent per argument.
///
/// Cotangents are output-shaped; a matrix per output is a stacked linear
/// map and yields one `k × len(argument)` matrix per argument.
pub fn pullback_function<'a, B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<PullbackFn<'a, S>>
where
    B: Backend,
    F: Function,
    S: Scalar + 'a,
{
    backend.lowest().value_and_pullback(f, xs).map(|(_, pb)| pb)
}

/// The primal and [`pullback_function`].
pub fn value_and_pullback_function<'a, B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Value<S>, PullbackFn<'a, S>)>
where
    B: Backend,
    F: Function,
    S: Scalar + 'a,
{
    let (y, pb) = backend.lowest().value_and_pullback(f, xs)?;
    Ok((primal_value(backend, y, f, xs)?, pb))
}
