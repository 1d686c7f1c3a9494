//! Lazy operators.
//!
//! A handle captures `(backend, f, xs)` and computes nothing until it is
//! multiplied. Products with vectors stay matrix-free: `J * v` is one
//! pushforward, `v * J` one pullback, `H * v` a pushforward of the gradient
//! map. Products with plain numbers materialize and scale, since there is
//! nothing to save.
//!
//! Both `&handle * &value` and `&value * &handle` are supported through
//! [`Mul`]; the result is a [`Result`] because the underlying operators are
//! fallible.
//!
//! ```
//! use adops::{lazy_jacobian, ReverseDiff, Function, Result, Scalar, Value};
//! use ndarray::array;
//!
//! struct Square;
//! impl Function for Square {
//!     fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
//!         Ok(xs[0].map(|&v| v * v))
//!     }
//! }
//!
//! let xs = vec![Value::from(array![1.0, 2.0])];
//! let jac = lazy_jacobian(&ReverseDiff, &Square, xs);
//! let jv = (&jac * &Value::from(array![1.0, 1.0])).unwrap();
//! assert_eq!(jv, Value::from(array![2.0, 4.0]));
//! ```

use std::ops::Mul;

use ndarray::Array2;

use crate::api::{
    derivative, gradient, hessian, jacobian, pullback_function, pushforward_function,
    single_argument, PushforwardFn,
};
use crate::backend::Backend;
use crate::error::Result;
use crate::function::Function;
use crate::maps::{collapse, GradientMap};
use crate::scalar::Scalar;
use crate::value::{Layout, Shape, Value};

macro_rules! lazy_handle {
    ($(#[$doc:meta])* $name:ident, $ctor:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name<'a, B, F, S> {
            backend: &'a B,
            f: &'a F,
            xs: Vec<Value<S>>,
        }

        impl<'a, B: Backend, F: Function, S: Scalar> $name<'a, B, F, S> {
            pub fn new(backend: &'a B, f: &'a F, xs: Vec<Value<S>>) -> Self {
                $name { backend, f, xs }
            }

            /// The captured evaluation point.
            pub fn point(&self) -> &[Value<S>] {
                &self.xs
            }
        }

        /// Create a lazy handle at `xs`.
        pub fn $ctor<'a, B, F, S>(
            backend: &'a B,
            f: &'a F,
            xs: Vec<Value<S>>,
        ) -> $name<'a, B, F, S>
        where
            B: Backend,
            F: Function,
            S: Scalar,
        {
            $name::new(backend, f, xs)
        }

        impl<'a, B: Backend, F: Function, S: Scalar> Mul<&Value<S>> for &$name<'a, B, F, S> {
            type Output = Result<Value<S>>;

            fn mul(self, rhs: &Value<S>) -> Result<Value<S>> {
                self.right_mul(rhs)
            }
        }

        impl<'a, B: Backend, F: Function, S: Scalar> Mul<&$name<'a, B, F, S>> for &Value<S> {
            type Output = Result<Value<S>>;

            fn mul(self, rhs: &$name<'a, B, F, S>) -> Result<Value<S>> {
                rhs.left_mul(self)
            }
        }
    };
}

lazy_handle!(
    /// Deferred [`derivative`].
    LazyDerivative,
    lazy_derivative
);
lazy_handle!(
    /// Deferred [`gradient`].
    LazyGradient,
    lazy_gradient
);
lazy_handle!(
    /// Deferred [`jacobian`]: products are pushforwards and pullbacks.
    LazyJacobian,
    lazy_jacobian
);
lazy_handle!(
    /// Deferred [`hessian`]: products differentiate the gradient map.
    LazyHessian,
    lazy_hessian
);

// ══════════════════════════════════════════════
//  Derivative / gradient: small, always materialized
// ══════════════════════════════════════════════

impl<B: Backend, F: Function, S: Scalar> LazyDerivative<'_, B, F, S> {
    /// The derivative, bare for a single argument and a tuple otherwise.
    pub fn materialize(&self) -> Result<Value<S>> {
        derivative(self.backend, self.f, &self.xs).map(collapse)
    }

    /// `D * y`: scalars scale, tuples multiply slot by slot, arrays entry by entry.
    pub fn right_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        Ok(self.materialize()?.hadamard(y))
    }

    /// `y * D`.
    pub fn left_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        Ok(y.hadamard(&self.materialize()?))
    }
}

impl<B: Backend, F: Function, S: Scalar> LazyGradient<'_, B, F, S> {
    /// The gradient, bare for a single argument and a tuple otherwise.
    pub fn materialize(&self) -> Result<Value<S>> {
        gradient(self.backend, self.f, &self.xs).map(collapse)
    }

    pub fn right_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        Ok(self.materialize()?.hadamard(y))
    }

    pub fn left_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        Ok(y.hadamard(&self.materialize()?))
    }
}

// ══════════════════════════════════════════════
//  Jacobian
// ══════════════════════════════════════════════

impl<B: Backend, F: Function, S: Scalar> LazyJacobian<'_, B, F, S> {
    /// The full Jacobian in nested tuple form.
    pub fn materialize(&self) -> Result<Value<S>> {
        jacobian(self.backend, self.f, &self.xs).map(|jac| jac.into_value())
    }

    /// `J * y`.
    ///
    /// A tuple is one tangent per argument. An array is the tangent of a
    /// single-argument function, and a matrix stacks such tangents as
    /// columns. A scalar scales the materialized Jacobian.
    ///
    /// # Panics
    ///
    /// Panics if an array or matrix operand is used with a function of more
    /// than one argument.
    pub fn right_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        match y {
            Value::Scalar(a) => {
                jacobian(self.backend, self.f, &self.xs).map(|jac| jac.scale(*a).into_value())
            }
            Value::Tuple(ds) => pushforward_function(self.backend, self.f, &self.xs)?(ds),
            Value::Array(_) => {
                single_input(&self.xs, "array")?;
                pushforward_function(self.backend, self.f, &self.xs)?(std::slice::from_ref(y))
            }
            Value::Matrix(m) => {
                let shape = single_input(&self.xs, "matrix")?;
                let pf = pushforward_function(self.backend, self.f, &self.xs)?;
                push_columns(&pf, shape, m)
            }
        }
    }

    /// `y * J`, the pullback of `conj(y)`, one cotangent per argument.
    ///
    /// A matrix (or tuple of matrices for several outputs) stacks cotangents
    /// as rows. A scalar scales the materialized Jacobian.
    pub fn left_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        if let Value::Scalar(a) = y {
            return jacobian(self.backend, self.f, &self.xs)
                .map(|jac| jac.scale(a.conj()).into_value());
        }
        let pb = pullback_function(self.backend, self.f, &self.xs)?;
        pb(&y.map(|v| v.conj())).map(Value::Tuple)
    }
}

// ══════════════════════════════════════════════
//  Hessian
// ══════════════════════════════════════════════

impl<B: Backend, F: Function, S: Scalar> LazyHessian<'_, B, F, S> {
    pub fn materialize(&self) -> Result<Value<S>> {
        hessian(self.backend, self.f, &self.xs).map(Value::Matrix)
    }

    /// The captured argument, with a 1-tuple unwrapped as [`hessian`] does.
    fn argument(&self) -> &[Value<S>] {
        std::slice::from_ref(single_argument(&self.xs, "hessian"))
    }

    /// `H * v`: a pushforward of the gradient map under
    /// `backend.second_lowest()`, without forming `H`.
    ///
    /// A matrix operand stacks directions as columns; a scalar scales the
    /// materialized Hessian.
    pub fn right_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        if let Value::Scalar(a) = y {
            return Ok(Value::Matrix(
                hessian(self.backend, self.f, &self.xs)?.mapv(|v| v * *a),
            ));
        }
        let x = self.argument();
        let map = GradientMap::new(self.backend.lowest(), self.f);
        let pf = pushforward_function(&self.backend.second_lowest(), &map, x)?;
        match y {
            Value::Matrix(m) => push_columns(&pf, x[0].shape()?, m),
            Value::Tuple(ds) => pf(ds),
            _ => pf(std::slice::from_ref(y)),
        }
    }

    /// `v * H`: a pullback of the gradient map, returned as a 1-tuple.
    pub fn left_mul(&self, y: &Value<S>) -> Result<Value<S>> {
        if let Value::Scalar(a) = y {
            let a = a.conj();
            return Ok(Value::Matrix(
                hessian(self.backend, self.f, &self.xs)?.mapv(|v| a * v),
            ));
        }
        let map = GradientMap::new(self.backend.lowest(), self.f);
        let pb = pullback_function(&self.backend.second_lowest(), &map, self.argument())?;
        pb(&y.map(|v| v.conj())).map(Value::Tuple)
    }
}

/// Shape of the single argument of a product that requires one.
fn single_input<S: Scalar>(xs: &[Value<S>], operand: &str) -> Result<Shape> {
    assert_eq!(
        xs.len(),
        1,
        "{operand} operand requires a single-argument function"
    );
    xs[0].shape()
}

/// Apply a pushforward to each column of `m`, stacking the results as
/// columns of one matrix per output.
fn push_columns<S: Scalar>(
    pf: &PushforwardFn<'_, S>,
    shape: Shape,
    m: &Array2<S>,
) -> Result<Value<S>> {
    assert_eq!(
        m.nrows(),
        shape.len(),
        "tangent matrix height must match argument length"
    );
    let mut columns = Vec::with_capacity(m.ncols());
    for c in 0..m.ncols() {
        columns.push(pf(&[shape.reshape(m.column(c).to_vec())])?);
    }
    // With no columns, a zero tangent still yields the output layout.
    let layout = match columns.first() {
        Some(first) => Layout::of(first)?,
        None => Layout::of(&pf(&[shape.zeros()])?)?,
    };
    let flat = columns
        .iter()
        .map(|dy| layout.flatten_parts(dy))
        .collect::<Result<Vec<_>>>()?;
    let mats = layout
        .shapes()
        .iter()
        .enumerate()
        .map(|(j, out)| {
            Value::Matrix(Array2::from_shape_fn((out.len(), m.ncols()), |(r, c)| {
                flat[c][j][r]
            }))
        })
        .collect();
    Ok(layout.wrap(mats))
}
