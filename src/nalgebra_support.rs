//! nalgebra adapters for the operator library.
//!
//! Thin wrappers for single-argument functions over one flat array: accept a
//! `DVector<F>` and return `DVector<F>` / `DMatrix<F>`.

use nalgebra::{DMatrix, DVector};
use ndarray::Array2;

use crate::api::{gradient, jacobian, value_and_gradient, value_gradient_and_hessian};
use crate::backend::Backend;
use crate::error::{DiffError, Result};
use crate::function::Function;
use crate::jacobian::Jacobian;
use crate::scalar::Scalar;
use crate::value::Value;

/// Copy an `ndarray` matrix into a `DMatrix`.
pub fn to_dmatrix<F: Scalar + nalgebra::Scalar>(m: &Array2<F>) -> DMatrix<F> {
    DMatrix::from_fn(m.nrows(), m.ncols(), |i, j| m[[i, j]])
}

/// Block `(input, output)` of a Jacobian as a `DMatrix`.
pub fn jacobian_block_dmatrix<F: Scalar + nalgebra::Scalar>(
    jac: &Jacobian<F>,
    input: usize,
    output: usize,
) -> Option<DMatrix<F>> {
    jac.output(input, output).map(to_dmatrix)
}

fn argument<F: Scalar + nalgebra::Scalar>(x: &DVector<F>) -> [Value<F>; 1] {
    [Value::from_vec(x.iter().copied().collect())]
}

fn dvector<F: Scalar + nalgebra::Scalar>(v: &Value<F>) -> Result<DVector<F>> {
    v.flatten().map(DVector::from_vec)
}

/// Gradient of a scalar-valued function, returning a `DVector`.
pub fn gradient_nalgebra<B, Fun, F>(backend: &B, f: &Fun, x: &DVector<F>) -> Result<DVector<F>>
where
    B: Backend,
    Fun: Function,
    F: Scalar + nalgebra::Scalar,
{
    let grads = gradient(backend, f, &argument(x))?;
    dvector(&grads[0])
}

/// Value and gradient, returning `(value, DVector)`.
pub fn value_and_gradient_nalgebra<B, Fun, F>(
    backend: &B,
    f: &Fun,
    x: &DVector<F>,
) -> Result<(F, DVector<F>)>
where
    B: Backend,
    Fun: Function,
    F: Scalar + nalgebra::Scalar,
{
    let (y, grads) = value_and_gradient(backend, f, &argument(x))?;
    Ok((y.as_scalar()?, dvector(&grads[0])?))
}

/// Value, gradient and Hessian, returning `(value, DVector, DMatrix)`.
pub fn hessian_nalgebra<B, Fun, F>(
    backend: &B,
    f: &Fun,
    x: &DVector<F>,
) -> Result<(F, DVector<F>, DMatrix<F>)>
where
    B: Backend,
    Fun: Function,
    F: Scalar + nalgebra::Scalar,
{
    let (y, grads, hess) = value_gradient_and_hessian(backend, f, &argument(x))?;
    Ok((y.as_scalar()?, dvector(&grads[0])?, to_dmatrix(&hess)))
}

/// Jacobian of a single-output function, returning `J[i][j] = ∂f_i/∂x_j`.
pub fn jacobian_nalgebra<B, Fun, F>(backend: &B, f: &Fun, x: &DVector<F>) -> Result<DMatrix<F>>
where
    B: Backend,
    Fun: Function,
    F: Scalar + nalgebra::Scalar,
{
    let jac = jacobian(backend, f, &argument(x))?;
    jac.matrix(0).map(to_dmatrix).ok_or(DiffError::UnsupportedKind {
        kind: "tuple",
        context: "nalgebra jacobian output",
    })
}
