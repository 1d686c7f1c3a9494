#![allow(dead_code)]

use std::cell::Cell;

use adops::{Function, Result, Scalar, Value};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn c<T: Scalar>(v: f64) -> T {
    T::from_f64(v)
}

// ─── Scalar functions ──────────────────────────────────────────────────────

/// f(x) = x²
pub struct Square;

impl Function for Square {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_scalar()?;
        Ok(Value::Scalar(x * x))
    }
}

/// f(x) = x³
pub struct Cube;

impl Function for Cube {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        Ok(Value::Scalar(xs[0].as_scalar()?.powi(3)))
    }
}

/// f(x, y) = x·y
pub struct Product;

impl Function for Product {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        Ok(Value::Scalar(xs[0].as_scalar()? * xs[1].as_scalar()?))
    }
}

/// f(r, θ) = [r·cos θ, r·sin θ]
pub struct Polar;

impl Function for Polar {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let r = xs[0].as_scalar()?;
        let theta = xs[1].as_scalar()?;
        Ok(Value::from_vec(vec![r * theta.cos(), r * theta.sin()]))
    }
}

// ─── Array functions ───────────────────────────────────────────────────────

/// f(x) = [x0², x0·x1]
pub struct SquareAndCross;

impl Function for SquareAndCross {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_array()?;
        Ok(Value::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
    }
}

/// f(x) = x0²·x1 + x1³
///
/// gradient = [2·x0·x1, x0² + 3·x1²], Hessian = [[2·x1, 2·x0], [2·x0, 6·x1]]
pub struct Cubic2;

impl Function for Cubic2 {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_array()?;
        Ok(Value::Scalar(x[0] * x[0] * x[1] + x[1] * x[1] * x[1]))
    }
}

/// Rosenbrock over a flat array.
pub struct Rosenbrock;

impl Function for Rosenbrock {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_array()?;
        let mut sum = T::zero();
        for i in 0..x.len() - 1 {
            let t1 = c::<T>(1.0) - x[i];
            let t2 = x[i + 1] - x[i] * x[i];
            sum = sum + t1 * t1 + c::<T>(100.0) * t2 * t2;
        }
        Ok(Value::Scalar(sum))
    }
}

/// f(x, y) = (x³, [y0·y1, exp(y1)]) with scalar `x` and array `y`: the
/// arguments never mix.
pub struct Separable;

impl Function for Separable {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_scalar()?;
        let y = xs[1].as_array()?;
        Ok(Value::Tuple(vec![
            Value::Scalar(x * x * x),
            Value::from_vec(vec![y[0] * y[1], y[1].exp()]),
        ]))
    }
}

/// f(x) = 1 + Σ xᵢ², defined for empty `x`.
pub struct ShiftedNorm;

impl Function for ShiftedNorm {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_array()?;
        let sum = x.iter().fold(T::one(), |acc, &v| acc + v * v);
        Ok(Value::Scalar(sum))
    }
}

/// Wraps a function and counts its evaluations at any scalar type.
pub struct Counting<F> {
    pub inner: F,
    pub calls: Cell<usize>,
}

impl<F> Counting<F> {
    pub fn new(inner: F) -> Self {
        Counting {
            inner,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl<F: Function> Function for Counting<F> {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        self.calls.set(self.calls.get() + 1);
        self.inner.eval(xs)
    }
}

/// Flatten a scalar/array value to `f64`s.
pub fn flat(v: &Value<f64>) -> Vec<f64> {
    v.flatten().unwrap()
}
