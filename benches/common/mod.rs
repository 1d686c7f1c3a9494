#![allow(dead_code)]

use adops::{Function, Result, Scalar, Value};

// ─── Rosenbrock ────────────────────────────────────────────────────────────

pub struct Rosenbrock;

impl Function for Rosenbrock {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_array()?;
        let one = T::from_f64(1.0);
        let hundred = T::from_f64(100.0);
        let mut sum = T::zero();
        for i in 0..x.len() - 1 {
            let t1 = one - x[i];
            let t2 = x[i + 1] - x[i] * x[i];
            sum = sum + t1 * t1 + hundred * t2 * t2;
        }
        Ok(Value::Scalar(sum))
    }
}

// ─── Trigonometric map ─────────────────────────────────────────────────────

/// f(x)_i = sin(x_i)·x_{i+1}, cyclic: a square Jacobian with two bands.
pub struct Cyclic;

impl Function for Cyclic {
    fn eval<T: Scalar>(&self, xs: &[Value<T>]) -> Result<Value<T>> {
        let x = xs[0].as_array()?;
        let n = x.len();
        Ok(Value::from_vec(
            (0..n).map(|i| x[i].sin() * x[(i + 1) % n]).collect(),
        ))
    }
}

pub fn make_input(n: usize) -> Vec<Value<f64>> {
    vec![Value::from_vec((0..n).map(|i| 0.5 + 0.01 * i as f64).collect())]
}
