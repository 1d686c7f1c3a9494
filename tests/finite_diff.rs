mod common;

use adops::{
    derivative, gradient, jacobian, value_and_jacobian, Backend, BackendKind,
    FiniteDifferenceConfig, FiniteDifferences, Primitive, Stencil, Value,
};
use approx::assert_relative_eq;
use common::{flat, Counting, Polar, Rosenbrock};
use ndarray::array;

struct Sin;

impl adops::Function for Sin {
    fn eval<T: adops::Scalar>(&self, xs: &[Value<T>]) -> adops::Result<Value<T>> {
        Ok(Value::Scalar(xs[0].as_scalar()?.sin()))
    }
}

#[test]
fn default_config() {
    let fd = FiniteDifferences::default();
    assert_eq!(fd.config().stencil, Stencil::Central5);
    assert_eq!(fd.config().relative_step, None);
    assert_eq!(fd.kind(), BackendKind::FiniteDifference);
    assert_eq!(fd.primitive(), Primitive::Jacobian);
    assert_eq!(fd.name(), "finite_differences");
}

#[test]
fn both_stencils_approximate_cosine() {
    for (stencil, tol) in [(Stencil::Central3, 1e-9), (Stencil::Central5, 1e-11)] {
        let d = derivative(
            &FiniteDifferences::with_stencil(stencil),
            &Sin,
            &[Value::Scalar(0.7)],
        )
        .unwrap();
        assert_relative_eq!(d[0].as_scalar().unwrap(), 0.7f64.cos(), epsilon = tol);
    }
}

#[test]
fn stencil_sets_the_number_of_evaluations() {
    let xs = [Value::from(array![1.0, -1.0, 0.5])];
    for (stencil, per_column) in [(Stencil::Central3, 2), (Stencil::Central5, 4)] {
        let f = Counting::new(Rosenbrock);
        jacobian(&FiniteDifferences::with_stencil(stencil), &f, &xs).unwrap();
        assert_eq!(f.calls(), 3 * per_column);
    }
}

#[test]
fn explicit_relative_step() {
    let fd = FiniteDifferences::new(FiniteDifferenceConfig {
        stencil: Stencil::Central3,
        relative_step: Some(1e-4),
    });
    let d = derivative(&fd, &Sin, &[Value::Scalar(0.3)]).unwrap();
    // Truncation error of the 3-point stencil is about h²/6.
    assert_relative_eq!(d[0].as_scalar().unwrap(), 0.3f64.cos(), epsilon = 1e-8);
}

#[test]
fn rosenbrock_gradient() {
    let g = gradient(
        &FiniteDifferences::default(),
        &Rosenbrock,
        &[Value::from(array![-1.2, 1.0])],
    )
    .unwrap();
    // ∂f/∂x0 = -2(1 - x0) - 400·x0·(x1 - x0²), ∂f/∂x1 = 200·(x1 - x0²)
    let expected = [-2.0 * 2.2 - 400.0 * -1.2 * (1.0 - 1.44), 200.0 * (1.0 - 1.44)];
    for (got, want) in flat(&g[0]).iter().zip(expected) {
        assert_relative_eq!(*got, want, epsilon = 1e-7);
    }
}

#[test]
fn primal_is_recomputed() {
    let xs = [Value::Scalar(2.0), Value::Scalar(0.0)];
    let (y, jac) = value_and_jacobian(&FiniteDifferences::default(), &Polar, &xs).unwrap();
    assert_eq!(y, Value::from(array![2.0, 0.0]));
    let theta = jac.matrix(1).unwrap();
    assert_relative_eq!(theta[[0, 0]], 0.0, epsilon = 1e-9);
    assert_relative_eq!(theta[[1, 0]], 2.0, epsilon = 1e-9);
}
