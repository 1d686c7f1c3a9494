//! Backends defined outside the crate.

mod common;

use adops::{
    derivative, gradient, hessian, jacobian, pullback_function, pushforward_function, Backend,
    BackendKind, DiffError, ForwardDiff, Function, HigherOrder, Jacobian, Primitive,
    ReverseDiff, Scalar, Value,
};
use common::{Cubic2, Square, SquareAndCross};
use ndarray::array;

/// Declares a pushforward it never implements.
#[derive(Clone, Debug)]
struct Hollow;

impl Backend for Hollow {
    type Lowest = Self;
    type SecondLowest = Self;
    type Reduced = Self;

    fn kind(&self) -> BackendKind {
        BackendKind::ForwardMode
    }

    fn name(&self) -> &'static str {
        "hollow"
    }

    fn primitive(&self) -> Primitive {
        Primitive::Pushforward
    }

    fn lowest(&self) -> Self {
        Hollow
    }

    fn second_lowest(&self) -> Self {
        Hollow
    }

    fn reduce_order(&self) -> Self {
        Hollow
    }
}

/// Supplies only a Jacobian, borrowed from forward mode.
#[derive(Clone, Debug)]
struct DenseOnly;

impl Backend for DenseOnly {
    type Lowest = Self;
    type SecondLowest = Self;
    type Reduced = Self;

    fn kind(&self) -> BackendKind {
        BackendKind::ForwardMode
    }

    fn name(&self) -> &'static str {
        "dense_only"
    }

    fn primitive(&self) -> Primitive {
        Primitive::Jacobian
    }

    fn lowest(&self) -> Self {
        DenseOnly
    }

    fn second_lowest(&self) -> Self {
        DenseOnly
    }

    fn reduce_order(&self) -> Self {
        DenseOnly
    }

    fn jacobian_primitive<F: Function, S: Scalar>(
        &self,
        f: &F,
        xs: &[Value<S>],
    ) -> adops::Result<(Option<Value<S>>, Jacobian<S>)> {
        ForwardDiff.jacobian(f, xs)
    }
}

#[test]
fn missing_primitive_surfaces_at_first_use() {
    let err = derivative(&Hollow, &Square, &[Value::Scalar(1.0)]).unwrap_err();
    assert_eq!(
        err,
        DiffError::Unimplemented {
            backend: "hollow",
            primitive: Primitive::Pushforward,
        }
    );
    assert_eq!(
        err.to_string(),
        "backend `hollow` does not implement the `pushforward` primitive"
    );
}

#[test]
fn missing_primitive_fails_when_building_closures() {
    let pf = pushforward_function(&Hollow, &Square, &[Value::Scalar(1.0)]).unwrap();
    assert!(pf(&[Value::Scalar(1.0)]).is_err());
    assert!(pullback_function(&Hollow, &Square, &[Value::Scalar(1.0)]).is_err());
}

#[test]
fn jacobian_only_backend_derives_the_rest() {
    let xs = [Value::from(array![1.0, 2.0])];
    let jac = jacobian(&DenseOnly, &SquareAndCross, &xs).unwrap();
    assert_eq!(jac.matrix(0).unwrap(), &array![[2.0, 0.0], [2.0, 1.0]]);

    let pf = pushforward_function(&DenseOnly, &SquareAndCross, &xs).unwrap();
    assert_eq!(
        pf(&[Value::from(array![1.0, 1.0])]).unwrap(),
        Value::from(array![2.0, 3.0])
    );

    let pb = pullback_function(&DenseOnly, &SquareAndCross, &xs).unwrap();
    assert_eq!(
        pb(&Value::from(array![1.0, 1.0])).unwrap(),
        vec![Value::from(array![4.0, 1.0])]
    );

    assert_eq!(
        gradient(&DenseOnly, &Cubic2, &[Value::from(array![3.0, 2.0])]).unwrap(),
        vec![Value::from(array![12.0, 21.0])]
    );
}

#[test]
fn custom_backend_composes() {
    let b = HigherOrder::new((DenseOnly, ReverseDiff));
    assert_eq!(b.second_lowest().name(), "dense_only");
    let h = hessian(&b, &Cubic2, &[Value::from(array![3.0, 2.0])]).unwrap();
    assert_eq!(h, array![[4.0, 6.0], [6.0, 12.0]]);
}
