//! Composite backends for higher-order operators.
//!
//! `HigherOrder((outer, inner))` differentiates with `inner` first and then
//! differentiates that derivative with `outer`: `(ForwardDiff, ReverseDiff)`
//! is forward-over-reverse. Tuples of one to four backends are supported; an
//! empty composite cannot be written down.
//!
//! | backends        | `lowest` | `second_lowest` | `reduce_order`      |
//! |-----------------|----------|-----------------|---------------------|
//! | `(a,)`          | `a`      | `lowest(a)`     | `a`                 |
//! | `(a, b)`        | `b`      | `a`             | `a`                 |
//! | `(a, b, c)`     | `c`      | `b`             | `HigherOrder((a, b))` |
//! | `(a, b, c, d)`  | `d`      | `c`             | `HigherOrder((a, b, c))` |

use crate::backend::{Backend, BackendKind, Primitive, PullbackFn};
use crate::error::Result;
use crate::function::Function;
use crate::jacobian::Jacobian;
use crate::scalar::Scalar;
use crate::value::Value;

/// An ordered composition of backends, outer to inner.
#[derive(Clone, Debug, PartialEq)]
pub struct HigherOrder<T> {
    backends: T,
}

impl<T> HigherOrder<T> {
    pub fn new(backends: T) -> Self {
        HigherOrder { backends }
    }

    /// The composed backends, outer to inner.
    pub fn backends(&self) -> &T {
        &self.backends
    }
}

// Every slot of a composite acts as its innermost backend.
macro_rules! delegate_to_lowest {
    () => {
        fn kind(&self) -> BackendKind {
            BackendKind::HigherOrder
        }

        fn name(&self) -> &'static str {
            "higher_order"
        }

        fn primitive(&self) -> Primitive {
            self.lowest().primitive()
        }

        fn jacobian_primitive<F: Function, S: Scalar>(
            &self,
            f: &F,
            xs: &[Value<S>],
        ) -> Result<(Option<Value<S>>, Jacobian<S>)> {
            self.lowest().jacobian_primitive(f, xs)
        }

        fn pushforward_primitive<F: Function, S: Scalar>(
            &self,
            f: &F,
            xs: &[Value<S>],
            ds: &[Value<S>],
        ) -> Result<(Value<S>, Value<S>)> {
            self.lowest().pushforward_primitive(f, xs, ds)
        }

        fn pullback_primitive<'a, F: Function, S: Scalar + 'a>(
            &self,
            f: &F,
            xs: &[Value<S>],
        ) -> Result<(Value<S>, PullbackFn<'a, S>)> {
            self.lowest().pullback_primitive(f, xs)
        }

        fn jacobian<F: Function, S: Scalar>(
            &self,
            f: &F,
            xs: &[Value<S>],
        ) -> Result<(Option<Value<S>>, Jacobian<S>)> {
            self.lowest().jacobian(f, xs)
        }

        fn pushforward<F: Function, S: Scalar>(
            &self,
            f: &F,
            xs: &[Value<S>],
            ds: &[Value<S>],
        ) -> Result<(Option<Value<S>>, Value<S>)> {
            self.lowest().pushforward(f, xs, ds)
        }

        fn value_and_pullback<'a, F: Function, S: Scalar + 'a>(
            &self,
            f: &F,
            xs: &[Value<S>],
        ) -> Result<(Option<Value<S>>, PullbackFn<'a, S>)> {
            self.lowest().value_and_pullback(f, xs)
        }
    };
}

impl<A: Backend> Backend for HigherOrder<(A,)> {
    type Lowest = A;
    type SecondLowest = A::Lowest;
    type Reduced = A;

    fn order(&self) -> usize {
        self.backends.0.order()
    }

    fn lowest(&self) -> A {
        self.backends.0.clone()
    }

    fn second_lowest(&self) -> A::Lowest {
        self.backends.0.lowest()
    }

    fn reduce_order(&self) -> A {
        self.backends.0.clone()
    }

    delegate_to_lowest!();
}

impl<A: Backend, B: Backend> Backend for HigherOrder<(A, B)> {
    type Lowest = B;
    type SecondLowest = A;
    type Reduced = A;

    fn order(&self) -> usize {
        self.backends.0.order() + self.backends.1.order()
    }

    fn lowest(&self) -> B {
        self.backends.1.clone()
    }

    fn second_lowest(&self) -> A {
        self.backends.0.clone()
    }

    fn reduce_order(&self) -> A {
        self.backends.0.clone()
    }

    delegate_to_lowest!();
}

impl<A: Backend, B: Backend, C: Backend> Backend for HigherOrder<(A, B, C)> {
    type Lowest = C;
    type SecondLowest = B;
    type Reduced = HigherOrder<(A, B)>;

    fn order(&self) -> usize {
        self.backends.0.order() + self.backends.1.order() + self.backends.2.order()
    }

    fn lowest(&self) -> C {
        self.backends.2.clone()
    }

    fn second_lowest(&self) -> B {
        self.backends.1.clone()
    }

    fn reduce_order(&self) -> HigherOrder<(A, B)> {
        HigherOrder::new((self.backends.0.clone(), self.backends.1.clone()))
    }

    delegate_to_lowest!();
}

impl<A: Backend, B: Backend, C: Backend, D: Backend> Backend for HigherOrder<(A, B, C, D)> {
    type Lowest = D;
    type SecondLowest = C;
    type Reduced = HigherOrder<(A, B, C)>;

    fn order(&self) -> usize {
        self.backends.0.order()
            + self.backends.1.order()
            + self.backends.2.order()
            + self.backends.3.order()
    }

    fn lowest(&self) -> D {
        self.backends.3.clone()
    }

    fn second_lowest(&self) -> C {
        self.backends.2.clone()
    }

    fn reduce_order(&self) -> HigherOrder<(A, B, C)> {
        let (a, b, c, _) = self.backends.clone();
        HigherOrder::new((a, b, c))
    }

    delegate_to_lowest!();
}
