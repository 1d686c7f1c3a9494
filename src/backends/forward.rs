use crate::backend::{Backend, BackendKind, Primitive};
use crate::dual::Dual;
use crate::error::Result;
use crate::function::Function;
use crate::scalar::Scalar;
use crate::value::Value;

/// Forward mode over [`Dual`] numbers: one function evaluation per
/// pushforward, with the primal as a by-product.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ForwardDiff;

impl Backend for ForwardDiff {
    type Lowest = Self;
    type SecondLowest = Self;
    type Reduced = Self;

    fn kind(&self) -> BackendKind {
        BackendKind::ForwardMode
    }

    fn name(&self) -> &'static str {
        "forward_diff"
    }

    fn primitive(&self) -> Primitive {
        Primitive::Pushforward
    }

    fn lowest(&self) -> Self {
        *self
    }

    fn second_lowest(&self) -> Self {
        *self
    }

    fn reduce_order(&self) -> Self {
        *self
    }

    fn pushforward_primitive<F: Function, S: Scalar>(
        &self,
        f: &F,
        xs: &[Value<S>],
        ds: &[Value<S>],
    ) -> Result<(Value<S>, Value<S>)> {
        let duals = xs
            .iter()
            .zip(ds)
            .map(|(x, d)| x.zip_map(d, Dual::new))
            .collect::<Result<Vec<_>>>()?;
        let out = f.eval(&duals)?;
        Ok((out.map(|d| d.re), out.map(|d| d.eps)))
    }
}
