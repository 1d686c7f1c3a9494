use log::trace;

use crate::backend::{Backend, BackendKind};
use crate::error::Result;
use crate::function::Function;
use crate::scalar::Scalar;
use crate::value::Value;

/// The primal `f(xs)`, reusing `computed` when the backend produced it as a
/// by-product.
///
/// Finite-difference backends always recompute: their by-product (when any)
/// is a perturbed evaluation, not the primal. Every other backend reuses the
/// computed value as-is and recomputes only when none was produced.
pub fn primal_value<B, F, S>(
    backend: &B,
    computed: Option<Value<S>>,
    f: &F,
    xs: &[Value<S>],
) -> Result<Value<S>>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let lowest = backend.lowest();
    match computed {
        Some(y) if lowest.kind() != BackendKind::FiniteDifference => Ok(y),
        _ => {
            trace!("{}: recomputing primal", lowest.name());
            f.eval(xs)
        }
    }
}
