//! Primitive derivation rules.
//!
//! Each backend supplies one native primitive; the functions here build the
//! other two from it for any number of arguments and outputs:
//!
//! - Jacobian from pushforward: one pushforward per argument column, probing
//!   with block-diagonal identity/zero tangents ([`probe_blocks`]).
//! - Jacobian from pullback: one pullback per output row, probing with the
//!   same construction over the output space.
//! - Pushforward and pullback from a Jacobian: `J·ds` and `Jᴴ·w`.

use log::debug;
use ndarray::Array2;

use crate::backend::{Backend, PullbackFn};
use crate::error::Result;
use crate::function::Function;
use crate::jacobian::Jacobian;
use crate::scalar::Scalar;
use crate::value::{probe, probe_blocks, Layout, Shape, Value};

/// Shapes of the arguments, failing on the first non-differentiable kind.
pub(crate) fn input_shapes<S: Scalar>(xs: &[Value<S>]) -> Result<Vec<Shape>> {
    xs.iter().map(Value::shape).collect()
}

/// Jacobian by identity/zero probing through the native pushforward.
///
/// The primal comes from the first probe. A function of zero-length
/// arguments only is evaluated once to learn its output layout.
pub(crate) fn jacobian_from_pushforward<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Option<Value<S>>, Jacobian<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let blocks = probe_blocks(xs)?;
    let shapes = input_shapes(xs)?;
    let mut acc: Option<(Value<S>, Jacobian<S>)> = None;
    let mut probes = 0;

    for (i, row) in blocks.iter().enumerate() {
        for col in 0..shapes[i].len() {
            let ds = probe(row, col, &shapes);
            let (y, dy) = backend.pushforward_primitive(f, xs, &ds)?;
            probes += 1;
            let (primal, mut jac) = match acc.take() {
                Some(state) => state,
                None => {
                    let jac = Jacobian::zeros(shapes.clone(), Layout::of(&y)?);
                    (y, jac)
                }
            };
            let column = jac.outputs().flatten_parts(&dy)?;
            jac.set_column(i, col, &column);
            acc = Some((primal, jac));
        }
    }

    let (primal, jac) = match acc {
        Some(state) => state,
        None => {
            let y = f.eval(xs)?;
            let jac = Jacobian::zeros(shapes, Layout::of(&y)?);
            (y, jac)
        }
    };
    debug!(
        "{}: jacobian from {} pushforward probe(s) over {} argument(s)",
        backend.name(),
        probes,
        xs.len()
    );
    Ok((Some(primal), jac))
}

/// Jacobian by output-basis probing through the native pullback.
///
/// The recording pass yields the output layout and doubles as the primal.
pub(crate) fn jacobian_from_pullback<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Option<Value<S>>, Jacobian<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    let shapes = input_shapes(xs)?;
    let (y, pullback) = backend.pullback_primitive(f, xs)?;
    let layout = Layout::of(&y)?;
    let basis = probe_blocks(y.parts())?;
    let mut jac = Jacobian::zeros(shapes, layout.clone());
    let mut probes = 0;

    for (j, row) in basis.iter().enumerate() {
        for r in 0..layout.shapes()[j].len() {
            let w = layout.wrap(probe(row, r, layout.shapes()));
            let cotangents = pullback(&w)?;
            probes += 1;
            let entries = cotangents
                .iter()
                .map(|ct| -> Result<Vec<S>> {
                    Ok(ct.flatten()?.into_iter().map(S::conj).collect())
                })
                .collect::<Result<Vec<_>>>()?;
            jac.set_row(j, r, &entries);
        }
    }

    debug!(
        "{}: jacobian from {} pullback probe(s) over {} output(s)",
        backend.name(),
        probes,
        layout.len()
    );
    Ok((Some(y), jac))
}

/// Pushforward as `J·ds` over the backend's Jacobian.
pub(crate) fn pushforward_from_jacobian<B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
    ds: &[Value<S>],
) -> Result<(Option<Value<S>>, Value<S>)>
where
    B: Backend,
    F: Function,
    S: Scalar,
{
    debug!("{}: pushforward from jacobian", backend.name());
    let (y, jac) = backend.jacobian(f, xs)?;
    Ok((y, jac.jvp(ds)?))
}

/// Pullback as `Jᴴ·w` over the backend's Jacobian, computed once.
pub(crate) fn pullback_from_jacobian<'a, B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Option<Value<S>>, PullbackFn<'a, S>)>
where
    B: Backend,
    F: Function,
    S: Scalar + 'a,
{
    debug!("{}: pullback from jacobian", backend.name());
    let (y, jac) = backend.jacobian(f, xs)?;
    Ok((y, Box::new(move |w: &Value<S>| jac.vjp(w))))
}

/// Native pullback, extended to stacked linear-map cotangents by applying it
/// once per row.
pub(crate) fn native_pullback<'a, B, F, S>(
    backend: &B,
    f: &F,
    xs: &[Value<S>],
) -> Result<(Option<Value<S>>, PullbackFn<'a, S>)>
where
    B: Backend,
    F: Function,
    S: Scalar + 'a,
{
    let shapes = input_shapes(xs)?;
    let (y, pullback) = backend.pullback_primitive(f, xs)?;
    let layout = Layout::of(&y)?;
    let rowwise = move |w: &Value<S>| -> Result<Vec<Value<S>>> {
        let Some(maps) = layout.linear_map_parts(w)? else {
            return pullback(w);
        };
        let rows = maps.first().map_or(0, |m| m.nrows());
        let mut out: Vec<Array2<S>> = shapes
            .iter()
            .map(|s| Array2::from_shape_fn((rows, s.len()), |_| S::zero()))
            .collect();
        for k in 0..rows {
            let row = maps
                .iter()
                .zip(layout.shapes())
                .map(|(m, shape)| shape.reshape(m.row(k).to_vec()))
                .collect();
            let cotangents = pullback(&layout.wrap(row))?;
            for (acc, ct) in out.iter_mut().zip(&cotangents) {
                for (c, v) in ct.flatten()?.into_iter().enumerate() {
                    acc[[k, c]] = v;
                }
            }
        }
        Ok(out.into_iter().map(Value::Matrix).collect())
    };
    Ok((Some(y), Box::new(rowwise)))
}
