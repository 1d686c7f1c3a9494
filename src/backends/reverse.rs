use log::trace;

use crate::backend::{Backend, BackendKind, Primitive, PullbackFn};
use crate::derive::input_shapes;
use crate::error::Result;
use crate::function::Function;
use crate::reverse::Reverse;
use crate::scalar::Scalar;
use crate::tape::Tape;
use crate::value::{Layout, Shape, Value};

/// Reverse mode over a [`Tape`].
///
/// The function is recorded once per pullback closure; each cotangent is one
/// reverse sweep over the same tape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReverseDiff;

impl Backend for ReverseDiff {
    type Lowest = Self;
    type SecondLowest = Self;
    type Reduced = Self;

    fn kind(&self) -> BackendKind {
        BackendKind::ReverseMode
    }

    fn name(&self) -> &'static str {
        "reverse_diff"
    }

    fn primitive(&self) -> Primitive {
        Primitive::Pullback
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

    fn pullback_primitive<'a, F: Function, S: Scalar + 'a>(
        &self,
        f: &F,
        xs: &[Value<S>],
    ) -> Result<(Value<S>, PullbackFn<'a, S>)> {
        let shapes = input_shapes(xs)?;
        let num_inputs: usize = shapes.iter().map(Shape::len).sum();
        let tape = Tape::with_capacity(num_inputs * 10);

        // Inputs are registered first, so argument `i` owns a contiguous
        // run of adjoint slots starting where argument `i - 1` ended.
        let (y, layout, outputs) = {
            let vars: Vec<Value<Reverse<'_, S>>> = xs
                .iter()
                .map(|x| x.map(|&v| Reverse::variable(&tape, v)))
                .collect();
            let out = f.eval(&vars)?;
            let layout = Layout::of(&out)?;
            let outputs: Vec<Vec<u32>> = layout
                .flatten_parts(&out)?
                .iter()
                .map(|part| part.iter().map(Reverse::index).collect())
                .collect();
            (out.map(Reverse::primal), layout, outputs)
        };
        trace!("reverse_diff: recorded {} operations", tape.len());

        let pullback = move |w: &Value<S>| -> Result<Vec<Value<S>>> {
            let seeds: Vec<(u32, S)> = outputs
                .iter()
                .zip(layout.flatten_parts(w)?)
                .flat_map(|(indices, ws)| indices.iter().copied().zip(ws))
                .collect();
            let adjoints = tape.reverse_seeded(&seeds);
            let mut offset = 0;
            Ok(shapes
                .iter()
                .map(|shape| {
                    let end = offset + shape.len();
                    let ct = shape.reshape(adjoints[offset..end].to_vec());
                    offset = end;
                    ct
                })
                .collect())
        };
        Ok((y, Box::new(pullback)))
    }
}
