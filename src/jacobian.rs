//! Jacobian block structure.
//!
//! For a function of `n` arguments and `m` outputs, a [`Jacobian`] holds one
//! [`Block`] per argument: a single matrix when the function has one output,
//! or one matrix per output otherwise. Block `(i, j)` has one row per element
//! of output `j` and one column per element of argument `i`; scalars count as
//! one element.

use std::ops::Index;

use ndarray::Array2;

use crate::error::Result;
use crate::scalar::Scalar;
use crate::value::{Layout, Shape, Value};

/// Derivative of every output with respect to one argument.
#[derive(Clone, Debug, PartialEq)]
pub enum Block<S> {
    /// The function has one output.
    Single(Array2<S>),
    /// The function returns a tuple; one matrix per output.
    Multi(Vec<Array2<S>>),
}

impl<S> Block<S> {
    /// The matrix of a single-output function.
    pub fn single(&self) -> Option<&Array2<S>> {
        match self {
            Block::Single(m) => Some(m),
            Block::Multi(_) => None,
        }
    }

    /// The matrix for output `j`.
    pub fn output(&self, j: usize) -> Option<&Array2<S>> {
        self.outputs().get(j)
    }

    /// All per-output matrices.
    pub fn outputs(&self) -> &[Array2<S>] {
        match self {
            Block::Single(m) => std::slice::from_ref(m),
            Block::Multi(ms) => ms,
        }
    }

    fn outputs_mut(&mut self) -> &mut [Array2<S>] {
        match self {
            Block::Single(m) => std::slice::from_mut(m),
            Block::Multi(ms) => ms,
        }
    }
}

/// Full Jacobian of a function at a point.
#[derive(Clone, Debug, PartialEq)]
pub struct Jacobian<S> {
    inputs: Vec<Shape>,
    outputs: Layout,
    blocks: Vec<Block<S>>,
}

impl<S: Scalar> Jacobian<S> {
    /// All-zero Jacobian for the given argument shapes and output layout.
    ///
    /// Backends that supply a native Jacobian fill it with
    /// [`set_column`](Self::set_column) or [`set_row`](Self::set_row).
    pub fn zeros(inputs: Vec<Shape>, outputs: Layout) -> Self {
        let blocks = inputs
            .iter()
            .map(|input| {
                let mut mats: Vec<Array2<S>> = outputs
                    .shapes()
                    .iter()
                    .map(|out| Array2::from_shape_fn((out.len(), input.len()), |_| S::zero()))
                    .collect();
                if outputs.is_multi() {
                    Block::Multi(mats)
                } else {
                    Block::Single(mats.remove(0))
                }
            })
            .collect();
        Jacobian {
            inputs,
            outputs,
            blocks,
        }
    }

    /// Write column `col` of argument `input`'s block: one flat vector per output.
    pub fn set_column(&mut self, input: usize, col: usize, outputs: &[Vec<S>]) {
        let mats = self.blocks[input].outputs_mut();
        assert_eq!(mats.len(), outputs.len(), "one column per output");
        for (mat, data) in mats.iter_mut().zip(outputs) {
            assert_eq!(mat.nrows(), data.len(), "column length must match output length");
            for (r, &v) in data.iter().enumerate() {
                mat[[r, col]] = v;
            }
        }
    }

    /// Write row `row` of output `output`: one flat vector per argument.
    pub fn set_row(&mut self, output: usize, row: usize, inputs: &[Vec<S>]) {
        assert_eq!(self.blocks.len(), inputs.len(), "one row per argument");
        for (block, data) in self.blocks.iter_mut().zip(inputs) {
            let mat = &mut block.outputs_mut()[output];
            assert_eq!(mat.ncols(), data.len(), "row length must match argument length");
            for (c, &v) in data.iter().enumerate() {
                mat[[row, c]] = v;
            }
        }
    }

    /// Shapes of the arguments.
    pub fn inputs(&self) -> &[Shape] {
        &self.inputs
    }

    /// Layout of the outputs.
    pub fn outputs(&self) -> &Layout {
        &self.outputs
    }

    pub fn blocks(&self) -> &[Block<S>] {
        &self.blocks
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The matrix for argument `input` of a single-output function.
    pub fn matrix(&self, input: usize) -> Option<&Array2<S>> {
        self.blocks.get(input).and_then(Block::single)
    }

    /// The matrix for argument `input` and output `output`.
    pub fn output(&self, input: usize, output: usize) -> Option<&Array2<S>> {
        self.blocks.get(input).and_then(|b| b.output(output))
    }

    /// Multiply every entry by `factor`.
    pub fn scale(&self, factor: S) -> Jacobian<S> {
        let scale = |m: &Array2<S>| m.mapv(|v| v * factor);
        Jacobian {
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            blocks: self
                .blocks
                .iter()
                .map(|b| match b {
                    Block::Single(m) => Block::Single(scale(m)),
                    Block::Multi(ms) => Block::Multi(ms.iter().map(scale).collect()),
                })
                .collect(),
        }
    }

    /// The nested tuple form: one entry per argument, each a matrix or a
    /// tuple of matrices.
    pub fn into_value(self) -> Value<S> {
        Value::Tuple(
            self.blocks
                .into_iter()
                .map(|b| match b {
                    Block::Single(m) => Value::Matrix(m),
                    Block::Multi(ms) => Value::Tuple(ms.into_iter().map(Value::Matrix).collect()),
                })
                .collect(),
        )
    }

    /// Jacobian-vector product: one tangent per argument, output-shaped result.
    ///
    /// # Panics
    ///
    /// Panics if the tangent tuple length or any tangent's element count
    /// differs from the arguments.
    pub fn jvp(&self, tangents: &[Value<S>]) -> Result<Value<S>> {
        assert_eq!(
            tangents.len(),
            self.inputs.len(),
            "tangent tuple length must match input arity"
        );
        let mut out: Vec<Vec<S>> = self
            .outputs
            .shapes()
            .iter()
            .map(|s| vec![S::zero(); s.len()])
            .collect();
        for ((block, tangent), shape) in self.blocks.iter().zip(tangents).zip(&self.inputs) {
            let d = tangent.flatten()?;
            assert_eq!(d.len(), shape.len(), "tangent length must match argument length");
            for (acc, mat) in out.iter_mut().zip(block.outputs()) {
                for (r, slot) in acc.iter_mut().enumerate() {
                    for (c, &dc) in d.iter().enumerate() {
                        *slot = *slot + mat[[r, c]] * dc;
                    }
                }
            }
        }
        Ok(self.outputs.assemble(out))
    }

    /// Vector-Jacobian product: output-shaped cotangent, one result per argument.
    ///
    /// A plain cotangent contracts by inner product and each result has its
    /// argument's shape. A matrix cotangent (`k × len(output)` per output) is a
    /// linear map applied on the left, and each result is the `k × len(input)`
    /// matrix `W·J`.
    pub fn vjp(&self, cotangent: &Value<S>) -> Result<Vec<Value<S>>> {
        if let Some(maps) = self.outputs.linear_map_parts(cotangent)? {
            let rows = maps.first().map_or(0, |m| m.nrows());
            return Ok(self
                .blocks
                .iter()
                .zip(&self.inputs)
                .map(|(block, shape)| {
                    let mut acc = Array2::from_shape_fn((rows, shape.len()), |_| S::zero());
                    for (mat, map) in block.outputs().iter().zip(&maps) {
                        let product = matmul(map, &mat.mapv(S::conj));
                        acc.zip_mut_with(&product, |a, &b| *a = *a + b);
                    }
                    Value::Matrix(acc)
                })
                .collect());
        }

        let w = self.outputs.flatten_parts(cotangent)?;
        Ok(self
            .blocks
            .iter()
            .zip(&self.inputs)
            .map(|(block, shape)| {
                let mut acc = vec![S::zero(); shape.len()];
                for (mat, wj) in block.outputs().iter().zip(&w) {
                    for (c, slot) in acc.iter_mut().enumerate() {
                        for (r, &wr) in wj.iter().enumerate() {
                            *slot = *slot + mat[[r, c]].conj() * wr;
                        }
                    }
                }
                shape.reshape(acc)
            })
            .collect())
    }
}

impl<S> Index<usize> for Jacobian<S> {
    type Output = Block<S>;

    fn index(&self, input: usize) -> &Block<S> {
        &self.blocks[input]
    }
}

/// Dense product over a generic scalar (`ndarray`'s `dot` needs `'static`
/// element types, which tape-bound scalars are not).
pub(crate) fn matmul<S: Scalar>(a: &Array2<S>, b: &Array2<S>) -> Array2<S> {
    assert_eq!(a.ncols(), b.nrows(), "inner dimensions must agree");
    Array2::from_shape_fn((a.nrows(), b.ncols()), |(i, j)| {
        (0..a.ncols()).fold(S::zero(), |acc, k| acc + a[[i, k]] * b[[k, j]])
    })
}
