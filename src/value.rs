//! Argument, output and operand values.
//!
//! The engine is closed-world: only scalars and flat arrays are
//! differentiable. Matrices appear as linear-map operands (stacked tangents
//! or cotangents) and tuples wrap the outputs of multi-output functions.

use ndarray::{Array1, Array2};

use crate::error::{DiffError, Result};
use crate::scalar::Scalar;

/// A scalar, array, matrix or tuple of values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value<S> {
    /// A single number.
    Scalar(S),
    /// A flat array.
    Array(Array1<S>),
    /// A matrix used as a linear map.
    Matrix(Array2<S>),
    /// The outputs of a multi-output function, or a tuple operand.
    Tuple(Vec<Value<S>>),
}

impl<S> Value<S> {
    /// Build an array value from a `Vec`.
    pub fn from_vec(data: Vec<S>) -> Self {
        Value::Array(Array1::from_vec(data))
    }

    /// Name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Array(_) => "array",
            Value::Matrix(_) => "matrix",
            Value::Tuple(_) => "tuple",
        }
    }

    /// The elements of a tuple, or this value alone.
    pub fn parts(&self) -> &[Value<S>] {
        match self {
            Value::Tuple(items) => items,
            other => std::slice::from_ref(other),
        }
    }

    /// Consume a tuple into its elements; any other value becomes a 1-tuple.
    pub fn into_parts(self) -> Vec<Value<S>> {
        match self {
            Value::Tuple(items) => items,
            other => vec![other],
        }
    }

    /// Borrow the array payload.
    pub fn as_array(&self) -> Result<&Array1<S>> {
        match self {
            Value::Array(a) => Ok(a),
            other => Err(DiffError::UnsupportedKind {
                kind: other.kind(),
                context: "array operand",
            }),
        }
    }

    /// Borrow the matrix payload.
    pub fn as_matrix(&self) -> Result<&Array2<S>> {
        match self {
            Value::Matrix(m) => Ok(m),
            other => Err(DiffError::UnsupportedKind {
                kind: other.kind(),
                context: "matrix operand",
            }),
        }
    }

    /// Element-wise conversion, preserving structure.
    pub fn map<U>(&self, mut f: impl FnMut(&S) -> U) -> Value<U> {
        self.map_with(&mut f)
    }

    fn map_with<U>(&self, f: &mut impl FnMut(&S) -> U) -> Value<U> {
        match self {
            Value::Scalar(s) => Value::Scalar(f(s)),
            Value::Array(a) => Value::Array(a.iter().map(|s| f(s)).collect()),
            Value::Matrix(m) => Value::Matrix(Array2::from_shape_fn(m.dim(), |ij| f(&m[ij]))),
            Value::Tuple(items) => Value::Tuple(items.iter().map(|v| v.map_with(f)).collect()),
        }
    }
}

impl<S: Copy> Value<S> {
    /// Extract the scalar payload.
    pub fn as_scalar(&self) -> Result<S> {
        match self {
            Value::Scalar(s) => Ok(*s),
            other => Err(DiffError::UnsupportedKind {
                kind: other.kind(),
                context: "scalar operand",
            }),
        }
    }
}

impl<S: Scalar> Value<S> {
    /// Shape of a differentiable value.
    pub fn shape(&self) -> Result<Shape> {
        match self {
            Value::Scalar(_) => Ok(Shape::Scalar),
            Value::Array(a) => Ok(Shape::Array(a.len())),
            other => Err(DiffError::UnsupportedKind {
                kind: other.kind(),
                context: "differentiable value",
            }),
        }
    }

    /// Flatten a scalar or array into its elements.
    pub fn flatten(&self) -> Result<Vec<S>> {
        match self {
            Value::Scalar(s) => Ok(vec![*s]),
            Value::Array(a) => Ok(a.to_vec()),
            other => Err(DiffError::UnsupportedKind {
                kind: other.kind(),
                context: "differentiable value",
            }),
        }
    }

    /// Multiply every element by `factor`.
    pub fn scale(&self, factor: S) -> Value<S> {
        self.map(|&s| s * factor)
    }

    /// Element-wise product. Scalars broadcast; tuples multiply slot by slot.
    ///
    /// # Panics
    ///
    /// Panics if the two values have incompatible shapes.
    pub fn hadamard(&self, other: &Value<S>) -> Value<S> {
        match (self, other) {
            (Value::Scalar(a), v) | (v, Value::Scalar(a)) => v.scale(*a),
            (Value::Array(a), Value::Array(b)) => {
                assert_eq!(a.len(), b.len(), "array lengths must match");
                Value::Array(a.iter().zip(b.iter()).map(|(&x, &y)| x * y).collect())
            }
            (Value::Matrix(a), Value::Matrix(b)) => {
                assert_eq!(a.dim(), b.dim(), "matrix dimensions must match");
                Value::Matrix(Array2::from_shape_fn(a.dim(), |ij| a[ij] * b[ij]))
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                assert_eq!(a.len(), b.len(), "tuple lengths must match");
                Value::Tuple(a.iter().zip(b).map(|(x, y)| x.hadamard(y)).collect())
            }
            (a, b) => panic!("cannot multiply `{}` by `{}` element-wise", a.kind(), b.kind()),
        }
    }

    /// Combine two same-shaped scalar/array values element by element.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn zip_map<T, U>(&self, other: &Value<T>, mut f: impl FnMut(S, T) -> U) -> Result<Value<U>>
    where
        T: Scalar,
    {
        let shape = self.shape()?;
        let other_shape = other.shape()?;
        assert_eq!(shape, other_shape, "tangent shape must match argument shape");
        let data = self
            .flatten()?
            .into_iter()
            .zip(other.flatten()?)
            .map(|(a, b)| f(a, b))
            .collect();
        Ok(shape.reshape(data))
    }

    /// Copy of this scalar/array with `delta` added to element `k`.
    pub(crate) fn with_offset(&self, k: usize, delta: S) -> Result<Value<S>> {
        match self {
            Value::Scalar(s) => Ok(Value::Scalar(*s + delta)),
            Value::Array(a) => {
                let mut a = a.clone();
                a[k] = a[k] + delta;
                Ok(Value::Array(a))
            }
            other => Err(DiffError::UnsupportedKind {
                kind: other.kind(),
                context: "differentiable argument",
            }),
        }
    }
}

impl<S> From<Array1<S>> for Value<S> {
    fn from(a: Array1<S>) -> Self {
        Value::Array(a)
    }
}

impl<S> From<Array2<S>> for Value<S> {
    fn from(m: Array2<S>) -> Self {
        Value::Matrix(m)
    }
}

/// Shape of a differentiable value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Array(usize),
}

impl Shape {
    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Shape::Scalar => 1,
            Shape::Array(n) => *n,
        }
    }

    /// `true` for a zero-length array.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Array(_) => "array",
        }
    }

    /// Rebuild a value of this shape from flat data.
    ///
    /// # Panics
    ///
    /// Panics if `data` has the wrong length.
    pub fn reshape<S>(&self, mut data: Vec<S>) -> Value<S> {
        assert_eq!(data.len(), self.len(), "data length must match shape");
        match self {
            Shape::Scalar => Value::Scalar(data.swap_remove(0)),
            Shape::Array(_) => Value::from_vec(data),
        }
    }

    /// Zero value of this shape.
    pub fn zeros<S: Scalar>(&self) -> Value<S> {
        self.reshape(vec![S::zero(); self.len()])
    }
}

/// Output structure of a function: one shape per output, and whether the
/// outputs are wrapped in a tuple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    shapes: Vec<Shape>,
    multi: bool,
}

impl Layout {
    /// A single (non-tuple) output.
    pub fn single(shape: Shape) -> Self {
        Layout {
            shapes: vec![shape],
            multi: false,
        }
    }

    /// A tuple of outputs.
    pub fn multi(shapes: Vec<Shape>) -> Self {
        Layout {
            shapes,
            multi: true,
        }
    }

    /// Layout of a function output.
    pub fn of<S: Scalar>(output: &Value<S>) -> Result<Self> {
        match output {
            Value::Tuple(items) => items
                .iter()
                .map(|v| {
                    v.shape().map_err(|_| DiffError::UnsupportedKind {
                        kind: v.kind(),
                        context: "tuple output element",
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Layout::multi),
            v => v
                .shape()
                .map(Layout::single)
                .map_err(|_| DiffError::UnsupportedKind {
                    kind: v.kind(),
                    context: "function output",
                }),
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Number of outputs.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Kind of the output this layout describes.
    pub fn kind(&self) -> &'static str {
        if self.multi {
            "tuple"
        } else {
            self.shapes[0].kind()
        }
    }

    /// Assemble an output-shaped value from per-output flat data.
    pub fn assemble<S>(&self, parts: Vec<Vec<S>>) -> Value<S> {
        assert_eq!(parts.len(), self.len(), "one data vector per output");
        self.wrap(
            self.shapes
                .iter()
                .zip(parts)
                .map(|(shape, data)| shape.reshape(data))
                .collect(),
        )
    }

    /// Wrap per-output values the way the function returns them.
    pub fn wrap<S>(&self, mut parts: Vec<Value<S>>) -> Value<S> {
        assert_eq!(parts.len(), self.len(), "one value per output");
        if self.multi {
            Value::Tuple(parts)
        } else {
            parts.swap_remove(0)
        }
    }

    /// Flatten an output-shaped value (e.g. a cotangent) per output.
    ///
    /// # Panics
    ///
    /// Panics if the tuple length or any element count differs from the layout.
    pub fn flatten_parts<S: Scalar>(&self, value: &Value<S>) -> Result<Vec<Vec<S>>> {
        self.output_parts(value)?
            .iter()
            .zip(&self.shapes)
            .map(|(part, shape)| {
                let data = part.flatten()?;
                assert_eq!(
                    data.len(),
                    shape.len(),
                    "cotangent length must match output length"
                );
                Ok(data)
            })
            .collect()
    }

    /// The per-output matrices of a stacked (linear-map) cotangent, or `None`
    /// when `value` is a plain cotangent.
    ///
    /// # Panics
    ///
    /// Panics if the matrices stack different row counts or a matrix width
    /// differs from its output's length.
    pub(crate) fn linear_map_parts<'v, S>(
        &self,
        value: &'v Value<S>,
    ) -> Result<Option<Vec<&'v Array2<S>>>> {
        if !value.parts().iter().any(|p| matches!(p, Value::Matrix(_))) {
            return Ok(None);
        }
        let maps = self
            .output_parts(value)?
            .iter()
            .map(Value::as_matrix)
            .collect::<Result<Vec<_>>>()?;
        let rows = maps.first().map_or(0, |m| m.nrows());
        for (map, shape) in maps.iter().zip(&self.shapes) {
            assert_eq!(map.nrows(), rows, "linear-map cotangents must stack the same count");
            assert_eq!(
                map.ncols(),
                shape.len(),
                "linear-map cotangent width must match output length"
            );
        }
        Ok(Some(maps))
    }

    fn output_parts<'v, S>(&self, value: &'v Value<S>) -> Result<&'v [Value<S>]> {
        let parts = if self.multi {
            match value {
                Value::Tuple(items) => items.as_slice(),
                other => {
                    return Err(DiffError::UnsupportedKind {
                        kind: other.kind(),
                        context: "cotangent of a multi-output function",
                    })
                }
            }
        } else {
            std::slice::from_ref(value)
        };
        assert_eq!(
            parts.len(),
            self.len(),
            "cotangent tuple length must match output arity"
        );
        Ok(parts)
    }
}

/// Identity matrix over the flattened elements of `x` (`[[1]]` for a scalar).
pub fn identity_matrix_like<S: Scalar>(x: &Value<S>) -> Result<Array2<S>> {
    let n = probe_len(x)?;
    Ok(Array2::from_shape_fn((n, n), |(r, c)| {
        if r == c {
            S::one()
        } else {
            S::zero()
        }
    }))
}

/// Zero matrix with one row per flattened element of `x` and `cols` columns.
pub fn zero_matrix_like<S: Scalar>(x: &Value<S>, cols: usize) -> Result<Array2<S>> {
    let n = probe_len(x)?;
    Ok(Array2::from_shape_fn((n, cols), |_| S::zero()))
}

fn probe_len<S: Scalar>(x: &Value<S>) -> Result<usize> {
    match x {
        Value::Scalar(_) => Ok(1),
        Value::Array(a) => Ok(a.len()),
        other => Err(DiffError::UnsupportedKind {
            kind: other.kind(),
            context: "differentiable argument",
        }),
    }
}

/// Block-diagonal probe construction over a list of values.
///
/// `blocks[i][j]` is the slot-`j` block used while probing value `i`: the
/// identity for `j == i`, a `len(j) × len(i)` zero matrix otherwise. Column
/// `k` of row `i` is the probe that perturbs element `k` of value `i` alone.
pub fn probe_blocks<S: Scalar>(xs: &[Value<S>]) -> Result<Vec<Vec<Array2<S>>>> {
    let mut blocks = Vec::with_capacity(xs.len());
    for (i, own) in xs.iter().enumerate() {
        let cols = probe_len(own)?;
        let mut row = Vec::with_capacity(xs.len());
        for (j, other) in xs.iter().enumerate() {
            if i == j {
                row.push(identity_matrix_like(own)?);
            } else {
                row.push(zero_matrix_like(other, cols)?);
            }
        }
        blocks.push(row);
    }
    Ok(blocks)
}

/// Column `col` of one probe row, reshaped slot by slot.
pub(crate) fn probe<S: Scalar>(row: &[Array2<S>], col: usize, shapes: &[Shape]) -> Vec<Value<S>> {
    row.iter()
        .zip(shapes)
        .map(|(block, shape)| shape.reshape(block.column(col).to_vec()))
        .collect()
}
