use log::trace;

use crate::backend::{Backend, BackendKind, Primitive};
use crate::derive::input_shapes;
use crate::error::Result;
use crate::function::Function;
use crate::jacobian::Jacobian;
use crate::scalar::{cast, Float, Scalar};
use crate::value::{Layout, Value};

/// Central difference stencil.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stencil {
    /// `(f(x+h) - f(x-h)) / 2h`, second-order accurate.
    Central3,
    /// `(f(x-2h) - 8f(x-h) + 8f(x+h) - f(x+2h)) / 12h`, fourth-order accurate.
    #[default]
    Central5,
}

impl Stencil {
    /// `(offset, weight)` pairs, in units of the step.
    fn points(self) -> &'static [(f64, f64)] {
        match self {
            Stencil::Central3 => &[(-1.0, -1.0), (1.0, 1.0)],
            Stencil::Central5 => &[(-2.0, 1.0), (-1.0, -8.0), (1.0, 8.0), (2.0, -1.0)],
        }
    }

    fn denominator(self) -> f64 {
        match self {
            Stencil::Central3 => 2.0,
            Stencil::Central5 => 12.0,
        }
    }

    /// Relative step balancing truncation and rounding error in `f64`.
    pub fn default_step(self) -> f64 {
        match self {
            Stencil::Central3 => 6e-6,
            Stencil::Central5 => 1e-3,
        }
    }
}

/// Finite-difference settings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiniteDifferenceConfig {
    pub stencil: Stencil,
    /// Step relative to `max(1, |x|)`; the stencil's default when `None`.
    pub relative_step: Option<f64>,
}

/// Central finite differences: a native Jacobian built column by column from
/// perturbed evaluations.
///
/// The primal is never produced as a by-product and is always recomputed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FiniteDifferences {
    config: FiniteDifferenceConfig,
}

impl FiniteDifferences {
    pub fn new(config: FiniteDifferenceConfig) -> Self {
        FiniteDifferences { config }
    }

    pub fn with_stencil(stencil: Stencil) -> Self {
        Self::new(FiniteDifferenceConfig {
            stencil,
            relative_step: None,
        })
    }

    pub fn config(&self) -> &FiniteDifferenceConfig {
        &self.config
    }

    fn step<F: Float>(&self, x: F) -> F {
        let rel = self
            .config
            .relative_step
            .unwrap_or_else(|| self.config.stencil.default_step());
        cast::<F>(rel) * x.abs().max(F::one())
    }
}

impl Backend for FiniteDifferences {
    type Lowest = Self;
    type SecondLowest = Self;
    type Reduced = Self;

    fn kind(&self) -> BackendKind {
        BackendKind::FiniteDifference
    }

    fn name(&self) -> &'static str {
        "finite_differences"
    }

    fn primitive(&self) -> Primitive {
        Primitive::Jacobian
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

    fn jacobian_primitive<F: Function, S: Scalar>(
        &self,
        f: &F,
        xs: &[Value<S>],
    ) -> Result<(Option<Value<S>>, Jacobian<S>)> {
        let shapes = input_shapes(xs)?;
        let stencil = self.config.stencil;
        let mut jac: Option<Jacobian<S>> = None;
        let mut evaluations = 0;

        for (i, x) in xs.iter().enumerate() {
            for (k, xk) in x.flatten()?.into_iter().enumerate() {
                let h = self.step(xk.value());
                let mut column: Vec<Vec<S>> = Vec::new();
                for &(offset, weight) in stencil.points() {
                    let mut perturbed = xs.to_vec();
                    perturbed[i] = x.with_offset(k, S::from_f(h * cast(offset)))?;
                    let y = f.eval(&perturbed)?;
                    evaluations += 1;
                    let current = match jac.take() {
                        Some(current) => current,
                        None => Jacobian::zeros(shapes.clone(), Layout::of(&y)?),
                    };
                    let parts = current.outputs().flatten_parts(&y)?;
                    jac = Some(current);
                    if column.is_empty() {
                        column = parts.iter().map(|p| vec![S::zero(); p.len()]).collect();
                    }
                    let w = S::from_f64(weight);
                    for (slots, values) in column.iter_mut().zip(parts) {
                        for (slot, v) in slots.iter_mut().zip(values) {
                            *slot = *slot + w * v;
                        }
                    }
                }
                let scale = S::one() / S::from_f(h * cast(stencil.denominator()));
                for v in column.iter_mut().flatten() {
                    *v = *v * scale;
                }
                if let Some(current) = jac.as_mut() {
                    current.set_column(i, k, &column);
                }
            }
        }

        let jac = match jac {
            Some(jac) => jac,
            None => {
                evaluations += 1;
                Jacobian::zeros(shapes, Layout::of(&f.eval(xs)?)?)
            }
        };
        trace!("finite_differences: {} evaluations", evaluations);
        Ok((None, jac))
    }
}
