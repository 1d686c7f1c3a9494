use std::fmt::{self, Display};

use crate::scalar::Scalar;

/// Forward-mode dual number: a value paired with its tangent.
///
/// `Dual { re, eps }` represents `re + eps·ε` where `ε² = 0`. The base is any
/// [`Scalar`], so duals nest over themselves and over [`Reverse`](crate::Reverse)
/// for higher-order composition.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dual<S> {
    /// Primal (real) value.
    pub re: S,
    /// Tangent (derivative) value.
    pub eps: S,
}

impl<S: Display> Display for Dual<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}ε", self.re, self.eps)
    }
}

impl<S: Scalar> Dual<S> {
    /// Create a new dual number.
    #[inline]
    pub fn new(re: S, eps: S) -> Self {
        Dual { re, eps }
    }

    /// Create a constant (zero derivative).
    #[inline]
    pub fn constant(re: S) -> Self {
        Dual { re, eps: S::zero() }
    }

    /// Create a variable (unit derivative) for differentiation.
    #[inline]
    pub fn variable(re: S) -> Self {
        Dual { re, eps: S::one() }
    }

    /// Apply the chain rule: given `f(self.re)` and `f'(self.re)`, produce the dual result.
    #[inline]
    pub(crate) fn chain(self, f_val: S, f_deriv: S) -> Self {
        Dual {
            re: f_val,
            eps: self.eps * f_deriv,
        }
    }
}
