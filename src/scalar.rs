//! The [`Scalar`] trait every evaluation type implements.
//!
//! A [`Function`](crate::Function) is evaluated by each backend at its own
//! scalar type: plain `f64` for finite differences, [`Dual`] for forward
//! mode, [`Reverse`] for reverse mode, and nestings of these when operators
//! are composed (`Dual<Reverse<f64>>` for forward-over-reverse Hessians).
//! Writing the function once against `T: Scalar` is what lets the engine
//! stay agnostic of the backend.

use std::fmt::{Debug, Display};
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{Float as NumFloat, FloatConst, FromPrimitive, NumCast, One, Zero};

use crate::dual::Dual;
use crate::reverse::Reverse;

/// Marker trait for the primitive floats at the bottom of every scalar tower.
pub trait Float:
    NumFloat + FloatConst + FromPrimitive + Copy + Send + Sync + Default + Debug + Display + 'static
{
}

impl Float for f32 {}
impl Float for f64 {}

/// Cast an `f64` literal into a primitive float.
#[inline]
pub(crate) fn cast<F: Float>(val: f64) -> F {
    <F as NumCast>::from(val).unwrap_or_else(F::nan)
}

/// The central trait for AD-generic numeric code.
///
/// Only the elementals listed here are available inside a
/// [`Function`](crate::Function); every backend scalar implements them with
/// the appropriate derivative rule.
pub trait Scalar:
    Copy
    + Debug
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The primitive float at the bottom of this scalar.
    type Float: Float;

    /// Lift a plain float to this scalar (constant: zero derivative).
    fn from_f(val: Self::Float) -> Self;

    /// Extract the innermost primal value.
    fn value(&self) -> Self::Float;

    /// Lift an `f64` literal.
    #[inline]
    fn from_f64(val: f64) -> Self {
        Self::from_f(cast(val))
    }

    /// Complex conjugate. Real scalars are self-adjoint.
    #[inline]
    fn conj(self) -> Self {
        self
    }

    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn tan(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn sqrt(self) -> Self;
    fn tanh(self) -> Self;
    fn powi(self, n: i32) -> Self;
}

macro_rules! impl_float_scalar {
    ($f:ty) => {
        impl Scalar for $f {
            type Float = $f;

            #[inline]
            fn from_f(val: $f) -> Self {
                val
            }

            #[inline]
            fn value(&self) -> $f {
                *self
            }

            #[inline]
            fn sin(self) -> Self {
                <$f>::sin(self)
            }

            #[inline]
            fn cos(self) -> Self {
                <$f>::cos(self)
            }

            #[inline]
            fn tan(self) -> Self {
                <$f>::tan(self)
            }

            #[inline]
            fn exp(self) -> Self {
                <$f>::exp(self)
            }

            #[inline]
            fn ln(self) -> Self {
                <$f>::ln(self)
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$f>::sqrt(self)
            }

            #[inline]
            fn tanh(self) -> Self {
                <$f>::tanh(self)
            }

            #[inline]
            fn powi(self, n: i32) -> Self {
                <$f>::powi(self, n)
            }
        }
    };
}

impl_float_scalar!(f32);
impl_float_scalar!(f64);

impl<S: Scalar> Scalar for Dual<S> {
    type Float = S::Float;

    #[inline]
    fn from_f(val: S::Float) -> Self {
        Dual::constant(S::from_f(val))
    }

    #[inline]
    fn value(&self) -> S::Float {
        self.re.value()
    }

    #[inline]
    fn conj(self) -> Self {
        Dual::new(self.re.conj(), self.eps.conj())
    }

    #[inline]
    fn sin(self) -> Self {
        self.chain(self.re.sin(), self.re.cos())
    }

    #[inline]
    fn cos(self) -> Self {
        self.chain(self.re.cos(), -self.re.sin())
    }

    #[inline]
    fn tan(self) -> Self {
        let c = self.re.cos();
        self.chain(self.re.tan(), S::one() / (c * c))
    }

    #[inline]
    fn exp(self) -> Self {
        let e = self.re.exp();
        self.chain(e, e)
    }

    #[inline]
    fn ln(self) -> Self {
        self.chain(self.re.ln(), S::one() / self.re)
    }

    #[inline]
    fn sqrt(self) -> Self {
        let s = self.re.sqrt();
        self.chain(s, S::one() / (s + s))
    }

    #[inline]
    fn tanh(self) -> Self {
        let t = self.re.tanh();
        self.chain(t, S::one() - t * t)
    }

    #[inline]
    fn powi(self, n: i32) -> Self {
        // x⁰ is constant; x⁻¹ at zero would poison the multiplier.
        let deriv = if n == 0 {
            S::zero()
        } else {
            S::from_f64(n.into()) * self.re.powi(n - 1)
        };
        self.chain(self.re.powi(n), deriv)
    }
}

impl<'t, S: Scalar> Scalar for Reverse<'t, S> {
    type Float = S::Float;

    #[inline]
    fn from_f(val: S::Float) -> Self {
        Reverse::constant(S::from_f(val))
    }

    #[inline]
    fn value(&self) -> S::Float {
        self.value.value()
    }

    #[inline]
    fn sin(self) -> Self {
        self.unary(self.value.sin(), self.value.cos())
    }

    #[inline]
    fn cos(self) -> Self {
        self.unary(self.value.cos(), -self.value.sin())
    }

    #[inline]
    fn tan(self) -> Self {
        let c = self.value.cos();
        self.unary(self.value.tan(), S::one() / (c * c))
    }

    #[inline]
    fn exp(self) -> Self {
        let e = self.value.exp();
        self.unary(e, e)
    }

    #[inline]
    fn ln(self) -> Self {
        self.unary(self.value.ln(), S::one() / self.value)
    }

    #[inline]
    fn sqrt(self) -> Self {
        let s = self.value.sqrt();
        self.unary(s, S::one() / (s + s))
    }

    #[inline]
    fn tanh(self) -> Self {
        let t = self.value.tanh();
        self.unary(t, S::one() - t * t)
    }

    #[inline]
    fn powi(self, n: i32) -> Self {
        let deriv = if n == 0 {
            S::zero()
        } else {
            S::from_f64(n.into()) * self.value.powi(n - 1)
        };
        self.unary(self.value.powi(n), deriv)
    }
}
