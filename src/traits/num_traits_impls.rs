use num_traits::{One, Zero};

use crate::dual::Dual;
use crate::reverse::Reverse;
use crate::scalar::Scalar;

// ══════════════════════════════════════════════
//  Dual<S>
// ══════════════════════════════════════════════

impl<S: Scalar> Zero for Dual<S> {
    #[inline]
    fn zero() -> Self {
        Dual::constant(S::zero())
    }
    #[inline]
    fn is_zero(&self) -> bool {
        self.re.is_zero() && self.eps.is_zero()
    }
}

impl<S: Scalar> One for Dual<S> {
    #[inline]
    fn one() -> Self {
        Dual::constant(S::one())
    }
}

// ══════════════════════════════════════════════
//  Reverse<S>
// ══════════════════════════════════════════════

impl<S: Scalar> Zero for Reverse<'_, S> {
    #[inline]
    fn zero() -> Self {
        Reverse::constant(S::zero())
    }
    #[inline]
    fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl<S: Scalar> One for Reverse<'_, S> {
    #[inline]
    fn one() -> Self {
        Reverse::constant(S::one())
    }
}
