use std::fmt::{self, Debug, Display};

use crate::scalar::Scalar;
use crate::tape::{Tape, CONSTANT};

/// Reverse-mode AD variable.
///
/// A value, a tape index and a borrow of the tape it was recorded on. `Copy`
/// because the tape is shared, not owned. Constants carry no tape.
#[derive(Clone, Copy)]
pub struct Reverse<'t, S> {
    pub(crate) value: S,
    pub(crate) index: u32,
    pub(crate) tape: Option<&'t Tape<S>>,
}

impl<'t, S: Scalar> Reverse<'t, S> {
    /// Create a constant (not tracked on tape).
    #[inline]
    pub fn constant(value: S) -> Self {
        Reverse {
            value,
            index: CONSTANT,
            tape: None,
        }
    }

    /// Register a new independent variable on `tape`.
    #[inline]
    pub fn variable(tape: &'t Tape<S>, value: S) -> Self {
        Reverse {
            value,
            index: tape.new_variable(),
            tape: Some(tape),
        }
    }

    /// Primal value at this node.
    #[inline]
    pub fn primal(&self) -> S {
        self.value
    }

    /// Get the tape index (for advanced usage / testing).
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Record `value = g(self)` with `multiplier = g'(self)`.
    #[inline]
    pub(crate) fn unary(self, value: S, multiplier: S) -> Self {
        match self.tape {
            Some(tape) => Reverse {
                value,
                index: tape.push_unary(self.index, multiplier),
                tape: Some(tape),
            },
            None => Reverse::constant(value),
        }
    }

    /// Record `value = g(self, rhs)` with both partials precomputed.
    #[inline]
    pub(crate) fn binary(self, rhs: Self, value: S, lhs_mult: S, rhs_mult: S) -> Self {
        match self.tape.or(rhs.tape) {
            Some(tape) => Reverse {
                value,
                index: tape.push_binary(self.index, lhs_mult, rhs.index, rhs_mult),
                tape: Some(tape),
            },
            None => Reverse::constant(value),
        }
    }
}

impl<S: Debug> Debug for Reverse<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reverse")
            .field("value", &self.value)
            .field("index", &self.index)
            .finish()
    }
}

impl<S: Display> Display for Reverse<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<S: Scalar> Default for Reverse<'_, S> {
    fn default() -> Self {
        Reverse::constant(S::zero())
    }
}
