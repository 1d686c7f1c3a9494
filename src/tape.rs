//! Adept-style two-stack tape for reverse-mode AD.
//!
//! Stores precomputed partial derivatives (multipliers) and operand indices during the
//! forward pass. The reverse sweep is a single multiply-accumulate loop with no opcode
//! dispatch. Used by [`crate::Reverse`] and the [`ReverseDiff`](crate::ReverseDiff) backend.
//!
//! The tape is generic over the multiplier scalar so it can record over
//! [`Dual`](crate::Dual) or another tape's [`Reverse`](crate::Reverse) values. Variables
//! borrow the tape through a shared reference; the stacks sit behind a `RefCell`.

use std::cell::RefCell;

use crate::scalar::Scalar;

/// Sentinel index indicating a constant (not recorded on tape).
pub const CONSTANT: u32 = u32::MAX;

/// A recorded operation: its result lives at `lhs_index`, and its operands'
/// multipliers/indices span `[prev.end_plus_one .. self.end_plus_one)`.
#[derive(Clone, Copy, Debug)]
struct Statement {
    lhs_index: u32,
    end_plus_one: u32,
}

#[derive(Debug)]
struct Stacks<S> {
    statements: Vec<Statement>,
    multipliers: Vec<S>,
    indices: Vec<u32>,
    num_variables: u32,
}

/// Adept-style two-stack tape for reverse-mode AD.
#[derive(Debug)]
pub struct Tape<S> {
    stacks: RefCell<Stacks<S>>,
}

impl<S: Scalar> Default for Tape<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scalar> Tape<S> {
    /// Create an empty tape.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a tape with pre-allocated capacity.
    pub fn with_capacity(est_ops: usize) -> Self {
        let mut statements = Vec::with_capacity(est_ops + 1);
        // Sentinel statement at index 0 so that `statements[i-1].end_plus_one`
        // is always valid for i >= 1.
        statements.push(Statement {
            lhs_index: 0,
            end_plus_one: 0,
        });
        Tape {
            stacks: RefCell::new(Stacks {
                statements,
                multipliers: Vec::with_capacity(est_ops * 2),
                indices: Vec::with_capacity(est_ops * 2),
                num_variables: 0,
            }),
        }
    }

    /// Register a new independent variable and return its adjoint index.
    ///
    /// No statement is pushed for input variables: they are leaves.
    #[inline]
    pub fn new_variable(&self) -> u32 {
        let mut stacks = self.stacks.borrow_mut();
        let idx = stacks.num_variables;
        stacks.num_variables += 1;
        idx
    }

    /// Number of adjoint slots allocated so far.
    pub fn num_variables(&self) -> usize {
        self.stacks.borrow().num_variables as usize
    }

    /// Number of recorded operations.
    pub fn len(&self) -> usize {
        self.stacks.borrow().statements.len() - 1
    }

    /// `true` if nothing but inputs has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a unary operation: `result = f(operand)` with precomputed `multiplier = df/d(operand)`.
    #[inline]
    pub fn push_unary(&self, operand_idx: u32, multiplier: S) -> u32 {
        let mut stacks = self.stacks.borrow_mut();
        let result_idx = stacks.num_variables;
        stacks.num_variables += 1;

        if operand_idx != CONSTANT {
            stacks.multipliers.push(multiplier);
            stacks.indices.push(operand_idx);
        }

        let end_plus_one = stacks.multipliers.len() as u32;
        stacks.statements.push(Statement {
            lhs_index: result_idx,
            end_plus_one,
        });
        result_idx
    }

    /// Record a binary operation with precomputed partial derivatives.
    #[inline]
    pub fn push_binary(&self, lhs_idx: u32, lhs_mult: S, rhs_idx: u32, rhs_mult: S) -> u32 {
        let mut stacks = self.stacks.borrow_mut();
        let result_idx = stacks.num_variables;
        stacks.num_variables += 1;

        if lhs_idx != CONSTANT {
            stacks.multipliers.push(lhs_mult);
            stacks.indices.push(lhs_idx);
        }
        if rhs_idx != CONSTANT {
            stacks.multipliers.push(rhs_mult);
            stacks.indices.push(rhs_idx);
        }

        let end_plus_one = stacks.multipliers.len() as u32;
        stacks.statements.push(Statement {
            lhs_index: result_idx,
            end_plus_one,
        });
        result_idx
    }

    /// Run the reverse sweep, seeding the adjoint of `seed_index` with 1.
    /// Returns the full adjoint vector.
    pub fn reverse(&self, seed_index: u32) -> Vec<S> {
        self.reverse_seeded(&[(seed_index, S::one())])
    }

    /// Run the reverse sweep with custom adjoint seeds.
    ///
    /// Constant seeds (index [`CONSTANT`]) are ignored.
    pub fn reverse_seeded(&self, seeds: &[(u32, S)]) -> Vec<S> {
        let stacks = self.stacks.borrow();
        let mut adjoints = vec![S::zero(); stacks.num_variables as usize];
        for &(idx, seed) in seeds {
            if idx != CONSTANT {
                adjoints[idx as usize] = adjoints[idx as usize] + seed;
            }
        }

        // No zero-adjoint skipping: a nested adjoint with zero primal can
        // still carry a tangent.
        for i in (1..stacks.statements.len()).rev() {
            let stmt = stacks.statements[i];
            let a = adjoints[stmt.lhs_index as usize];
            adjoints[stmt.lhs_index as usize] = S::zero();
            let start = stacks.statements[i - 1].end_plus_one as usize;
            let end = stmt.end_plus_one as usize;
            for j in start..end {
                let target = stacks.indices[j] as usize;
                adjoints[target] = adjoints[target] + stacks.multipliers[j] * a;
            }
        }
        adjoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_accumulates_shared_operands() {
        // z = x * y + x at x = 3, y = 4.
        let tape = Tape::<f64>::new();
        let x = tape.new_variable();
        let y = tape.new_variable();
        let xy = tape.push_binary(x, 4.0, y, 3.0);
        let z = tape.push_binary(xy, 1.0, x, 1.0);
        assert_eq!(tape.len(), 2);

        let adjoints = tape.reverse(z);
        assert_eq!(adjoints[x as usize], 5.0);
        assert_eq!(adjoints[y as usize], 3.0);
    }

    #[test]
    fn constant_operands_are_not_recorded() {
        let tape = Tape::<f64>::new();
        let x = tape.new_variable();
        let y = tape.push_binary(x, 2.0, CONSTANT, 7.0);
        let adjoints = tape.reverse_seeded(&[(y, 1.5), (CONSTANT, 9.0)]);
        assert_eq!(adjoints[x as usize], 3.0);
        assert_eq!(tape.num_variables(), 2);
    }
}
