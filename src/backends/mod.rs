//! Bundled backends, one per primitive.
//!
//! | Backend               | Kind               | Native primitive |
//! |-----------------------|--------------------|------------------|
//! | [`ForwardDiff`]       | `ForwardMode`      | pushforward      |
//! | [`ReverseDiff`]       | `ReverseMode`      | pullback         |
//! | [`FiniteDifferences`] | `FiniteDifference` | jacobian         |

pub mod finite_diff;
pub mod forward;
pub mod reverse;

pub use finite_diff::{FiniteDifferenceConfig, FiniteDifferences, Stencil};
pub use forward::ForwardDiff;
pub use reverse::ReverseDiff;
