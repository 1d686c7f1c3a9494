pub mod api;
pub mod backend;
pub mod backends;
mod derive;
pub mod dual;
pub mod error;
pub mod function;
pub mod higher_order;
pub mod jacobian;
pub mod lazy;
pub mod maps;
pub mod primal;
pub mod reverse;
pub mod scalar;
pub mod tape;
mod traits;
pub mod value;

#[cfg(feature = "nalgebra")]
pub mod nalgebra_support;

pub use api::{
    derivative, gradient, hessian, jacobian, pullback_function, pushforward_function,
    second_derivative, value_and_derivative, value_and_gradient, value_and_hessian,
    value_and_jacobian, value_and_pullback_function, value_and_pushforward_function,
    value_and_second_derivative, value_derivative_and_second_derivative,
    value_gradient_and_hessian, PushforwardFn, ValuePushforwardFn,
};
pub use backend::{Backend, BackendKind, Primitive, PullbackFn};
pub use backends::{FiniteDifferenceConfig, FiniteDifferences, ForwardDiff, ReverseDiff, Stencil};
pub use dual::Dual;
pub use error::{DiffError, Result};
pub use function::Function;
pub use higher_order::HigherOrder;
pub use jacobian::{Block, Jacobian};
pub use lazy::{
    lazy_derivative, lazy_gradient, lazy_hessian, lazy_jacobian, LazyDerivative, LazyGradient,
    LazyHessian, LazyJacobian,
};
pub use maps::{DerivativeMap, GradientMap};
pub use primal::primal_value;
pub use reverse::Reverse;
pub use scalar::{Float, Scalar};
pub use tape::Tape;
pub use value::{identity_matrix_like, probe_blocks, zero_matrix_like, Layout, Shape, Value};

/// Type alias for forward-mode dual numbers over `f64`.
pub type Dual64 = Dual<f64>;
/// Type alias for forward-mode dual numbers over `f32`.
pub type Dual32 = Dual<f32>;
