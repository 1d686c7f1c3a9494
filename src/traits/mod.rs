pub mod num_traits_impls;
pub mod std_ops;
