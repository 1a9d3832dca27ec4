// Cluster connection context and error types
pub mod error;
pub mod kubeconfig;

pub use error::*;
pub use kubeconfig::*;
