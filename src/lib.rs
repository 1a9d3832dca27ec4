//! At-a-glance summary of a Kubernetes cluster: resource counts across all
//! namespaces plus node capacity, gathered with one batch of read-only calls.

pub mod contexts;
pub mod k8s;
pub mod utils;
pub mod views;
