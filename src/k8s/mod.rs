pub mod cluster_resources;
pub mod cluster_stats;
pub mod lister;
pub mod quantity;
pub mod report;
pub mod resource_kind;

pub use cluster_resources::*;
pub use cluster_stats::*;
pub use lister::{KubeLister, NamespaceScope, ResourceLister};
pub use quantity::{Quantity, QuantityError};
pub use report::*;
pub use resource_kind::ResourceKind;
