pub mod error;
pub mod model;
pub mod payload;
pub mod puller;
pub mod service;

pub use error::BackendError;
pub use puller::{Puller, PullerConfig};
pub use service::{GrpcSubscriptionService, SubscriptionService};
