//! Finding the best common day for a meeting and tracking its lifecycle.

pub mod aggregate;
pub mod lifecycle;
pub mod select;

pub use lifecycle::{LifecycleError, Outcome, Response, Scheduler, Summary};
