//! `vitrine-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the client configuration, the domain error
//! model, and the optimistic-override value type.

pub mod config;
pub mod error;
pub mod id;
pub mod optimistic;

pub use config::ClientConfig;
pub use error::{CoreError, CoreResult};
pub use id::{OrderId, ProductId, ProductRef, VariantId};
pub use optimistic::OptimisticState;
