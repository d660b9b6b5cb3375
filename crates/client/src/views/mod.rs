//! View-controller glue.
//!
//! Each view is a leaf consumer: it renders from view-local state, issues
//! mutations through the controller, and keeps itself consistent by
//! subscribing to the event bus. Bus handlers only record a staleness hint;
//! the async `refresh` methods re-derive state from authoritative sources,
//! so handlers stay idempotent and payload-independent.

pub mod admin;
pub mod card;
pub mod detail;

pub use admin::AdminProductListView;
pub use card::ProductCardView;
pub use detail::ProductDetailView;
