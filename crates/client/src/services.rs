//! Collaborator service boundaries (cart, wishlist, images, catalog).
//!
//! Abstract call boundaries only; no wire format is mandated. Methods return
//! `impl Future` so implementations (HTTP clients, test doubles) are plain
//! `async fn`.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vitrine_core::ProductId;

use crate::types::ProductRecord;

/// Transport-level failure talking to a collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("service failure: {0}")]
pub struct ServiceError(pub String);

impl ServiceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Cart service acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartAck {
    /// Optional human-readable message from the server ("Added to cart").
    pub message: Option<String>,
}

/// Server-side cart boundary.
pub trait CartService: Send + Sync {
    fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
        variant_id: Option<vitrine_core::VariantId>,
    ) -> impl Future<Output = Result<CartAck, ServiceError>> + Send;
}

// Shared service handles: an `Arc<impl Service>` is itself a service.
impl<T: CartService> CartService for Arc<T> {
    fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
        variant_id: Option<vitrine_core::VariantId>,
    ) -> impl Future<Output = Result<CartAck, ServiceError>> + Send {
        self.as_ref().add_to_cart(product_id, quantity, variant_id)
    }
}

/// Typed wishlist failure.
///
/// `AlreadyInWishlist` / `NotInWishlist` are idempotency signals, not real
/// failures: the caller settles its optimistic state and reports success.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WishlistError {
    #[error("product already in wishlist")]
    AlreadyInWishlist,

    #[error("product not in wishlist")]
    NotInWishlist,

    #[error("wishlist service failure: {0}")]
    Transport(String),
}

/// Server-side wishlist boundary. Idempotent from the caller's perspective.
pub trait WishlistService: Send + Sync {
    fn add(&self, product_id: ProductId)
    -> impl Future<Output = Result<(), WishlistError>> + Send;

    fn remove(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), WishlistError>> + Send;
}

impl<T: WishlistService> WishlistService for Arc<T> {
    fn add(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), WishlistError>> + Send {
        self.as_ref().add(product_id)
    }

    fn remove(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<(), WishlistError>> + Send {
        self.as_ref().remove(product_id)
    }
}

/// One image as reported by the image service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub url: String,
    pub alt: Option<String>,
}

/// Image pipeline boundary.
///
/// An empty result is a real answer (product has no images) and is distinct
/// from a failed call.
pub trait ImageService: Send + Sync {
    fn fetch_images(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<ImageDescriptor>, ServiceError>> + Send;
}

impl<T: ImageService> ImageService for Arc<T> {
    fn fetch_images(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Vec<ImageDescriptor>, ServiceError>> + Send {
        self.as_ref().fetch_images(product_id)
    }
}

/// Catalog boundary used by the admin list view.
pub trait CatalogService: Send + Sync {
    fn fetch_products(&self)
    -> impl Future<Output = Result<Vec<ProductRecord>, ServiceError>> + Send;

    fn fetch_product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<ProductRecord, ServiceError>> + Send;
}

impl<T: CatalogService> CatalogService for Arc<T> {
    fn fetch_products(
        &self,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, ServiceError>> + Send {
        self.as_ref().fetch_products()
    }

    fn fetch_product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<ProductRecord, ServiceError>> + Send {
        self.as_ref().fetch_product(product_id)
    }
}
