//! Shared read-model and intent types.

use serde::{Deserialize, Serialize};

use vitrine_core::{CoreError, CoreResult, ProductId, ProductRef};

/// Product record as carried by listing and detail responses.
///
/// `stock` is the figure embedded in the record at fetch time — a weaker,
/// staler signal than a reconciled snapshot, kept as the degraded fallback
/// when reconciliation fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    /// Price in the smallest currency unit (e.g. cents).
    pub price: Option<u64>,
    /// ISO currency code (e.g. "USD").
    pub currency: Option<String>,
    pub stock: u32,
    pub wishlisted: bool,
    /// Image URLs embedded in the record, used until the image service is
    /// consulted.
    pub images: Vec<String>,
}

/// The mutating action a gesture requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    AddToCart,
    ToggleWishlist,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::AddToCart => "add_to_cart",
            MutationKind::ToggleWishlist => "toggle_wishlist",
        }
    }
}

/// Ephemeral description of a requested action.
///
/// Created at gesture time, consumed within one guard/controller cycle,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationIntent {
    pub kind: MutationKind,
    pub target: ProductRef,
    pub quantity: u32,
}

impl MutationIntent {
    pub fn add_to_cart(target: ProductRef, quantity: u32) -> CoreResult<Self> {
        if quantity == 0 {
            return Err(CoreError::validation("quantity must be positive"));
        }
        Ok(Self {
            kind: MutationKind::AddToCart,
            target,
            quantity,
        })
    }

    pub fn toggle_wishlist(target: ProductRef) -> Self {
        Self {
            kind: MutationKind::ToggleWishlist,
            target,
            quantity: 1,
        }
    }

    /// Guard key: one slot per action kind per inventory unit.
    pub fn action_key(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.target)
    }
}

/// Denormalized summary of a successful add-to-cart, for transient UI
/// feedback (toast / mini-cart line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartReceipt {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Option<u64>,
    pub currency: Option<String>,
    pub quantity: u32,
    pub message: Option<String>,
}
