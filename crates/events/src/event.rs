//! Store-wide notification events.

use serde::{Deserialize, Serialize};

use vitrine_core::{OrderId, ProductId, VariantId};

/// One line of a completed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Authoritative state transition, broadcast to all mounted views.
///
/// Payloads are intentionally minimal (id + delta hints only). Subscribers
/// must re-derive their state from the reconciliation client or the local
/// cache rather than treating a payload as a full snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreEvent {
    /// Stock for a `(product, variant)` pair changed on the server.
    InventoryChanged {
        product_id: ProductId,
        variant_id: Option<VariantId>,
    },
    /// A product record (name, price, status) was edited.
    ProductChanged { product_id: ProductId },
    /// The image set for a product was re-uploaded or reordered.
    ImagesChanged { product_id: ProductId },
    /// A checkout completed; `items` lists the affected quantities.
    OrderCompleted {
        order_id: OrderId,
        items: Vec<OrderLine>,
    },
}

impl StoreEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            StoreEvent::InventoryChanged { .. } => EventKind::InventoryChanged,
            StoreEvent::ProductChanged { .. } => EventKind::ProductChanged,
            StoreEvent::ImagesChanged { .. } => EventKind::ImagesChanged,
            StoreEvent::OrderCompleted { .. } => EventKind::OrderCompleted,
        }
    }

    /// The product a single-product event refers to, if any.
    pub fn product_id(&self) -> Option<ProductId> {
        match self {
            StoreEvent::InventoryChanged { product_id, .. }
            | StoreEvent::ProductChanged { product_id }
            | StoreEvent::ImagesChanged { product_id } => Some(*product_id),
            StoreEvent::OrderCompleted { .. } => None,
        }
    }
}

/// Discriminant used when subscribing to one event family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    InventoryChanged,
    ProductChanged,
    ImagesChanged,
    OrderCompleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::InventoryChanged => "inventory_changed",
            EventKind::ProductChanged => "product_changed",
            EventKind::ImagesChanged => "images_changed",
            EventKind::OrderCompleted => "order_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let event = StoreEvent::InventoryChanged {
            product_id: ProductId::new(1),
            variant_id: None,
        };
        assert_eq!(event.kind(), EventKind::InventoryChanged);
        assert_eq!(event.kind().as_str(), "inventory_changed");
    }

    #[test]
    fn order_completed_has_no_single_product() {
        let event = StoreEvent::OrderCompleted {
            order_id: OrderId::new(),
            items: vec![OrderLine {
                product_id: ProductId::new(1),
                quantity: 2,
            }],
        };
        assert_eq!(event.product_id(), None);
    }
}
