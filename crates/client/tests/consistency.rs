//! Cross-view consistency scenarios, driven end to end through the public
//! API against in-process fakes of the collaborator services.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use vitrine_client::{
    AdminProductListView, CartAck, CartOutcome, CartService, CatalogService, ImageCache,
    ImageDescriptor, ImageService, MemoryStore, MutationController, MutationError,
    ProductCardView, ProductDetailView, ProductRecord, ServiceError, WishlistError,
    WishlistOutcome, WishlistService,
};
use vitrine_core::{ClientConfig, ProductId, ProductRef, VariantId};
use vitrine_events::{EventBus, OrderLine, StoreEvent};
use vitrine_inventory::{
    AvailabilityCheck, InventoryService, ReconciliationClient, StockStatus, StockSummary,
    TransportError,
};

/// Server-held stock, shared by the inventory fake and the cart fake so a
/// successful add-to-cart actually depletes it.
#[derive(Default)]
struct FakeInventory {
    stock: AtomicU32,
    summary_fetches: AtomicUsize,
}

impl FakeInventory {
    fn with(stock: u32) -> Arc<Self> {
        let inventory = Self::default();
        inventory.stock.store(stock, Ordering::SeqCst);
        Arc::new(inventory)
    }
}

impl InventoryService for FakeInventory {
    async fn get_summary(&self, _target: ProductRef) -> Result<StockSummary, TransportError> {
        self.summary_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(StockSummary {
            available_quantity: self.stock.load(Ordering::SeqCst),
            last_updated: Some(chrono::Utc::now()),
        })
    }

    async fn check_availability(
        &self,
        _target: ProductRef,
        quantity: u32,
    ) -> Result<AvailabilityCheck, TransportError> {
        let available = self.stock.load(Ordering::SeqCst);
        Ok(AvailabilityCheck {
            is_available: available >= quantity,
            available_quantity: available,
        })
    }
}

struct FakeCart {
    inventory: Arc<FakeInventory>,
    calls: AtomicUsize,
}

impl CartService for FakeCart {
    async fn add_to_cart(
        &self,
        _product_id: ProductId,
        quantity: u32,
        _variant_id: Option<VariantId>,
    ) -> Result<CartAck, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.inventory.stock.load(Ordering::SeqCst);
        if remaining < quantity {
            return Err(ServiceError::new("insufficient stock"));
        }
        self.inventory
            .stock
            .store(remaining - quantity, Ordering::SeqCst);
        Ok(CartAck { message: None })
    }
}

#[derive(Default)]
struct FakeWishlist {
    adds: AtomicUsize,
    removes: AtomicUsize,
    next_error: Mutex<Option<WishlistError>>,
    /// When set, calls park here until the test releases them.
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeWishlist {
    async fn wait_at_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

impl WishlistService for FakeWishlist {
    async fn add(&self, _product_id: ProductId) -> Result<(), WishlistError> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        self.wait_at_gate().await;
        match self.next_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn remove(&self, _product_id: ProductId) -> Result<(), WishlistError> {
        self.removes.fetch_add(1, Ordering::SeqCst);
        self.wait_at_gate().await;
        match self.next_error.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct FakeImages {
    responses: Mutex<VecDeque<Result<Vec<ImageDescriptor>, ServiceError>>>,
}

impl FakeImages {
    fn scripted(
        responses: Vec<Result<Vec<ImageDescriptor>, ServiceError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

impl ImageService for FakeImages {
    async fn fetch_images(
        &self,
        _product_id: ProductId,
    ) -> Result<Vec<ImageDescriptor>, ServiceError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

struct FakeCatalog {
    rows: Mutex<Vec<ProductRecord>>,
}

impl CatalogService for FakeCatalog {
    async fn fetch_products(&self) -> Result<Vec<ProductRecord>, ServiceError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn fetch_product(&self, product_id: ProductId) -> Result<ProductRecord, ServiceError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == product_id)
            .cloned()
            .ok_or_else(|| ServiceError::new("no such product"))
    }
}

type Controller = MutationController<Arc<FakeInventory>, Arc<FakeCart>, Arc<FakeWishlist>>;

struct Fixture {
    inventory: Arc<FakeInventory>,
    cart: Arc<FakeCart>,
    wishlist: Arc<FakeWishlist>,
    controller: Arc<Controller>,
    bus: Arc<EventBus>,
}

fn fixture(stock: u32) -> Fixture {
    let inventory = FakeInventory::with(stock);
    let cart = Arc::new(FakeCart {
        inventory: Arc::clone(&inventory),
        calls: AtomicUsize::new(0),
    });
    let wishlist = Arc::new(FakeWishlist::default());
    let bus = EventBus::new();
    let client = ReconciliationClient::new(Arc::clone(&inventory), ClientConfig::default());
    let controller = Arc::new(MutationController::new(
        client,
        Arc::clone(&cart),
        Arc::clone(&wishlist),
        Arc::clone(&bus),
    ));
    Fixture {
        inventory,
        cart,
        wishlist,
        controller,
        bus,
    }
}

fn record(id: u64, stock: u32) -> ProductRecord {
    ProductRecord {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Some(1999),
        currency: Some("USD".into()),
        stock,
        wishlisted: false,
        images: Vec::new(),
    }
}

fn descriptors(urls: &[&str]) -> Vec<ImageDescriptor> {
    urls.iter()
        .map(|u| ImageDescriptor {
            url: u.to_string(),
            alt: None,
        })
        .collect()
}

fn detail_view(
    fx: &Fixture,
    record: ProductRecord,
    images: Arc<FakeImages>,
) -> ProductDetailView<Arc<FakeInventory>, Arc<FakeCart>, Arc<FakeWishlist>, Arc<FakeImages>, MemoryStore>
{
    ProductDetailView::mount(
        record,
        None,
        Arc::clone(&fx.controller),
        images,
        Arc::new(ImageCache::new(MemoryStore::new())),
    )
}

#[tokio::test(start_paused = true)]
async fn add_to_cart_updates_an_independent_card_via_the_bus() {
    let fx = fixture(12);
    let images = FakeImages::scripted(vec![Ok(descriptors(&["a.jpg"]))]);

    let detail = detail_view(&fx, record(1, 12), images);
    let card = ProductCardView::mount(record(1, 12), Arc::clone(&fx.controller));

    detail.refresh().await;
    card.refresh_if_stale().await;
    assert_eq!(card.stock_badge(), Some(StockStatus::InStock));
    let fetches_after_mount = fx.inventory.summary_fetches.load(Ordering::SeqCst);

    // Quiet period: the card does not poll on its own initiative.
    card.refresh_if_stale().await;
    assert_eq!(
        fx.inventory.summary_fetches.load(Ordering::SeqCst),
        fetches_after_mount
    );

    // Buying 4 drops server stock to 8, inside the low-stock threshold.
    let outcome = detail.add_to_cart(4).await.unwrap();
    assert!(matches!(outcome, CartOutcome::Added(_)));

    assert!(card.is_stale());
    card.refresh_if_stale().await;
    assert_eq!(card.stock_badge(), Some(StockStatus::LowStock));
    assert_eq!(
        fx.inventory.summary_fetches.load(Ordering::SeqCst),
        fetches_after_mount + 1
    );
}

#[tokio::test(start_paused = true)]
async fn stale_stock_rejection_corrects_the_detail_snapshot() {
    let fx = fixture(20);
    let images = FakeImages::scripted(vec![Ok(Vec::new())]);
    let detail = detail_view(&fx, record(1, 20), images);

    detail.refresh().await;
    assert_eq!(detail.snapshot().unwrap().available_quantity(), 20);

    // Stock depletes server-side after the mount fetch.
    fx.inventory.stock.store(3, Ordering::SeqCst);

    let err = detail.add_to_cart(5).await.unwrap_err();
    match err {
        MutationError::StaleStock { available, .. } => assert_eq!(available, 3),
        other => panic!("expected StaleStock, got {other:?}"),
    }

    let snapshot = detail.snapshot().unwrap();
    assert_eq!(snapshot.available_quantity(), 3);
    assert_eq!(snapshot.status(), StockStatus::LowStock);
    assert_eq!(fx.cart.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn rapid_double_click_submits_once() {
    let fx = fixture(10);
    let images = FakeImages::scripted(vec![Ok(Vec::new())]);
    let detail = detail_view(&fx, record(1, 10), images);
    detail.refresh().await;

    let first = detail.add_to_cart(1).await.unwrap();
    let second = detail.add_to_cart(1).await.unwrap();

    assert!(matches!(first, CartOutcome::Added(_)));
    assert!(matches!(second, CartOutcome::Skipped));
    assert_eq!(fx.cart.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn pending_wishlist_override_is_visible_while_the_call_is_in_flight() {
    let fx = fixture(10);
    let gate = Arc::new(Notify::new());
    *fx.wishlist.gate.lock().unwrap() = Some(Arc::clone(&gate));

    let card = Arc::new(ProductCardView::mount(
        record(1, 10),
        Arc::clone(&fx.controller),
    ));
    assert!(!card.is_wishlisted());

    let toggling = tokio::spawn({
        let card = Arc::clone(&card);
        async move { card.toggle_wishlist(true).await }
    });

    // Let the toggle run up to the parked wishlist call.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(fx.wishlist.adds.load(Ordering::SeqCst), 1);

    // The call has not resolved, yet the icon already shows the intent.
    assert!(card.is_wishlisted());

    gate.notify_one();
    let outcome = toggling.await.unwrap().unwrap();
    assert_eq!(outcome, WishlistOutcome::Set(true));
    assert!(card.is_wishlisted());
}

#[tokio::test(start_paused = true)]
async fn wishlist_failure_reverts_the_card_icon() {
    let fx = fixture(10);
    *fx.wishlist.next_error.lock().unwrap() =
        Some(WishlistError::Transport("503".into()));
    let card = ProductCardView::mount(record(1, 10), Arc::clone(&fx.controller));

    let err = card.toggle_wishlist(true).await.unwrap_err();
    assert!(matches!(err, MutationError::Wishlist(_)));
    assert!(!card.is_wishlisted());
}

#[tokio::test(start_paused = true)]
async fn two_toggles_with_identical_target_call_the_service_once() {
    let fx = fixture(10);
    let card = ProductCardView::mount(record(1, 10), Arc::clone(&fx.controller));

    let first = card.toggle_wishlist(true).await.unwrap();
    tokio::time::advance(Duration::from_millis(50)).await;
    let second = card.toggle_wishlist(true).await.unwrap();

    assert_eq!(first, WishlistOutcome::Set(true));
    assert!(matches!(
        second,
        WishlistOutcome::Skipped | WishlistOutcome::AlreadySet(true)
    ));
    assert_eq!(fx.wishlist.adds.load(Ordering::SeqCst), 1);
    assert!(card.is_wishlisted());
}

#[tokio::test(start_paused = true)]
async fn detail_view_masks_a_failed_image_fetch_with_the_cache() {
    let fx = fixture(10);
    let images = FakeImages::scripted(vec![
        Ok(descriptors(&["a.jpg", "b.jpg"])),
        Ok(Vec::new()),
    ]);
    let detail = detail_view(&fx, record(1, 10), Arc::clone(&images));

    detail.refresh().await;
    assert_eq!(detail.images(), vec!["a.jpg".to_string(), "b.jpg".to_string()]);

    // The image pipeline re-uploads and briefly reports nothing.
    fx.bus.publish(StoreEvent::ImagesChanged {
        product_id: ProductId::new(1),
    });
    assert!(detail.needs_refresh());
    detail.refresh().await;

    assert_eq!(detail.images(), vec!["a.jpg".to_string(), "b.jpg".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn order_completion_updates_the_admin_list() {
    let fx = fixture(10);
    let catalog = Arc::new(FakeCatalog {
        rows: Mutex::new(vec![record(1, 10), record(2, 4)]),
    });

    let admin = AdminProductListView::mount(&fx.bus);
    admin.reload(&catalog).await.unwrap();
    assert!(!admin.needs_reload());

    fx.bus.publish(StoreEvent::OrderCompleted {
        order_id: vitrine_core::OrderId::new(),
        items: vec![
            OrderLine {
                product_id: ProductId::new(1),
                quantity: 3,
            },
            OrderLine {
                product_id: ProductId::new(2),
                quantity: 4,
            },
        ],
    });

    // Delta hints applied immediately, ahead of the authoritative reload.
    assert_eq!(admin.row(ProductId::new(1)).unwrap().stock, 7);
    assert_eq!(admin.row(ProductId::new(2)).unwrap().stock, 0);
    assert!(admin.needs_reload());

    catalog.rows.lock().unwrap()[0].stock = 7;
    catalog.rows.lock().unwrap()[1].stock = 0;
    admin.reload_if_stale(&catalog).await.unwrap();
    assert!(!admin.needs_reload());
    assert_eq!(admin.row(ProductId::new(1)).unwrap().stock, 7);
}

#[tokio::test(start_paused = true)]
async fn unmounting_a_view_detaches_its_handlers() {
    let fx = fixture(10);
    let card = ProductCardView::mount(record(1, 10), Arc::clone(&fx.controller));
    card.refresh_if_stale().await;
    let fetches = fx.inventory.summary_fetches.load(Ordering::SeqCst);

    drop(card);
    fx.bus.publish(StoreEvent::InventoryChanged {
        product_id: ProductId::new(1),
        variant_id: None,
    });

    // No handler left to mark anything stale, so nothing re-fetches.
    assert_eq!(fx.inventory.summary_fetches.load(Ordering::SeqCst), fetches);
}
