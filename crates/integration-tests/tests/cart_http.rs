//! End-to-end cart tests against a mock catalog API.
//!
//! Each test runs the real `HttpCatalog` and `FileStorage` against
//! `MockCatalogApi` and a temporary cart file.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use rocketshoes_cart::{
    ADD_FAILED_MESSAGE, CART_STORAGE_KEY, CartError, CartOperation, CartStore, CatalogError,
    FailureCause, FileStorage, HttpCatalog, MemoryNotifier, STOCK_EXCEEDED_MESSAGE, Storage,
    UPDATE_FAILED_MESSAGE, UpdateProductAmount,
};
use rocketshoes_core::{LineItem, ProductId};
use rocketshoes_integration_tests::{Failure, MockCatalogApi};
use secrecy::ExposeSecret;

type HttpCart = CartStore<HttpCatalog, FileStorage, Arc<MemoryNotifier>>;

fn open(api: &MockCatalogApi, cart_file: &Path) -> (HttpCart, Arc<MemoryNotifier>) {
    let config = api.config(cart_file, None);
    let notifier = Arc::new(MemoryNotifier::new());
    let cart = CartStore::load(
        HttpCatalog::new(&config).unwrap(),
        FileStorage::new(&config.cart_file),
        Arc::clone(&notifier),
    )
    .unwrap();
    (cart, notifier)
}

fn persisted(cart_file: &Path) -> Vec<LineItem> {
    let raw = FileStorage::new(cart_file)
        .get(CART_STORAGE_KEY)
        .unwrap()
        .unwrap();
    serde_json::from_str(&raw).unwrap()
}

fn id(n: i32) -> ProductId {
    ProductId::new(n)
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_new_product_persists_to_file() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 5);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    cart.add_product(id(1)).await.unwrap();

    assert_eq!(cart.cart().len(), 1);
    assert_eq!(cart.cart()[0].amount, 1);
    assert_eq!(cart.cart()[0].product.title.as_deref(), Some("Tênis 1"));
    assert_eq!(persisted(&cart_file), cart.cart());
    assert_eq!(api.stock_requests(), 1);
    assert_eq!(api.product_requests(), 1);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_add_beyond_stock_leaves_file_untouched() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 1);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    cart.add_product(id(1)).await.unwrap();
    let before = std::fs::read_to_string(&cart_file).unwrap();

    let err = cart.add_product(id(1)).await.unwrap_err();

    assert!(err.is_stock_exceeded());
    assert_eq!(cart.get(id(1)).unwrap().amount, 1);
    assert_eq!(std::fs::read_to_string(&cart_file).unwrap(), before);
    assert_eq!(notifier.messages(), vec![STOCK_EXCEEDED_MESSAGE]);
}

#[tokio::test]
async fn test_add_unknown_product_fails_generically() {
    let api = MockCatalogApi::start().await;
    api.set_stock(42, 3);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    let err = cart.add_product(id(42)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::Unexpected {
            operation: CartOperation::Add,
            source: FailureCause::Catalog(CatalogError::NotFound(_)),
        }
    ));
    assert!(cart.cart().is_empty());
    assert!(!cart_file.exists());
    assert_eq!(notifier.messages(), vec![ADD_FAILED_MESSAGE]);
}

#[tokio::test]
async fn test_add_when_catalog_is_down() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 5);
    api.set_failure(Some(Failure::Status(503)));
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    let err = cart.add_product(id(1)).await.unwrap_err();

    assert!(matches!(
        err,
        CartError::Unexpected {
            source: FailureCause::Catalog(CatalogError::Api { status: 503, .. }),
            ..
        }
    ));
    assert!(cart.cart().is_empty());
    assert_eq!(notifier.messages(), vec![ADD_FAILED_MESSAGE]);
}

#[tokio::test]
async fn test_catalog_entries_are_cached_but_stock_is_not() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 5);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, _notifier) = open(&api, &cart_file);
    cart.add_product(id(1)).await.unwrap();
    cart.remove_product(id(1)).unwrap();
    cart.add_product(id(1)).await.unwrap();

    assert_eq!(api.stock_requests(), 2);
    assert_eq!(api.product_requests(), 1);
}

#[tokio::test]
async fn test_extra_catalog_fields_survive_a_restart() {
    let api = MockCatalogApi::start().await;
    api.set_product(serde_json::json!({
        "id": 3,
        "title": "Tênis Adidas Duramo Lite 2.0",
        "price": 219.9,
        "image": "https://rocketseat.example/duramo.jpg",
        "brand": "Adidas",
        "sizes": [38, 39, 40]
    }));
    api.set_stock(3, 2);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, _) = open(&api, &cart_file);
    cart.add_product(id(3)).await.unwrap();
    drop(cart);

    let (reopened, _) = open(&api, &cart_file);
    let line = reopened.get(id(3)).unwrap();
    assert_eq!(line.product.extra["brand"], "Adidas");
    assert_eq!(line.product.extra["sizes"], serde_json::json!([38, 39, 40]));
    assert_eq!(reopened.summary().formatted_subtotal(), "$219.90");
}

#[tokio::test]
async fn test_minimal_catalog_entry_round_trips() {
    let api = MockCatalogApi::start().await;
    api.set_product(serde_json::json!({ "id": 5, "name": "Sneaker", "price": 99.9 }));
    api.set_stock(5, 3);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    cart.add_product(id(5)).await.unwrap();
    cart.add_product(id(5)).await.unwrap();
    assert!(notifier.messages().is_empty());
    drop(cart);

    let raw = FileStorage::new(&cart_file)
        .get(CART_STORAGE_KEY)
        .unwrap()
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        stored,
        serde_json::json!([{ "id": 5, "name": "Sneaker", "price": 99.9, "amount": 2 }])
    );

    let (reopened, _) = open(&api, &cart_file);
    let line = reopened.get(id(5)).unwrap();
    assert_eq!(line.product.title, None);
    assert_eq!(line.product.extra["name"], "Sneaker");
    assert_eq!(reopened.summary().formatted_subtotal(), "$199.80");
}

// =============================================================================
// Remove & Update
// =============================================================================

#[tokio::test]
async fn test_full_session_round_trip() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 3);
    api.add_product(2, 139.9, 10);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("state").join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    cart.add_product(id(1)).await.unwrap();
    cart.add_product(id(2)).await.unwrap();
    cart.update_product_amount(UpdateProductAmount {
        product_id: id(2),
        amount: 4,
    })
    .await
    .unwrap();
    cart.add_product(id(1)).await.unwrap();

    let (reopened, _) = open(&api, &cart_file);
    assert_eq!(reopened.cart(), cart.cart());
    assert_eq!(
        reopened
            .cart()
            .iter()
            .map(|line| (line.id(), line.amount))
            .collect::<Vec<_>>(),
        vec![(id(1), 2), (id(2), 4)]
    );
    assert_eq!(reopened.summary().item_count, 6);
    assert_eq!(reopened.summary().formatted_subtotal(), "$919.40");

    cart.remove_product(id(1)).unwrap();
    assert_eq!(persisted(&cart_file).len(), 1);
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn test_update_beyond_stock_and_missing_item() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 2);
    api.add_product(2, 139.9, 2);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    cart.add_product(id(1)).await.unwrap();

    let over = cart
        .update_product_amount(UpdateProductAmount {
            product_id: id(1),
            amount: 3,
        })
        .await
        .unwrap_err();
    assert!(over.is_stock_exceeded());

    let missing = cart
        .update_product_amount(UpdateProductAmount {
            product_id: id(2),
            amount: 1,
        })
        .await
        .unwrap_err();
    assert!(matches!(missing, CartError::ItemNotFound { .. }));

    assert_eq!(persisted(&cart_file), cart.cart());
    assert_eq!(cart.get(id(1)).unwrap().amount, 1);
    assert_eq!(
        notifier.messages(),
        vec![STOCK_EXCEEDED_MESSAGE, UPDATE_FAILED_MESSAGE]
    );
}

#[tokio::test]
async fn test_update_to_zero_makes_no_requests() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 2);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    cart.add_product(id(1)).await.unwrap();
    let stock_requests = api.stock_requests();

    cart.update_product_amount(UpdateProductAmount {
        product_id: id(1),
        amount: 0,
    })
    .await
    .unwrap();

    assert_eq!(api.stock_requests(), stock_requests);
    assert_eq!(cart.get(id(1)).unwrap().amount, 1);
    assert!(notifier.messages().is_empty());
}

// =============================================================================
// HTTP client
// =============================================================================

#[tokio::test]
async fn test_rate_limit_reports_retry_after() {
    let api = MockCatalogApi::start().await;
    api.set_failure(Some(Failure::RateLimited { retry_after: 30 }));
    let dir = tempfile::tempdir().unwrap();
    let catalog = HttpCatalog::new(&api.config(&dir.path().join("cart.json"), None)).unwrap();

    let err = catalog.get_stock(id(1)).await.unwrap_err();
    assert!(matches!(err, CatalogError::RateLimited(30)));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let api = MockCatalogApi::start().await;
    api.set_failure(Some(Failure::Garbage));
    let dir = tempfile::tempdir().unwrap();
    let catalog = HttpCatalog::new(&api.config(&dir.path().join("cart.json"), None)).unwrap();

    let err = catalog.get_product(id(1)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let api = MockCatalogApi::start().await;
    api.set_stock(1, 4);
    let dir = tempfile::tempdir().unwrap();
    let config = api.config(&dir.path().join("cart.json"), Some("tok_9f8e7d6c5b4a"));
    assert_eq!(
        config.api_token.as_ref().unwrap().expose_secret(),
        "tok_9f8e7d6c5b4a"
    );

    let catalog = HttpCatalog::new(&config).unwrap();
    let stock = catalog.get_stock(id(1)).await.unwrap();

    assert_eq!(stock.amount, 4);
    assert_eq!(
        api.last_authorization().as_deref(),
        Some("Bearer tok_9f8e7d6c5b4a")
    );
}

#[tokio::test]
async fn test_sold_out_stock_is_stock_exceeded() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 5);
    api.add_product(2, 139.9, -1);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");

    let (mut cart, notifier) = open(&api, &cart_file);
    cart.add_product(id(1)).await.unwrap();
    api.set_stock(1, -1);

    let add = cart.add_product(id(2)).await.unwrap_err();
    assert!(matches!(
        add,
        CartError::StockExceeded {
            available: -1,
            ..
        }
    ));

    let update = cart
        .update_product_amount(UpdateProductAmount {
            product_id: id(1),
            amount: 3,
        })
        .await
        .unwrap_err();
    assert!(update.is_stock_exceeded());

    assert_eq!(
        notifier.messages(),
        vec![STOCK_EXCEEDED_MESSAGE, STOCK_EXCEEDED_MESSAGE]
    );
    assert_eq!(api.product_requests(), 1);
    assert_eq!(persisted(&cart_file), cart.cart());
    assert_eq!(cart.get(id(1)).unwrap().amount, 1);
}

// =============================================================================
// Corrupt storage
// =============================================================================

#[tokio::test]
async fn test_corrupt_cart_entry() {
    let api = MockCatalogApi::start().await;
    api.add_product(1, 179.9, 5);
    let dir = tempfile::tempdir().unwrap();
    let cart_file = dir.path().join("cart.json");
    FileStorage::new(&cart_file)
        .set(CART_STORAGE_KEY, "[{\"id\": 1}]")
        .unwrap();

    let config = api.config(&cart_file, None);
    let strict = CartStore::load(
        HttpCatalog::new(&config).unwrap(),
        FileStorage::new(&cart_file),
        MemoryNotifier::new(),
    );
    assert!(matches!(strict, Err(CartError::CorruptCart { .. })));

    let mut lenient = CartStore::load_or_reset(
        HttpCatalog::new(&config).unwrap(),
        FileStorage::new(&cart_file),
        MemoryNotifier::new(),
    )
    .unwrap();
    assert!(lenient.cart().is_empty());

    lenient.add_product(id(1)).await.unwrap();
    assert_eq!(persisted(&cart_file).len(), 1);
}
