//! FFI cart API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the cart provider scope to Dart via FRB.
//! - Translate core results into plain envelopes the UI can render.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Cart calls made before `cart_mount` return `ok=false` with the
//!   missing-provider message.
//! - Mutations report the cart state after the change; persistence runs in
//!   the background and its failures never reach Dart.

use gomarket_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CartError, CartItem, CartProvider, CartSnapshot, CartStore, CartStoreConfig,
    ProductDescriptor, SqliteKeyValueStore, DEFAULT_PERSIST_KEY,
};
use log::warn;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

const CART_DB_FILE_NAME: &str = "gomarket_cart.sqlite3";
const CART_DB_PATH_ENV: &str = "GOMARKET_DB_PATH";

static CART_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CART: CartProvider<SqliteKeyValueStore> = CartProvider::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One cart line as shown by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub image_url: String,
    /// Decimal string, e.g. `"19.99"`.
    pub price: String,
    pub quantity: i64,
}

/// Result envelope for every cart call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartResponse {
    /// Whether the call reached a mounted cart.
    pub ok: bool,
    /// Cart lines after the call (empty on failure).
    pub items: Vec<CartItemView>,
    /// Human-readable message for diagnostics.
    pub message: String,
    /// Snapshot revision; changes whenever the cart changes.
    pub revision: u64,
    pub total_quantity: i64,
    /// Decimal string.
    pub total_price: String,
}

impl CartResponse {
    fn from_snapshot(message: impl Into<String>, snapshot: &CartSnapshot) -> Self {
        Self {
            ok: true,
            items: snapshot.products().iter().map(to_item_view).collect(),
            message: message.into(),
            revision: snapshot.revision(),
            total_quantity: snapshot.total_quantity(),
            total_price: snapshot.total_price().to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
            revision: 0,
            total_quantity: 0,
            total_price: Decimal::ZERO.to_string(),
        }
    }
}

/// Opens the cart database, loads the persisted cart and mounts it.
///
/// `unified_key = true` reads and writes `@GoMarketPlace:products`; `false`
/// keeps the legacy split between load and persist keys.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Fails when a cart is already mounted or the stored blob is malformed.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_mount(unified_key: bool) -> CartResponse {
    let config = if unified_key {
        CartStoreConfig::unified(DEFAULT_PERSIST_KEY)
    } else {
        CartStoreConfig::default()
    };
    let store = SqliteKeyValueStore::open(resolve_cart_db_path())
        .map_err(CartError::from)
        .and_then(|storage| CartStore::open(Arc::new(storage), config));

    let store = match store {
        Ok(store) => store,
        Err(err) => return CartResponse::failure(format!("cart_mount failed: {err}")),
    };
    let snapshot = store.snapshot();
    match CART.mount(store) {
        Ok(()) => CartResponse::from_snapshot("Cart mounted.", &snapshot),
        Err(err) => CartResponse::failure(format!("cart_mount failed: {err}")),
    }
}

/// Unmounts the cart, waiting for queued writes to land.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_unmount() -> CartResponse {
    match CART.unmount() {
        Some(store) => {
            let snapshot = store.snapshot();
            drop(store);
            CartResponse::from_snapshot("Cart unmounted.", &snapshot)
        }
        None => CartResponse::failure(format!(
            "cart_unmount failed: {}",
            CartError::MissingProvider
        )),
    }
}

/// Returns the current cart.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_products() -> CartResponse {
    respond("cart_products", "Cart loaded.", |_| {})
}

/// Adds one unit of a product.
///
/// `price` must parse as a decimal number.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_add(id: String, title: String, image_url: String, price: String) -> CartResponse {
    let price = match Decimal::from_str(price.trim()) {
        Ok(price) => price,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call=cart_add error_code=invalid_price");
            return CartResponse::failure(format!("cart_add failed: invalid price: {err}"));
        }
    };
    let product = ProductDescriptor::new(id, title, image_url, price);
    respond("cart_add", "Added to cart.", move |cart| cart.add_to_cart(product))
}

/// Adds one to the quantity of `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_increment(id: String) -> CartResponse {
    respond("cart_increment", "Quantity increased.", |cart| {
        cart.increment(id.as_str())
    })
}

/// Subtracts one from the quantity of `id` (no floor).
#[flutter_rust_bridge::frb(sync)]
pub fn cart_decrement(id: String) -> CartResponse {
    respond("cart_decrement", "Quantity decreased.", |cart| {
        cart.decrement(id.as_str())
    })
}

fn respond(
    call: &str,
    message: &str,
    f: impl FnOnce(&mut gomarket_core::CartContext<'_, SqliteKeyValueStore>),
) -> CartResponse {
    let result = CART.use_cart(|cart| {
        f(cart);
        cart.snapshot()
    });
    match result {
        Ok(snapshot) => CartResponse::from_snapshot(message, &snapshot),
        Err(err) => CartResponse::failure(format!("{call} failed: {err}")),
    }
}

fn resolve_cart_db_path() -> PathBuf {
    CART_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(CART_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CART_DB_FILE_NAME)
        })
        .clone()
}

fn to_item_view(item: &CartItem) -> CartItemView {
    CartItemView {
        id: item.id.clone(),
        title: item.title.clone(),
        image_url: item.image_url.clone(),
        price: item.price.to_string(),
        quantity: item.quantity,
    }
}
