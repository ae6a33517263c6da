//! Cart state container.
//!
//! # Responsibility
//! - Own the in-memory cart collection for the lifetime of the app session.
//! - Load it once from device storage and persist it after every mutation.
//! - Publish an immutable `CartSnapshot` whenever state changes.
//!
//! # Invariants
//! - At most one `CartItem` per id; `add_to_cart` on a known id bumps its
//!   quantity instead of appending.
//! - Mutations never fail from the caller's point of view. Persistence is
//!   handed to `PersistWriter` and failures only show up in logs.
//! - `decrement` has no floor; quantities may reach zero or go negative.
//! - Quantities and snapshot totals saturate at their numeric bounds.
//! - With the default config, reads and writes use different keys, so a new
//!   session does not see what the previous one wrote. Use
//!   `CartStoreConfig::unified` to read and write one key.

use crate::model::cart_item::{validate_collection, CartItem, ProductDescriptor};
use crate::storage::{KeyValueStore, PersistWriter, StorageError};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Key read by `load_initial` in the default config.
pub const DEFAULT_LOAD_KEY: &str = "@GoMarketPlace:storagedProducts";
/// Key written after every mutation in the default config.
pub const DEFAULT_PERSIST_KEY: &str = "@GoMarketPlace:products";

pub type CartResult<T> = Result<T, CartError>;

/// Errors surfaced by the cart store and its provider scope.
#[derive(Debug)]
pub enum CartError {
    /// Cart was requested outside a mounted `CartProvider`.
    MissingProvider,
    /// A store is already mounted in this provider.
    ProviderAlreadyMounted,
    /// `load_initial` was called after the store left its initial phase.
    AlreadyLoaded,
    /// The persisted blob is not a valid cart collection.
    MalformedStorage(String),
    Storage(StorageError),
}

impl Display for CartError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProvider => write!(f, "use_cart must be used within a CartProvider"),
            Self::ProviderAlreadyMounted => write!(f, "a cart store is already mounted"),
            Self::AlreadyLoaded => write!(f, "cart has already been loaded"),
            Self::MalformedStorage(message) => write!(f, "malformed persisted cart: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::MissingProvider
            | Self::ProviderAlreadyMounted
            | Self::AlreadyLoaded
            | Self::MalformedStorage(_) => None,
        }
    }
}

impl From<StorageError> for CartError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Storage keys used by the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreConfig {
    pub load_key: String,
    pub persist_key: String,
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self {
            load_key: DEFAULT_LOAD_KEY.to_string(),
            persist_key: DEFAULT_PERSIST_KEY.to_string(),
        }
    }
}

impl CartStoreConfig {
    /// Reads and writes the same key.
    pub fn unified(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            load_key: key.clone(),
            persist_key: key,
        }
    }

    pub fn keys_diverge(&self) -> bool {
        self.load_key != self.persist_key
    }
}

/// Lifecycle of a store: `Uninitialized -> Loaded -> Mutated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartPhase {
    Uninitialized,
    Loaded,
    Mutated,
}

/// Read-only view of the cart handed to consumers.
///
/// Cheap to clone; the item slice is shared, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    products: Arc<[CartItem]>,
    revision: u64,
}

impl CartSnapshot {
    fn new(products: &[CartItem], revision: u64) -> Self {
        Self {
            products: Arc::from(products),
            revision,
        }
    }

    pub fn products(&self) -> &[CartItem] {
        &self.products
    }

    /// Increases by one with every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&CartItem> {
        self.products.iter().find(|item| item.id == id)
    }

    /// Sum of quantities across all lines, saturating at the `i64` bounds.
    pub fn total_quantity(&self) -> i64 {
        self.products
            .iter()
            .fold(0i64, |total, item| total.saturating_add(item.quantity))
    }

    /// Sum of `price * quantity` across all lines, saturating at the
    /// `Decimal` bounds.
    pub fn total_price(&self) -> Decimal {
        self.products
            .iter()
            .fold(Decimal::ZERO, |total, item| {
                total.saturating_add(item.line_total())
            })
    }
}

/// Owns the cart collection and its persistence.
pub struct CartStore<S: KeyValueStore> {
    storage: Arc<S>,
    writer: PersistWriter,
    config: CartStoreConfig,
    products: Vec<CartItem>,
    phase: CartPhase,
    revision: u64,
    snapshot: CartSnapshot,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Builds an empty store in `Uninitialized` phase and starts its writer.
    pub fn new(storage: Arc<S>, config: CartStoreConfig) -> CartResult<Self> {
        let writer = PersistWriter::spawn(Arc::clone(&storage))?;
        if config.keys_diverge() {
            warn!(
                "event=cart_config module=cart status=warn reason=keys_diverge load_key={} persist_key={}",
                config.load_key, config.persist_key
            );
        }
        Ok(Self {
            storage,
            writer,
            config,
            products: Vec::new(),
            phase: CartPhase::Uninitialized,
            revision: 0,
            snapshot: CartSnapshot::new(&[], 0),
        })
    }

    /// Builds a store and loads the persisted cart into it.
    pub fn open(storage: Arc<S>, config: CartStoreConfig) -> CartResult<Self> {
        let mut store = Self::new(storage, config)?;
        store.load_initial()?;
        Ok(store)
    }

    /// Replaces the collection with the blob stored under `load_key`.
    ///
    /// Leaves the collection empty when nothing is stored.
    ///
    /// # Errors
    /// - `AlreadyLoaded` outside the `Uninitialized` phase.
    /// - `Storage` when the read fails.
    /// - `MalformedStorage` when the blob is not a JSON array of cart items
    ///   or repeats an id.
    pub fn load_initial(&mut self) -> CartResult<()> {
        if self.phase != CartPhase::Uninitialized {
            return Err(CartError::AlreadyLoaded);
        }

        let started_at = Instant::now();
        let loaded = self
            .storage
            .get_item(&self.config.load_key)
            .map_err(CartError::from)
            .and_then(|raw| raw.map(|raw| parse_products(&raw)).transpose());

        let products = match loaded {
            Ok(products) => products,
            Err(err) => {
                error!(
                    "event=cart_load module=cart status=error key={} duration_ms={} error={}",
                    self.config.load_key,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let found = products.is_some();
        self.products = products.unwrap_or_default();
        self.phase = CartPhase::Loaded;
        self.publish();
        info!(
            "event=cart_load module=cart status=ok key={} found={} items={} duration_ms={}",
            self.config.load_key,
            found,
            self.products.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Adds one unit of `product`.
    ///
    /// A known id gets `quantity + 1` and keeps its stored fields; an unknown
    /// id is appended with quantity 1.
    pub fn add_to_cart(&mut self, product: ProductDescriptor) {
        let existing = self.products.iter().position(|item| item.id == product.id);
        let quantity = match existing {
            Some(index) => {
                let existing = &mut self.products[index];
                existing.quantity = existing.quantity.saturating_add(1);
                existing.quantity
            }
            None => {
                self.products.push(CartItem::from_descriptor(product));
                1
            }
        };
        self.revision += 1;
        debug!(
            "event=cart_add module=cart status=ok quantity={} items={} revision={}",
            quantity,
            self.products.len(),
            self.revision
        );
        self.commit();
    }

    /// Adds one to the quantity of `id`. Unknown ids leave the cart as is.
    pub fn increment(&mut self, id: &str) {
        let changed = self.adjust_quantity(id, 1);
        debug!(
            "event=cart_increment module=cart status=ok matched={} items={} revision={}",
            changed,
            self.products.len(),
            self.revision
        );
        self.commit();
    }

    /// Subtracts one from the quantity of `id`, with no floor. Unknown ids
    /// leave the cart as is.
    pub fn decrement(&mut self, id: &str) {
        let changed = self.adjust_quantity(id, -1);
        debug!(
            "event=cart_decrement module=cart status=ok matched={} items={} revision={}",
            changed,
            self.products.len(),
            self.revision
        );
        self.commit();
    }

    pub fn products(&self) -> &[CartItem] {
        &self.products
    }

    /// Latest published view of the cart.
    pub fn snapshot(&self) -> CartSnapshot {
        self.snapshot.clone()
    }

    pub fn phase(&self) -> CartPhase {
        self.phase
    }

    pub fn config(&self) -> &CartStoreConfig {
        &self.config
    }

    fn adjust_quantity(&mut self, id: &str, delta: i64) -> bool {
        let Some(item) = self.products.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.quantity = item.quantity.saturating_add(delta);
        self.revision += 1;
        true
    }

    // Every mutating call lands here, including no-op increments/decrements:
    // the collection is written back either way.
    fn commit(&mut self) {
        self.phase = CartPhase::Mutated;
        if self.snapshot.revision != self.revision {
            self.publish();
        }
        match serde_json::to_string(&self.products) {
            Ok(json) => self
                .writer
                .submit(&self.config.persist_key, json, self.revision),
            Err(err) => error!(
                "event=cart_persist module=cart status=error key={} revision={} error_code=serialize_failed error={}",
                self.config.persist_key, self.revision, err
            ),
        }
    }

    fn publish(&mut self) {
        self.snapshot = CartSnapshot::new(&self.products, self.revision);
    }
}

fn parse_products(raw: &str) -> CartResult<Vec<CartItem>> {
    let products: Vec<CartItem> =
        serde_json::from_str(raw).map_err(|err| CartError::MalformedStorage(err.to_string()))?;
    validate_collection(&products).map_err(|err| CartError::MalformedStorage(err.to_string()))?;
    Ok(products)
}
