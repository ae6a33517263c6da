//! Provider scope that hands the cart to consumers.
//!
//! # Responsibility
//! - Hold at most one mounted `CartStore` and lend it to callers.
//! - Fail fast when a consumer asks for the cart outside a mounted scope.
//!
//! # Invariants
//! - `use_cart` never runs its closure unless a store is mounted.
//! - Consumers see `CartContext`, which exposes reads and the three
//!   mutations but not loading or teardown.
//! - A poisoned lock is recovered, not propagated.
//! - `use_cart` is not reentrant: a consumer closure must not call
//!   `use_cart`, `mount` or `unmount` on the same provider.

use crate::model::cart_item::{CartItem, ProductDescriptor};
use crate::service::cart_store::{CartError, CartResult, CartSnapshot, CartStore};
use crate::storage::KeyValueStore;
use log::{info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Consumer-facing capability: current cart plus add/increment/decrement.
pub struct CartContext<'a, S: KeyValueStore> {
    store: &'a mut CartStore<S>,
}

impl<S: KeyValueStore> CartContext<'_, S> {
    pub fn products(&self) -> &[CartItem] {
        self.store.products()
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.store.snapshot()
    }

    pub fn add_to_cart(&mut self, product: ProductDescriptor) {
        self.store.add_to_cart(product);
    }

    pub fn increment(&mut self, id: &str) {
        self.store.increment(id);
    }

    pub fn decrement(&mut self, id: &str) {
        self.store.decrement(id);
    }
}

/// Scope holding the active cart store.
///
/// Construct one per app session and pass it to whatever needs the cart.
/// `new` is `const`, so an embedding layer may keep one in a `static`.
pub struct CartProvider<S: KeyValueStore> {
    slot: Mutex<Option<CartStore<S>>>,
}

impl<S: KeyValueStore> Default for CartProvider<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: KeyValueStore> CartProvider<S> {
    /// Creates an unmounted provider.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Makes `store` available to consumers.
    ///
    /// # Errors
    /// `ProviderAlreadyMounted` when a store is already active; the rejected
    /// store is dropped, which flushes its pending writes.
    pub fn mount(&self, store: CartStore<S>) -> CartResult<()> {
        let mut slot = self.lock();
        if slot.is_some() {
            warn!("event=cart_provider module=provider status=error action=mount error_code=already_mounted");
            return Err(CartError::ProviderAlreadyMounted);
        }
        info!(
            "event=cart_provider module=provider status=ok action=mount items={}",
            store.products().len()
        );
        *slot = Some(store);
        Ok(())
    }

    /// Ends the scope and hands the store back.
    ///
    /// Dropping the returned store joins its persist worker.
    pub fn unmount(&self) -> Option<CartStore<S>> {
        let store = self.lock().take();
        if store.is_some() {
            info!("event=cart_provider module=provider status=ok action=unmount");
        }
        store
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().is_some()
    }

    /// Runs `f` against the mounted cart.
    ///
    /// The provider stays locked while `f` runs, so `f` must not call back
    /// into this provider; doing so deadlocks.
    ///
    /// # Errors
    /// `MissingProvider` when nothing is mounted.
    pub fn use_cart<T>(&self, f: impl FnOnce(&mut CartContext<'_, S>) -> T) -> CartResult<T> {
        let mut slot = self.lock();
        let Some(store) = slot.as_mut() else {
            return Err(CartError::MissingProvider);
        };
        let mut context = CartContext { store };
        Ok(f(&mut context))
    }

    fn lock(&self) -> MutexGuard<'_, Option<CartStore<S>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
