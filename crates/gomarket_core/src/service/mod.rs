//! Cart use-case services.
//!
//! # Responsibility
//! - Own cart state and route every mutation through one store.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod cart_store;
pub mod provider;
