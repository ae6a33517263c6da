//! Cart domain model.
//!
//! # Responsibility
//! - Define the line-item record held by the cart and its persisted shape.
//! - Keep collection-level invariants next to the record they protect.
//!
//! # Invariants
//! - A cart collection holds at most one item per `id`.
//! - Quantities are not clamped here; callers own quantity semantics.

pub mod cart_item;
