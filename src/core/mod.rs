//! Purpose: Internal core modules for the cart-item service.
//! Exports: `error`, `filter`, `item`, `store` (via `crate::api`).
//! Role: Private implementation detail; `crate::api` is the public path.

pub mod error;
pub mod filter;
pub mod item;
pub mod store;
