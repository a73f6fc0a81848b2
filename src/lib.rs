//! Purpose: Shared core library crate used by the `carton` binary and tests.
//! Exports: `api` (items, store, filters, errors).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
mod core;

pub mod api;
