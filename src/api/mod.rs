//! Purpose: Define the stable public Rust API boundary for carton.
//! Exports: Core types and operations needed by the binary and tests.
//! Role: Public, additive-only surface; hides internal core modules.
//! Invariants: This module is the only public path to the store primitives.
//! Invariants: Internal modules remain private and are not directly exposed.

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::filter::ItemFilter;
pub use crate::core::item::{CartItem, NewCartItem};
pub use crate::core::store::CartStore;
