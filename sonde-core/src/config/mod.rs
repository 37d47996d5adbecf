//! Device configuration
//!
//! Types, persisted layout and the store that ties them to non-volatile
//! storage.

pub mod layout;
pub mod store;
pub mod types;

pub use layout::IMAGE_LEN;
pub use store::{ConfigStore, FieldValue, OpenReport, Persistence};
pub use types::*;
