//! # Baserepo Repository
//!
//! Read-side repository facade over a [`DataSource`](baserepo_core::DataSource):
//!
//! ```text
//! Handler
//!   ↓  BaseRepository<S>        (lookups, pagination, envelopes)
//! DataSource                    (fetch_page / find)
//!   ↓
//! InMemoryDataSource | your own store
//! ```

pub mod base_repository;
pub mod memory;

pub use base_repository::*;
pub use memory::*;
