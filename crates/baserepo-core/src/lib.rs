//! # Baserepo Core
//!
//! The transformer contract, the JSON:API-style resource envelope builder and
//! the two pagination adapters (page based and cursor based) that decorate an
//! envelope with navigation metadata.
//!
//! Data access is abstracted behind [`DataSource`]; nothing here performs I/O.

pub mod cursor;
pub mod envelope;
pub mod error;
pub mod id;
pub mod includes;
pub mod pagination;
pub mod query;
pub mod result;
pub mod telemetry;
pub mod traits;
pub mod transformer;
pub mod validation;

pub use cursor::*;
pub use envelope::*;
pub use error::*;
pub use id::*;
pub use includes::*;
pub use pagination::*;
pub use query::*;
pub use result::*;
pub use telemetry::*;
pub use traits::*;
pub use transformer::*;
pub use validation::*;

#[doc(hidden)]
pub use serde_json as __serde_json;
