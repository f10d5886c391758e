//! Result type aliases for Baserepo.

use crate::BaseRepoError;

/// A specialized `Result` type for Baserepo operations.
pub type BaseRepoResult<T> = Result<T, BaseRepoError>;
