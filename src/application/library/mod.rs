mod errors;
mod library_service;
mod queries;

pub use errors::{LibraryError, Result};
pub use library_service::Library;
