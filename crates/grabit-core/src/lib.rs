pub mod config;
pub mod error;
pub mod fetch;
pub mod integrity;
pub mod lock;
pub mod logging;
pub mod resource;
pub mod url_model;

pub use error::{GrabError, Result};
pub use fetch::FetchContext;
pub use integrity::{Algorithm, Integrity};
pub use lock::{DownloadOptions, Lock, TagFilter};
pub use resource::{Materialized, Origin, Resource};
