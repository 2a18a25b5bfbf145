pub mod config;
pub mod error;
pub mod error_utils;
pub mod safety;
pub mod snapshot;
pub mod types;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use safety::*;
pub use snapshot::*;
pub use types::*;
