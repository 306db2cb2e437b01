pub mod catalog;
pub mod config;
pub mod core;
mod error;
pub mod model;
mod processing;
pub use deadpool_diesel;
pub use error::{AssetError, ErrorKind};
pub use processing::image::{ImageFormat, Resampling};
pub use processing::startup_self_check;
