use super::db;

pub mod asset;
pub mod util;
