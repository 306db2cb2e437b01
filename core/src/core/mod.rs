pub mod asset_manager;
pub mod storage;
#[cfg(test)]
mod test;
