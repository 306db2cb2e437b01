pub mod operation;
pub mod storage_key;
