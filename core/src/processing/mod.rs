pub mod image;
pub mod startup_self_check;
