mod codec;
mod format;
mod mitchell;
mod resampling;
mod resize;

pub use codec::inspect;
pub use format::ImageFormat;
pub use resampling::Resampling;
pub use resize::{fit_dimensions, resize};
