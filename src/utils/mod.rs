pub mod format;
pub mod test_helpers;

pub use format::format_size;
