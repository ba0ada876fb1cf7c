pub mod batch;
pub mod controller;
pub mod handles;

pub use batch::{export_filename, ArchiveWriter};
pub use controller::{ConversionController, ConversionResult, ItemId, JobState};
pub use handles::{DisplayHandle, HandleStore};
