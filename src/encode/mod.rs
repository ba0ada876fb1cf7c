//! Output serializers for the palette formats (GIF, PNG).

pub mod gif;
pub mod png;
