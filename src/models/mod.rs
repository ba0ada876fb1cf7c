pub mod options;
pub mod raster;

pub use options::{
    quality_to_float, ConversionRequest, Dithering, GifOptions, GifOptionsPatch, OutputFormat,
    PngOptions, PngOptionsPatch,
};
pub use raster::RasterImage;
