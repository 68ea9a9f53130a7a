pub mod imagemagick;

pub use imagemagick::ImageMagickConverter;
