pub mod import_export;
pub mod jersey_images;

pub use import_export::*;
pub use jersey_images::*;
