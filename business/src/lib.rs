mod config;
pub mod http;
pub mod maps;

pub use config::{BusinessConfig, DEFAULT_FONT_PATH, DEFAULT_MAPS_PATH};
