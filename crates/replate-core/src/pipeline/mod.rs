//! Image input stages ahead of the model call.
//!
//! - **discovery**: Find image files in directories
//! - **validate**: Existence, size and magic-byte checks
//! - **loader**: Read, detect format, downscale, base64-encode

pub mod discovery;
pub mod loader;
pub mod validate;

pub use discovery::FileDiscovery;
pub use loader::ImageLoader;
pub use validate::Validator;
