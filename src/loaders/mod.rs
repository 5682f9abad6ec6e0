//! Texture loaders
//!
//! Turns source HDR bytes into ready-to-sample GPU textures.

pub mod hdr;

pub use hdr::{from_buffer, from_path, from_url, is_hdr_file, HdrLoadOptions, SamplerOptions};
