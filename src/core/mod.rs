//! GPU precompute passes
//!
//! Per-device generators and the registry that caches them.

pub mod brdf_lut;
pub mod mipmap;
pub mod pmrem;
pub mod registry;

pub use brdf_lut::BrdfLut;
pub use mipmap::{mip_level_count, MipmapGenerator};
pub use pmrem::{PmremGenerator, PmremOptions, PmremTextures};
