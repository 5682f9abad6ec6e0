//! Environment-lighting precompute pipeline for wgpu renderers.
//!
//! Ingests Radiance `.hdr` panoramas and produces the texture set used for
//! image-based lighting: a half-float equirect environment texture, a
//! roughness-prefiltered specular cubemap, a diffuse irradiance cubemap and
//! a shared BRDF lookup table.
//!
//! ```no_run
//! # async fn demo(device: &wgpu::Device, queue: &wgpu::Queue) -> envlight::EnvResult<()> {
//! let options = envlight::HdrLoadOptions::default();
//! let env = envlight::from_url(device, queue, "https://example.com/studio.hdr", &options).await?;
//!
//! let generator = envlight::PmremGenerator::get(device);
//! let ibl = generator.from_equirectangular(device, queue, &env, &Default::default())?;
//! # let _ = ibl;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod formats;
pub mod gpu;
pub mod loaders;
pub mod texture;

pub use crate::core::registry::{clear_cache, dispose};
pub use crate::core::{
    mip_level_count, BrdfLut, MipmapGenerator, PmremGenerator, PmremOptions, PmremTextures,
};
pub use error::{EnvError, EnvResult};
pub use formats::{parse_hdr, ParsedHdr};
pub use loaders::{from_buffer, from_path, from_url, is_hdr_file, HdrLoadOptions, SamplerOptions};
pub use texture::{EnvCubeTexture, EnvTexture, HdrPixelFormat};
