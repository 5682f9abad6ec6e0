//! Radiance HDR -> GPU texture loader
//!
//! Fetches or receives raw `.hdr` bytes, decodes them through the RGBE
//! parser, applies the header's cumulative exposure, encodes texels to the
//! requested float format and uploads everything in a single write,
//! followed by GPU mip generation when requested.

use std::path::Path;

use crate::core::mipmap::{mip_level_count, MipmapGenerator};
use crate::error::{EnvError, EnvResult};
use crate::formats::{parse_hdr, to_half_bulk};
use crate::gpu::pad_image_rows;
use crate::texture::{EnvTexture, HdrPixelFormat};

/// Caller overrides merged over the environment-map sampler defaults.
/// Environment maps must not wrap, so every unset address mode stays
/// clamp-to-edge.
#[derive(Debug, Clone, Default)]
pub struct SamplerOptions {
    pub address_mode: Option<wgpu::AddressMode>,
    pub mag_filter: Option<wgpu::FilterMode>,
    pub min_filter: Option<wgpu::FilterMode>,
    pub mipmap_filter: Option<wgpu::FilterMode>,
    pub anisotropy_clamp: Option<u16>,
}

/// Options for one load.
#[derive(Debug, Clone)]
pub struct HdrLoadOptions {
    pub format: HdrPixelFormat,
    /// Scale R,G,B by the header's cumulative exposure (alpha untouched).
    pub apply_exposure: bool,
    pub generate_mipmaps: bool,
    pub label: Option<String>,
    pub sampler: SamplerOptions,
}

impl Default for HdrLoadOptions {
    fn default() -> Self {
        Self {
            format: HdrPixelFormat::Rgba16Float,
            apply_exposure: true,
            generate_mipmaps: true,
            label: None,
            sampler: SamplerOptions::default(),
        }
    }
}

/// Extension check for `.hdr` sources, ignoring query string and fragment.
pub fn is_hdr_file(url: &str) -> bool {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    match path.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case("hdr"),
        None => false,
    }
}

/// Fetch an HDR image over HTTP and upload it.
///
/// One non-blocking fetch; the calling task suspends until bytes arrive or
/// the request fails. Decode and upload run synchronously afterwards.
pub async fn from_url(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    url: &str,
    options: &HdrLoadOptions,
) -> EnvResult<EnvTexture> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| EnvError::network_with(format!("failed to fetch {url}"), Box::new(e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(EnvError::network(
            format!("fetching {url}"),
            Some(status.as_u16()),
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| EnvError::network_with(format!("reading body of {url}"), Box::new(e)))?;

    from_buffer(device, queue, &bytes, options)
}

/// Read an HDR image from the filesystem and upload it.
pub fn from_path(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: impl AsRef<Path>,
    options: &HdrLoadOptions,
) -> EnvResult<EnvTexture> {
    let bytes = std::fs::read(path.as_ref())?;
    from_buffer(device, queue, &bytes, options)
}

/// Decode an in-memory HDR buffer and upload it. The synchronous core of
/// the loader.
pub fn from_buffer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    bytes: &[u8],
    options: &HdrLoadOptions,
) -> EnvResult<EnvTexture> {
    // Capability gate up front, before decode work and before any GPU
    // allocation: full-float environment maps must stay filterable, and
    // that is feature-gated.
    if options.format == HdrPixelFormat::Rgba32Float
        && !device
            .features()
            .contains(wgpu::Features::FLOAT32_FILTERABLE)
    {
        return Err(EnvError::capability(
            "Rgba32Float environment textures require the FLOAT32_FILTERABLE device feature",
        ));
    }

    let mut parsed = parse_hdr(bytes)?;

    if options.apply_exposure && parsed.exposure != 1.0 {
        for px in parsed.data.chunks_exact_mut(4) {
            px[0] *= parsed.exposure;
            px[1] *= parsed.exposure;
            px[2] *= parsed.exposure;
        }
        log::debug!("applied cumulative exposure {}", parsed.exposure);
    }

    let wgpu_format = options.format.wgpu_format();
    let renderable = wgpu_format
        .guaranteed_format_features(device.features())
        .allowed_usages
        .contains(wgpu::TextureUsages::RENDER_ATTACHMENT);

    let mips = if options.generate_mipmaps && renderable {
        mip_level_count(parsed.width, parsed.height)
    } else {
        1
    };

    let texel_bytes: Vec<u8> = match options.format {
        HdrPixelFormat::Rgba16Float => {
            let halves = to_half_bulk(&parsed.data);
            bytemuck::cast_slice(&halves).to_vec()
        }
        HdrPixelFormat::Rgba32Float => bytemuck::cast_slice(&parsed.data).to_vec(),
    };

    let mut usage = wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST;
    if mips > 1 {
        usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }

    let label = options.label.as_deref().unwrap_or("envlight.hdr.texture");
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: parsed.width,
            height: parsed.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: mips,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu_format,
        usage,
        view_formats: &[],
    });

    let (padded, bytes_per_row) = pad_image_rows(
        &texel_bytes,
        parsed.width,
        parsed.height,
        options.format.bytes_per_pixel(),
    );

    // One write covers the whole base level.
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &padded,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(bytes_per_row),
            rows_per_image: Some(parsed.height),
        },
        wgpu::Extent3d {
            width: parsed.width,
            height: parsed.height,
            depth_or_array_layers: 1,
        },
    );

    if mips > 1 {
        if let Err(e) = MipmapGenerator::get(device).generate(device, queue, &texture) {
            // The texture was already allocated; release it before the
            // error propagates.
            texture.destroy();
            return Err(EnvError::resource_with("mip generation failed", e));
        }
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        ..Default::default()
    });
    let sampler = build_sampler(device, &options.sampler, label);

    log::info!(
        "loaded {}x{} HDR environment ({mips} mips, {:?})",
        parsed.width,
        parsed.height,
        wgpu_format
    );

    Ok(EnvTexture::new(texture, view, sampler))
}

/// Clamp-to-edge defaults merged with caller overrides. Anisotropy is only
/// valid with all-linear filtering; incompatible requests are corrected and
/// logged rather than failed.
fn build_sampler(
    device: &wgpu::Device,
    options: &SamplerOptions,
    label: &str,
) -> wgpu::Sampler {
    let address_mode = options.address_mode.unwrap_or(wgpu::AddressMode::ClampToEdge);
    let mag_filter = options.mag_filter.unwrap_or(wgpu::FilterMode::Linear);
    let min_filter = options.min_filter.unwrap_or(wgpu::FilterMode::Linear);
    let mipmap_filter = options.mipmap_filter.unwrap_or(wgpu::FilterMode::Linear);

    let mut anisotropy_clamp = options.anisotropy_clamp.unwrap_or(1).max(1);
    let all_linear = mag_filter == wgpu::FilterMode::Linear
        && min_filter == wgpu::FilterMode::Linear
        && mipmap_filter == wgpu::FilterMode::Linear;
    if anisotropy_clamp > 1 && !all_linear {
        log::warn!(
            "anisotropy_clamp {anisotropy_clamp} requires linear filtering; falling back to 1"
        );
        anisotropy_clamp = 1;
    }

    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter,
        min_filter,
        mipmap_filter,
        anisotropy_clamp,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hdr_extension_check_ignores_query_and_hash() {
        assert!(is_hdr_file("studio.hdr"));
        assert!(is_hdr_file("https://example.com/maps/venice.HDR?v=3"));
        assert!(is_hdr_file("https://example.com/a.hdr#section"));
        assert!(is_hdr_file("https://example.com/a.hdr?x=1#y"));
        assert!(!is_hdr_file("https://example.com/a.exr"));
        assert!(!is_hdr_file("https://example.com/hdr"));
        assert!(!is_hdr_file("https://example.com/a.hdr.png"));
    }

    #[test]
    fn default_options_are_half_float_with_mips() {
        let options = HdrLoadOptions::default();
        assert_eq!(options.format, HdrPixelFormat::Rgba16Float);
        assert!(options.apply_exposure);
        assert!(options.generate_mipmaps);
        assert!(options.label.is_none());
    }
}
