//! Caller-owned GPU texture handles
//!
//! Thin wrappers pairing a wgpu texture with its default view, sampler and
//! metadata. Handles are long-lived; `destroy` releases backend memory
//! explicitly instead of waiting for the last reference to drop.

use crate::error::{EnvError, EnvResult};

pub const CUBE_FACE_COUNT: u32 = 6;

/// Pixel formats the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HdrPixelFormat {
    /// Packed binary16, the default for environment maps.
    #[default]
    Rgba16Float,
    /// Full single-precision; requires float32 filtering support.
    Rgba32Float,
}

impl HdrPixelFormat {
    pub fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            HdrPixelFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            HdrPixelFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            HdrPixelFormat::Rgba16Float => 8,
            HdrPixelFormat::Rgba32Float => 16,
        }
    }
}

/// An owned 2D texture: backend texture + default view + sampler + metadata.
#[derive(Debug)]
pub struct EnvTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    mip_level_count: u32,
}

impl EnvTexture {
    pub(crate) fn new(
        texture: wgpu::Texture,
        view: wgpu::TextureView,
        sampler: wgpu::Sampler,
    ) -> Self {
        let (width, height) = (texture.width(), texture.height());
        let format = texture.format();
        let mip_level_count = texture.mip_level_count();
        Self {
            texture,
            view,
            sampler,
            width,
            height,
            format,
            mip_level_count,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    /// View of a single mip level.
    pub fn mip_view(&self, level: u32) -> EnvResult<wgpu::TextureView> {
        if level >= self.mip_level_count {
            return Err(EnvError::resource(format!(
                "mip level {level} out of range (texture has {})",
                self.mip_level_count
            )));
        }
        Ok(self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("envlight.texture.mip_view"),
            base_mip_level: level,
            mip_level_count: Some(1),
            ..Default::default()
        }))
    }

    /// Release backend memory. The handle itself stays valid Rust-side;
    /// any later GPU use of the texture is an error.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// An owned six-face cube texture with per-face/per-mip view accessors.
#[derive(Debug)]
pub struct EnvCubeTexture {
    texture: wgpu::Texture,
    cube_view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    face_size: u32,
    format: wgpu::TextureFormat,
    mip_level_count: u32,
}

impl EnvCubeTexture {
    pub(crate) fn new(
        texture: wgpu::Texture,
        cube_view: wgpu::TextureView,
        sampler: wgpu::Sampler,
    ) -> Self {
        let face_size = texture.width();
        let format = texture.format();
        let mip_level_count = texture.mip_level_count();
        Self {
            texture,
            cube_view,
            sampler,
            face_size,
            format,
            mip_level_count,
        }
    }

    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Cube-dimension view spanning all faces and mips.
    pub fn cube_view(&self) -> &wgpu::TextureView {
        &self.cube_view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn face_size(&self) -> u32 {
        self.face_size
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    /// View of one face at mip 0.
    pub fn face_view(&self, face: u32) -> EnvResult<wgpu::TextureView> {
        self.face_mip_view(face, 0)
    }

    /// View of one face at one mip level, usable as a render target.
    pub fn face_mip_view(&self, face: u32, mip: u32) -> EnvResult<wgpu::TextureView> {
        if face >= CUBE_FACE_COUNT {
            return Err(EnvError::resource(format!(
                "cube face {face} out of range"
            )));
        }
        if mip >= self.mip_level_count {
            return Err(EnvError::resource(format!(
                "mip level {mip} out of range (cube has {})",
                self.mip_level_count
            )));
        }
        Ok(self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("envlight.cube.face_mip_view"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: mip,
            mip_level_count: Some(1),
            base_array_layer: face,
            array_layer_count: Some(1),
            ..Default::default()
        }))
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
