//! GPU mipmap generation
//!
//! One cached generator per device. Each mip level is produced by a
//! full-screen-triangle draw that samples the previous level linearly at
//! half resolution; all levels of one texture go into a single command
//! submission. Render pipelines are cached per pixel format.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::registry::{self, DeviceId};
use crate::error::{EnvError, EnvResult};

/// Full mip chain length for a base level: floor(log2(max(w, h))) + 1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    if width == 0 || height == 0 {
        return 0;
    }
    (width.max(height) as f32).log2().floor() as u32 + 1
}

/// Per-device downsampler with a per-format pipeline cache.
pub struct MipmapGenerator {
    _device_id: DeviceId,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    pipelines: Mutex<HashMap<wgpu::TextureFormat, Arc<wgpu::RenderPipeline>>>,
}

impl MipmapGenerator {
    /// The per-device instance; created on first use and cached for the
    /// lifetime of the device (until [`crate::core::registry::dispose`]).
    pub fn get(device: &wgpu::Device) -> Arc<MipmapGenerator> {
        registry::mipmap_for(device)
    }

    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("envlight.mipmap.shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/mipmap_blit.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("envlight.mipmap.layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("envlight.mipmap.pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("envlight.mipmap.sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            _device_id: device.global_id(),
            shader,
            bind_group_layout,
            pipeline_layout,
            sampler,
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    fn pipeline_for(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Arc<wgpu::RenderPipeline> {
        let mut pipelines = self.pipelines.lock().expect("mip pipeline cache poisoned");
        pipelines
            .entry(format)
            .or_insert_with(|| {
                Arc::new(
                    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                        label: Some("envlight.mipmap.pipeline"),
                        layout: Some(&self.pipeline_layout),
                        vertex: wgpu::VertexState {
                            module: &self.shader,
                            entry_point: "vs_main",
                            buffers: &[],
                        },
                        primitive: wgpu::PrimitiveState::default(),
                        depth_stencil: None,
                        multisample: wgpu::MultisampleState::default(),
                        fragment: Some(wgpu::FragmentState {
                            module: &self.shader,
                            entry_point: "fs_main",
                            targets: &[Some(wgpu::ColorTargetState {
                                format,
                                blend: None,
                                write_mask: wgpu::ColorWrites::ALL,
                            })],
                        }),
                        multiview: None,
                    }),
                )
            })
            .clone()
    }

    /// Fill every mip level of `texture` from its level 0.
    ///
    /// No-op for single-mip textures. Array textures (cube faces included)
    /// are downsampled layer by layer. The texture must be renderable and
    /// sampled-capable; 1D/3D textures are rejected.
    pub fn generate(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &wgpu::Texture,
    ) -> EnvResult<()> {
        if texture.dimension() != wgpu::TextureDimension::D2 {
            return Err(EnvError::capability(format!(
                "mipmap generation requires a 2D texture, got {:?}",
                texture.dimension()
            )));
        }
        let format = texture.format();
        let features = format.guaranteed_format_features(device.features());
        if !features
            .allowed_usages
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT)
        {
            return Err(EnvError::capability(format!(
                "format {format:?} is not renderable; cannot downsample"
            )));
        }
        if !texture
            .usage()
            .contains(wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING)
        {
            return Err(EnvError::resource(
                "texture was created without RENDER_ATTACHMENT | TEXTURE_BINDING usage",
            ));
        }

        let mip_count = texture.mip_level_count();
        if mip_count <= 1 {
            return Ok(());
        }

        let pipeline = self.pipeline_for(device, format);

        let layer_view = |layer: u32, mip: u32| {
            texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("envlight.mipmap.level_view"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_mip_level: mip,
                mip_level_count: Some(1),
                base_array_layer: layer,
                array_layer_count: Some(1),
                ..Default::default()
            })
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("envlight.mipmap.encoder"),
        });

        for layer in 0..texture.depth_or_array_layers() {
            for level in 1..mip_count {
                let src = layer_view(layer, level - 1);
                let dst = layer_view(layer, level);

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("envlight.mipmap.bind_group"),
                    layout: &self.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&src),
                        },
                    ],
                });

                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("envlight.mipmap.pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &dst,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
                pass.set_pipeline(&pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        // One submission covers every level of every layer.
        queue.submit(Some(encoder.finish()));
        log::debug!(
            "generated {} mip levels x {} layers",
            mip_count - 1,
            texture.depth_or_array_layers()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_count_uses_larger_dimension() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(1024, 512), 11);
        assert_eq!(mip_level_count(512, 1024), 11);
        assert_eq!(mip_level_count(0, 64), 0);
    }

    #[test]
    fn mip_count_of_npot_rounds_down() {
        assert_eq!(mip_level_count(100, 100), 7); // floor(log2(100)) = 6
        assert_eq!(mip_level_count(257, 2), 9);
    }
}
