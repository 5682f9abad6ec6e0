// src/core/pmrem.rs
// Prefiltered mipmapped radiance environment map generation
// Equirect HDR -> intermediate cubemap -> roughness-prefiltered specular
// cubemap + diffuse irradiance cubemap + shared BRDF LUT reference
// RELEVANT FILES: src/shaders/equirect_to_cube.wgsl,
// src/shaders/irradiance_convolve.wgsl, src/shaders/specular_prefilter.wgsl,
// src/core/mipmap.rs, src/core/brdf_lut.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::core::brdf_lut::BrdfLut;
use crate::core::mipmap::{mip_level_count, MipmapGenerator};
use crate::core::registry::{self, DeviceId};
use crate::error::{EnvError, EnvResult};
use crate::texture::{EnvCubeTexture, EnvTexture, HdrPixelFormat, CUBE_FACE_COUNT};

const CONVOLUTION_SAMPLE_COUNT: u32 = 1024;

/// Sizing and format knobs for one generation run.
#[derive(Debug, Clone)]
pub struct PmremOptions {
    /// Face size of the specular cubemap's base mip.
    pub prefiltered_size: u32,
    /// Face size of the diffuse irradiance cubemap.
    pub irradiance_size: u32,
    pub format: HdrPixelFormat,
}

impl Default for PmremOptions {
    fn default() -> Self {
        Self {
            prefiltered_size: 256,
            irradiance_size: 32,
            format: HdrPixelFormat::Rgba16Float,
        }
    }
}

/// The texture set a renderer binds for image-based lighting.
///
/// `brdf_lut` is the device-wide shared table; the result references but
/// does not own it.
pub struct PmremTextures {
    pub prefiltered: EnvCubeTexture,
    pub irradiance: EnvCubeTexture,
    pub brdf_lut: Arc<BrdfLut>,
}

impl PmremTextures {
    /// Roughness encoded at a given mip of the prefiltered map:
    /// `mip / (mip_level_count - 1)`.
    pub fn roughness_for_mip(&self, mip: u32) -> f32 {
        let count = self.prefiltered.mip_level_count();
        if count <= 1 {
            return 0.0;
        }
        mip.min(count - 1) as f32 / (count - 1) as f32
    }
}

/// Uniforms shared by the three convolution passes. Fields a pass does not
/// read stay zeroed.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FaceParams {
    forward: [f32; 4],
    right: [f32; 4],
    up: [f32; 4],
    roughness: f32,
    max_mip_level: f32,
    sample_count: u32,
    resolution: u32,
}

/// Per-face orientation (forward, right, up) in wgpu cube layer order
/// +X, -X, +Y, -Y, +Z, -Z. The fragment shader reconstructs the view
/// direction as `forward + (2u-1)*right + (1-2v)*up`.
const FACE_BASES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

fn face_params(face: u32) -> FaceParams {
    let (forward, right, up) = FACE_BASES[face as usize];
    FaceParams {
        forward: forward.extend(0.0).to_array(),
        right: right.extend(0.0).to_array(),
        up: up.extend(0.0).to_array(),
        roughness: 0.0,
        max_mip_level: 0.0,
        sample_count: 0,
        resolution: 0,
    }
}

/// Intermediate cubemap with guaranteed release: the equirect projection
/// lives only for the duration of one generation call, and `Drop` frees the
/// backend memory on every exit path, including mid-stage errors.
struct ScratchCubemap {
    texture: wgpu::Texture,
}

impl ScratchCubemap {
    fn new(device: &wgpu::Device, size: u32, mips: u32, format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("envlight.pmrem.scratch_cube"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: CUBE_FACE_COUNT,
            },
            mip_level_count: mips,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        Self { texture }
    }

    fn cube_view(&self) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("envlight.pmrem.scratch_cube.view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        })
    }

    fn face_view(&self, face: u32) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("envlight.pmrem.scratch_cube.face"),
            dimension: Some(wgpu::TextureViewDimension::D2),
            base_mip_level: 0,
            mip_level_count: Some(1),
            base_array_layer: face,
            array_layer_count: Some(1),
            ..Default::default()
        })
    }
}

impl Drop for ScratchCubemap {
    fn drop(&mut self) {
        self.texture.destroy();
    }
}

/// The three render pipelines plus their layouts, built together so no
/// partially initialized state can ever be observed: a failed build leaves
/// the cache entry absent and the next call re-attempts the full setup.
struct PmremPipelines {
    equirect_layout: wgpu::BindGroupLayout,
    convolve_layout: wgpu::BindGroupLayout,
    equirect: wgpu::RenderPipeline,
    irradiance: wgpu::RenderPipeline,
    prefilter: wgpu::RenderPipeline,
}

/// Per-device PMREM generator. Pipelines are built lazily on the first
/// generation call and cached per target format.
pub struct PmremGenerator {
    device_id: DeviceId,
    sampler: wgpu::Sampler,
    pipelines: Mutex<HashMap<wgpu::TextureFormat, Arc<PmremPipelines>>>,
}

impl PmremGenerator {
    /// The per-device instance, created on first request.
    pub fn get(device: &wgpu::Device) -> Arc<PmremGenerator> {
        registry::pmrem_for(device)
    }

    pub(crate) fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("envlight.pmrem.sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            device_id: device.global_id(),
            sampler,
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// Explicit, idempotent teardown: drops the cached pipelines and this
    /// generator's registry slot. A later `get` builds a fresh instance.
    pub fn dispose(&self) {
        self.pipelines
            .lock()
            .expect("pmrem pipeline cache poisoned")
            .clear();
        registry::evict_pmrem(self.device_id);
    }

    /// Build the full IBL texture set from an equirectangular HDR texture.
    pub fn from_equirectangular(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        environment: &EnvTexture,
        options: &PmremOptions,
    ) -> EnvResult<PmremTextures> {
        if options.prefiltered_size == 0 || options.irradiance_size == 0 {
            return Err(EnvError::resource(
                "PMREM sizes must be positive integers",
            ));
        }
        for (name, size) in [
            ("prefiltered_size", options.prefiltered_size),
            ("irradiance_size", options.irradiance_size),
        ] {
            if !size.is_power_of_two() {
                log::warn!("{name} {size} is not a power of two; the mip chain will be truncated");
            }
        }

        let format = options.format.wgpu_format();
        if options.format == HdrPixelFormat::Rgba32Float
            && !device.features().contains(wgpu::Features::FLOAT32_FILTERABLE)
        {
            return Err(EnvError::capability(
                "Rgba32Float prefiltering requires the FLOAT32_FILTERABLE device feature",
            ));
        }

        let pipelines = self.pipelines_for(device, format);
        let cube_mips = mip_level_count(options.prefiltered_size, options.prefiltered_size);

        // Held as a guard: destroyed on every path out of this function.
        let scratch = ScratchCubemap::new(device, options.prefiltered_size, cube_mips, format);

        self.project_equirect(device, queue, &pipelines, environment, &scratch)
            .map_err(|e| EnvError::resource_with("equirect-to-cube stage failed", e))?;

        let scratch_view = scratch.cube_view();

        let irradiance = self
            .convolve_irradiance(device, queue, &pipelines, &scratch_view, options, format)
            .map_err(|e| EnvError::resource_with("irradiance convolution stage failed", e))?;

        let prefiltered = match self.prefilter_specular(
            device,
            queue,
            &pipelines,
            &scratch_view,
            options,
            format,
            cube_mips,
        ) {
            Ok(cube) => cube,
            Err(e) => {
                // The irradiance map was already committed; release it
                // before surfacing the failure.
                irradiance.destroy();
                return Err(EnvError::resource_with("specular prefilter stage failed", e));
            }
        };

        let brdf_lut = BrdfLut::get(device, queue);

        log::info!(
            "PMREM complete: specular {}px x{} mips, irradiance {}px",
            options.prefiltered_size,
            cube_mips,
            options.irradiance_size
        );

        Ok(PmremTextures {
            prefiltered,
            irradiance,
            brdf_lut,
        })
    }

    /// Stage (a): one render pass per cube face, reconstructing the view
    /// direction from the face basis and sampling the equirect source, then
    /// a full mip chain so the prefilter pass can sample blurred levels.
    fn project_equirect(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &PmremPipelines,
        environment: &EnvTexture,
        scratch: &ScratchCubemap,
    ) -> EnvResult<()> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("envlight.pmrem.equirect.encoder"),
        });

        for face in 0..CUBE_FACE_COUNT {
            let params = face_params(face);
            let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("envlight.pmrem.equirect.uniforms"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("envlight.pmrem.equirect.bind_group"),
                layout: &pipelines.equirect_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(environment.view()),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });

            let target = scratch.face_view(face);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("envlight.pmrem.equirect.pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
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
            pass.set_pipeline(&pipelines.equirect);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        queue.submit(Some(encoder.finish()));

        MipmapGenerator::get(device).generate(device, queue, &scratch.texture)
    }

    /// Stage (b): cosine-lobe convolution into the irradiance cube, one
    /// face at a time.
    fn convolve_irradiance(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &PmremPipelines,
        scratch_view: &wgpu::TextureView,
        options: &PmremOptions,
        format: wgpu::TextureFormat,
    ) -> EnvResult<EnvCubeTexture> {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("envlight.pmrem.irradiance"),
            size: wgpu::Extent3d {
                width: options.irradiance_size,
                height: options.irradiance_size,
                depth_or_array_layers: CUBE_FACE_COUNT,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let result = self.encode_convolution(
            device,
            queue,
            &pipelines.irradiance,
            pipelines,
            &texture,
            scratch_view,
            |face, _mip| {
                let mut params = face_params(face);
                params.sample_count = CONVOLUTION_SAMPLE_COUNT;
                params.resolution = options.irradiance_size;
                params
            },
            1,
            "envlight.pmrem.irradiance",
        );
        if let Err(e) = result {
            texture.destroy();
            return Err(e);
        }

        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("envlight.pmrem.irradiance.view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("envlight.pmrem.irradiance.sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(EnvCubeTexture::new(texture, cube_view, sampler))
    }

    /// Stage (c): GGX prefilter into the specular cube, widening the kernel
    /// with per-mip roughness `m / (mips - 1)` and clamping source lookups
    /// to `max_mip_level`.
    #[allow(clippy::too_many_arguments)]
    fn prefilter_specular(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &PmremPipelines,
        scratch_view: &wgpu::TextureView,
        options: &PmremOptions,
        format: wgpu::TextureFormat,
        cube_mips: u32,
    ) -> EnvResult<EnvCubeTexture> {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("envlight.pmrem.specular"),
            size: wgpu::Extent3d {
                width: options.prefiltered_size,
                height: options.prefiltered_size,
                depth_or_array_layers: CUBE_FACE_COUNT,
            },
            mip_level_count: cube_mips,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let max_roughness_mip = cube_mips.saturating_sub(1).max(1);
        let result = self.encode_convolution(
            device,
            queue,
            &pipelines.prefilter,
            pipelines,
            &texture,
            scratch_view,
            |face, mip| {
                let mut params = face_params(face);
                params.roughness = mip as f32 / max_roughness_mip as f32;
                params.max_mip_level = (cube_mips - 1) as f32;
                params.sample_count = CONVOLUTION_SAMPLE_COUNT;
                params.resolution = options.prefiltered_size;
                params
            },
            cube_mips,
            "envlight.pmrem.specular",
        );
        if let Err(e) = result {
            texture.destroy();
            return Err(e);
        }

        let cube_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("envlight.pmrem.specular.view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("envlight.pmrem.specular.sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(EnvCubeTexture::new(texture, cube_view, sampler))
    }

    /// Encode one convolution pipeline over every (face, mip) target of a
    /// cube texture in a single submission.
    #[allow(clippy::too_many_arguments)]
    fn encode_convolution(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &wgpu::RenderPipeline,
        pipelines: &PmremPipelines,
        target: &wgpu::Texture,
        scratch_view: &wgpu::TextureView,
        params_for: impl Fn(u32, u32) -> FaceParams,
        mips: u32,
        label: &str,
    ) -> EnvResult<()> {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });

        for mip in 0..mips {
            for face in 0..CUBE_FACE_COUNT {
                let params = params_for(face, mip);
                let uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::bytes_of(&params),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: &pipelines.convolve_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: uniforms.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(scratch_view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&self.sampler),
                        },
                    ],
                });

                let view = target.create_view(&wgpu::TextureViewDescriptor {
                    label: Some(label),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_mip_level: mip,
                    mip_level_count: Some(1),
                    base_array_layer: face,
                    array_layer_count: Some(1),
                    ..Default::default()
                });
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(label),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
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
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &bind_group, &[]);
                pass.draw(0..3, 0..1);
            }
        }

        queue.submit(Some(encoder.finish()));
        Ok(())
    }

    fn pipelines_for(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Arc<PmremPipelines> {
        let mut pipelines = self.pipelines.lock().expect("pmrem pipeline cache poisoned");
        pipelines
            .entry(format)
            .or_insert_with(|| Arc::new(build_pipelines(device, format)))
            .clone()
    }
}

fn build_pipelines(device: &wgpu::Device, format: wgpu::TextureFormat) -> PmremPipelines {
    let equirect_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("envlight.pmrem.shader.equirect"),
        source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/equirect_to_cube.wgsl").into()),
    });
    let irradiance_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("envlight.pmrem.shader.irradiance"),
        source: wgpu::ShaderSource::Wgsl(
            include_str!("../shaders/irradiance_convolve.wgsl").into(),
        ),
    });
    let prefilter_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("envlight.pmrem.shader.prefilter"),
        source: wgpu::ShaderSource::Wgsl(
            include_str!("../shaders/specular_prefilter.wgsl").into(),
        ),
    });

    let uniform_entry = wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };
    let sampler_entry = wgpu::BindGroupLayoutEntry {
        binding: 2,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    };

    let equirect_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("envlight.pmrem.equirect.layout"),
        entries: &[
            uniform_entry,
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
            sampler_entry,
        ],
    });

    let convolve_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("envlight.pmrem.convolve.layout"),
        entries: &[
            uniform_entry,
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::Cube,
                    multisampled: false,
                },
                count: None,
            },
            sampler_entry,
        ],
    });

    let make_pipeline = |label: &str, layout: &wgpu::BindGroupLayout, shader: &wgpu::ShaderModule| {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            multiview: None,
        })
    };

    let equirect = make_pipeline(
        "envlight.pmrem.pipeline.equirect",
        &equirect_layout,
        &equirect_shader,
    );
    let irradiance = make_pipeline(
        "envlight.pmrem.pipeline.irradiance",
        &convolve_layout,
        &irradiance_shader,
    );
    let prefilter = make_pipeline(
        "envlight.pmrem.pipeline.prefilter",
        &convolve_layout,
        &prefilter_shader,
    );

    PmremPipelines {
        equirect_layout,
        convolve_layout,
        equirect,
        irradiance,
        prefilter,
    }
}
