// tests/test_pmrem_generation.rs
// PMREM acceptance tests: cubemap sizing, mip/roughness tagging, shared
// BRDF LUT, generator lifecycle. Skips when no adapter is available.

use std::sync::Arc;

use envlight::{HdrLoadOptions, PmremGenerator, PmremOptions};

fn create_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::LowPower,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))?;
    let desc = wgpu::DeviceDescriptor {
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::downlevel_defaults(),
        label: Some("pmrem_test_device"),
    };
    let (device, queue) = pollster::block_on(adapter.request_device(&desc, None)).ok()?;
    Some((device, queue))
}

fn tiny_environment(device: &wgpu::Device, queue: &wgpu::Queue) -> envlight::EnvTexture {
    // 2x2 equirect: a bright and a dim pixel pair.
    let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 2 +X 2\n".to_vec();
    bytes.extend_from_slice(&[255, 200, 100, 130]);
    bytes.extend_from_slice(&[128, 128, 128, 129]);
    bytes.extend_from_slice(&[64, 64, 128, 128]);
    bytes.extend_from_slice(&[32, 32, 32, 127]);
    envlight::from_buffer(device, queue, &bytes, &HdrLoadOptions::default()).expect("load env")
}

#[test]
fn small_equirect_produces_expected_mip_counts() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping PMREM test: no adapter");
        return;
    };

    let env = tiny_environment(&device, &queue);
    let generator = PmremGenerator::get(&device);
    let options = PmremOptions {
        prefiltered_size: 4,
        irradiance_size: 2,
        ..Default::default()
    };
    let ibl = generator
        .from_equirectangular(&device, &queue, &env, &options)
        .expect("generate");

    // floor(log2(4)) + 1
    assert_eq!(ibl.prefiltered.mip_level_count(), 3);
    assert_eq!(ibl.prefiltered.face_size(), 4);
    assert_eq!(ibl.irradiance.mip_level_count(), 1);
    assert_eq!(ibl.irradiance.face_size(), 2);

    // Roughness tags span 0..1 across the chain.
    assert_eq!(ibl.roughness_for_mip(0), 0.0);
    assert_eq!(ibl.roughness_for_mip(1), 0.5);
    assert_eq!(ibl.roughness_for_mip(2), 1.0);

    assert_eq!(ibl.brdf_lut.size(), 512);

    device.poll(wgpu::Maintain::Wait);
    ibl.prefiltered.destroy();
    ibl.irradiance.destroy();
    env.destroy();
    envlight::dispose(&device);
}

#[test]
fn generator_lifecycle_caching_sharing_and_dispose() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping PMREM test: no adapter");
        return;
    };

    let first = PmremGenerator::get(&device);
    let second = PmremGenerator::get(&device);
    assert!(Arc::ptr_eq(&first, &second), "generator must be cached");

    let env = tiny_environment(&device, &queue);
    let options = PmremOptions {
        prefiltered_size: 4,
        irradiance_size: 2,
        ..Default::default()
    };
    let a = first
        .from_equirectangular(&device, &queue, &env, &options)
        .expect("first run");
    let b = first
        .from_equirectangular(&device, &queue, &env, &options)
        .expect("second run");
    assert!(
        Arc::ptr_eq(&a.brdf_lut, &b.brdf_lut),
        "BRDF LUT must be shared between results"
    );

    // Teardown is explicit and idempotent; the next get builds anew.
    first.dispose();
    first.dispose();
    let rebuilt = PmremGenerator::get(&device);
    assert!(!Arc::ptr_eq(&first, &rebuilt));

    let c = rebuilt
        .from_equirectangular(&device, &queue, &env, &options)
        .expect("generate after dispose");

    device.poll(wgpu::Maintain::Wait);
    for ibl in [a, b, c] {
        ibl.prefiltered.destroy();
        ibl.irradiance.destroy();
    }
    env.destroy();
    envlight::dispose(&device);
    envlight::dispose(&device); // idempotent
}

#[test]
fn zero_sizes_are_rejected() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping PMREM test: no adapter");
        return;
    };

    let env = tiny_environment(&device, &queue);
    let generator = PmremGenerator::get(&device);
    let options = PmremOptions {
        prefiltered_size: 0,
        irradiance_size: 2,
        ..Default::default()
    };
    assert!(generator
        .from_equirectangular(&device, &queue, &env, &options)
        .is_err());

    env.destroy();
    envlight::dispose(&device);
}
