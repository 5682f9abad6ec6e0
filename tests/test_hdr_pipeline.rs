// tests/test_hdr_pipeline.rs
// HDR loader acceptance tests (GPU upload + mip generation).
// Skips when no adapter is available.

use envlight::{EnvError, HdrLoadOptions, HdrPixelFormat};

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
        label: Some("hdr_pipeline_test_device"),
    };
    let (device, queue) = pollster::block_on(adapter.request_device(&desc, None)).ok()?;
    Some((device, queue))
}

/// Flat (uncompressed) image with every pixel set to `pixel`.
fn synthetic_hdr(width: u32, height: u32, pixel: [u8; 4], extra_header: &str) -> Vec<u8> {
    let mut bytes = if extra_header.is_empty() {
        format!("#?RADIANCE\n\n-Y {height} +X {width}\n").into_bytes()
    } else {
        format!("#?RADIANCE\n{extra_header}\n\n-Y {height} +X {width}\n").into_bytes()
    };
    for _ in 0..width * height {
        bytes.extend_from_slice(&pixel);
    }
    bytes
}

#[test]
fn loads_half_float_texture_with_full_mip_chain() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping loader test: no adapter");
        return;
    };

    let bytes = synthetic_hdr(8, 4, [128, 128, 128, 129], "");
    let options = HdrLoadOptions::default();
    let env = envlight::from_buffer(&device, &queue, &bytes, &options).expect("load");

    assert_eq!(env.width(), 8);
    assert_eq!(env.height(), 4);
    assert_eq!(env.format(), wgpu::TextureFormat::Rgba16Float);
    // floor(log2(8)) + 1
    assert_eq!(env.mip_level_count(), 4);

    device.poll(wgpu::Maintain::Wait);
    env.destroy();
    envlight::dispose(&device);
}

#[test]
fn mipmaps_can_be_disabled() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping loader test: no adapter");
        return;
    };

    let bytes = synthetic_hdr(8, 8, [128, 128, 128, 129], "EXPOSURE=2.0");
    let options = HdrLoadOptions {
        generate_mipmaps: false,
        label: Some("test.env.nomips".to_string()),
        ..Default::default()
    };
    let env = envlight::from_buffer(&device, &queue, &bytes, &options).expect("load");
    assert_eq!(env.mip_level_count(), 1);

    device.poll(wgpu::Maintain::Wait);
    env.destroy();
    envlight::dispose(&device);
}

#[test]
fn full_float_without_feature_is_a_capability_error() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping loader test: no adapter");
        return;
    };
    // The test device is created with no optional features.
    assert!(!device
        .features()
        .contains(wgpu::Features::FLOAT32_FILTERABLE));

    let bytes = synthetic_hdr(4, 4, [128, 128, 128, 129], "");
    let options = HdrLoadOptions {
        format: HdrPixelFormat::Rgba32Float,
        ..Default::default()
    };
    let err = envlight::from_buffer(&device, &queue, &bytes, &options).unwrap_err();
    assert!(
        matches!(err, EnvError::Capability(_)),
        "expected capability error, got {err:?}"
    );
}

#[tokio::test]
async fn unreachable_url_is_a_network_error() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping loader test: no adapter");
        return;
    };

    // Port 1 is never serving; any transport failure must surface as a
    // wrapped network error.
    let err = envlight::from_url(
        &device,
        &queue,
        "http://127.0.0.1:1/env.hdr",
        &HdrLoadOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EnvError::Network { .. }), "{err:?}");
}

#[test]
fn malformed_buffers_surface_format_errors() {
    let Some((device, queue)) = create_device_queue() else {
        eprintln!("Skipping loader test: no adapter");
        return;
    };

    let err = envlight::from_buffer(
        &device,
        &queue,
        b"INVALID\n\n-Y 1 +X 1\n",
        &HdrLoadOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, EnvError::Format { .. }), "{err:?}");
    assert!(err.to_string().contains("magic number"), "{err}");

    // Header promises 4x4 pixels, buffer carries one.
    let mut truncated = b"#?RADIANCE\n\n-Y 4 +X 4\n".to_vec();
    truncated.extend_from_slice(&[128, 128, 128, 129]);
    let err = envlight::from_buffer(&device, &queue, &truncated, &HdrLoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, EnvError::Format { .. }), "{err:?}");
}
