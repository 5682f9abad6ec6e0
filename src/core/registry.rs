//! Per-device cache registry
//!
//! GPU-side generators and the shared BRDF LUT are created at most once per
//! device. wgpu device handles are reference counted and carry no stable
//! address, so entries are keyed by the device's global id and evicted
//! explicitly — there is no GC hook to rely on, and callers are expected to
//! dispose on device loss.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::core::brdf_lut::BrdfLut;
use crate::core::mipmap::MipmapGenerator;
use crate::core::pmrem::PmremGenerator;

pub(crate) type DeviceId = wgpu::Id<wgpu::Device>;

#[derive(Default)]
struct DeviceCaches {
    mipmap: Option<Arc<MipmapGenerator>>,
    pmrem: Option<Arc<PmremGenerator>>,
    brdf_lut: Option<Arc<BrdfLut>>,
}

/// The mutex only guards map mutation; all GPU work stays on the device's
/// own submission timeline.
static CACHES: Lazy<Mutex<HashMap<DeviceId, DeviceCaches>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn lock_caches() -> std::sync::MutexGuard<'static, HashMap<DeviceId, DeviceCaches>> {
    CACHES.lock().expect("device cache registry poisoned")
}

pub(crate) fn mipmap_for(device: &wgpu::Device) -> Arc<MipmapGenerator> {
    let mut caches = lock_caches();
    let entry = caches.entry(device.global_id()).or_default();
    entry
        .mipmap
        .get_or_insert_with(|| Arc::new(MipmapGenerator::new(device)))
        .clone()
}

pub(crate) fn pmrem_for(device: &wgpu::Device) -> Arc<PmremGenerator> {
    let mut caches = lock_caches();
    let entry = caches.entry(device.global_id()).or_default();
    entry
        .pmrem
        .get_or_insert_with(|| Arc::new(PmremGenerator::new(device)))
        .clone()
}

pub(crate) fn brdf_lut_for(device: &wgpu::Device, queue: &wgpu::Queue) -> Arc<BrdfLut> {
    let mut caches = lock_caches();
    let entry = caches.entry(device.global_id()).or_default();
    entry
        .brdf_lut
        .get_or_insert_with(|| Arc::new(BrdfLut::generate(device, queue)))
        .clone()
}

pub(crate) fn evict_pmrem(device_id: DeviceId) {
    let mut caches = lock_caches();
    if let Some(entry) = caches.get_mut(&device_id) {
        entry.pmrem = None;
    }
}

/// Drop every cache tied to one device. Idempotent; call on device loss or
/// planned device teardown.
pub fn dispose(device: &wgpu::Device) {
    let removed = lock_caches().remove(&device.global_id());
    if let Some(entry) = removed {
        if let Some(lut) = entry.brdf_lut {
            lut.destroy();
        }
        log::info!("disposed per-device lighting caches");
    }
}

/// Drop the caches of every device. Idempotent.
pub fn clear_cache() {
    let mut caches = lock_caches();
    for (_, entry) in caches.drain() {
        if let Some(lut) = entry.brdf_lut {
            lut.destroy();
        }
    }
}
