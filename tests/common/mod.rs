//! Common test utilities
#![allow(dead_code)]

use haloconv::filter::{FilterFamily, generate_filter};
use haloconv::image::{Image, RawImage};
use haloconv::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
#[cfg(feature = "wgpu")]
use haloconv::runtime::wgpu::{WgpuClient, WgpuDevice};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Create a WebGPU client and device, returning None if WebGPU is unavailable
#[cfg(feature = "wgpu")]
pub fn create_wgpu_client() -> Option<(WgpuClient, WgpuDevice)> {
    if !haloconv::runtime::wgpu::is_wgpu_available() {
        return None;
    }
    let device = WgpuDevice::new(0);
    let client = WgpuClient::new(device.clone()).ok()?;
    Some((client, device))
}

/// Assert two f32 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two images are bit-for-bit identical
pub fn assert_bit_identical(a: &Image, b: &Image, msg: &str) {
    assert_eq!(
        (a.width(), a.height(), a.channels(), a.halo()),
        (b.width(), b.height(), b.channels(), b.halo()),
        "{}: geometry mismatch",
        msg
    );
    for (i, (x, y)) in a.data().iter().zip(b.data()).enumerate() {
        assert_eq!(
            x.to_bits(),
            y.to_bits(),
            "{}: sample {} differs: {} vs {}",
            msg,
            i,
            x,
            y
        );
    }
}

/// Deterministic random 8-bit RGBA image
pub fn random_raw_image(width: usize, height: usize, seed: u64) -> RawImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let pixels = (0..width * height * 4)
        .map(|_| rng.random_range(0..=255u8))
        .collect();
    RawImage::new(pixels, width, height, 4).unwrap()
}

/// Raw RGBA image with every sample set to `value`
pub fn constant_raw_image(width: usize, height: usize, value: u8) -> RawImage {
    RawImage::new(vec![value; width * height * 4], width, height, 4).unwrap()
}

/// Random raw image padded for a filter of `filter_width`, plus that filter
pub fn padded_case(
    width: usize,
    height: usize,
    family: FilterFamily,
    filter_width: usize,
    seed: u64,
) -> (Image, Image) {
    let raw = random_raw_image(width, height, seed);
    let filter = generate_filter(family, filter_width).unwrap();
    let padded = raw.to_padded(filter.half_width()).unwrap();
    (padded, filter)
}
