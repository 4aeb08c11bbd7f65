//! Integration tests for convolution operations on the CPU runtime.

mod common;

use common::{
    assert_allclose_f32, assert_bit_identical, constant_raw_image, create_cpu_client,
    padded_case, random_raw_image,
};
use haloconv::error::Error;
use haloconv::filter::{FilterFamily, generate_filter};
use haloconv::image::Image;
use haloconv::ops::{ConvOps, Strategy, WorkgroupDims};

// =============================================================================
// Equivalence
// =============================================================================

#[test]
fn test_strategies_are_bit_identical() {
    let (client, _) = create_cpu_client();

    for family in FilterFamily::ALL {
        for filter_width in [1, 3, 5, 11] {
            let (input, filter) = padded_case(23, 17, family, filter_width, 7);
            let naive = client.convolve(&input, &filter, Strategy::Naive).unwrap();
            for strategy in Strategy::all(WorkgroupDims::default()) {
                let output = client.convolve(&input, &filter, strategy).unwrap();
                assert_bit_identical(
                    &naive,
                    &output,
                    &format!("{} width {} {}", family, filter_width, strategy),
                );
            }
        }
    }
}

#[test]
fn test_output_is_unpadded_with_input_dimensions() {
    let (client, _) = create_cpu_client();
    let (input, filter) = padded_case(9, 6, FilterFamily::Blur, 5, 1);
    assert_eq!(input.halo(), 2);

    let output = client
        .convolve(&input, &filter, Strategy::Vectorized)
        .unwrap();
    assert_eq!(output.width(), 9);
    assert_eq!(output.height(), 6);
    assert_eq!(output.channels(), 4);
    assert_eq!(output.halo(), 0);
}

// =============================================================================
// Identity
// =============================================================================

#[test]
fn test_identity_filter_is_noop() {
    let (client, _) = create_cpu_client();
    let raw = random_raw_image(13, 8, 42);

    for filter_width in [1, 3, 7] {
        let filter = generate_filter(FilterFamily::Identity, filter_width).unwrap();
        let input = raw.to_padded(filter.half_width()).unwrap();
        for strategy in Strategy::all(WorkgroupDims::new(4, 4)) {
            let output = client.convolve(&input, &filter, strategy).unwrap();
            assert_eq!(output, input.unpadded(), "width {} {}", filter_width, strategy);
            assert_eq!(output.to_rgba8(), raw);
        }
    }
}

// =============================================================================
// Blur
// =============================================================================

#[test]
fn test_blur_of_constant_image_is_constant() {
    let (client, _) = create_cpu_client();
    let raw = constant_raw_image(4, 4, 100);
    let filter = generate_filter(FilterFamily::Blur, 3).unwrap();
    let input = raw.to_padded(1).unwrap();

    for strategy in Strategy::all(WorkgroupDims::default()) {
        let output = client.convolve(&input, &filter, strategy).unwrap();
        assert_allclose_f32(
            output.data(),
            &[100.0; 64],
            1e-5,
            1e-4,
            &format!("blur {}", strategy),
        );
        assert_eq!(output.to_rgba8(), raw);
    }
}

#[test]
fn test_blur_passes_alpha_through() {
    let (client, _) = create_cpu_client();
    let (input, filter) = padded_case(10, 7, FilterFamily::Blur, 5, 3);
    let output = client
        .convolve(&input, &filter, Strategy::default())
        .unwrap();

    for row in 0..7 {
        for col in 0..10 {
            assert_eq!(
                output.logical_pixel(row, col)[3],
                input.logical_pixel(row, col)[3],
                "alpha at ({}, {})",
                row,
                col
            );
        }
    }
}

// =============================================================================
// Edge
// =============================================================================

#[test]
fn test_edge_of_constant_image_is_zero() {
    let (client, _) = create_cpu_client();
    let raw = constant_raw_image(6, 5, 77);
    let filter = generate_filter(FilterFamily::Edge, 3).unwrap();
    let input = raw.to_padded(1).unwrap();

    let output = client.convolve(&input, &filter, Strategy::Naive).unwrap();
    for row in 0..5 {
        for col in 0..6 {
            let pixel = output.logical_pixel(row, col);
            assert_eq!(&pixel[..3], &[0.0, 0.0, 0.0]);
            assert_eq!(pixel[3], 77.0);
        }
    }
}

// =============================================================================
// Tiling
// =============================================================================

#[test]
fn test_tile_size_invariance() {
    let (client, _) = create_cpu_client();
    let (input, filter) = padded_case(37, 29, FilterFamily::Edge, 5, 11);
    let reference = client
        .convolve(&input, &filter, Strategy::Tiled(WorkgroupDims::new(16, 16)))
        .unwrap();

    for dims in [
        WorkgroupDims::new(32, 1),
        WorkgroupDims::new(1, 32),
        WorkgroupDims::new(1, 1),
        WorkgroupDims::new(3, 7),
        WorkgroupDims::new(64, 64),
    ] {
        let output = client
            .convolve(&input, &filter, Strategy::Tiled(dims))
            .unwrap();
        assert_bit_identical(&reference, &output, &format!("tiled {}", dims));
    }
}

#[test]
fn test_tiled_partial_groups_cover_every_pixel() {
    // 5x3 is smaller than one 16x16 group in both directions
    let (client, _) = create_cpu_client();
    let (input, filter) = padded_case(5, 3, FilterFamily::Blur, 3, 5);
    let naive = client.convolve(&input, &filter, Strategy::Naive).unwrap();
    let tiled = client
        .convolve(&input, &filter, Strategy::default())
        .unwrap();
    assert_bit_identical(&naive, &tiled, "partial group");
}

#[test]
fn test_filter_wider_than_image() {
    let (client, _) = create_cpu_client();
    let (input, filter) = padded_case(2, 2, FilterFamily::Blur, 7, 9);
    let naive = client.convolve(&input, &filter, Strategy::Naive).unwrap();
    let tiled = client
        .convolve(&input, &filter, Strategy::Tiled(WorkgroupDims::new(2, 2)))
        .unwrap();
    assert_bit_identical(&naive, &tiled, "filter wider than image");
}

#[test]
fn test_workgroup_larger_than_image() {
    let (client, _) = create_cpu_client();
    let (input, filter) = padded_case(4, 4, FilterFamily::Blur, 3, 13);
    let naive = client.convolve(&input, &filter, Strategy::Naive).unwrap();

    for dims in [
        WorkgroupDims::new(100_000, 100_000),
        WorkgroupDims::new(1, 1 << 40),
        WorkgroupDims::new(1 << 40, 3),
    ] {
        let tiled = client
            .convolve(&input, &filter, Strategy::Tiled(dims))
            .unwrap();
        assert_bit_identical(&naive, &tiled, &format!("tiled {}", dims));
    }
}

#[test]
fn test_unaddressable_workgroup_is_rejected() {
    let (client, _) = create_cpu_client();
    let filter = generate_filter(FilterFamily::Blur, 3).unwrap();
    let input = Image::filled(4, 4, 4, 100.0).padded(1).unwrap();
    let err = client
        .convolve(&input, &filter, Strategy::Tiled(WorkgroupDims::new(1 << 33, 1 << 33)))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidArgument {
            arg: "workgroup_dims",
            ..
        }
    ));
}

// =============================================================================
// Error cases
// =============================================================================

#[test]
fn test_rejects_halo_mismatch() {
    let (client, _) = create_cpu_client();
    let filter = generate_filter(FilterFamily::Blur, 5).unwrap();
    let input = random_raw_image(4, 4, 0).to_padded(1).unwrap();
    let err = client
        .convolve(&input, &filter, Strategy::Naive)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "input", .. }));
}

#[test]
fn test_rejects_non_rgba_input() {
    let (client, _) = create_cpu_client();
    let filter = generate_filter(FilterFamily::Identity, 1).unwrap();
    let input = Image::filled(3, 3, 3, 1.0);
    for strategy in Strategy::all(WorkgroupDims::default()) {
        assert!(matches!(
            client.convolve(&input, &filter, strategy),
            Err(Error::InvalidArgument { .. })
        ));
    }
}

#[test]
fn test_rejects_zero_workgroup() {
    let (client, _) = create_cpu_client();
    let (input, filter) = padded_case(4, 4, FilterFamily::Blur, 3, 0);
    let err = client
        .convolve(&input, &filter, Strategy::Tiled(WorkgroupDims::new(0, 8)))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_rejects_padded_filter() {
    let (client, _) = create_cpu_client();
    let filter = generate_filter(FilterFamily::Blur, 3)
        .unwrap()
        .padded(1)
        .unwrap();
    let input = random_raw_image(4, 4, 0).to_padded(1).unwrap();
    assert!(client.convolve(&input, &filter, Strategy::Naive).is_err());
}
