//! Property tests for strategy equivalence and tile-size invariance.

mod common;

use common::{assert_bit_identical, create_cpu_client, padded_case};
use haloconv::filter::FilterFamily;
use haloconv::ops::{ConvOps, Strategy, WorkgroupDims};
use proptest::prelude::*;

fn family() -> impl proptest::strategy::Strategy<Value = FilterFamily> {
    prop_oneof![
        Just(FilterFamily::Identity),
        Just(FilterFamily::Blur),
        Just(FilterFamily::Edge),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn strategies_agree(
        width in 1usize..24,
        height in 1usize..24,
        family in family(),
        half_width in 0usize..4,
        rows in 1usize..20,
        cols in 1usize..20,
        seed in any::<u64>(),
    ) {
        let (client, _) = create_cpu_client();
        let (input, filter) = padded_case(width, height, family, 2 * half_width + 1, seed);
        let naive = client.convolve(&input, &filter, Strategy::Naive).unwrap();

        for strategy in Strategy::all(WorkgroupDims::new(rows, cols)) {
            let output = client.convolve(&input, &filter, strategy).unwrap();
            assert_bit_identical(&naive, &output, &strategy.to_string());
        }
    }

    #[test]
    fn tiled_output_ignores_workgroup_shape(
        width in 1usize..40,
        height in 1usize..40,
        a in (1usize..33, 1usize..33),
        b in (1usize..33, 1usize..33),
        seed in any::<u64>(),
    ) {
        let (client, _) = create_cpu_client();
        let (input, filter) = padded_case(width, height, FilterFamily::Blur, 5, seed);
        let first = client
            .convolve(&input, &filter, Strategy::Tiled(WorkgroupDims::new(a.0, a.1)))
            .unwrap();
        let second = client
            .convolve(&input, &filter, Strategy::Tiled(WorkgroupDims::new(b.0, b.1)))
            .unwrap();
        prop_assert_eq!(first, second);
    }
}
