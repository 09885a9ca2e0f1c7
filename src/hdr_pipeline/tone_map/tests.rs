use crate::hdr_pipeline::common::error::HdrError;
use crate::hdr_pipeline::common::types::{CHANNELS, RadianceMap, Rgb8Image};
use crate::hdr_pipeline::tone_map::{
    BilateralToneMapper, PhotographicGlobal, PhotographicLocal, ToneMapOperator, ToneMapParams,
    ToneMapper,
};

const CHROMA: [f32; CHANNELS] = [1.0, 0.8, 0.6];

fn operators() -> Vec<ToneMapOperator> {
    vec![
        ToneMapOperator::PhotographicGlobal(PhotographicGlobal::default()),
        ToneMapOperator::PhotographicLocal(PhotographicLocal::default()),
        ToneMapOperator::Bilateral(BilateralToneMapper::default()),
    ]
}

/// Exponential ramp along x with one fixed chromaticity.
fn ramp(width: usize, height: usize) -> RadianceMap {
    let mut data = Vec::with_capacity(width * height * CHANNELS);
    for _ in 0..height {
        for x in 0..width {
            let level = 0.01 * (0.2 * x as f32).exp();
            data.extend(CHROMA.iter().map(|c| c * level));
        }
    }
    RadianceMap::new(width, height, data).unwrap()
}

fn constant(width: usize, height: usize, value: f32) -> RadianceMap {
    RadianceMap::new(width, height, vec![value; width * height * CHANNELS]).unwrap()
}

#[test]
fn test_output_matches_input_dimensions() {
    let radiance = ramp(13, 7);
    for op in operators() {
        let image = op.map(&radiance).unwrap();
        assert_eq!(image.dimensions(), (13, 7), "{}", op);
        assert_eq!(image.data.len(), 13 * 7 * CHANNELS);
    }
}

#[test]
fn test_monotonic_in_luminance() {
    let radiance = ramp(48, 3);
    for op in operators() {
        let image = op.map(&radiance).unwrap();
        for y in 0..3 {
            for x in 1..48 {
                let prev = image.pixel(x - 1, y);
                let cur = image.pixel(x, y);
                for c in 0..CHANNELS {
                    assert!(
                        cur[c] >= prev[c],
                        "{} not monotonic at ({}, {}) channel {}: {:?} -> {:?}",
                        op,
                        x,
                        y,
                        c,
                        prev,
                        cur
                    );
                }
            }
        }
        // the ramp spans a wide range, so the ends must differ
        assert!(image.pixel(47, 1)[0] > image.pixel(0, 1)[0]);
    }
}

#[test]
fn test_preserves_chromaticity_up_to_rounding() {
    let radiance = ramp(48, 3);
    for op in operators() {
        let image = op.map(&radiance).unwrap();
        for y in 0..3 {
            for x in 0..48 {
                let px = image.pixel(x, y);
                if px[0] == 255 {
                    continue;
                }
                for c in 1..CHANNELS {
                    let ratio = CHROMA[c] / CHROMA[0];
                    let expected = ratio * px[0] as f32;
                    let bound = 0.5 * (1.0 + ratio) + 1e-3;
                    assert!(
                        (px[c] as f32 - expected).abs() <= bound,
                        "{} at ({}, {}): {:?}",
                        op,
                        x,
                        y,
                        px
                    );
                }
            }
        }
    }
}

#[test]
fn test_all_zero_radiance_maps_to_black() {
    let radiance = constant(9, 5, 0.0);
    for op in operators() {
        let image = op.map(&radiance).unwrap();
        assert_eq!(image, Rgb8Image::black(9, 5), "{}", op);
    }
}

#[test]
fn test_constant_gray_scene() {
    let radiance = constant(6, 6, 2.0);

    // lm equals alpha everywhere, so the white point is lm itself and ld = 1
    let global = PhotographicGlobal::default().map(&radiance).unwrap();
    assert!(global.data.iter().all(|&v| v == 255));

    // surround is lm: 0.3 / 1.3 * 255 = 58.8
    let local = PhotographicLocal::default().map(&radiance).unwrap();
    assert!(local.data.iter().all(|&v| v == 59), "{:?}", &local.data[..3]);

    // flat base layer: compression factor 1, ld = 1
    let bilateral = BilateralToneMapper::default().map(&radiance).unwrap();
    assert!(bilateral.data.iter().all(|&v| v == 255));
}

#[test]
fn test_global_maps_brightest_gray_pixel_to_white() {
    let mut data = vec![0.5f32; 4 * 4 * CHANNELS];
    data[..CHANNELS].copy_from_slice(&[8.0, 8.0, 8.0]);
    let radiance = RadianceMap::new(4, 4, data).unwrap();

    let image = PhotographicGlobal::default().map(&radiance).unwrap();
    assert_eq!(image.pixel(0, 0), [255, 255, 255]);
    let rest = image.pixel(1, 1)[0];
    assert!(rest > 0 && rest < 255, "{}", rest);
}

#[test]
fn test_empty_radiance_is_rejected() {
    let radiance = RadianceMap::new(0, 0, Vec::new()).unwrap();
    for op in operators() {
        assert!(matches!(op.map(&radiance), Err(HdrError::InvalidInput(_))));
    }
}

#[test]
fn test_local_rejects_even_kernel() {
    let op = PhotographicLocal {
        max_kernel_size: 34,
        ..PhotographicLocal::default()
    };
    assert!(matches!(
        op.map(&constant(4, 4, 1.0)),
        Err(HdrError::InvalidInput(_))
    ));
    assert_eq!(PhotographicLocal::default().kernel_sizes().len(), 18);
}

#[test]
fn test_operator_from_str() {
    assert_eq!(
        "photographic-global".parse::<ToneMapOperator>().unwrap().name(),
        "photographic-global"
    );
    assert_eq!(
        "Photographic_Local".parse::<ToneMapOperator>().unwrap().name(),
        "photographic-local"
    );
    assert_eq!(
        "bilateral".parse::<ToneMapOperator>().unwrap(),
        ToneMapOperator::default()
    );
    assert!(matches!(
        "drago".parse::<ToneMapOperator>(),
        Err(HdrError::UnknownVariant { .. })
    ));
}

#[test]
fn test_params_override_only_matching_fields() {
    let params = ToneMapParams {
        alpha: Some(0.6),
        max_kernel_size: Some(9),
        sigma_range: Some(0.4),
        ..ToneMapParams::default()
    };

    let local = ToneMapOperator::PhotographicLocal(PhotographicLocal::default()).with_params(&params);
    assert_eq!(
        local,
        ToneMapOperator::PhotographicLocal(PhotographicLocal {
            alpha: 0.6,
            max_kernel_size: 9,
            ..PhotographicLocal::default()
        })
    );

    let global = ToneMapOperator::PhotographicGlobal(PhotographicGlobal::default()).with_params(&params);
    assert_eq!(
        global,
        ToneMapOperator::PhotographicGlobal(PhotographicGlobal {
            alpha: 0.6,
            ..PhotographicGlobal::default()
        })
    );

    let bilateral = ToneMapOperator::default().with_params(&params);
    assert_eq!(
        bilateral,
        ToneMapOperator::Bilateral(BilateralToneMapper {
            sigma_range: 0.4,
            ..BilateralToneMapper::default()
        })
    );

    assert_eq!(
        ToneMapOperator::default().with_params(&ToneMapParams::default()),
        ToneMapOperator::default()
    );
}

#[test]
fn test_overridden_key_value_changes_output() {
    let params = ToneMapParams {
        alpha: Some(0.6),
        ..ToneMapParams::default()
    };
    let op = ToneMapOperator::PhotographicLocal(PhotographicLocal::default()).with_params(&params);

    // 0.6 / 1.6 * 255 = 95.6
    let image = op.map(&constant(6, 6, 2.0)).unwrap();
    assert!(image.data.iter().all(|&v| v == 96), "{:?}", &image.data[..3]);
}

#[test]
fn test_non_positive_parameters_are_rejected() {
    let radiance = constant(4, 4, 1.0);
    let invalid = [
        ToneMapOperator::PhotographicGlobal(PhotographicGlobal {
            alpha: 0.0,
            ..PhotographicGlobal::default()
        }),
        ToneMapOperator::PhotographicLocal(PhotographicLocal {
            epsilon: -1.0,
            ..PhotographicLocal::default()
        }),
        ToneMapOperator::PhotographicLocal(PhotographicLocal {
            phi: f32::NAN,
            ..PhotographicLocal::default()
        }),
        ToneMapOperator::Bilateral(BilateralToneMapper {
            sigma_range: 0.0,
            ..BilateralToneMapper::default()
        }),
        ToneMapOperator::Bilateral(BilateralToneMapper {
            sigma_space: f32::INFINITY,
            ..BilateralToneMapper::default()
        }),
    ];
    for op in invalid {
        assert!(
            matches!(op.map(&radiance), Err(HdrError::InvalidInput(_))),
            "{:?}",
            op
        );
    }
}
