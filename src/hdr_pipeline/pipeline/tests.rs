use std::sync::{Arc, Mutex};

use rand::Rng;
use tempfile::TempDir;

use crate::hdr_pipeline::align::ImageAligner;
use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::types::{CHANNELS, ExposureSet, RadianceMap, Rgb8Image};
use crate::hdr_pipeline::config::PipelineConfig;
use crate::hdr_pipeline::io::{DirectoryExposureReader, TiffCompression};
use crate::hdr_pipeline::pipeline::HdrPipeline;
use crate::hdr_pipeline::response::ResponseSolver;
use crate::hdr_pipeline::tone_map::{PhotographicGlobal, ToneMapOperator, ToneMapper};

#[derive(Default, Clone)]
struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn push(&self, stage: &'static str) {
        self.0.lock().unwrap().push(stage);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

struct MockAligner {
    should_fail: bool,
    log: CallLog,
}

impl ImageAligner for MockAligner {
    fn align(&self, exposures: &ExposureSet) -> Result<ExposureSet> {
        self.log.push("align");
        if self.should_fail {
            return Err(HdrError::InvalidInput("Mock align error".to_string()));
        }
        Ok(exposures.clone())
    }
}

struct MockSolver {
    should_fail: bool,
    log: CallLog,
    draws: Arc<Mutex<Vec<u64>>>,
}

impl ResponseSolver for MockSolver {
    fn solve<R: Rng + ?Sized>(&self, exposures: &ExposureSet, rng: &mut R) -> Result<RadianceMap> {
        self.log.push("solve");
        self.draws.lock().unwrap().push(rng.random::<u64>());
        if self.should_fail {
            return Err(HdrError::NumericFailure("Mock solve error".to_string()));
        }
        let (width, height) = exposures.dimensions();
        RadianceMap::new(width, height, vec![0.5; width * height * CHANNELS])
    }
}

struct MockToneMapper {
    should_fail: bool,
    log: CallLog,
}

impl ToneMapper for MockToneMapper {
    fn map(&self, radiance: &RadianceMap) -> Result<Rgb8Image> {
        self.log.push("tone_map");
        if self.should_fail {
            return Err(HdrError::EncodeError("Mock tone map error".to_string()));
        }
        Ok(Rgb8Image::black(radiance.width(), radiance.height()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct Mocks {
    log: CallLog,
    draws: Arc<Mutex<Vec<u64>>>,
}

fn flat_exposures() -> ExposureSet {
    ExposureSet::from_parts(
        vec![
            Rgb8Image::from_fn(8, 6, |_, _| [40; CHANNELS]),
            Rgb8Image::from_fn(8, 6, |_, _| [120; CHANNELS]),
        ],
        vec![0.1, 0.4],
    )
    .unwrap()
}

fn mock_pipeline(
    fail: [bool; 3],
    seed: Option<u64>,
) -> (HdrPipeline<MockAligner, MockSolver, MockToneMapper>, Mocks) {
    let log = CallLog::default();
    let draws = Arc::new(Mutex::new(Vec::new()));
    let pipeline = HdrPipeline::with_custom(
        flat_exposures(),
        MockAligner {
            should_fail: fail[0],
            log: log.clone(),
        },
        MockSolver {
            should_fail: fail[1],
            log: log.clone(),
            draws: draws.clone(),
        },
        MockToneMapper {
            should_fail: fail[2],
            log: log.clone(),
        },
        PipelineConfig::builder().seed(seed).build(),
    );
    (pipeline, Mocks { log, draws })
}

/// Linear camera over a smooth scene, unsaturated at every speed.
fn synthetic_exposures(speeds: &[f32]) -> ExposureSet {
    let images = speeds
        .iter()
        .map(|&t| {
            Rgb8Image::from_fn(24, 20, |x, y| {
                let edge = if x > 12 { 8.0 } else { 0.0 };
                let radiance = 5.0 + x as f32 + 0.25 * y as f32 + edge;
                [
                    (radiance * t).round() as u8,
                    (0.8 * radiance * t).round() as u8,
                    (0.6 * radiance * t).round() as u8,
                ]
            })
        })
        .collect();
    ExposureSet::from_parts(images, speeds.to_vec()).unwrap()
}

#[test]
fn test_stages_run_in_order() {
    let (pipeline, mocks) = mock_pipeline([false; 3], Some(1));
    let image = pipeline.solve().unwrap();
    assert_eq!(image.dimensions(), (8, 6));
    assert_eq!(mocks.log.calls(), vec!["align", "solve", "tone_map"]);
}

#[test]
fn test_align_failure_stops_pipeline() {
    let (pipeline, mocks) = mock_pipeline([true, false, false], Some(1));
    let result = pipeline.solve();
    assert!(matches!(result, Err(HdrError::InvalidInput(_))));
    assert_eq!(mocks.log.calls(), vec!["align"]);
}

#[test]
fn test_solver_failure_propagates() {
    let (pipeline, mocks) = mock_pipeline([false, true, false], Some(1));
    let result = pipeline.solve();
    assert!(matches!(result, Err(HdrError::NumericFailure(_))));
    assert_eq!(mocks.log.calls(), vec!["align", "solve"]);
}

#[test]
fn test_tone_map_failure_propagates() {
    let (pipeline, _mocks) = mock_pipeline([false, false, true], Some(1));
    assert!(matches!(pipeline.solve(), Err(HdrError::EncodeError(_))));
}

#[test]
fn test_every_run_reseeds_generator() {
    let (pipeline, mocks) = mock_pipeline([false; 3], Some(1234));
    pipeline.solve().unwrap();
    pipeline.solve().unwrap();
    pipeline.solve_with_timings().unwrap();
    let draws = mocks.draws.lock().unwrap().clone();
    assert_eq!(draws.len(), 3);
    assert!(draws.iter().all(|&d| d == draws[0]));
}

#[test]
fn test_timings_record_each_stage() {
    let (pipeline, _mocks) = mock_pipeline([false; 3], Some(1));
    let (_, timings) = pipeline.solve_with_timings().unwrap();
    let names: Vec<&str> = timings.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["align", "recover_radiance", "tone_map"]);
    assert!(timings.get_step("recover_radiance").is_some());
}

#[test]
fn test_same_seed_gives_identical_output() {
    let speeds = [1.0, 2.0, 4.0];
    for name in ["photographic-global", "photographic-local", "bilateral"] {
        let config = PipelineConfig::builder()
            .tone_mapper(name.parse().unwrap())
            .seed(Some(2024))
            .build();
        let first = HdrPipeline::new(synthetic_exposures(&speeds), config.clone())
            .solve()
            .unwrap();
        let second = HdrPipeline::new(synthetic_exposures(&speeds), config)
            .solve()
            .unwrap();
        assert_eq!(first, second, "{}", name);
    }
}

#[test]
fn test_timed_and_plain_runs_agree() {
    let config = PipelineConfig::builder().seed(Some(8)).build();
    let pipeline = HdrPipeline::new(synthetic_exposures(&[1.0, 2.0, 4.0]), config);
    let plain = pipeline.solve().unwrap();
    let (timed, _) = pipeline.solve_with_timings().unwrap();
    assert_eq!(plain, timed);
}

#[test]
fn test_all_zero_exposures_produce_finite_output() {
    let exposures = ExposureSet::from_parts(
        vec![Rgb8Image::black(10, 10), Rgb8Image::black(10, 10), Rgb8Image::black(10, 10)],
        vec![0.01, 0.1, 1.0],
    )
    .unwrap();
    let config = PipelineConfig::builder()
        .tone_mapper(ToneMapOperator::PhotographicGlobal(PhotographicGlobal::default()))
        .seed(Some(3))
        .build();
    let (radiance, image) = HdrPipeline::new(exposures, config)
        .solve_with_radiance()
        .unwrap();
    assert!(radiance.data().iter().all(|v| v.is_finite()));
    assert_eq!(image.dimensions(), (10, 10));
}

#[test]
fn test_solve_to_file_writes_image_and_radiance() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("result.png");
    let radiance_path = dir.path().join("radiance.hdr");
    let config = PipelineConfig::builder()
        .seed(Some(11))
        .radiance_output(Some(radiance_path.clone()))
        .build();

    let pipeline = HdrPipeline::new(synthetic_exposures(&[1.0, 2.0, 4.0]), config);
    let (image, timings) = pipeline.solve_to_file(&output).unwrap();
    assert!(timings.get_step("write_output").is_some());

    let written = DirectoryExposureReader.read_image(&output).unwrap();
    assert_eq!(written, image);
    let hdr = std::fs::read(&radiance_path).unwrap();
    assert!(hdr.starts_with(b"#?RADIANCE"));
}

#[test]
fn test_set_config_switches_stages() {
    let speeds = [1.0, 2.0, 4.0];
    let global = PipelineConfig::builder()
        .tone_mapper(ToneMapOperator::PhotographicGlobal(PhotographicGlobal::default()))
        .seed(Some(21))
        .build();

    let mut pipeline = HdrPipeline::new(
        synthetic_exposures(&speeds),
        PipelineConfig::builder().seed(Some(21)).build(),
    );
    let bilateral = pipeline.solve().unwrap();
    pipeline.set_config(global.clone());
    assert_eq!(pipeline.config(), &global);

    let switched = pipeline.solve().unwrap();
    let fresh = HdrPipeline::new(synthetic_exposures(&speeds), global)
        .solve()
        .unwrap();
    assert_eq!(switched, fresh);
    assert_ne!(switched, bilateral);
}

#[test]
fn test_solve_to_file_uses_configured_tiff_compression() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("result.tiff");
    let config = PipelineConfig::builder()
        .seed(Some(4))
        .tiff_compression(TiffCompression::Lzw)
        .build();

    let pipeline = HdrPipeline::new(synthetic_exposures(&[1.0, 2.0, 4.0]), config);
    let (image, _) = pipeline.solve_to_file(&output).unwrap();

    let written = DirectoryExposureReader.read_image(&output).unwrap();
    assert_eq!(written, image);
    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*"));
}

#[test]
fn test_unwritable_output_is_resource_failure() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("missing_dir").join("result.png");
    let (pipeline, _mocks) = mock_pipeline([false; 3], Some(1));
    assert!(matches!(
        pipeline.solve_to_file(&output),
        Err(HdrError::ResourceFailure(_))
    ));
}
