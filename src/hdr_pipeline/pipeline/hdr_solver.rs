use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, instrument};

use crate::hdr_pipeline::align::{AlignerKind, ImageAligner};
use crate::hdr_pipeline::common::error::{HdrError, Result};
use crate::hdr_pipeline::common::timing::PipelineTimings;
use crate::hdr_pipeline::common::types::{ExposureSet, RadianceMap, Rgb8Image};
use crate::hdr_pipeline::config::PipelineConfig;
use crate::hdr_pipeline::io::{
    ExposureReader, LdrImageWriter, LdrWriterKind, RadianceHdrWriter, RadianceWriter,
};
use crate::hdr_pipeline::response::{ResponseSolver, ResponseSolverKind};
use crate::hdr_pipeline::tone_map::{ToneMapOperator, ToneMapper};

/// Align, recover radiance, tone map.
///
/// Holds no state between runs besides its inputs; each run builds its own
/// random generator from the configured seed.
pub struct HdrPipeline<A: ImageAligner, S: ResponseSolver, T: ToneMapper> {
    exposures: ExposureSet,
    aligner: A,
    solver: S,
    tone_mapper: T,
    config: PipelineConfig,
}

impl HdrPipeline<AlignerKind, ResponseSolverKind, ToneMapOperator> {
    /// Pipeline using the stages selected in `config`.
    pub fn new(exposures: ExposureSet, config: PipelineConfig) -> Self {
        Self {
            exposures,
            aligner: config.aligner.clone(),
            solver: config.response_solver.clone(),
            tone_mapper: config.tone_mapper.clone(),
            config,
        }
    }

    pub fn from_reader<Rd: ExposureReader>(
        reader: &Rd,
        image_dir: &Path,
        shutter_file: &Path,
        config: PipelineConfig,
    ) -> Result<Self> {
        let exposures = reader.read_exposures(image_dir, shutter_file)?;
        Ok(Self::new(exposures, config))
    }

    /// Replaces the configuration along with the stages it selects.
    pub fn set_config(&mut self, config: PipelineConfig) {
        self.aligner = config.aligner.clone();
        self.solver = config.response_solver.clone();
        self.tone_mapper = config.tone_mapper.clone();
        self.config = config;
    }
}

impl<A: ImageAligner, S: ResponseSolver, T: ToneMapper> HdrPipeline<A, S, T> {
    /// Pipeline with caller-supplied stages. Only the seed and the radiance
    /// output path are read from `config`.
    pub fn with_custom(
        exposures: ExposureSet,
        aligner: A,
        solver: S,
        tone_mapper: T,
        config: PipelineConfig,
    ) -> Self {
        Self {
            exposures,
            aligner,
            solver,
            tone_mapper,
            config,
        }
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn align(&self) -> Result<ExposureSet> {
        let _span = tracing::info_span!("align", images = self.exposures.len()).entered();
        self.aligner.align(&self.exposures)
    }

    fn recover_radiance(&self, aligned: &ExposureSet, rng: &mut StdRng) -> Result<RadianceMap> {
        let _span = tracing::info_span!("recover_radiance").entered();
        self.solver.solve(aligned, rng)
    }

    fn tone_map(&self, radiance: &RadianceMap) -> Result<Rgb8Image> {
        let _span = tracing::info_span!("tone_map", operator = self.tone_mapper.name()).entered();
        self.tone_mapper.map(radiance)
    }

    fn run(&self, timings: &mut PipelineTimings) -> Result<(RadianceMap, Rgb8Image)> {
        let mut rng = self.rng();
        let aligned = timings.time("align", || self.align())?;
        let radiance = timings.time("recover_radiance", || {
            self.recover_radiance(&aligned, &mut rng)
        })?;
        let image = timings.time("tone_map", || self.tone_map(&radiance))?;
        Ok((radiance, image))
    }

    /// Runs every stage, returning the radiance map along with the 8-bit image.
    #[instrument(skip(self), fields(images = self.exposures.len(), seed = ?self.config.seed))]
    pub fn solve_with_radiance(&self) -> Result<(RadianceMap, Rgb8Image)> {
        let (width, height) = self.exposures.dimensions();
        info!(width, height, "Starting HDR reconstruction");

        let result = self.run(&mut PipelineTimings::new())?;

        info!(width, height, "HDR reconstruction complete");
        Ok(result)
    }

    pub fn solve(&self) -> Result<Rgb8Image> {
        self.solve_with_radiance().map(|(_, image)| image)
    }

    /// Same as `solve`, recording `align`, `recover_radiance` and `tone_map` durations.
    pub fn solve_with_timings(&self) -> Result<(Rgb8Image, PipelineTimings)> {
        let mut timings = PipelineTimings::new();
        let (_, image) = self.run(&mut timings)?;
        info!(
            "HDR reconstruction complete in {:.3}ms",
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok((image, timings))
    }

    /// Solves and writes the result to `output_path`, encoded by extension.
    /// The radiance map is also written when a radiance output is configured.
    /// Timings include a `write_output` step.
    #[instrument(skip(self, output_path), fields(output = %output_path.as_ref().display()))]
    pub fn solve_to_file<P: AsRef<Path>>(
        &self,
        output_path: P,
    ) -> Result<(Rgb8Image, PipelineTimings)> {
        let output_path = output_path.as_ref();
        let mut timings = PipelineTimings::new();
        let (radiance, image) = self.run(&mut timings)?;

        timings.time("write_output", || -> Result<()> {
            let _span = tracing::info_span!("write_output").entered();
            let mut output = create_output(output_path)?;
            LdrWriterKind::for_path(output_path, self.config.tiff_compression)
                .write_image(&image, &mut output)?;
            output.flush()?;
            info!(path = %output_path.display(), "Wrote tone-mapped image");

            if let Some(radiance_path) = &self.config.radiance_output {
                let mut output = create_output(radiance_path)?;
                RadianceHdrWriter.write_radiance(&radiance, &mut output)?;
                output.flush()?;
                debug!(path = %radiance_path.display(), "Wrote radiance map");
            }
            Ok(())
        })?;
        Ok((image, timings))
    }

    pub fn exposures(&self) -> &ExposureSet {
        &self.exposures
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| HdrError::ResourceFailure(format!("{}: {}", path.display(), e)))
}
