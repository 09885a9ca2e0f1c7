//! HDR pipeline configuration types

use std::path::PathBuf;

use crate::hdr_pipeline::align::AlignerKind;
use crate::hdr_pipeline::io::TiffCompression;
use crate::hdr_pipeline::response::ResponseSolverKind;
use crate::hdr_pipeline::tone_map::ToneMapOperator;

/// Stage selection and run settings for an HDR pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Exposure alignment algorithm
    pub aligner: AlignerKind,
    /// Response curve recovery algorithm and its parameters
    pub response_solver: ResponseSolverKind,
    /// Operator used to produce the 8-bit result
    pub tone_mapper: ToneMapOperator,
    /// Seed for pixel sampling; `None` draws a fresh seed from the OS on every run
    pub seed: Option<u64>,
    /// Where to also write the floating point radiance map, if anywhere
    pub radiance_output: Option<PathBuf>,
    /// Compression used when the tone-mapped output is a TIFF file
    pub tiff_compression: TiffCompression,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            aligner: AlignerKind::default(),
            response_solver: ResponseSolverKind::default(),
            tone_mapper: ToneMapOperator::default(),
            seed: None,
            radiance_output: None,
            tiff_compression: TiffCompression::default(),
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    aligner: Option<AlignerKind>,
    response_solver: Option<ResponseSolverKind>,
    tone_mapper: Option<ToneMapOperator>,
    seed: Option<Option<u64>>,
    radiance_output: Option<Option<PathBuf>>,
    tiff_compression: Option<TiffCompression>,
}

impl PipelineConfigBuilder {
    pub fn aligner(mut self, aligner: AlignerKind) -> Self {
        self.aligner = Some(aligner);
        self
    }

    pub fn response_solver(mut self, solver: ResponseSolverKind) -> Self {
        self.response_solver = Some(solver);
        self
    }

    pub fn tone_mapper(mut self, tone_mapper: ToneMapOperator) -> Self {
        self.tone_mapper = Some(tone_mapper);
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn radiance_output(mut self, path: Option<PathBuf>) -> Self {
        self.radiance_output = Some(path);
        self
    }

    pub fn tiff_compression(mut self, compression: TiffCompression) -> Self {
        self.tiff_compression = Some(compression);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            aligner: self.aligner.unwrap_or(default.aligner),
            response_solver: self.response_solver.unwrap_or(default.response_solver),
            tone_mapper: self.tone_mapper.unwrap_or(default.tone_mapper),
            seed: self.seed.unwrap_or(default.seed),
            radiance_output: self.radiance_output.unwrap_or(default.radiance_output),
            tiff_compression: self.tiff_compression.unwrap_or(default.tiff_compression),
        }
    }
}
