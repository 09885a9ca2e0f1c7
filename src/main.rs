mod cli;

use anyhow::Context;
use tracing::{debug, info};

use simple_hdr_rs::hdr_pipeline::config::{
    resolve_aligner, resolve_response_solver, resolve_tiff_compression, resolve_tone_mapper,
    resolve_weight,
};
use simple_hdr_rs::hdr_pipeline::{DirectoryExposureReader, HdrPipeline, PipelineConfig};
use simple_hdr_rs::logger;

use crate::cli::{CmdOptions, create_cmd_args};

fn main() -> anyhow::Result<()> {
    let matches = create_cmd_args().get_matches();
    let options = CmdOptions::from_matches(&matches)?;
    logger::init(options.log_level);

    info!("Starting simple_hdr_rs...");

    let weight = resolve_weight(&options.weight).value;
    let config = PipelineConfig::builder()
        .aligner(resolve_aligner(&options.aligner).value)
        .response_solver(
            resolve_response_solver(&options.crf_solver, weight, options.samples, options.lambda)
                .value,
        )
        .tone_mapper(
            resolve_tone_mapper(&options.tone_mapper)
                .value
                .with_params(&options.tone_map_params),
        )
        .seed(options.seed)
        .radiance_output(options.radiance_output.clone())
        .tiff_compression(resolve_tiff_compression(&options.tiff_compression).value)
        .build();

    info!(
        aligner = %config.aligner,
        solver = %config.response_solver,
        weight = %weight,
        tone_mapper = %config.tone_mapper,
        operator_params = ?config.tone_mapper,
        "HDR pipeline configured"
    );

    let pipeline = HdrPipeline::from_reader(
        &DirectoryExposureReader,
        &options.image_dir,
        &options.shutter_file,
        config,
    )
    .with_context(|| {
        format!(
            "failed to load exposures from {} with shutter speeds from {}",
            options.image_dir.display(),
            options.shutter_file.display()
        )
    })?;

    let (_, timings) = pipeline
        .solve_to_file(&options.output)
        .with_context(|| format!("failed to produce {}", options.output.display()))?;

    if tracing::enabled!(tracing::Level::DEBUG) {
        debug!("Stage timings:");
        timings.log_summary();
    }

    info!(output = %options.output.display(), "Done");
    Ok(())
}
