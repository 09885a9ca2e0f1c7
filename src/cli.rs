use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use simple_hdr_rs::hdr_pipeline::{
    AlignerKind, ResponseSolverKind, TiffCompression, ToneMapOperator, ToneMapParams, WeightKind,
};

pub const DEFAULT_OUTPUT: &str = "hdr_tone_mapping.png";

#[rustfmt::skip]
pub fn create_cmd_args() -> Command {
    Command::new("simple_hdr_rs")
        .about("Reconstructs an HDR radiance map from bracketed exposures and tone maps it")
        .arg(Arg::new("image_dir")
            .help("Directory holding the exposures, taken in file name order")
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("shutter_file")
            .help("Text file with one shutter speed per line (e.g. 1/250 or 0.004)")
            .value_parser(value_parser!(PathBuf))
            .required(true))
        .arg(Arg::new("aligner")
            .long("aligner")
            .help_heading("STAGES")
            .help("Exposure alignment algorithm [mtb]")
            .default_value(AlignerKind::DEFAULT_NAME))
        .arg(Arg::new("crf-solver")
            .long("crf-solver")
            .help_heading("STAGES")
            .help("Camera response recovery algorithm [debevec]")
            .default_value(ResponseSolverKind::DEFAULT_NAME))
        .arg(Arg::new("weight")
            .long("weight")
            .help_heading("RESPONSE")
            .help("Intensity weighting [gaussian, uniform]")
            .default_value("gaussian"))
        .arg(Arg::new("samples")
            .long("samples")
            .help_heading("RESPONSE")
            .help("Number of pixel locations sampled for the response fit")
            .value_parser(value_parser!(usize))
            .default_value("50"))
        .arg(Arg::new("lambda")
            .long("lambda")
            .help_heading("RESPONSE")
            .help("Smoothness strength of the response curve")
            .value_parser(value_parser!(f32))
            .default_value("40"))
        .arg(Arg::new("tone-mapper")
            .long("tone-mapper")
            .help_heading("STAGES")
            .help("Tone mapping operator [photographic-global, photographic-local, bilateral]")
            .default_value(ToneMapOperator::DEFAULT_NAME))
        .arg(Arg::new("tm-alpha")
            .long("tm-alpha")
            .help_heading("TONE MAPPING")
            .help("Key value of the photographic operators [global 0.7, local 0.3]")
            .value_parser(value_parser!(f32)))
        .arg(Arg::new("tm-phi")
            .long("tm-phi")
            .help_heading("TONE MAPPING")
            .help("Sharpening exponent of photographic-local [8]")
            .value_parser(value_parser!(f32)))
        .arg(Arg::new("tm-epsilon")
            .long("tm-epsilon")
            .help_heading("TONE MAPPING")
            .help("Scale selection threshold of photographic-local [0.05]")
            .value_parser(value_parser!(f32)))
        .arg(Arg::new("tm-max-kernel-size")
            .long("tm-max-kernel-size")
            .help_heading("TONE MAPPING")
            .help("Largest odd blur kernel of photographic-local [35]")
            .value_parser(value_parser!(usize)))
        .arg(Arg::new("tm-radius")
            .long("tm-radius")
            .help_heading("TONE MAPPING")
            .help("Filter radius of bilateral [5]")
            .value_parser(value_parser!(usize)))
        .arg(Arg::new("tm-sigma-space")
            .long("tm-sigma-space")
            .help_heading("TONE MAPPING")
            .help("Spatial sigma of bilateral [30]")
            .value_parser(value_parser!(f32)))
        .arg(Arg::new("tm-sigma-range")
            .long("tm-sigma-range")
            .help_heading("TONE MAPPING")
            .help("Range sigma of bilateral [30]")
            .value_parser(value_parser!(f32)))
        .arg(Arg::new("seed")
            .long("seed")
            .help("Seed for pixel sampling; random when omitted")
            .value_parser(value_parser!(u64)))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .help("Tone-mapped output; .tif/.tiff writes TIFF, anything else PNG")
            .value_parser(value_parser!(PathBuf))
            .default_value(DEFAULT_OUTPUT))
        .arg(Arg::new("tiff-compression")
            .long("tiff-compression")
            .help("Compression of TIFF output [none, lzw, deflate-fast, deflate-balanced, deflate-best]")
            .default_value(TiffCompression::DEFAULT_NAME))
        .arg(Arg::new("radiance-output")
            .long("radiance-output")
            .help("Also write the radiance map as a Radiance .hdr file")
            .value_parser(value_parser!(PathBuf)))
        .arg(Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display debug information and stage timings"))
        .arg(Arg::new("trace")
            .long("trace")
            .action(ArgAction::SetTrue)
            .help_heading("LOGGING")
            .help("Display very verbose information"))
}

/// Parsed command line
#[derive(Debug, Clone)]
pub struct CmdOptions {
    pub image_dir: PathBuf,
    pub shutter_file: PathBuf,
    pub aligner: String,
    pub crf_solver: String,
    pub weight: String,
    pub samples: usize,
    pub lambda: f32,
    pub tone_mapper: String,
    pub tone_map_params: ToneMapParams,
    pub seed: Option<u64>,
    pub output: PathBuf,
    pub radiance_output: Option<PathBuf>,
    pub tiff_compression: String,
    pub log_level: &'static str,
}

fn string_arg(matches: &ArgMatches, id: &str, default: &str) -> String {
    matches
        .get_one::<String>(id)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

impl CmdOptions {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let image_dir = matches
            .get_one::<PathBuf>("image_dir")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing image directory"))?;
        let shutter_file = matches
            .get_one::<PathBuf>("shutter_file")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing shutter speed file"))?;

        let log_level = if matches.get_flag("trace") {
            "trace"
        } else if matches.get_flag("debug") {
            "debug"
        } else {
            "info"
        };

        Ok(Self {
            image_dir,
            shutter_file,
            aligner: string_arg(matches, "aligner", AlignerKind::DEFAULT_NAME),
            crf_solver: string_arg(matches, "crf-solver", ResponseSolverKind::DEFAULT_NAME),
            weight: string_arg(matches, "weight", WeightKind::default().name()),
            samples: matches.get_one::<usize>("samples").copied().unwrap_or(50),
            lambda: matches.get_one::<f32>("lambda").copied().unwrap_or(40.0),
            tone_mapper: string_arg(matches, "tone-mapper", ToneMapOperator::DEFAULT_NAME),
            tone_map_params: ToneMapParams {
                alpha: matches.get_one::<f32>("tm-alpha").copied(),
                phi: matches.get_one::<f32>("tm-phi").copied(),
                epsilon: matches.get_one::<f32>("tm-epsilon").copied(),
                max_kernel_size: matches.get_one::<usize>("tm-max-kernel-size").copied(),
                radius: matches.get_one::<usize>("tm-radius").copied(),
                sigma_space: matches.get_one::<f32>("tm-sigma-space").copied(),
                sigma_range: matches.get_one::<f32>("tm-sigma-range").copied(),
            },
            seed: matches.get_one::<u64>("seed").copied(),
            output: matches
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            radiance_output: matches.get_one::<PathBuf>("radiance-output").cloned(),
            tiff_compression: string_arg(
                matches,
                "tiff-compression",
                TiffCompression::DEFAULT_NAME,
            ),
            log_level,
        })
    }
}
