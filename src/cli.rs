use av1wrap::engine::{EncodeOptions, Rav1eOptions};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "av1wrap")]
#[command(about = "Av1an wrapper for StaxRip", long_about = None)]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Input File (for StaxRip)
    #[arg(short = 'i', value_name = "INPUT")]
    pub input: Option<String>,

    /// Output File (for StaxRip)
    #[arg(short = 'o', value_name = "OUTPUT")]
    pub output: Option<String>,

    /// Temp Directory (for StaxRip)
    #[arg(short = 't', value_name = "TEMPDIR")]
    pub tempdir: Option<String>,

    /// StaxRip startup directory; its encoder and frame-server folders are added to PATH
    /// for av1an (only needed for portable installations)
    #[arg(short = 's', long)]
    pub staxrip_startup_dir: Option<PathBuf>,

    /// Print Av1an and rav1e versions
    #[arg(long)]
    pub version: bool,

    /// Generate a photon noise table and apply it using grain synthesis [strength: 0-64]
    /// (disabled by default) (Av1an parameter)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=64))]
    pub photon_noise: Option<u8>,

    /// Add chroma grain synthesis to the grain table generated by --photon-noise (Av1an parameter)
    #[arg(long)]
    pub chroma_noise: bool,

    /// Optional downscaling for scene detection; no downscaling by default (Av1an parameter)
    #[arg(long)]
    pub sc_downscale_height: Option<u32>,

    /// Number of workers to spawn [0 = automatic] (Av1an parameter).
    /// Leave unset to use automatic thread detection
    #[arg(long)]
    pub workers: Option<u32>,

    /// Pin each worker to a specific set of threads of this size (Av1an parameter).
    /// Leave unset to use automatic thread detection
    #[arg(long)]
    pub set_thread_affinity: Option<u32>,

    /// Disable the wrapper's automatic thread detection
    #[arg(long)]
    pub disable_automatic_thread_detection: bool,

    /// Quantizer (0-255), smaller values are higher quality [default: 100] (rav1e parameter)
    #[arg(long)]
    pub quantizer: Option<u8>,

    /// Speed level (0 is best quality, 10 is fastest) [default: 6] (rav1e parameter)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub speed: Option<u8>,

    /// Number of tiles; tile-cols and tile-rows are raised to reach at least this many (rav1e parameter)
    #[arg(long)]
    pub tiles: Option<u32>,

    /// Threadpool size; 0 uses the number of logical CPUs [default: 0] (rav1e parameter)
    #[arg(long)]
    pub threads: Option<u32>,

    /// Print the av1an command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose wrapper logging
    #[arg(long)]
    pub debug: bool,

    /// Write the default config file if missing and show its location
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    /// Structured options, or `None` when any of -i / -o / -t is missing
    pub fn encode_options(&self) -> Option<EncodeOptions> {
        let (input, output, temp_dir) = match (&self.input, &self.output, &self.tempdir) {
            (Some(i), Some(o), Some(t)) => (i, o, t),
            _ => return None,
        };

        Some(EncodeOptions {
            photon_noise: self.photon_noise,
            chroma_noise: self.chroma_noise,
            scene_downscale_height: self.sc_downscale_height,
            workers: self.workers,
            affinity_group_size: self.set_thread_affinity,
            detection_disabled: self.disable_automatic_thread_detection,
            rav1e: Rav1eOptions {
                speed: self.speed,
                quantizer: self.quantizer,
                tiles: self.tiles,
                threads: self.threads,
            },
            ..EncodeOptions::new(input.as_str(), output.as_str(), temp_dir.as_str())
        })
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
