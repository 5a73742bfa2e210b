// Av1an command assembly

use std::fmt;
use std::process::Command;

use super::topology::{ThreadingOverrides, ThreadingPlan};

/// Encoder wrapped by av1an for every chunk
pub const ENCODER: &str = "rav1e";

/// Output pixel format handed to av1an
pub const PIX_FORMAT: &str = "yuv420p10le";

/// Audio params for av1an's ffmpeg pass (drop all audio streams)
pub const AUDIO_PARAMS: &str = "-an";

/// rav1e flag appended to every sub-argument string; av1an does scene detection itself
pub const NO_SCENE_DETECTION: &str = "--no-scene-detection";

/// rav1e-specific options, forwarded through av1an's `-v`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rav1eOptions {
    pub speed: Option<u8>,
    pub quantizer: Option<u8>,
    pub tiles: Option<u32>,
    pub threads: Option<u32>,
}

impl Rav1eOptions {
    pub fn is_empty(&self) -> bool {
        self.speed.is_none() && self.quantizer.is_none() && self.tiles.is_none() && self.threads.is_none()
    }

    /// Space-joined rav1e arguments, or `None` when nothing was set
    pub fn to_arg_string(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut parts = Vec::new();
        if let Some(speed) = self.speed {
            parts.push(format!("--speed {}", speed));
        }
        if let Some(quantizer) = self.quantizer {
            parts.push(format!("--quantizer {}", quantizer));
        }
        if let Some(tiles) = self.tiles {
            parts.push(format!("--tiles {}", tiles));
        }
        if let Some(threads) = self.threads {
            parts.push(format!("--threads {}", threads));
        }
        parts.push(NO_SCENE_DETECTION.to_string());

        Some(parts.join(" "))
    }
}

/// Everything the user can ask of a single encode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub input: String,
    pub output: String,
    pub temp_dir: String,

    pub photon_noise: Option<u8>,
    pub chroma_noise: bool,
    pub scene_downscale_height: Option<u32>,

    pub workers: Option<u32>,
    pub affinity_group_size: Option<u32>,
    pub detection_disabled: bool,

    pub rav1e: Rav1eOptions,
}

impl EncodeOptions {
    pub fn new(input: impl Into<String>, output: impl Into<String>, temp_dir: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            temp_dir: temp_dir.into(),
            ..Self::default()
        }
    }

    pub fn threading_overrides(&self) -> ThreadingOverrides {
        ThreadingOverrides {
            detection_disabled: self.detection_disabled,
            workers_set: self.workers.is_some(),
            affinity_set: self.affinity_group_size.is_some(),
        }
    }
}

/// One argument of the assembled command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Passed and shown as-is
    Bare(String),
    /// Passed as-is, shown in double quotes
    Quoted(String),
    /// `flag=value` in a single argument, shown as `flag="value"`
    Assign { flag: &'static str, value: String },
}

impl Token {
    fn bare(s: impl Into<String>) -> Self {
        Token::Bare(s.into())
    }

    /// The raw argument handed to the OS
    pub fn to_arg(&self) -> String {
        match self {
            Token::Bare(s) | Token::Quoted(s) => s.clone(),
            Token::Assign { flag, value } => format!("{}={}", flag, value),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Bare(s) => write!(f, "{}", s),
            Token::Quoted(s) => write!(f, "\"{}\"", s),
            Token::Assign { flag, value } => write!(f, "{}=\"{}\"", flag, value),
        }
    }
}

/// Program plus ordered tokens for one av1an run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub tokens: Vec<Token>,
}

impl CommandLine {
    /// Raw argv (no quote characters; the OS layer does its own quoting)
    pub fn args(&self) -> Vec<String> {
        self.tokens.iter().map(Token::to_arg).collect()
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args());
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for token in &self.tokens {
            write!(f, " {}", token)?;
        }
        Ok(())
    }
}

fn push_flag(tokens: &mut Vec<Token>, flag: &str, value: impl fmt::Display) {
    tokens.push(Token::bare(flag));
    tokens.push(Token::bare(value.to_string()));
}

fn apply_defaults(tokens: &mut Vec<Token>) {
    tokens.push(Token::bare("--verbose"));
    tokens.push(Token::bare("-y"));
    tokens.push(Token::bare("--resume"));
    tokens.push(Token::Assign {
        flag: "-a",
        value: AUDIO_PARAMS.to_string(),
    });
    push_flag(tokens, "-e", ENCODER);
    push_flag(tokens, "--pix-format", PIX_FORMAT);
}

/// Plan values win when enabled; an enabled plan implies the user set neither flag.
fn apply_threading(tokens: &mut Vec<Token>, opts: &EncodeOptions, plan: &ThreadingPlan) {
    match *plan {
        ThreadingPlan::Enabled {
            worker_count,
            affinity_group_size,
        } => {
            push_flag(tokens, "--workers", worker_count);
            push_flag(tokens, "--set-thread-affinity", affinity_group_size);
        }
        ThreadingPlan::Disabled => {
            if let Some(workers) = opts.workers {
                push_flag(tokens, "--workers", workers);
            }
            if let Some(affinity) = opts.affinity_group_size {
                push_flag(tokens, "--set-thread-affinity", affinity);
            }
        }
    }
}

fn apply_grain_and_scene_detection(tokens: &mut Vec<Token>, opts: &EncodeOptions) {
    if let Some(strength) = opts.photon_noise {
        push_flag(tokens, "--photon-noise", strength);
    }
    if opts.chroma_noise {
        tokens.push(Token::bare("--chroma-noise"));
    }
    if let Some(height) = opts.scene_downscale_height {
        push_flag(tokens, "--sc-downscale-height", height);
    }
}

fn apply_io(tokens: &mut Vec<Token>, opts: &EncodeOptions) {
    tokens.push(Token::bare("-i"));
    tokens.push(Token::Quoted(opts.input.clone()));
    tokens.push(Token::bare("-o"));
    tokens.push(Token::Quoted(opts.output.clone()));
    tokens.push(Token::bare("--temp"));
    tokens.push(Token::Quoted(opts.temp_dir.clone()));
}

/// Build the av1an invocation for `opts` under `plan`
pub fn build_av1an_cmd(program: &str, opts: &EncodeOptions, plan: &ThreadingPlan) -> CommandLine {
    let mut tokens = Vec::new();

    apply_defaults(&mut tokens);
    apply_threading(&mut tokens, opts, plan);
    apply_grain_and_scene_detection(&mut tokens, opts);

    if let Some(video_params) = opts.rav1e.to_arg_string() {
        tokens.push(Token::Assign {
            flag: "-v",
            value: video_params,
        });
    }

    apply_io(&mut tokens, opts);

    CommandLine {
        program: program.to_string(),
        tokens,
    }
}
