use crate::cli::Cli;
use anyhow::{Context, Result};
use av1wrap::config::Config;
use av1wrap::engine::{self, EncodeOptions, Launcher, ProcessorTopology, SearchPath};
use std::io::Write;
use std::path::Path;
use std::process;

pub fn run(cli: Cli) {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {:#}", e);
            eprintln!("Using built-in defaults.");
            Config::default()
        }
    };

    if cli.init_config {
        handle_init_config();
        return;
    }

    let launcher = match build_launcher(&cli, &config) {
        Ok(launcher) => launcher,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if cli.version {
        handle_version(&launcher, &config);
        process::exit(0);
    }

    let Some(opts) = cli.encode_options() else {
        println!("The arguments, -i, -o, -t are required to work!");
        process::exit(1);
    };

    if let Err(e) = handle_encode(&opts, &config, &launcher, cli.dry_run) {
        eprintln!("Error: {:#}", e);
        eprintln!("Error occurred when transcoding with av1an. Check logs");
        process::exit(1);
    }
}

/// Launcher with the install-root PATH override, if an install root is known
fn build_launcher(cli: &Cli, config: &Config) -> Result<Launcher> {
    let install_root = cli
        .staxrip_startup_dir
        .as_deref()
        .or(config.defaults.install_root.as_deref());

    let env = match install_root {
        Some(root) => {
            tracing::info!(root = %root.display(), "using StaxRip tool directories");
            vec![SearchPath::from_install_root(root).env_override()?]
        }
        None => Vec::new(),
    };

    Ok(Launcher::new(env).with_new_console(config.orchestrator.new_console))
}

fn handle_version(launcher: &Launcher, config: &Config) {
    for program in [&config.orchestrator.program, &config.orchestrator.encoder_program] {
        match launcher.version(program) {
            Ok(version) => println!("{}", version),
            Err(e) => eprintln!("Error: {:#}", e),
        }
        println!();
    }
}

fn handle_encode(opts: &EncodeOptions, config: &Config, launcher: &Launcher, dry_run: bool) -> Result<()> {
    let detection = engine::plan_threading(&opts.threading_overrides(), ProcessorTopology::query)
        .context("Automatic thread detection failed")?;
    println!("{}", detection.report());

    let command = engine::build_av1an_cmd(&config.orchestrator.program, opts, &detection.plan);

    if dry_run {
        println!("{}", command);
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    writeln!(stdout, "Starting av1an... Check new console window for progress")?;
    writeln!(stdout, "Command: {}", command)?;
    stdout.flush()?;

    if config.defaults.debug_log {
        // Not fatal: the temp dir may not exist until av1an creates it
        if let Err(e) = engine::write_debug_log(Path::new(&opts.temp_dir), &command.to_string()) {
            tracing::warn!("{:#}", e);
        }
    }

    launcher.run(&command)?;
    tracing::info!(output = %opts.output, "av1an finished");
    Ok(())
}

fn handle_init_config() {
    match Config::ensure_default() {
        Ok(path) => println!("Config file: {}", path.display()),
        Err(e) => {
            eprintln!("Failed to save default config: {:#}", e);
            process::exit(1);
        }
    }
}
