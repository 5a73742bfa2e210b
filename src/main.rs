mod app;
mod cli;

use tracing::Level;

fn main() {
    let cli = cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    app::run(cli);
}
