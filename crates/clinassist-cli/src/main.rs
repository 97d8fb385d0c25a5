use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

use clinassist_cli::{AppContext, Cli, config};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let dir = match cli.config_dir.clone() {
        Some(dir) => dir,
        None => config::config_dir()?,
    };
    let config = config::load_or_default(&dir)?.with_api_url(cli.api_url.clone());
    init_tracing(config.log_json);

    let ctx = AppContext::open(config, &dir)?;
    let mut stdout = std::io::stdout().lock();
    clinassist_cli::run(cli.command, &ctx, &mut stdout).await
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
