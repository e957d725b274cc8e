use anyhow::Result;
use tracing_subscriber::EnvFilter;

use facematch::processing::args::Args;
use facematch::processing::runner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_args();
    runner::run(&args).await
}
