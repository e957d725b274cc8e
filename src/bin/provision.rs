use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use facematch::processing::args::single_dash_stack;
use facematch::processing::settings::Settings;
use facematch::stack::outputs::PulumiStack;
use facematch::stack::provision;

/// Creates the bucket and face collection, then uploads the local images.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// The name of the pulumi stack
    #[arg(long, default_value = "dev")]
    stack: String,
    /// Directory holding the reference/ and input/ image folders
    #[arg(short, long, default_value = "resources/images")]
    images: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse_from(std::env::args_os().map(single_dash_stack));
    let settings = Settings::from_env();
    let stack = PulumiStack::new(&settings.iac_dir, &args.stack);

    let info = provision::provision(&stack, &settings, &args.images).await?;
    println!("bucketName: {}", info.bucket_name);
    println!("collectionId: {}", info.collection_id);
    Ok(())
}
