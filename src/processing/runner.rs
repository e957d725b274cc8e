use anyhow::{Context, Result};

use crate::cloud::aws;
use crate::cloud::rekognition::{FaceCollection, RekognitionCollection};
use crate::cloud::storage::{ObjectStore, S3Storage};
use crate::processing::args;
use crate::processing::context::RunContext;
use crate::processing::reference;
use crate::processing::resolve::{self, ImageResolution};
use crate::processing::settings::Settings;
use crate::stack::outputs::{PulumiStack, StackSource};

/// Runs both stages against an already built context, printing the users
/// found in each input image.
pub async fn match_faces<C: FaceCollection, S: ObjectStore>(
    ctx: &mut RunContext<C, S>,
) -> Result<Vec<ImageResolution>> {
    let report = reference::index_and_associate(ctx).await?;
    tracing::info!(
        users = report.groups.len(),
        warnings = report.warnings.len(),
        "reference images processed"
    );

    let resolutions = resolve::resolve_input_images(&*ctx).await?;
    for resolution in &resolutions {
        println!("\nProcessing image: {}", resolution.image);
        for user in resolution.matches.users() {
            println!("Found user: {}", user);
        }
    }
    Ok(resolutions)
}

pub async fn run(args: &args::Args) -> Result<()> {
    let settings = Settings::from_env();

    // reading exported values from the stack
    let stack = PulumiStack::new(&settings.iac_dir, &args.stack);
    let stack_info = stack
        .stack_info()
        .await
        .context("error getting stack info")?;
    tracing::info!(
        stack = %args.stack,
        bucket = %stack_info.bucket_name,
        collection = %stack_info.collection_id,
        "stack info loaded"
    );

    let config = aws::shared_config().await;
    let collection = RekognitionCollection::new(&config, &stack_info);
    let storage = S3Storage::new(&config, &stack_info.bucket_name);

    let mut ctx = RunContext::new(stack_info, settings, collection, storage);
    match_faces(&mut ctx).await?;
    Ok(())
}
