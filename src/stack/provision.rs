use std::path::Path;

use anyhow::{Context, Result};

use crate::cloud::aws;
use crate::cloud::storage::{ObjectStore, S3Storage};
use crate::graphics::images;
use crate::processing::settings::Settings;
use crate::stack::outputs::{PulumiStack, StackInfo, StackSource};

/// Uploads `<images_dir>/reference` and `<images_dir>/input` under the
/// reference and input prefixes. Returns the uploaded keys.
pub async fn upload_images<S: ObjectStore + ?Sized>(
    storage: &S,
    settings: &Settings,
    images_dir: &Path,
) -> Result<Vec<String>> {
    let sources = [
        ("reference", settings.reference_prefix.as_str()),
        ("input", settings.input_prefix.as_str()),
    ];

    let mut uploaded = Vec::new();
    for (dir, prefix) in sources {
        let files = images::local_images(&images_dir.join(dir), prefix)
            .context("error uploading files")?;
        for file in files {
            storage
                .upload_file(&file.path, &file.key, Some(file.content_type))
                .await?;
            tracing::info!(key = %file.key, "uploaded");
            uploaded.push(file.key);
        }
    }
    Ok(uploaded)
}

/// Brings the stack up, then fills its bucket with the local images.
pub async fn provision(stack: &PulumiStack, settings: &Settings, images_dir: &Path) -> Result<StackInfo> {
    stack.up().await?;
    let info = stack
        .stack_info()
        .await
        .context("error getting stack info")?;
    tracing::info!(
        stack = %stack.name(),
        bucket = %info.bucket_name,
        collection = %info.collection_id,
        "stack ready"
    );

    let config = aws::shared_config().await;
    let storage = S3Storage::new(&config, &info.bucket_name);
    let uploaded = upload_images(&storage, settings, images_dir).await?;
    tracing::info!(count = uploaded.len(), "images uploaded");
    Ok(info)
}
