use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::process::Command;

/// What the provisioning phase hands over to the matching phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackInfo {
    pub bucket_name: String,
    pub collection_id: String,
}

#[derive(Debug, Error)]
pub enum StackError {
    #[error("missing value in stack output: {0}")]
    MissingOutput(&'static str),
    #[error("pulumi {command} failed for stack {stack} ({status}): {stderr}")]
    EngineFailed {
        command: String,
        stack: String,
        status: String,
        stderr: String,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOutputs {
    bucket_name: Option<String>,
    collection_id: Option<String>,
}

impl StackInfo {
    /// Reads the exported outputs of a stack, as printed by
    /// `pulumi stack output --json`.
    pub fn from_outputs_json(json: &str) -> Result<Self> {
        let raw: RawOutputs =
            serde_json::from_str(json).context("error decoding stack outputs")?;
        let bucket_name = raw
            .bucket_name
            .ok_or(StackError::MissingOutput("bucketName"))?;
        let collection_id = raw
            .collection_id
            .ok_or(StackError::MissingOutput("collectionId"))?;
        Ok(Self {
            bucket_name,
            collection_id,
        })
    }
}

#[async_trait]
pub trait StackSource: Send + Sync {
    async fn stack_info(&self) -> Result<StackInfo>;
}

#[async_trait]
impl StackSource for StackInfo {
    async fn stack_info(&self) -> Result<StackInfo> {
        Ok(self.clone())
    }
}

/// A Pulumi stack driven through the `pulumi` CLI. The CLI picks up
/// `PULUMI_CONFIG_PASSPHRASE` from the environment to unlock the state.
pub struct PulumiStack {
    work_dir: PathBuf,
    name: String,
}

impl PulumiStack {
    pub fn new(work_dir: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            work_dir: work_dir.into(),
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates or updates the stack's resources, streaming the engine's
    /// progress to the terminal.
    pub async fn up(&self) -> Result<()> {
        tracing::info!(stack = %self.name, dir = %self.work_dir.display(), "running pulumi up");
        let status = Command::new("pulumi")
            .args(["up", "--yes", "--stack", &self.name])
            .current_dir(&self.work_dir)
            .status()
            .await
            .context("error running pulumi, is the CLI installed?")?;

        if !status.success() {
            return Err(StackError::EngineFailed {
                command: "up".to_string(),
                stack: self.name.clone(),
                status: status.to_string(),
                stderr: String::new(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl StackSource for PulumiStack {
    async fn stack_info(&self) -> Result<StackInfo> {
        let output = Command::new("pulumi")
            .args(["stack", "output", "--json", "--stack", &self.name])
            .current_dir(&self.work_dir)
            .output()
            .await
            .context("error running pulumi, is the CLI installed?")?;

        if !output.status.success() {
            return Err(StackError::EngineFailed {
                command: "stack output".to_string(),
                stack: self.name.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        StackInfo::from_outputs_json(&stdout)
            .with_context(|| format!("error getting outputs of stack {}", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_outputs() {
        let info = StackInfo::from_outputs_json(
            r#"{"bucketName": "faces-1a2b3c", "collectionId": "faces", "other": 3}"#,
        )
        .unwrap();
        assert_eq!(
            info,
            StackInfo {
                bucket_name: "faces-1a2b3c".to_string(),
                collection_id: "faces".to_string(),
            }
        );
    }

    #[test]
    fn null_output_is_missing() {
        let err = StackInfo::from_outputs_json(r#"{"bucketName": null, "collectionId": "faces"}"#)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StackError>(),
            Some(StackError::MissingOutput("bucketName"))
        ));
    }

    #[test]
    fn absent_output_is_missing() {
        let err = StackInfo::from_outputs_json(r#"{"bucketName": "faces-1a2b3c"}"#).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StackError>(),
            Some(StackError::MissingOutput("collectionId"))
        ));
    }

    #[test]
    fn non_string_output_is_rejected() {
        assert!(StackInfo::from_outputs_json(r#"{"bucketName": 1, "collectionId": "c"}"#).is_err());
        assert!(StackInfo::from_outputs_json("not json").is_err());
    }

    #[tokio::test]
    async fn stack_info_is_its_own_source() {
        let info = StackInfo {
            bucket_name: "b".to_string(),
            collection_id: "c".to_string(),
        };
        assert_eq!(info.stack_info().await.unwrap(), info);
    }
}
