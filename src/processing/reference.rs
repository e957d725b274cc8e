use anyhow::{Context, Result};

use crate::cloud::rekognition::{FaceCollection, IndexedFace};
use crate::cloud::storage::ObjectStore;
use crate::processing::context::RunContext;
use crate::processing::filename::identity_from_key;
use crate::processing::identities::IdentityStatus;
use crate::processing::outcome::{record, Outcome, Warning};

/// Face ids grouped by identity label, in the order labels were discovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceGroups {
    groups: Vec<(String, Vec<String>)>,
}

impl FaceGroups {
    pub fn add(&mut self, label: &str, face_id: &str) {
        match self.groups.iter_mut().find(|(l, _)| l == label) {
            Some((_, faces)) => faces.push(face_id.to_string()),
            None => self
                .groups
                .push((label.to_string(), vec![face_id.to_string()])),
        }
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, faces)| faces.as_slice())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(l, faces)| (l.as_str(), faces.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFace {
    pub label: String,
    pub face: IndexedFace,
    /// Faces returned beyond the kept one.
    pub extra_faces: usize,
}

#[derive(Debug, Default)]
pub struct ReferenceReport {
    pub groups: FaceGroups,
    pub identities: Vec<(String, IdentityStatus)>,
    pub warnings: Vec<Warning>,
}

pub async fn index_reference_image<C: FaceCollection, S: ObjectStore>(
    ctx: &RunContext<C, S>,
    key: &str,
) -> Outcome<ReferenceFace> {
    Outcome::flatten(try_index_reference_image(ctx, key).await)
}

async fn try_index_reference_image<C: FaceCollection, S: ObjectStore>(
    ctx: &RunContext<C, S>,
    key: &str,
) -> Result<Outcome<ReferenceFace>> {
    let label = identity_from_key(key, &ctx.settings.reference_prefix)
        .context("error getting user id from filename")?;

    let mut faces = ctx
        .collection
        .index_faces(key, ctx.settings.reference_max_faces)
        .await
        .context("error indexing faces")?;

    if faces.is_empty() {
        return Ok(Outcome::Warning(Warning::NoFaceDetected {
            image: key.to_string(),
        }));
    }

    // first in service order wins
    let extra_faces = faces.len() - 1;
    let face = faces.remove(0);
    Ok(Outcome::Ok(ReferenceFace {
        label: label.to_string(),
        face,
        extra_faces,
    }))
}

/// Indexes every reference image, creates one user per label and associates
/// the indexed faces to it.
pub async fn index_and_associate<C: FaceCollection, S: ObjectStore>(
    ctx: &mut RunContext<C, S>,
) -> Result<ReferenceReport> {
    let keys = ctx
        .storage
        .list_keys(&ctx.settings.reference_prefix)
        .await
        .context("error getting reference images")?;
    tracing::info!(count = keys.len(), "indexing reference images");

    let mut report = ReferenceReport::default();
    for key in &keys {
        let Some(reference) = index_reference_image(&*ctx, key)
            .await
            .into_result(&mut report.warnings)?
        else {
            continue;
        };
        if reference.extra_faces > 0 {
            record(
                &mut report.warnings,
                Warning::MultipleFacesDetected {
                    image: key.clone(),
                    count: reference.extra_faces + 1,
                },
            );
        }
        tracing::debug!(image = %key, face = %reference.face.face_id, label = %reference.label, "indexed reference face");
        report.groups.add(&reference.label, &reference.face.face_id);
    }

    for (label, face_ids) in report.groups.iter() {
        let status = ctx
            .identities
            .ensure(&ctx.collection, label)
            .await
            .context("error creating user")?;
        report.identities.push((label.to_string(), status));

        let association = ctx
            .collection
            .associate_faces(label, face_ids, ctx.settings.association_threshold)
            .await
            .context("error associating faces")?;
        tracing::info!(
            user = %label,
            associated = association.associated.len(),
            "associated faces"
        );
        for (face_id, reasons) in association.rejected {
            record(
                &mut report.warnings,
                Warning::AssociationRejected {
                    user_id: label.to_string(),
                    face_id,
                    reasons,
                },
            );
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_keep_discovery_order() {
        let mut groups = FaceGroups::default();
        groups.add("bob", "face1");
        groups.add("alice", "face2");
        groups.add("bob", "face3");

        assert_eq!(groups.labels().collect::<Vec<_>>(), vec!["bob", "alice"]);
        assert_eq!(groups.get("bob").unwrap(), ["face1", "face3"]);
        assert_eq!(groups.get("alice").unwrap(), ["face2"]);
        assert!(groups.get("carol").is_none());
        assert_eq!(groups.len(), 2);
    }
}
