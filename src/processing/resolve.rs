use anyhow::{Context, Result};

use crate::cloud::rekognition::{FaceCollection, FaceMatch, UserMatch};
use crate::cloud::storage::ObjectStore;
use crate::processing::context::RunContext;
use crate::processing::outcome::{record, Outcome, Warning};

/// Identities found in one image, each once, in the order first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    users: Vec<String>,
}

impl MatchResult {
    /// Adds `user_id` unless already present. Returns whether it was added.
    pub fn insert(&mut self, user_id: &str) -> bool {
        if self.users.iter().any(|u| u == user_id) {
            return false;
        }
        self.users.push(user_id.to_string());
        true
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for MatchResult {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut result = MatchResult::default();
        for user in iter {
            result.insert(user.as_ref());
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageResolution {
    pub image: String,
    pub matches: MatchResult,
    pub warnings: Vec<Warning>,
}

fn best_face(matches: &[FaceMatch]) -> Option<&FaceMatch> {
    matches
        .iter()
        .reduce(|best, m| if m.similarity > best.similarity { m } else { best })
}

fn best_user(matches: &[UserMatch]) -> Option<&UserMatch> {
    matches
        .iter()
        .reduce(|best, m| if m.similarity > best.similarity { m } else { best })
}

pub async fn resolve_face<C: FaceCollection, S: ObjectStore>(
    ctx: &RunContext<C, S>,
    image: &str,
    face_id: &str,
) -> Outcome<String> {
    Outcome::flatten(try_resolve_face(ctx, image, face_id).await)
}

async fn try_resolve_face<C: FaceCollection, S: ObjectStore>(
    ctx: &RunContext<C, S>,
    image: &str,
    face_id: &str,
) -> Result<Outcome<String>> {
    let faces = ctx
        .collection
        .search_faces(face_id, ctx.settings.face_match_threshold)
        .await
        .with_context(|| format!("error searching faces (image: {})", image))?;
    let Some(matched) = best_face(&faces) else {
        return Ok(Outcome::Warning(Warning::NoFaceMatch {
            image: image.to_string(),
            face_id: face_id.to_string(),
        }));
    };
    tracing::debug!(face = %face_id, matched = %matched.face_id, similarity = matched.similarity, "face matched");

    let users = ctx
        .collection
        .search_users(&matched.face_id, ctx.settings.user_match_threshold)
        .await
        .with_context(|| format!("error searching users (image: {})", image))?;
    // The matched face comes from the collection, so a user is expected here.
    let Some(user) = best_user(&users) else {
        return Ok(Outcome::Warning(Warning::NoIdentityForFace {
            image: image.to_string(),
            face_id: face_id.to_string(),
        }));
    };
    Ok(Outcome::Ok(user.user_id.clone()))
}

pub async fn resolve_image<C: FaceCollection, S: ObjectStore>(
    ctx: &RunContext<C, S>,
    image: &str,
) -> Result<ImageResolution> {
    tracing::info!(image = %image, "processing image");
    let mut resolution = ImageResolution {
        image: image.to_string(),
        matches: MatchResult::default(),
        warnings: Vec::new(),
    };

    let faces = ctx
        .collection
        .index_faces(image, ctx.settings.input_max_faces)
        .await
        .context("error indexing faces")?;
    if faces.is_empty() {
        record(
            &mut resolution.warnings,
            Warning::NoFaceDetected {
                image: image.to_string(),
            },
        );
        return Ok(resolution);
    }

    for face in &faces {
        if let Some(user_id) = resolve_face(ctx, image, &face.face_id)
            .await
            .into_result(&mut resolution.warnings)?
        {
            resolution.matches.insert(&user_id);
        }
    }
    Ok(resolution)
}

async fn list_input_images<C: FaceCollection, S: ObjectStore>(
    ctx: &RunContext<C, S>,
) -> Result<Vec<String>> {
    ctx.storage
        .list_keys(&ctx.settings.input_prefix)
        .await
        .context("error getting input images")
}

pub async fn resolve_input_images<C: FaceCollection, S: ObjectStore>(
    ctx: &RunContext<C, S>,
) -> Result<Vec<ImageResolution>> {
    let mut resolutions = Vec::new();
    for image in list_input_images(ctx).await? {
        resolutions.push(resolve_image(ctx, &image).await?);
    }
    Ok(resolutions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_result_drops_repeats() {
        let result: MatchResult = ["alice", "bob", "alice", "carol"].into_iter().collect();
        assert_eq!(result.users(), ["alice", "bob", "carol"]);
    }

    #[test]
    fn insert_reports_novelty() {
        let mut result = MatchResult::default();
        assert!(result.is_empty());
        assert!(result.insert("alice"));
        assert!(!result.insert("alice"));
        assert_eq!(result.users().len(), 1);
    }

    #[test]
    fn best_match_prefers_similarity_then_order() {
        let faces = vec![
            FaceMatch { face_id: "a".to_string(), similarity: 91.0 },
            FaceMatch { face_id: "b".to_string(), similarity: 99.5 },
            FaceMatch { face_id: "c".to_string(), similarity: 99.5 },
        ];
        assert_eq!(best_face(&faces).unwrap().face_id, "b");
        assert!(best_face(&[]).is_none());

        let users = vec![
            UserMatch { user_id: "alice".to_string(), similarity: 80.0 },
            UserMatch { user_id: "bob".to_string(), similarity: 79.0 },
        ];
        assert_eq!(best_user(&users).unwrap().user_id, "alice");
    }
}
