use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_rekognition::types::{Image, S3Object};

use crate::stack::outputs::StackInfo;

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFace {
    pub face_id: String,
    pub source_image: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FaceMatch {
    pub face_id: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserMatch {
    pub user_id: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociationResult {
    pub associated: Vec<String>,
    pub rejected: Vec<(String, Vec<String>)>,
}

/// The face recognition operations the matching pipeline relies on. All of
/// them are scoped to a single collection chosen at construction.
#[async_trait]
pub trait FaceCollection: Send + Sync {
    /// Detects up to `max_faces` faces in a stored image and adds them to the
    /// collection, most prominent first.
    async fn index_faces(&self, image: &str, max_faces: i32) -> Result<Vec<IndexedFace>>;

    async fn search_faces(&self, face_id: &str, threshold: f32) -> Result<Vec<FaceMatch>>;

    async fn search_users(&self, face_id: &str, threshold: f32) -> Result<Vec<UserMatch>>;

    async fn list_users(&self) -> Result<Vec<String>>;

    async fn create_user(&self, user_id: &str) -> Result<()>;

    async fn associate_faces(
        &self,
        user_id: &str,
        face_ids: &[String],
        threshold: f32,
    ) -> Result<AssociationResult>;
}

pub struct RekognitionCollection {
    client: aws_sdk_rekognition::Client,
    bucket_name: String,
    collection_id: String,
}

impl RekognitionCollection {
    pub fn new(config: &SdkConfig, stack: &StackInfo) -> Self {
        Self {
            client: aws_sdk_rekognition::Client::new(config),
            bucket_name: stack.bucket_name.clone(),
            collection_id: stack.collection_id.clone(),
        }
    }

    fn stored_image(&self, key: &str) -> Image {
        Image::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(&self.bucket_name)
                    .name(key)
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl FaceCollection for RekognitionCollection {
    async fn index_faces(&self, image: &str, max_faces: i32) -> Result<Vec<IndexedFace>> {
        let resp = self
            .client
            .index_faces()
            .collection_id(&self.collection_id)
            .image(self.stored_image(image))
            .max_faces(max_faces)
            .send()
            .await
            .with_context(|| format!("error indexing faces (image: {})", image))?;

        Ok(resp
            .face_records()
            .iter()
            .filter_map(|record| record.face().and_then(|face| face.face_id()))
            .map(|face_id| IndexedFace {
                face_id: face_id.to_string(),
                source_image: image.to_string(),
            })
            .collect())
    }

    async fn search_faces(&self, face_id: &str, threshold: f32) -> Result<Vec<FaceMatch>> {
        let resp = self
            .client
            .search_faces()
            .collection_id(&self.collection_id)
            .face_id(face_id)
            .face_match_threshold(threshold)
            .send()
            .await
            .with_context(|| format!("error searching faces (face: {})", face_id))?;

        Ok(resp
            .face_matches()
            .iter()
            .filter_map(|m| {
                let matched = m.face()?.face_id()?;
                Some(FaceMatch {
                    face_id: matched.to_string(),
                    similarity: m.similarity().unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn search_users(&self, face_id: &str, threshold: f32) -> Result<Vec<UserMatch>> {
        let resp = self
            .client
            .search_users()
            .collection_id(&self.collection_id)
            .face_id(face_id)
            .user_match_threshold(threshold)
            .send()
            .await
            .with_context(|| format!("error searching users (face: {})", face_id))?;

        Ok(resp
            .user_matches()
            .iter()
            .filter_map(|m| {
                let user_id = m.user()?.user_id()?;
                Some(UserMatch {
                    user_id: user_id.to_string(),
                    similarity: m.similarity().unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn list_users(&self) -> Result<Vec<String>> {
        let mut users = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut req = self.client.list_users().collection_id(&self.collection_id);
            if let Some(t) = token.as_deref() {
                req = req.next_token(t);
            }
            let resp = req
                .send()
                .await
                .context("error requesting existing users")?;

            users.extend(
                resp.users()
                    .iter()
                    .filter_map(|user| user.user_id())
                    .map(String::from),
            );

            match resp.next_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(users)
    }

    async fn create_user(&self, user_id: &str) -> Result<()> {
        self.client
            .create_user()
            .collection_id(&self.collection_id)
            .user_id(user_id)
            .send()
            .await
            .with_context(|| format!("error creating user {}", user_id))?;
        Ok(())
    }

    async fn associate_faces(
        &self,
        user_id: &str,
        face_ids: &[String],
        threshold: f32,
    ) -> Result<AssociationResult> {
        let resp = self
            .client
            .associate_faces()
            .collection_id(&self.collection_id)
            .user_id(user_id)
            .set_face_ids(Some(face_ids.to_vec()))
            .user_match_threshold(threshold)
            .send()
            .await
            .with_context(|| format!("error associating faces to user {}", user_id))?;

        Ok(AssociationResult {
            associated: resp
                .associated_faces()
                .iter()
                .filter_map(|face| face.face_id())
                .map(String::from)
                .collect(),
            rejected: resp
                .unsuccessful_face_associations()
                .iter()
                .map(|failure| {
                    (
                        failure.face_id().unwrap_or_default().to_string(),
                        failure
                            .reasons()
                            .iter()
                            .map(|reason| reason.as_str().to_string())
                            .collect(),
                    )
                })
                .collect(),
        })
    }
}
