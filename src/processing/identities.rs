use std::collections::HashSet;

use anyhow::Result;

use crate::cloud::rekognition::FaceCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    Created,
    AlreadyExists,
}

/// Run-scoped record of which users exist in the collection.
///
/// The service is listed once, on the first `ensure`, and never again for
/// the rest of the run. Users created through the registry are added to it.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    existing: Option<HashSet<String>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ensure<C: FaceCollection + ?Sized>(
        &mut self,
        collection: &C,
        user_id: &str,
    ) -> Result<IdentityStatus> {
        if self.existing.is_none() {
            let users = collection.list_users().await?;
            tracing::debug!(count = users.len(), "loaded existing users");
            self.existing = Some(users.into_iter().collect());
        }
        let existing = self.existing.get_or_insert_with(HashSet::new);

        if existing.contains(user_id) {
            tracing::info!("User {} already exists", user_id);
            return Ok(IdentityStatus::AlreadyExists);
        }

        collection.create_user(user_id).await?;
        existing.insert(user_id.to_string());
        tracing::info!("User {} created", user_id);
        Ok(IdentityStatus::Created)
    }

    pub fn is_loaded(&self) -> bool {
        self.existing.is_some()
    }
}
