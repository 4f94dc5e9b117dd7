use crate::error::CoreError;
use crate::error_utils::ErrorExt;
use crate::form::{AutoresponderForm, FormCommand, FormEffect};
use crate::identity::{IdentityResolver, OwnerId, ProfileLookup, TokenSource};
use crate::types::{AutoresponderRecord, NewAutoresponder};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Backend table the finished configuration is written to.
#[async_trait]
pub trait AutoresponderStore: Send + Sync {
    async fn insert(&self, row: NewAutoresponder) -> Result<AutoresponderRecord, CoreError>;
}

/// Runs the network half of a submission: identity resolution, then the insert.
#[derive(Clone)]
pub struct SubmissionController {
    tokens: Arc<dyn TokenSource>,
    resolver: IdentityResolver,
    store: Arc<dyn AutoresponderStore>,
}

impl SubmissionController {
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        lookup: Arc<dyn ProfileLookup>,
        store: Arc<dyn AutoresponderStore>,
    ) -> Self {
        Self {
            tokens,
            resolver: IdentityResolver::new(lookup),
            store,
        }
    }

    pub async fn resolve_identity(&self) -> OwnerId {
        let token = match self.tokens.access_token() {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read stored access token: {}", e);
                None
            }
        };
        self.resolver.resolve(token.as_deref()).await
    }

    pub async fn persist(&self, row: NewAutoresponder) -> Result<AutoresponderRecord, CoreError> {
        info!(
            "Saving autoresponder '{}' for post {} as {}",
            row.name, row.post_id, row.user_id
        );
        self.store.insert(row).await.map_err(|e| {
            e.log_error();
            e
        })
    }

    /// Drives `form` through a whole submission and returns the last effect.
    pub async fn submit(&self, form: &mut AutoresponderForm) -> FormEffect {
        let mut effect = form.update(FormCommand::Submit);
        loop {
            effect = match effect {
                FormEffect::ResolveIdentity => {
                    let owner = self.resolve_identity().await;
                    form.update(FormCommand::IdentityResolved(owner))
                }
                FormEffect::Persist(row) => match self.persist(row).await {
                    Ok(record) => form.update(FormCommand::PersistSucceeded(record)),
                    Err(e) => form.update(FormCommand::PersistFailed(e.to_string())),
                },
                other => return other,
            };
        }
    }
}
