//! Best-effort owner identification for saved autoresponders.
//!
//! The store needs a `user_id` for every row but there is no session model
//! here. The owner is derived from an access token obtained elsewhere. When
//! the profile lookup fails the resolver degrades to a token prefix, and
//! without a token to a fixed placeholder. Resolution never fails.

use crate::error::CoreError;
use crate::types::PageProfile;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Number of leading token characters used for the fallback identifier.
pub const TOKEN_PREFIX_LEN: usize = 20;

/// Identifier used when neither a profile nor a token is available.
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Read access to the locally stored access token.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Result<Option<String>, CoreError>;
}

/// Remote lookup of the page behind an access token.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn page_profile(&self, access_token: &str) -> Result<PageProfile, CoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerId {
    Page(String),
    Token(String),
    Anonymous,
}

impl OwnerId {
    /// Owner derived from the first 20 characters of the access token.
    ///
    /// Surrounding whitespace is not part of the token: a value stored with a
    /// trailing newline yields the same owner as the clean value, and the
    /// same token is what gets sent to the profile lookup.
    pub fn from_token(token: &str) -> Self {
        OwnerId::Token(token.trim().chars().take(TOKEN_PREFIX_LEN).collect())
    }

    /// True when the identifier came from the profile endpoint.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, OwnerId::Page(_))
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerId::Page(id) => write!(f, "page_{}", id),
            OwnerId::Token(prefix) => write!(f, "token_{}", prefix),
            OwnerId::Anonymous => f.write_str(ANONYMOUS_OWNER),
        }
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    lookup: Arc<dyn ProfileLookup>,
}

impl IdentityResolver {
    pub fn new(lookup: Arc<dyn ProfileLookup>) -> Self {
        Self { lookup }
    }

    pub async fn resolve(&self, access_token: Option<&str>) -> OwnerId {
        let token = match access_token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                warn!("No access token stored, using placeholder owner");
                return OwnerId::Anonymous;
            }
        };

        match self.lookup.page_profile(token).await {
            Ok(profile) => {
                if let Some(account) = &profile.instagram_business_account {
                    debug!(
                        "Page {} is linked to business account {}",
                        profile.id, account.id
                    );
                }
                info!(
                    "Resolved owner from page {} ({})",
                    profile.id,
                    profile.name.as_deref().unwrap_or("unnamed")
                );
                OwnerId::Page(profile.id)
            }
            Err(e) => {
                warn!("Profile lookup failed, falling back to token owner: {}", e);
                OwnerId::from_token(token)
            }
        }
    }
}
