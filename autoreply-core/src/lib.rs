pub mod config;
pub mod error;
pub mod error_utils;
pub mod form;
pub mod identity;
pub mod keywords;
pub mod submission;
pub mod types;
pub mod validation;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use form::{AutoresponderForm, FormCommand, FormEffect, Notice, NoticeKind, SubmissionPhase};
pub use identity::{IdentityResolver, OwnerId, ProfileLookup, TokenSource};
pub use keywords::KeywordSet;
pub use submission::{AutoresponderStore, SubmissionController};
pub use types::*;
pub use validation::FormValidator;
