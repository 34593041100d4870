//! HTTP request handlers for the feed service.

pub mod comment_handler;
pub mod metrics;
pub mod publication_handler;

use crate::errors::FeedError;
use axum::extract::rejection::JsonRejection;
use axum::Json;
use common::identity::CallerId;

pub use comment_handler::{create_comment, delete_comment, get_comment, list_comments, update_comment};
pub use metrics::metrics_handler;
pub use publication_handler::{
    create_publication, delete_publication, get_publication, health_check, list_publications,
    list_user_publications, update_publication,
};

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, FeedError> {
    payload
        .map(|Json(body)| body)
        .map_err(|_| FeedError::Validation("invalid JSON".to_string()))
}

/// 403 unless the caller owns the record.
fn ensure_owner(caller: &CallerId, owner: &str) -> Result<(), FeedError> {
    if caller.as_str() == owner {
        Ok(())
    } else {
        Err(FeedError::Forbidden)
    }
}
