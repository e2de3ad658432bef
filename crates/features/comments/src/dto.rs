//! Wire types for the comment endpoints.

use serde::{Deserialize, Serialize};
use slms_domain::models::Comment;
use utoipa::ToSchema;

/// Comment creation body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CommentIn {
    pub content_id: i64,
    pub comment: String,
}

/// Acknowledgement returned after posting a comment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentPostedOut {
    pub success: bool,
    pub comment_id: i64,
}

/// Listing shape for a comment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentOut {
    pub id: i64,
    pub comment: String,
    pub user_id: i64,
    pub content_id: i64,
}

impl From<Comment> for CommentOut {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            comment: comment.comment,
            user_id: comment.user_id,
            content_id: comment.content_id,
        }
    }
}
