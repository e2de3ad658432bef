//! Comments slice.
//!
//! Owns the discussion attached to course contents. Posting requires
//! membership in the course owning the content; reading does not.
//! Publishes [`CommentPosted`](slms_domain::events::CommentPosted).

mod dto;
mod error;
mod repo;
mod routes;

pub use dto::{CommentIn, CommentOut, CommentPostedOut};
pub use error::{CommentsError, CommentsErrorExt};
pub use routes::router;

use crate::repo::CommentRepo;
use slms_database::Database;
use slms_domain::config::ApiConfig;
use slms_domain::events::CommentPosted;
use slms_domain::registry::{FeatureSlice, InitializedSlice};
use slms_event_bus::EventBus;
use slms_kernel::server::{Page, PageParams};
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
struct CommentsInner {
    repo: CommentRepo,
    events: EventBus,
}

/// Comments feature state.
#[derive(Debug, Clone)]
pub struct Comments {
    inner: Arc<CommentsInner>,
}

impl FeatureSlice for Comments {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        "comments"
    }
}

/// Initializes the comments slice against the shared database and bus.
///
/// # Errors
/// Currently infallible; kept fallible so wiring changes do not ripple
/// through the facade.
pub fn init(
    _config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, CommentsError> {
    let slice = Comments {
        inner: Arc::new(CommentsInner {
            repo: CommentRepo::new(database.clone()),
            events: events.clone(),
        }),
    };

    info!("Comments slice initialized");

    Ok(InitializedSlice::new(slice))
}

impl Comments {
    /// Posts a comment on a content as the authenticated caller.
    ///
    /// # Errors
    /// [`CommentsError::NotFound`] for an unknown content,
    /// [`CommentsError::Forbidden`] when the caller is not a member of the
    /// course owning it.
    pub async fn post_comment(
        &self,
        user_id: i64,
        input: CommentIn,
    ) -> Result<CommentPostedOut, CommentsError> {
        let Some(course_id) = self.inner.repo.content_course(input.content_id).await? else {
            return Err(content_not_found());
        };

        if !self.inner.repo.is_member(course_id, user_id).await? {
            return Err(CommentsError::Forbidden {
                message: "you are not authorized to create a comment in this course".into(),
                context: None,
            });
        }

        let comment = self.inner.repo.create(input.content_id, user_id, input.comment).await?;

        if let Err(err) = self.inner.events.publish(CommentPosted {
            comment_id: comment.id,
            content_id: comment.content_id,
            user_id,
        }) {
            warn!(error = %err, comment = comment.id, "Failed to publish CommentPosted");
        }

        Ok(CommentPostedOut { success: true, comment_id: comment.id })
    }

    /// One page of a content's comments, oldest first.
    ///
    /// # Errors
    /// [`CommentsError::NotFound`] for an unknown content.
    pub async fn list_comments(
        &self,
        content_id: i64,
        page: PageParams,
    ) -> Result<Page<CommentOut>, CommentsError> {
        if self.inner.repo.content_course(content_id).await?.is_none() {
            return Err(content_not_found());
        }

        let page = page.normalize();
        let (comments, total) = self.inner.repo.page_for_content(content_id, page).await?;

        Ok(Page::new(comments.into_iter().map(CommentOut::from).collect(), total, page.limit))
    }
}

fn content_not_found() -> CommentsError {
    CommentsError::NotFound { message: "content not found".into(), context: None }
}
