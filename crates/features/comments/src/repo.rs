//! Data access for the `comment` table and the content/membership lookups
//! guarding comment creation.

use slms_database::{Database, DatabaseError, DatabaseErrorExt};
use slms_domain::constants::{COMMENT, CONTENT, MEMBER};
use slms_domain::models::Comment;
use slms_kernel::server::PageParams;
use surrealdb_types::SurrealValue;

const COMMENT_FIELDS: &str = "record::id(id) AS id, comment, user_id, content_id, created_at";

#[derive(Debug, SurrealValue)]
struct CommentRow {
    id: i64,
    comment: String,
    user_id: i64,
    content_id: i64,
    created_at: i64,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            comment: row.comment,
            user_id: row.user_id,
            content_id: row.content_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: i64,
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub(crate) struct CommentRepo {
    db: Database,
}

impl CommentRepo {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    /// The id of the course owning a content, `None` for unknown contents.
    pub(crate) async fn content_course(
        &self,
        content_id: i64,
    ) -> Result<Option<i64>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT VALUE course_id FROM type::thing('{CONTENT}', $id)"))
            .bind(("id", content_id))
            .await
            .context("Resolving content course")?;

        Ok(response.take::<Option<i64>>(0)?)
    }

    pub(crate) async fn is_member(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT count() AS total FROM {MEMBER} \
                 WHERE course_id = $course_id AND user_id = $user_id GROUP ALL"
            ))
            .bind(("course_id", course_id))
            .bind(("user_id", user_id))
            .await
            .context("Checking course membership")?;

        Ok(response.take::<Option<CountRow>>(0)?.is_some_and(|row| row.total > 0))
    }

    pub(crate) async fn create(
        &self,
        content_id: i64,
        user_id: i64,
        comment: String,
    ) -> Result<Comment, DatabaseError> {
        let id = self.db.next_id(COMMENT).await?;
        let now = chrono::Utc::now().timestamp();

        self.db
            .query(format!(
                "CREATE type::thing('{COMMENT}', $id) SET
                    comment = $comment,
                    user_id = $user_id,
                    content_id = $content_id,
                    created_at = $now
                 RETURN NONE"
            ))
            .bind(("id", id))
            .bind(("comment", comment.clone()))
            .bind(("user_id", user_id))
            .bind(("content_id", content_id))
            .bind(("now", now))
            .await
            .context("Creating comment")?
            .check()
            .context("Creating comment")?;

        Ok(Comment { id, comment, user_id, content_id, created_at: now })
    }

    /// One page of a content's comments plus their total.
    pub(crate) async fn page_for_content(
        &self,
        content_id: i64,
        page: PageParams,
    ) -> Result<(Vec<Comment>, u64), DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {COMMENT_FIELDS} FROM {COMMENT} WHERE content_id = $content_id \
                 ORDER BY id LIMIT $limit START $skip"
            ))
            .query(format!(
                "SELECT count() AS total FROM {COMMENT} WHERE content_id = $content_id GROUP ALL"
            ))
            .bind(("content_id", content_id))
            .bind(("limit", page.limit_i64()))
            .bind(("skip", page.skip_i64()))
            .await
            .context("Listing comments")?;

        let comments =
            response.take::<Vec<CommentRow>>(0)?.into_iter().map(Comment::from).collect::<Vec<_>>();
        let total = response.take::<Option<CountRow>>(1)?.map_or(0, |row| to_u64(row.total));

        Ok((comments, total))
    }
}
