//! Data access for the `member` table and the course-name lookups the
//! membership listing joins against.

use slms_database::{Database, DatabaseError, DatabaseErrorExt};
use slms_domain::constants::{COURSE, MEMBER};
use slms_domain::models::CourseMember;
use slms_domain::roles::MemberRole;
use slms_kernel::server::PageParams;
use surrealdb_types::SurrealValue;

const MEMBER_FIELDS: &str = "record::id(id) AS id, course_id, user_id, roles, created_at";

#[derive(Debug, SurrealValue)]
struct MemberRow {
    id: i64,
    course_id: i64,
    user_id: i64,
    roles: String,
    created_at: i64,
}

impl From<MemberRow> for CourseMember {
    fn from(row: MemberRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            user_id: row.user_id,
            // The schema constrains the column to valid codes.
            roles: row.roles.parse().unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: i64,
}

#[derive(Debug, SurrealValue)]
struct IdRow {
    id: i64,
}

/// `(id, name)` projection over courses.
#[derive(Debug, SurrealValue)]
struct CourseNameRow {
    id: i64,
    name: String,
}

/// Member counts bucketed per role code.
#[derive(Debug, SurrealValue)]
struct RoleBucket {
    roles: String,
    total: i64,
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub(crate) struct MemberRepo {
    db: Database,
}

impl MemberRepo {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    pub(crate) async fn course_exists(&self, course_id: i64) -> Result<bool, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT record::id(id) AS id FROM type::thing('{COURSE}', $id)"))
            .bind(("id", course_id))
            .await
            .context("Checking course existence")?;

        Ok(response.take::<Option<IdRow>>(0)?.is_some())
    }

    pub(crate) async fn find(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<CourseMember>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {MEMBER_FIELDS} FROM {MEMBER} \
                 WHERE course_id = $course_id AND user_id = $user_id LIMIT 1"
            ))
            .bind(("course_id", course_id))
            .bind(("user_id", user_id))
            .await
            .context("Loading membership")?;

        Ok(response.take::<Option<MemberRow>>(0)?.map(CourseMember::from))
    }

    pub(crate) async fn create(
        &self,
        course_id: i64,
        user_id: i64,
        role: MemberRole,
    ) -> Result<CourseMember, DatabaseError> {
        let id = self.db.next_id(MEMBER).await?;
        let now = chrono::Utc::now().timestamp();

        self.db
            .query(format!(
                "CREATE type::thing('{MEMBER}', $id) SET
                    course_id = $course_id,
                    user_id = $user_id,
                    roles = $roles,
                    created_at = $now
                 RETURN NONE"
            ))
            .bind(("id", id))
            .bind(("course_id", course_id))
            .bind(("user_id", user_id))
            .bind(("roles", role.as_str().to_owned()))
            .bind(("now", now))
            .await
            .context("Creating membership")?
            .check()
            .context("Creating membership")?;

        Ok(CourseMember { id, course_id, user_id, roles: role, created_at: now })
    }

    /// One page of a user's memberships plus their total.
    pub(crate) async fn page_for_user(
        &self,
        user_id: i64,
        page: PageParams,
    ) -> Result<(Vec<CourseMember>, u64), DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {MEMBER_FIELDS} FROM {MEMBER} WHERE user_id = $user_id \
                 ORDER BY id LIMIT $limit START $skip"
            ))
            .query(format!(
                "SELECT count() AS total FROM {MEMBER} WHERE user_id = $user_id GROUP ALL"
            ))
            .bind(("user_id", user_id))
            .bind(("limit", page.limit_i64()))
            .bind(("skip", page.skip_i64()))
            .await
            .context("Listing memberships")?;

        let members = response
            .take::<Vec<MemberRow>>(0)?
            .into_iter()
            .map(CourseMember::from)
            .collect::<Vec<_>>();
        let total = response.take::<Option<CountRow>>(1)?.map_or(0, |row| to_u64(row.total));

        Ok((members, total))
    }

    /// Names of the given courses, for joining into the listing.
    pub(crate) async fn course_names(
        &self,
        ids: Vec<i64>,
    ) -> Result<Vec<(i64, String)>, DatabaseError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = self
            .db
            .query(format!(
                "SELECT record::id(id) AS id, name FROM {COURSE} WHERE record::id(id) IN $ids"
            ))
            .bind(("ids", ids))
            .await
            .context("Loading course names")?;

        let rows = response.take::<Vec<CourseNameRow>>(0)?;
        Ok(rows.into_iter().map(|row| (row.id, row.name)).collect())
    }

    pub(crate) async fn total_members(&self) -> Result<u64, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT count() AS total FROM {MEMBER} GROUP ALL"))
            .await
            .context("Counting members")?;

        Ok(response.take::<Option<CountRow>>(0)?.map_or(0, |row| to_u64(row.total)))
    }

    /// Member counts per role code.
    pub(crate) async fn role_counts(&self) -> Result<Vec<(String, u64)>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT roles, count() AS total FROM {MEMBER} GROUP BY roles"))
            .await
            .context("Counting members per role")?;

        Ok(response
            .take::<Vec<RoleBucket>>(0)?
            .into_iter()
            .map(|row| (row.roles, to_u64(row.total)))
            .collect())
    }
}
