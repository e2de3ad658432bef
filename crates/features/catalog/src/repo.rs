//! Data access for the `course` and `content` tables, plus the read-only
//! aggregations over `user`, `member` and `comment` that power the stats
//! endpoints.

use crate::dto::CourseSort;
use fxhash::FxHashMap;
use slms_database::{Database, DatabaseError, DatabaseErrorExt};
use slms_domain::constants::{COMMENT, CONTENT, COURSE, MEMBER, USER};
use slms_domain::models::{Course, CourseContent};
use slms_kernel::server::PageParams;
use surrealdb_types::SurrealValue;

const COURSE_FIELDS: &str =
    "record::id(id) AS id, name, description, price, teacher_id, created_at, updated_at";
const CONTENT_FIELDS: &str =
    "record::id(id) AS id, name, body, course_id, created_at, updated_at";

#[derive(Debug, SurrealValue)]
struct CourseRow {
    id: i64,
    name: String,
    description: String,
    price: i64,
    teacher_id: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            teacher_id: row.teacher_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct ContentRow {
    id: i64,
    name: String,
    body: String,
    course_id: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<ContentRow> for CourseContent {
    fn from(row: ContentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            body: row.body,
            course_id: row.course_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: i64,
}

/// Comment counts bucketed per content.
#[derive(Debug, SurrealValue)]
struct ContentBucket {
    content_id: i64,
    total: i64,
}

/// Member counts bucketed per course.
#[derive(Debug, SurrealValue)]
struct CourseBucket {
    course_id: i64,
    total: i64,
}

/// `(id, name)` projection used when ranking contents.
#[derive(Debug, SurrealValue)]
pub(crate) struct ContentName {
    pub id: i64,
    pub name: String,
}

/// `(id, name, price)` projection used by the popularity rankings.
#[derive(Debug, SurrealValue)]
pub(crate) struct CourseSummary {
    pub id: i64,
    pub name: String,
    pub price: i64,
}

/// Teacher block joined into the course detail.
#[derive(Debug, SurrealValue)]
pub(crate) struct TeacherRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Price aggregates over the whole catalog.
#[derive(Debug, SurrealValue)]
pub(crate) struct PriceAggregates {
    pub course_count: i64,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: f64,
}

/// Filters applied to the course listing; `sort` is typed so only
/// whitelisted column names ever reach the query string.
#[derive(Debug, Clone, Default)]
pub(crate) struct CourseFilter {
    pub search: Option<String>,
    pub price: Option<i64>,
    pub sort: CourseSort,
}

impl CourseFilter {
    fn where_clause(&self) -> String {
        let mut conditions = Vec::new();
        if self.search.is_some() {
            conditions.push("string::lowercase(name) CONTAINS string::lowercase($search)");
        }
        if self.price.is_some() {
            conditions.push("price = $price");
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub(crate) struct CourseRepo {
    db: Database,
}

impl CourseRepo {
    pub(crate) const fn new(db: Database) -> Self {
        Self { db }
    }

    /// One page of courses plus the total matching the same filter.
    pub(crate) async fn list(
        &self,
        filter: &CourseFilter,
        page: PageParams,
    ) -> Result<(Vec<Course>, u64), DatabaseError> {
        let where_clause = filter.where_clause();
        let sort = filter.sort.as_ref();

        let mut response = self
            .db
            .query(format!(
                "SELECT {COURSE_FIELDS} FROM {COURSE}{where_clause} \
                 ORDER BY {sort} LIMIT $limit START $skip"
            ))
            .query(format!("SELECT count() AS total FROM {COURSE}{where_clause} GROUP ALL"))
            .bind(("search", filter.search.clone()))
            .bind(("price", filter.price))
            .bind(("limit", page.limit_i64()))
            .bind(("skip", page.skip_i64()))
            .await
            .context("Listing courses")?;

        let courses =
            response.take::<Vec<CourseRow>>(0)?.into_iter().map(Course::from).collect::<Vec<_>>();
        let total = response.take::<Option<CountRow>>(1)?.map_or(0, |row| to_u64(row.total));

        Ok((courses, total))
    }

    pub(crate) async fn get(&self, id: i64) -> Result<Option<Course>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT {COURSE_FIELDS} FROM type::thing('{COURSE}', $id)"))
            .bind(("id", id))
            .await
            .context("Loading course")?;

        Ok(response.take::<Option<CourseRow>>(0)?.map(Course::from))
    }

    pub(crate) async fn create(
        &self,
        teacher_id: i64,
        name: String,
        description: String,
        price: i64,
    ) -> Result<Course, DatabaseError> {
        let id = self.db.next_id(COURSE).await?;
        let now = chrono::Utc::now().timestamp();

        self.db
            .query(format!(
                "CREATE type::thing('{COURSE}', $id) SET
                    name = $name,
                    description = $description,
                    price = $price,
                    teacher_id = $teacher_id,
                    created_at = $now,
                    updated_at = $now
                 RETURN NONE"
            ))
            .bind(("id", id))
            .bind(("name", name.clone()))
            .bind(("description", description.clone()))
            .bind(("price", price))
            .bind(("teacher_id", teacher_id))
            .bind(("now", now))
            .await
            .context("Creating course")?
            .check()
            .context("Creating course")?;

        Ok(Course { id, name, description, price, teacher_id, created_at: now, updated_at: now })
    }

    /// Member, content and comment counts for one course.
    pub(crate) async fn engagement_counts(
        &self,
        course_id: i64,
    ) -> Result<(u64, u64, u64), DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT count() AS total FROM {MEMBER} WHERE course_id = $course_id GROUP ALL"
            ))
            .query(format!(
                "SELECT count() AS total FROM {CONTENT} WHERE course_id = $course_id GROUP ALL"
            ))
            .query(format!(
                "SELECT count() AS total FROM {COMMENT} WHERE content_id IN \
                 (SELECT VALUE record::id(id) FROM {CONTENT} WHERE course_id = $course_id) \
                 GROUP ALL"
            ))
            .bind(("course_id", course_id))
            .await
            .context("Counting course engagement")?;

        let members = response.take::<Option<CountRow>>(0)?.map_or(0, |row| to_u64(row.total));
        let contents = response.take::<Option<CountRow>>(1)?.map_or(0, |row| to_u64(row.total));
        let comments = response.take::<Option<CountRow>>(2)?.map_or(0, |row| to_u64(row.total));

        Ok((members, contents, comments))
    }

    /// Contents of a course with their comment counts, most discussed
    /// first, ties broken by id.
    pub(crate) async fn contents_by_comment_count(
        &self,
        course_id: i64,
    ) -> Result<Vec<(ContentName, u64)>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT record::id(id) AS id, name FROM {CONTENT} WHERE course_id = $course_id"
            ))
            .query(format!(
                "SELECT content_id, count() AS total FROM {COMMENT} WHERE content_id IN \
                 (SELECT VALUE record::id(id) FROM {CONTENT} WHERE course_id = $course_id) \
                 GROUP BY content_id"
            ))
            .bind(("course_id", course_id))
            .await
            .context("Ranking contents by comments")?;

        let contents = response.take::<Vec<ContentName>>(0)?;
        let counts: Vec<ContentBucket> = response.take(1)?;
        let by_content: FxHashMap<i64, u64> =
            counts.into_iter().map(|row| (row.content_id, to_u64(row.total))).collect();

        let mut ranked = contents
            .into_iter()
            .map(|content| {
                let count = by_content.get(&content.id).copied().unwrap_or_default();
                (content, count)
            })
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));

        Ok(ranked)
    }

    /// Count, min, max and mean price over all courses; `None` for an
    /// empty catalog.
    pub(crate) async fn price_aggregates(&self) -> Result<Option<PriceAggregates>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT count() AS course_count, \
                        math::min(price) AS min_price, \
                        math::max(price) AS max_price, \
                        <float> math::mean(price) AS avg_price \
                 FROM {COURSE} GROUP ALL"
            ))
            .await
            .context("Aggregating course prices")?;

        Ok(response.take::<Option<PriceAggregates>>(0)?)
    }

    pub(crate) async fn courses_at_price(&self, price: i64) -> Result<Vec<Course>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {COURSE_FIELDS} FROM {COURSE} WHERE price = $price ORDER BY id"
            ))
            .bind(("price", price))
            .await
            .context("Loading courses by price")?;

        Ok(response.take::<Vec<CourseRow>>(0)?.into_iter().map(Course::from).collect())
    }

    /// Lightweight projection of every course, ordered by id.
    pub(crate) async fn summaries(&self) -> Result<Vec<CourseSummary>, DatabaseError> {
        let mut response = self
            .db
            .query(format!("SELECT record::id(id) AS id, name, price FROM {COURSE} ORDER BY id"))
            .await
            .context("Loading course summaries")?;

        Ok(response.take::<Vec<CourseSummary>>(0)?)
    }

    /// Member count per course; courses without members have no bucket.
    pub(crate) async fn member_counts(&self) -> Result<Vec<(i64, u64)>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT course_id, count() AS total FROM {MEMBER} GROUP BY course_id"
            ))
            .await
            .context("Counting members per course")?;

        let buckets: Vec<CourseBucket> = response.take(0)?;
        Ok(buckets.into_iter().map(|row| (row.course_id, to_u64(row.total))).collect())
    }

    /// Service-wide record counts: users (superusers excluded), courses,
    /// members and contents.
    pub(crate) async fn overview_counts(&self) -> Result<(u64, u64, u64, u64), DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT count() AS total FROM {USER} WHERE is_superuser = false GROUP ALL"
            ))
            .query(format!("SELECT count() AS total FROM {COURSE} GROUP ALL"))
            .query(format!("SELECT count() AS total FROM {MEMBER} GROUP ALL"))
            .query(format!("SELECT count() AS total FROM {CONTENT} GROUP ALL"))
            .await
            .context("Counting service records")?;

        let users = response.take::<Option<CountRow>>(0)?.map_or(0, |row| to_u64(row.total));
        let courses = response.take::<Option<CountRow>>(1)?.map_or(0, |row| to_u64(row.total));
        let members = response.take::<Option<CountRow>>(2)?.map_or(0, |row| to_u64(row.total));
        let contents = response.take::<Option<CountRow>>(3)?.map_or(0, |row| to_u64(row.total));

        Ok((users, courses, members, contents))
    }

    pub(crate) async fn teacher(&self, id: i64) -> Result<Option<TeacherRecord>, DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT record::id(id) AS id, username, email, first_name, last_name \
                 FROM type::thing('{USER}', $id)"
            ))
            .bind(("id", id))
            .await
            .context("Loading course teacher")?;

        Ok(response.take::<Option<TeacherRecord>>(0)?)
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

    /// One page of a course's contents plus the total.
    pub(crate) async fn contents_page(
        &self,
        course_id: i64,
        page: PageParams,
    ) -> Result<(Vec<CourseContent>, u64), DatabaseError> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {CONTENT_FIELDS} FROM {CONTENT} WHERE course_id = $course_id \
                 ORDER BY id LIMIT $limit START $skip"
            ))
            .query(format!(
                "SELECT count() AS total FROM {CONTENT} WHERE course_id = $course_id GROUP ALL"
            ))
            .bind(("course_id", course_id))
            .bind(("limit", page.limit_i64()))
            .bind(("skip", page.skip_i64()))
            .await
            .context("Listing course contents")?;

        let contents = response
            .take::<Vec<ContentRow>>(0)?
            .into_iter()
            .map(CourseContent::from)
            .collect::<Vec<_>>();
        let total = response.take::<Option<CountRow>>(1)?.map_or(0, |row| to_u64(row.total));

        Ok((contents, total))
    }

    pub(crate) async fn create_content(
        &self,
        course_id: i64,
        name: String,
        body: String,
    ) -> Result<CourseContent, DatabaseError> {
        let id = self.db.next_id(CONTENT).await?;
        let now = chrono::Utc::now().timestamp();

        self.db
            .query(format!(
                "CREATE type::thing('{CONTENT}', $id) SET
                    name = $name,
                    body = $body,
                    course_id = $course_id,
                    created_at = $now,
                    updated_at = $now
                 RETURN NONE"
            ))
            .bind(("id", id))
            .bind(("name", name.clone()))
            .bind(("body", body.clone()))
            .bind(("course_id", course_id))
            .bind(("now", now))
            .await
            .context("Creating course content")?
            .check()
            .context("Creating course content")?;

        Ok(CourseContent { id, name, body, course_id, created_at: now, updated_at: now })
    }
}
