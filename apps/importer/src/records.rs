//! Row shapes of the three seed files. Header names follow the legacy
//! export, including its `firstname`/`lastname` spelling.

use serde::Deserialize;

/// Row of `user-data.csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

/// Row of `course-data.csv`. The teacher is referenced by username.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRecord {
    pub name: String,
    pub price: i64,
    pub description: String,
    pub teacher: String,
}

/// Row of `member-data.csv`. Ids reference the row positions the user
/// and course imports forced.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    pub course_id: i64,
    pub user_id: i64,
    pub roles: String,
}
