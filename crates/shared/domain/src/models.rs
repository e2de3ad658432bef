//! Canonical record shapes for the LMS tables.
//!
//! Repositories and the importer bind these fields when writing; read
//! paths project narrower DTOs. Timestamps are UTC epoch seconds.

use crate::roles::MemberRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered account. `password` holds the PBKDF2 hash, never the
/// plain text, and is skipped on serialization so it cannot leak into
/// API payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub date_joined: i64,
}

const fn default_true() -> bool {
    true
}

impl User {
    /// `"{first_name} {last_name}"`, trimmed when either part is empty.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_owned()
    }
}

/// A course owned by a teacher. `price` is a non-negative amount in the
/// smallest currency unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub teacher_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.price)
    }
}

/// An enrollment linking a user to a course with a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseMember {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub roles: MemberRole,
    pub created_at: i64,
}

/// A unit of course material. Comments attach to contents, not courses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseContent {
    pub id: i64,
    pub name: String,
    pub body: String,
    pub course_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A comment left by a course member on a piece of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub comment: String,
    pub user_id: i64,
    pub content_id: i64,
    pub created_at: i64,
}
