//! Wire types for the catalog endpoints.

use serde::{Deserialize, Serialize};
use slms_domain::models::{Course, CourseContent};
use strum_macros::{AsRefStr, EnumString};
use utoipa::{IntoParams, ToSchema};

/// Listing shape for a course.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseOut {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub teacher_id: i64,
}

impl From<Course> for CourseOut {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            description: course.description,
            price: course.price,
            teacher_id: course.teacher_id,
        }
    }
}

/// The teacher block embedded in a course detail.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeacherOut {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A content ranked by how much discussion it attracted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TopContentOut {
    pub id: i64,
    pub name: String,
    pub comment_count: u64,
}

/// Full course detail with membership and discussion figures.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetailOut {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub teacher_id: i64,
    pub member_count: u64,
    pub content_count: u64,
    pub comment_count: u64,
    pub teacher: TeacherOut,
    /// Top three contents by comment count.
    pub top_contents: Vec<TopContentOut>,
}

/// Course creation body; the authenticated caller becomes the teacher.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CourseCreateIn {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
}

/// Listing shape for course content.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentOut {
    pub id: i64,
    pub name: String,
    pub body: String,
    pub course_id: i64,
}

impl From<CourseContent> for ContentOut {
    fn from(content: CourseContent) -> Self {
        Self {
            id: content.id,
            name: content.name,
            body: content.body,
            course_id: content.course_id,
        }
    }
}

/// Content creation body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ContentCreateIn {
    pub name: String,
    #[serde(default)]
    pub body: String,
}

/// A course with its member count, used by the popularity rankings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoursePopularityOut {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub member_count: u64,
}

/// Catalog-wide price and popularity statistics.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseStatsOut {
    pub course_count: u64,
    pub min_price: i64,
    pub max_price: i64,
    pub avg_price: f64,
    /// Courses at the minimum price.
    pub cheapest: Vec<CourseOut>,
    /// Courses at the maximum price.
    pub expensive: Vec<CourseOut>,
    /// Top five courses by member count.
    pub popular: Vec<CoursePopularityOut>,
    /// Bottom five courses by member count.
    pub unpopular: Vec<CoursePopularityOut>,
}

/// Record counts across the whole service.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OverviewOut {
    /// Registered accounts, superusers excluded.
    pub users: u64,
    pub courses: u64,
    pub members: u64,
    pub contents: u64,
}

/// Whitelisted course sort keys; anything else falls back to `id`.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CourseSort {
    #[default]
    Id,
    Name,
    Price,
}

/// Filters for the course listing.
#[derive(Default, Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct CourseListParams {
    /// Case-insensitive substring match on `name`.
    pub search: Option<String>,
    /// Exact price match.
    pub price: Option<i64>,
    /// Sort key: `id`, `name` or `price`. Unknown values sort by `id`.
    pub sort: Option<String>,
}

impl CourseListParams {
    /// The effective sort key; unknown input degrades to the default
    /// instead of erroring, matching the listing's lenient contract.
    #[must_use]
    pub fn sort_key(&self) -> CourseSort {
        self.sort.as_deref().map_or_else(CourseSort::default, |raw| raw.parse().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_keys_whitelist() {
        let params = |sort: &str| CourseListParams {
            sort: Some(sort.to_owned()),
            ..CourseListParams::default()
        };

        assert_eq!(params("price").sort_key(), CourseSort::Price);
        assert_eq!(params("name").sort_key(), CourseSort::Name);
        assert_eq!(params("id").sort_key(), CourseSort::Id);
        // Unknown keys silently fall back instead of failing the request.
        assert_eq!(params("teacher_id").sort_key(), CourseSort::Id);
        assert_eq!(params("; DROP TABLE course").sort_key(), CourseSort::Id);
        assert_eq!(CourseListParams::default().sort_key(), CourseSort::Id);
    }

    #[test]
    fn sort_key_renders_lowercase_column_names() {
        assert_eq!(CourseSort::Id.as_ref(), "id");
        assert_eq!(CourseSort::Name.as_ref(), "name");
        assert_eq!(CourseSort::Price.as_ref(), "price");
    }
}
