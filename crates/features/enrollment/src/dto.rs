//! Wire types for the enrollment endpoints.

use serde::Serialize;
use slms_domain::models::CourseMember;
use slms_domain::roles::MemberRole;
use utoipa::ToSchema;

/// A membership as returned by the enroll endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrollmentOut {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    /// Role code, `std` or `ast`.
    #[schema(value_type = String, example = "std")]
    pub roles: MemberRole,
}

impl From<CourseMember> for EnrollmentOut {
    fn from(member: CourseMember) -> Self {
        Self {
            id: member.id,
            course_id: member.course_id,
            user_id: member.user_id,
            roles: member.roles,
        }
    }
}

/// A membership of the current user, joined with the course name.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyCourseOut {
    pub id: i64,
    pub course_id: i64,
    pub user_id: i64,
    /// Role code, `std` or `ast`.
    #[schema(value_type = String, example = "std")]
    pub roles: MemberRole,
    pub course_name: String,
}

/// Member count for one role code.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleStatOut {
    /// Role code, `std` or `ast`.
    pub roles: String,
    pub total: u64,
}

/// Membership totals with the per-role breakdown.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberStatsOut {
    pub total_members: u64,
    pub role_stats: Vec<RoleStatOut>,
}
