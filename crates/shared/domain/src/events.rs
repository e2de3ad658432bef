//! Events published on the shared bus by feature slices.
//!
//! Consumers must not assume delivery: publishing to a bus with no
//! subscribers drops the event silently.

/// A new account was created through registration or import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistered {
    pub user_id: i64,
    pub username: String,
}

/// A course was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCreated {
    pub course_id: i64,
    pub teacher_id: i64,
    pub name: String,
}

/// A user joined a course for the first time. Re-enrollment attempts
/// return the existing membership and do not publish this event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEnrolled {
    pub member_id: i64,
    pub course_id: i64,
    pub user_id: i64,
}

/// A comment was posted on course content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPosted {
    pub comment_id: i64,
    pub content_id: i64,
    pub user_id: i64,
}
