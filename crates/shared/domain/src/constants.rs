//! Table names shared by repositories, migrations and the importer.

pub const USER: &str = "user";
pub const COURSE: &str = "course";
pub const MEMBER: &str = "member";
pub const CONTENT: &str = "content";
pub const COMMENT: &str = "comment";
