use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a user holds inside a course.
///
/// Stored and serialized as the short codes `std` / `ast` used by the
/// member table and the CSV import format.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberRole {
    #[default]
    #[serde(rename = "std")]
    Student,
    #[serde(rename = "ast")]
    Assistant,
}

impl MemberRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "std",
            Self::Assistant => "ast",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = InvalidRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "std" => Ok(Self::Student),
            "ast" => Ok(Self::Assistant),
            other => Err(InvalidRole(other.to_owned())),
        }
    }
}

/// Rejected role code, carries the offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRole(pub String);

impl fmt::Display for InvalidRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown member role: {}", self.0)
    }
}

impl std::error::Error for InvalidRole {}
