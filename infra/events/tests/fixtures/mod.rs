//! Standalone event shapes mirroring the ones the feature slices publish.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enrolled {
    pub member_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posted {
    pub comment_id: i64,
}
