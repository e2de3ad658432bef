use slms_domain::constants::{COMMENT, CONTENT, COURSE, MEMBER, USER};
use slms_domain::roles::MemberRole;

#[test]
fn constants_match_table_names() {
    assert_eq!(USER, "user");
    assert_eq!(COURSE, "course");
    assert_eq!(MEMBER, "member");
    assert_eq!(CONTENT, "content");
    assert_eq!(COMMENT, "comment");
}

#[test]
fn roles_use_short_codes() {
    assert_eq!(MemberRole::Student.as_str(), "std");
    assert_eq!(MemberRole::Assistant.to_string(), "ast");
    assert_eq!("std".parse::<MemberRole>().unwrap(), MemberRole::Student);
    assert_eq!("ast".parse::<MemberRole>().unwrap(), MemberRole::Assistant);
    assert_eq!(MemberRole::default(), MemberRole::Student);
}

#[test]
fn unknown_role_is_rejected() {
    let err = "teacher".parse::<MemberRole>().unwrap_err();
    assert_eq!(err.to_string(), "unknown member role: teacher");
}

#[test]
fn roles_serialize_as_codes() {
    assert_eq!(serde_json::to_value(MemberRole::Assistant).unwrap(), "ast");
    let role: MemberRole = serde_json::from_str("\"std\"").unwrap();
    assert_eq!(role, MemberRole::Student);
}
