use slms_domain::models::{Course, User};

#[test]
fn course_display_joins_name_and_price() {
    let course = Course {
        id: 1,
        name: "Belajar Docker".to_owned(),
        description: "containers".to_owned(),
        price: 150_000,
        teacher_id: 1,
        created_at: 0,
        updated_at: 0,
    };

    assert_eq!(course.to_string(), "Belajar Docker : 150000");
}

#[test]
fn user_password_is_never_serialized() {
    let user = User {
        id: 7,
        username: "walter".to_owned(),
        email: "walter@example.com".to_owned(),
        first_name: "Walter".to_owned(),
        last_name: "Hartwell".to_owned(),
        password: "pbkdf2_sha256$390000$abc$def".to_owned(),
        is_staff: false,
        is_active: true,
        is_superuser: false,
        date_joined: 0,
    };

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
    assert_eq!(json["username"], "walter");
}

#[test]
fn user_deserializes_with_defaults() {
    let user: User = serde_json::from_value(serde_json::json!({
        "id": 3,
        "username": "skyler",
        "email": "skyler@example.com",
        "date_joined": 1_700_000_000
    }))
    .unwrap();

    assert!(user.is_active, "accounts default to active");
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
    assert_eq!(user.full_name(), "");
}

#[test]
fn full_name_trims_missing_parts() {
    let mut user: User = serde_json::from_value(serde_json::json!({
        "id": 3,
        "username": "skyler",
        "email": "skyler@example.com",
        "first_name": "Skyler",
        "date_joined": 0
    }))
    .unwrap();
    assert_eq!(user.full_name(), "Skyler");

    user.last_name = "White".to_owned();
    assert_eq!(user.full_name(), "Skyler White");
}
