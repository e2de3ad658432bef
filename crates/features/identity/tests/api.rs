use slms_database::Database;
use slms_domain::config::ApiConfig;
use slms_domain::events::UserRegistered;
use slms_event_bus::EventBus;
use slms_identity::{Identity, IdentityError, RefreshIn, RegisterIn, SignInIn};
use slms_kernel::prelude::*;
use slms_kernel::security::verify_password;

async fn state_with(config: ApiConfig) -> ApiState {
    let database = Database::builder()
        .url("mem://")
        .session("slms_identity", "api")
        .init()
        .await
        .unwrap();
    let events = EventBus::new();
    let slice = slms_identity::init(&config, &database, &events).unwrap();

    ApiState::builder()
        .config(config)
        .db(database)
        .events(events)
        .register_slice(slice)
        .build()
        .unwrap()
}

async fn state() -> ApiState {
    state_with(ApiConfig::default()).await
}

fn register_input(username: &str) -> RegisterIn {
    RegisterIn {
        username: username.to_owned(),
        email: format!("{username}@example.com"),
        password: "s3curepass".to_owned(),
        first_name: String::new(),
        last_name: String::new(),
    }
}

#[test]
fn register_body_defaults_the_optional_names() {
    let input: RegisterIn = serde_json::from_value(serde_json::json!({
        "username": "walter",
        "email": "walter@example.com",
        "password": "s3curepass"
    }))
    .unwrap();

    assert!(input.first_name.is_empty());
    assert!(input.last_name.is_empty());
}

#[tokio::test]
async fn register_creates_account_and_publishes_event() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();
    let mut rx = state.events.subscribe::<UserRegistered>().unwrap();

    let created = slice.register(register_input("walter")).await.unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.username, "walter");
    assert_eq!(created.email, "walter@example.com");

    let event = rx.try_recv().unwrap();
    assert_eq!(*event, UserRegistered { user_id: 1, username: "walter".to_owned() });

    // The stored password is a salted hash that verifies, not plain text.
    let stored = state
        .database
        .query("SELECT VALUE password FROM type::thing('user', $id)")
        .bind(("id", 1_i64))
        .await
        .unwrap()
        .take::<Option<String>>(0)
        .unwrap()
        .unwrap();
    assert_ne!(stored, "s3curepass");
    assert!(verify_password("s3curepass", &stored).unwrap());
}

#[tokio::test]
async fn register_rejects_duplicate_username() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();

    slice.register(register_input("walter")).await.unwrap();
    let err = slice.register(register_input("walter")).await.unwrap_err();

    assert!(matches!(err, IdentityError::Conflict { .. }));
}

#[tokio::test]
async fn register_enforces_username_and_password_rules() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();

    assert!(matches!(
        slice.register(register_input("walt")).await,
        Err(IdentityError::Validation { .. })
    ));

    let mut short_password = register_input("walter");
    short_password.password = "wh1t3".to_owned();
    assert!(matches!(
        slice.register(short_password).await,
        Err(IdentityError::Validation { .. })
    ));

    let mut no_digit = register_input("walter");
    no_digit.password = "lettersonly".to_owned();
    assert!(matches!(slice.register(no_digit).await, Err(IdentityError::Validation { .. })));
}

#[tokio::test]
async fn closed_registration_is_forbidden() {
    let mut config = ApiConfig::default();
    config.security.register.open = false;

    let state = state_with(config).await;
    let slice = state.try_get_slice::<Identity>().unwrap();

    let err = slice.register(register_input("walter")).await.unwrap_err();
    assert!(matches!(err, IdentityError::Forbidden { .. }));
}

#[tokio::test]
async fn sign_in_issues_verifiable_tokens() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();
    slice.register(register_input("walter")).await.unwrap();

    let pair = slice
        .sign_in(
            &state.tokens,
            SignInIn { username: "walter".to_owned(), password: "s3curepass".to_owned() },
        )
        .await
        .unwrap();

    let claims = state.tokens.verify_access(&pair.access).unwrap();
    assert_eq!(claims.sub, 1);
    assert_eq!(claims.username, "walter");
    assert!(state.tokens.verify_refresh(&pair.refresh).is_ok());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_yield_the_same_error() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();
    slice.register(register_input("walter")).await.unwrap();

    let wrong = slice
        .sign_in(
            &state.tokens,
            SignInIn { username: "walter".to_owned(), password: "wrongpass1".to_owned() },
        )
        .await
        .unwrap_err();
    let unknown = slice
        .sign_in(
            &state.tokens,
            SignInIn { username: "gus".to_owned(), password: "s3curepass".to_owned() },
        )
        .await
        .unwrap_err();

    // No user enumeration through differing messages.
    assert_eq!(wrong.to_string(), unknown.to_string());
    assert!(matches!(wrong, IdentityError::Unauthorized { .. }));
    assert!(matches!(unknown, IdentityError::Unauthorized { .. }));
}

#[tokio::test]
async fn inactive_accounts_cannot_sign_in() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();
    slice.register(register_input("walter")).await.unwrap();

    state
        .database
        .query("UPDATE type::thing('user', $id) SET is_active = false")
        .bind(("id", 1_i64))
        .await
        .unwrap()
        .check()
        .unwrap();

    let err = slice
        .sign_in(
            &state.tokens,
            SignInIn { username: "walter".to_owned(), password: "s3curepass".to_owned() },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::Unauthorized { .. }));
}

#[tokio::test]
async fn refresh_exchanges_tokens_but_rejects_access_tokens() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();
    slice.register(register_input("walter")).await.unwrap();

    let pair = slice
        .sign_in(
            &state.tokens,
            SignInIn { username: "walter".to_owned(), password: "s3curepass".to_owned() },
        )
        .await
        .unwrap();

    let refreshed =
        slice.refresh(&state.tokens, RefreshIn { refresh: pair.refresh }).await.unwrap();
    assert_eq!(state.tokens.verify_access(&refreshed.access).unwrap().sub, 1);

    let err =
        slice.refresh(&state.tokens, RefreshIn { refresh: pair.access }).await.unwrap_err();
    assert!(matches!(err, IdentityError::Unauthorized { .. }));
}

#[tokio::test]
async fn list_users_filters_and_paginates() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();
    for name in ["walter", "jesse", "skyler"] {
        slice.register(register_input(name)).await.unwrap();
    }

    let all = slice.list_users(None, PageParams::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.per_page, 5);
    assert_eq!(all.items.len(), 3);
    // Ordered by id, i.e. registration order.
    assert_eq!(all.items[0].username, "walter");

    let filtered = slice.list_users(Some("AL"), PageParams::default()).await.unwrap();
    assert_eq!(filtered.total, 1);
    assert_eq!(filtered.items[0].username, "walter");

    let second_page =
        slice.list_users(None, PageParams { skip: 2, limit: 2 }).await.unwrap();
    assert_eq!(second_page.total, 3);
    assert_eq!(second_page.per_page, 2);
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].username, "skyler");
}

#[tokio::test]
async fn profile_returns_the_callers_details() {
    let state = state().await;
    let slice = state.try_get_slice::<Identity>().unwrap();

    let mut input = register_input("walter");
    input.first_name = "Walter".to_owned();
    input.last_name = "White".to_owned();
    slice.register(input).await.unwrap();

    let profile = slice.profile(1).await.unwrap();
    assert_eq!(profile.username, "walter");
    assert_eq!(profile.first_name, "Walter");
    assert_eq!(profile.last_name, "White");

    let err = slice.profile(999).await.unwrap_err();
    assert!(matches!(err, IdentityError::Unauthorized { .. }));
}
