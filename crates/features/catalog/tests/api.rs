use slms_catalog::{Catalog, CatalogError, ContentCreateIn, CourseCreateIn, CourseListParams};
use slms_database::Database;
use slms_domain::config::ApiConfig;
use slms_domain::events::CourseCreated;
use slms_event_bus::EventBus;
use slms_kernel::prelude::*;

async fn state() -> ApiState {
    let config = ApiConfig::default();
    let database = Database::builder()
        .url("mem://")
        .session("slms_catalog", "api")
        .init()
        .await
        .unwrap();
    let events = EventBus::new();
    let slice = slms_catalog::init(&config, &database, &events).unwrap();

    ApiState::builder()
        .config(config)
        .db(database)
        .events(events)
        .register_slice(slice)
        .build()
        .unwrap()
}

async fn seed_user(state: &ApiState, id: i64, username: &str) {
    state
        .database
        .query(
            "CREATE type::thing('user', $id) SET
                username = $username,
                password = 'not-a-real-hash',
                email = $email,
                first_name = 'Jane',
                last_name = 'Doe',
                date_joined = 0
             RETURN NONE",
        )
        .bind(("id", id))
        .bind(("username", username.to_owned()))
        .bind(("email", format!("{username}@example.com")))
        .await
        .unwrap()
        .check()
        .unwrap();
}

async fn seed_member(state: &ApiState, id: i64, course_id: i64, user_id: i64) {
    state
        .database
        .query(
            "CREATE type::thing('member', $id) SET
                course_id = $course_id,
                user_id = $user_id,
                roles = 'std',
                created_at = 0
             RETURN NONE",
        )
        .bind(("id", id))
        .bind(("course_id", course_id))
        .bind(("user_id", user_id))
        .await
        .unwrap()
        .check()
        .unwrap();
}

async fn seed_comment(state: &ApiState, id: i64, content_id: i64, user_id: i64) {
    state
        .database
        .query(
            "CREATE type::thing('comment', $id) SET
                comment = 'nice one',
                user_id = $user_id,
                content_id = $content_id,
                created_at = 0
             RETURN NONE",
        )
        .bind(("id", id))
        .bind(("content_id", content_id))
        .bind(("user_id", user_id))
        .await
        .unwrap()
        .check()
        .unwrap();
}

fn course_input(name: &str, price: i64) -> CourseCreateIn {
    CourseCreateIn {
        name: name.to_owned(),
        description: format!("All about {name}"),
        price,
    }
}

fn search(term: &str) -> CourseListParams {
    CourseListParams { search: Some(term.to_owned()), ..CourseListParams::default() }
}

#[tokio::test]
async fn create_course_assigns_the_caller_as_teacher() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    let mut rx = state.events.subscribe::<CourseCreated>().unwrap();
    seed_user(&state, 1, "walter").await;

    let created = slice.create_course(1, course_input("Chemistry", 250)).await.unwrap();

    assert_eq!(created.id, 1);
    assert_eq!(created.name, "Chemistry");
    assert_eq!(created.price, 250);
    assert_eq!(created.teacher_id, 1);

    let event = rx.try_recv().unwrap();
    assert_eq!(
        *event,
        CourseCreated { course_id: 1, teacher_id: 1, name: "Chemistry".to_owned() }
    );
}

#[tokio::test]
async fn create_course_validates_name_and_price() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();

    let err = slice.create_course(1, course_input("   ", 100)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));

    let err = slice.create_course(1, course_input("Chemistry", -1)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));
}

#[tokio::test]
async fn listing_filters_searches_and_paginates() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    seed_user(&state, 1, "walter").await;
    slice.create_course(1, course_input("Rust Basics", 100)).await.unwrap();
    slice.create_course(1, course_input("Advanced Rust", 300)).await.unwrap();
    slice.create_course(1, course_input("Cooking", 100)).await.unwrap();

    let all =
        slice.list_courses(&CourseListParams::default(), PageParams::default()).await.unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.per_page, 5);
    // Ordered by id, i.e. creation order.
    assert_eq!(all.items.iter().map(|c| c.id).collect::<Vec<_>>(), [1, 2, 3]);

    // Search is a case-insensitive substring match on the name.
    let rust = slice.list_courses(&search("RUST"), PageParams::default()).await.unwrap();
    assert_eq!(rust.total, 2);
    assert_eq!(rust.items.iter().map(|c| c.id).collect::<Vec<_>>(), [1, 2]);

    let cheap = slice
        .list_courses(
            &CourseListParams { price: Some(100), ..CourseListParams::default() },
            PageParams::default(),
        )
        .await
        .unwrap();
    assert_eq!(cheap.items.iter().map(|c| c.id).collect::<Vec<_>>(), [1, 3]);

    let second_page = slice
        .list_courses(&CourseListParams::default(), PageParams { skip: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(second_page.total, 3);
    assert_eq!(second_page.per_page, 2);
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].id, 3);
}

#[tokio::test]
async fn listing_sorts_by_whitelisted_keys_only() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    seed_user(&state, 1, "walter").await;
    slice.create_course(1, course_input("Welding", 300)).await.unwrap();
    slice.create_course(1, course_input("Algebra", 100)).await.unwrap();
    slice.create_course(1, course_input("Pottery", 200)).await.unwrap();

    let sorted = |sort: &str| CourseListParams {
        sort: Some(sort.to_owned()),
        ..CourseListParams::default()
    };

    let by_name = slice.list_courses(&sorted("name"), PageParams::default()).await.unwrap();
    assert_eq!(
        by_name.items.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        ["Algebra", "Pottery", "Welding"]
    );

    let by_price = slice.list_courses(&sorted("price"), PageParams::default()).await.unwrap();
    assert_eq!(by_price.items.iter().map(|c| c.price).collect::<Vec<_>>(), [100, 200, 300]);

    // Unknown keys degrade to the id order instead of erroring.
    let fallback =
        slice.list_courses(&sorted("teacher_id"), PageParams::default()).await.unwrap();
    assert_eq!(fallback.items.iter().map(|c| c.id).collect::<Vec<_>>(), [1, 2, 3]);
}

#[tokio::test]
async fn course_detail_counts_engagement_and_ranks_contents() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    seed_user(&state, 1, "walter").await;
    slice.create_course(1, course_input("Chemistry", 250)).await.unwrap();

    for name in ["Intro", "Alkanes", "Crystals", "Safety"] {
        slice
            .create_content(1, 1, ContentCreateIn { name: name.to_owned(), body: String::new() })
            .await
            .unwrap();
    }
    seed_member(&state, 1, 1, 10).await;
    seed_member(&state, 2, 1, 11).await;
    // Contents 2 and 3 attract the discussion; content 4 has none.
    seed_comment(&state, 1, 1, 10).await;
    for id in 2..=4 {
        seed_comment(&state, id, 2, 10).await;
    }
    seed_comment(&state, 5, 3, 11).await;
    seed_comment(&state, 6, 3, 10).await;

    let detail = slice.course_detail(1).await.unwrap();

    assert_eq!(detail.name, "Chemistry");
    assert_eq!(detail.member_count, 2);
    assert_eq!(detail.content_count, 4);
    assert_eq!(detail.comment_count, 6);
    assert_eq!(detail.teacher.id, 1);
    assert_eq!(detail.teacher.username, "walter");
    assert_eq!(detail.teacher.first_name, "Jane");

    // Top three by comment count, most discussed first.
    let ranked: Vec<(i64, u64)> =
        detail.top_contents.iter().map(|c| (c.id, c.comment_count)).collect();
    assert_eq!(ranked, [(2, 3), (3, 2), (1, 1)]);
}

#[tokio::test]
async fn course_detail_rejects_unknown_courses() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();

    let err = slice.course_detail(404).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn contents_are_visible_to_members_and_the_teacher_only() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    seed_user(&state, 1, "walter").await;
    slice.create_course(1, course_input("Chemistry", 250)).await.unwrap();
    slice
        .create_content(1, 1, ContentCreateIn { name: "Intro".to_owned(), body: "p1".to_owned() })
        .await
        .unwrap();
    seed_member(&state, 1, 1, 2).await;

    let teacher_view = slice.list_contents(1, 1, PageParams::default()).await.unwrap();
    assert_eq!(teacher_view.total, 1);
    assert_eq!(teacher_view.items[0].name, "Intro");
    assert_eq!(teacher_view.items[0].body, "p1");

    let member_view = slice.list_contents(2, 1, PageParams::default()).await.unwrap();
    assert_eq!(member_view.total, 1);

    let err = slice.list_contents(3, 1, PageParams::default()).await.unwrap_err();
    assert!(matches!(err, CatalogError::Forbidden { .. }));

    let err = slice.list_contents(1, 404, PageParams::default()).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));
}

#[tokio::test]
async fn only_the_teacher_adds_content() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    seed_user(&state, 1, "walter").await;
    slice.create_course(1, course_input("Chemistry", 250)).await.unwrap();
    seed_member(&state, 1, 1, 2).await;

    let input = || ContentCreateIn { name: "Intro".to_owned(), body: String::new() };

    // Members and outsiders are equally rejected.
    let err = slice.create_content(2, 1, input()).await.unwrap_err();
    assert!(matches!(err, CatalogError::Forbidden { .. }));
    let err = slice.create_content(3, 1, input()).await.unwrap_err();
    assert!(matches!(err, CatalogError::Forbidden { .. }));

    let err = slice.create_content(1, 404, input()).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { .. }));

    let err = slice
        .create_content(1, 1, ContentCreateIn { name: "  ".to_owned(), body: String::new() })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Validation { .. }));

    let created = slice.create_content(1, 1, input()).await.unwrap();
    assert_eq!(created.id, 1);
    assert_eq!(created.course_id, 1);
}

#[tokio::test]
async fn course_stats_rank_prices_and_popularity() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    seed_user(&state, 1, "walter").await;

    for (name, price) in [
        ("Alchemy", 100),
        ("Biology", 300),
        ("Chemistry", 100),
        ("Drawing", 200),
        ("Economics", 50),
        ("French", 300),
    ] {
        slice.create_course(1, course_input(name, price)).await.unwrap();
    }
    // Biology gets three members, Drawing two, Alchemy one; the rest none.
    for (id, course_id, user_id) in
        [(1, 2, 10), (2, 2, 11), (3, 2, 12), (4, 4, 10), (5, 4, 11), (6, 1, 10)]
    {
        seed_member(&state, id, course_id, user_id).await;
    }

    let stats = slice.course_stats().await.unwrap();

    assert_eq!(stats.course_count, 6);
    assert_eq!(stats.min_price, 50);
    assert_eq!(stats.max_price, 300);
    assert!((stats.avg_price - 175.0).abs() < f64::EPSILON);

    assert_eq!(stats.cheapest.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["Economics"]);
    assert_eq!(
        stats.expensive.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        ["Biology", "French"]
    );

    // Top five by member count, ties broken by id; zero-member courses rank.
    let popular: Vec<(i64, u64)> =
        stats.popular.iter().map(|c| (c.id, c.member_count)).collect();
    assert_eq!(popular, [(2, 3), (4, 2), (1, 1), (3, 0), (5, 0)]);

    let unpopular: Vec<(i64, u64)> =
        stats.unpopular.iter().map(|c| (c.id, c.member_count)).collect();
    assert_eq!(unpopular, [(3, 0), (5, 0), (6, 0), (1, 1), (4, 2)]);
}

#[tokio::test]
async fn course_stats_zero_out_on_an_empty_catalog() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();

    let stats = slice.course_stats().await.unwrap();

    assert_eq!(stats.course_count, 0);
    assert_eq!(stats.min_price, 0);
    assert_eq!(stats.max_price, 0);
    assert!(stats.avg_price.abs() < f64::EPSILON);
    assert!(stats.cheapest.is_empty());
    assert!(stats.expensive.is_empty());
    assert!(stats.popular.is_empty());
    assert!(stats.unpopular.is_empty());
}

#[tokio::test]
async fn overview_counts_exclude_superusers() {
    let state = state().await;
    let slice = state.try_get_slice::<Catalog>().unwrap();
    seed_user(&state, 1, "walter").await;
    seed_user(&state, 2, "jesse").await;
    seed_user(&state, 3, "admin").await;
    state
        .database
        .query("UPDATE type::thing('user', $id) SET is_superuser = true")
        .bind(("id", 3_i64))
        .await
        .unwrap()
        .check()
        .unwrap();

    slice.create_course(1, course_input("Chemistry", 250)).await.unwrap();
    for name in ["Intro", "Alkanes"] {
        slice
            .create_content(1, 1, ContentCreateIn { name: name.to_owned(), body: String::new() })
            .await
            .unwrap();
    }
    seed_member(&state, 1, 1, 2).await;

    let counts = slice.overview().await.unwrap();
    assert_eq!(counts.users, 2);
    assert_eq!(counts.courses, 1);
    assert_eq!(counts.members, 1);
    assert_eq!(counts.contents, 2);
}
