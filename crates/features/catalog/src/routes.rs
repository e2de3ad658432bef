use crate::dto::{
    ContentCreateIn, ContentOut, CourseCreateIn, CourseDetailOut, CourseListParams, CourseOut,
    CourseStatsOut, OverviewOut,
};
use crate::Catalog;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use slms_kernel::server::problem::ProblemBody;
use slms_kernel::server::{ApiState, AuthUser, Page, PageParams, Problem};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

const CATALOG_TAG: &str = "catalog";

/// Routes owned by the catalog slice.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_courses, create_course))
        .routes(routes!(course_stats))
        .routes(routes!(course_detail))
        .routes(routes!(list_contents, create_content))
        .routes(routes!(overview))
}

#[utoipa::path(
    get,
    path = "/courses",
    params(CourseListParams, PageParams),
    responses((status = OK, description = "One page of courses", body = Page<CourseOut>)),
    tag = CATALOG_TAG,
)]
async fn list_courses(
    State(state): State<ApiState>,
    Query(filter): Query<CourseListParams>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<CourseOut>>, Problem> {
    let slice = state.try_get_slice::<Catalog>()?;
    let courses = slice.list_courses(&filter, page).await?;

    Ok(Json(courses))
}

#[utoipa::path(
    post,
    path = "/courses",
    request_body = CourseCreateIn,
    responses(
        (status = CREATED, description = "Course created", body = CourseOut),
        (status = BAD_REQUEST, description = "Validation failed", body = ProblemBody),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ProblemBody),
    ),
    security(("bearer" = [])),
    tag = CATALOG_TAG,
)]
async fn create_course(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(input): Json<CourseCreateIn>,
) -> Result<impl IntoResponse, Problem> {
    let slice = state.try_get_slice::<Catalog>()?;
    let created = slice.create_course(auth.id, input).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/courses/stats",
    responses(
        (status = OK, description = "Catalog price and popularity stats", body = CourseStatsOut),
    ),
    tag = CATALOG_TAG,
)]
async fn course_stats(State(state): State<ApiState>) -> Result<Json<CourseStatsOut>, Problem> {
    let slice = state.try_get_slice::<Catalog>()?;
    let stats = slice.course_stats().await?;

    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = OK, description = "Course detail and engagement figures", body = CourseDetailOut),
        (status = NOT_FOUND, description = "Unknown course", body = ProblemBody),
    ),
    tag = CATALOG_TAG,
)]
async fn course_detail(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> Result<Json<CourseDetailOut>, Problem> {
    let slice = state.try_get_slice::<Catalog>()?;
    let detail = slice.course_detail(id).await?;

    Ok(Json(detail))
}

#[utoipa::path(
    get,
    path = "/courses/{id}/contents",
    params(("id" = i64, Path, description = "Course id"), PageParams),
    responses(
        (status = OK, description = "One page of course contents", body = Page<ContentOut>),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ProblemBody),
        (status = FORBIDDEN, description = "Caller is outside the course", body = ProblemBody),
        (status = NOT_FOUND, description = "Unknown course", body = ProblemBody),
    ),
    security(("bearer" = [])),
    tag = CATALOG_TAG,
)]
async fn list_contents(
    State(state): State<ApiState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<ContentOut>>, Problem> {
    let slice = state.try_get_slice::<Catalog>()?;
    let contents = slice.list_contents(auth.id, id, page).await?;

    Ok(Json(contents))
}

#[utoipa::path(
    post,
    path = "/courses/{id}/contents",
    params(("id" = i64, Path, description = "Course id")),
    request_body = ContentCreateIn,
    responses(
        (status = CREATED, description = "Content created", body = ContentOut),
        (status = BAD_REQUEST, description = "Validation failed", body = ProblemBody),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ProblemBody),
        (status = FORBIDDEN, description = "Caller is not the teacher", body = ProblemBody),
        (status = NOT_FOUND, description = "Unknown course", body = ProblemBody),
    ),
    security(("bearer" = [])),
    tag = CATALOG_TAG,
)]
async fn create_content(
    State(state): State<ApiState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<ContentCreateIn>,
) -> Result<impl IntoResponse, Problem> {
    let slice = state.try_get_slice::<Catalog>()?;
    let created = slice.create_content(auth.id, id, input).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/stats/overview",
    responses((status = OK, description = "Record counts across the service", body = OverviewOut)),
    tag = CATALOG_TAG,
)]
async fn overview(State(state): State<ApiState>) -> Result<Json<OverviewOut>, Problem> {
    let slice = state.try_get_slice::<Catalog>()?;
    let counts = slice.overview().await?;

    Ok(Json(counts))
}
