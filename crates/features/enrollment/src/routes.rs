use crate::dto::{EnrollmentOut, MemberStatsOut, MyCourseOut};
use crate::Enrollment;
use axum::extract::{Path, Query, State};
use axum::Json;
use slms_kernel::server::problem::ProblemBody;
use slms_kernel::server::{ApiState, AuthUser, Page, PageParams, Problem};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

const ENROLLMENT_TAG: &str = "enrollment";

/// Routes owned by the enrollment slice.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(enroll))
        .routes(routes!(my_courses))
        .routes(routes!(member_stats))
}

#[utoipa::path(
    post,
    path = "/courses/{id}/enroll",
    params(("id" = i64, Path, description = "Course id")),
    responses(
        (status = OK, description = "Membership, existing or newly created", body = EnrollmentOut),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ProblemBody),
        (status = NOT_FOUND, description = "Unknown course", body = ProblemBody),
    ),
    security(("bearer" = [])),
    tag = ENROLLMENT_TAG,
)]
async fn enroll(
    State(state): State<ApiState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<EnrollmentOut>, Problem> {
    let slice = state.try_get_slice::<Enrollment>()?;
    let membership = slice.enroll(auth.id, id).await?;

    Ok(Json(membership))
}

#[utoipa::path(
    get,
    path = "/mycourses",
    params(PageParams),
    responses(
        (status = OK, description = "One page of the caller's courses", body = Page<MyCourseOut>),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ProblemBody),
    ),
    security(("bearer" = [])),
    tag = ENROLLMENT_TAG,
)]
async fn my_courses(
    State(state): State<ApiState>,
    auth: AuthUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<MyCourseOut>>, Problem> {
    let slice = state.try_get_slice::<Enrollment>()?;
    let courses = slice.my_courses(auth.id, page).await?;

    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/members/stats",
    responses((status = OK, description = "Membership totals per role", body = MemberStatsOut)),
    tag = ENROLLMENT_TAG,
)]
async fn member_stats(State(state): State<ApiState>) -> Result<Json<MemberStatsOut>, Problem> {
    let slice = state.try_get_slice::<Enrollment>()?;
    let stats = slice.member_stats().await?;

    Ok(Json(stats))
}
