use crate::dto::{CommentIn, CommentOut, CommentPostedOut};
use crate::Comments;
use axum::extract::{Path, Query, State};
use axum::Json;
use slms_kernel::server::problem::ProblemBody;
use slms_kernel::server::{ApiState, AuthUser, Page, PageParams, Problem};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

const COMMENTS_TAG: &str = "comments";

/// Routes owned by the comments slice.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new().routes(routes!(post_comment)).routes(routes!(list_comments))
}

#[utoipa::path(
    post,
    path = "/comments",
    request_body = CommentIn,
    responses(
        (status = OK, description = "Comment stored", body = CommentPostedOut),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ProblemBody),
        (status = FORBIDDEN, description = "Caller is outside the course", body = ProblemBody),
        (status = NOT_FOUND, description = "Unknown content", body = ProblemBody),
    ),
    security(("bearer" = [])),
    tag = COMMENTS_TAG,
)]
async fn post_comment(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(input): Json<CommentIn>,
) -> Result<Json<CommentPostedOut>, Problem> {
    let slice = state.try_get_slice::<Comments>()?;
    let posted = slice.post_comment(auth.id, input).await?;

    Ok(Json(posted))
}

#[utoipa::path(
    get,
    path = "/contents/{id}/comments",
    params(("id" = i64, Path, description = "Content id"), PageParams),
    responses(
        (status = OK, description = "One page of comments", body = Page<CommentOut>),
        (status = NOT_FOUND, description = "Unknown content", body = ProblemBody),
    ),
    tag = COMMENTS_TAG,
)]
async fn list_comments(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<CommentOut>>, Problem> {
    let slice = state.try_get_slice::<Comments>()?;
    let comments = slice.list_comments(id, page).await?;

    Ok(Json(comments))
}
