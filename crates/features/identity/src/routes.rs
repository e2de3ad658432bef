use crate::dto::{
    ProfileOut, RefreshIn, RefreshOut, RegisterIn, RegisterOut, SignInIn, UserOut,
    UserSearchParams,
};
use crate::Identity;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use slms_kernel::security::token::TokenPair;
use slms_kernel::server::problem::ProblemBody;
use slms_kernel::server::{ApiState, AuthUser, Page, PageParams, Problem};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

const IDENTITY_TAG: &str = "identity";

/// Routes owned by the identity slice.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(sign_in))
        .routes(routes!(refresh))
        .routes(routes!(list_users))
        .routes(routes!(me))
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterIn,
    responses(
        (status = CREATED, description = "Account created", body = RegisterOut),
        (status = BAD_REQUEST, description = "Validation failed", body = ProblemBody),
        (status = FORBIDDEN, description = "Registration closed", body = ProblemBody),
        (status = CONFLICT, description = "Username taken", body = ProblemBody),
    ),
    tag = IDENTITY_TAG,
)]
async fn register(
    State(state): State<ApiState>,
    Json(input): Json<RegisterIn>,
) -> Result<impl IntoResponse, Problem> {
    let slice = state.try_get_slice::<Identity>()?;
    let created = slice.register(input).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInIn,
    responses(
        (status = OK, description = "Token pair issued", body = TokenPair),
        (status = UNAUTHORIZED, description = "Invalid credentials", body = ProblemBody),
    ),
    tag = IDENTITY_TAG,
)]
async fn sign_in(
    State(state): State<ApiState>,
    Json(input): Json<SignInIn>,
) -> Result<Json<TokenPair>, Problem> {
    let slice = state.try_get_slice::<Identity>()?;
    let pair = slice.sign_in(&state.tokens, input).await?;

    Ok(Json(pair))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshIn,
    responses(
        (status = OK, description = "Fresh access token", body = RefreshOut),
        (status = UNAUTHORIZED, description = "Invalid refresh token", body = ProblemBody),
    ),
    tag = IDENTITY_TAG,
)]
async fn refresh(
    State(state): State<ApiState>,
    Json(input): Json<RefreshIn>,
) -> Result<Json<RefreshOut>, Problem> {
    let slice = state.try_get_slice::<Identity>()?;
    let refreshed = slice.refresh(&state.tokens, input).await?;

    Ok(Json(refreshed))
}

#[utoipa::path(
    get,
    path = "/users",
    params(UserSearchParams, PageParams),
    responses((status = OK, description = "One page of users", body = Page<UserOut>)),
    tag = IDENTITY_TAG,
)]
async fn list_users(
    State(state): State<ApiState>,
    Query(search): Query<UserSearchParams>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<UserOut>>, Problem> {
    let slice = state.try_get_slice::<Identity>()?;
    let users = slice.list_users(search.search.as_deref(), page).await?;

    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = OK, description = "The caller's profile", body = ProfileOut),
        (status = UNAUTHORIZED, description = "Missing or invalid token", body = ProblemBody),
    ),
    security(("bearer" = [])),
    tag = IDENTITY_TAG,
)]
async fn me(State(state): State<ApiState>, auth: AuthUser) -> Result<Json<ProfileOut>, Problem> {
    let slice = state.try_get_slice::<Identity>()?;
    let profile = slice.profile(auth.id).await?;

    Ok(Json(profile))
}
