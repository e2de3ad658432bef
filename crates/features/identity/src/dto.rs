//! Wire types for the identity endpoints. Field names are the JSON contract.

use serde::{Deserialize, Serialize};
use slms_domain::models::User;
use utoipa::{IntoParams, ToSchema};

/// Registration request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterIn {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Body returned by a successful registration.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegisterOut {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Sign-in request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignInIn {
    pub username: String,
    pub password: String,
}

/// Refresh request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshIn {
    pub refresh: String,
}

/// A fresh access token minted by the refresh flow.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshOut {
    pub access: String,
}

/// Public listing shape for an account.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserOut {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserOut {
    fn from(user: User) -> Self {
        Self { id: user.id, username: user.username, email: user.email }
    }
}

/// Profile of the authenticated caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileOut {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for ProfileOut {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Username filter for the user listing.
#[derive(Default, Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct UserSearchParams {
    /// Case-insensitive substring match on `username`.
    pub search: Option<String>,
}
