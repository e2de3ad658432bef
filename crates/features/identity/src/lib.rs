//! Accounts and authentication slice.
//!
//! Owns registration, the sign-in and refresh token flows, the user
//! listing, and the caller's own profile. Publishes
//! [`UserRegistered`](slms_domain::events::UserRegistered) on the shared
//! bus for every new account.

mod dto;
mod error;
mod repo;
mod routes;

pub use dto::{ProfileOut, RefreshIn, RefreshOut, RegisterIn, RegisterOut, SignInIn, UserOut};
pub use error::{IdentityError, IdentityErrorExt};
pub use routes::router;

use crate::repo::{NewUser, UserRepo};
use slms_database::Database;
use slms_domain::config::ApiConfig;
use slms_domain::events::UserRegistered;
use slms_domain::registry::{FeatureSlice, InitializedSlice};
use slms_event_bus::EventBus;
use slms_kernel::security::token::{TokenPair, TokenService};
use slms_kernel::security::{hash_password, verify_password};
use slms_kernel::server::{Page, PageParams};
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn};

/// Shortest username accepted at registration.
pub const MIN_USERNAME_LEN: usize = 5;
/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug)]
struct IdentityInner {
    repo: UserRepo,
    events: EventBus,
    registration_open: bool,
}

/// Identity feature state.
#[derive(Debug, Clone)]
pub struct Identity {
    inner: Arc<IdentityInner>,
}

impl FeatureSlice for Identity {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Initializes the identity slice against the shared database and bus.
///
/// # Errors
/// Currently infallible; kept fallible so wiring changes do not ripple
/// through the facade.
pub fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, IdentityError> {
    let slice = Identity {
        inner: Arc::new(IdentityInner {
            repo: UserRepo::new(database.clone()),
            events: events.clone(),
            registration_open: config.security.register.open,
        }),
    };

    info!(registration_open = slice.inner.registration_open, "Identity slice initialized");

    Ok(InitializedSlice::new(slice))
}

impl Identity {
    /// Creates an account and returns its public shape.
    ///
    /// # Errors
    /// [`IdentityError::Forbidden`] when registration is closed by config,
    /// [`IdentityError::Validation`] for inputs failing the username and
    /// password rules, [`IdentityError::Conflict`] when the username is
    /// taken.
    pub async fn register(&self, input: RegisterIn) -> Result<RegisterOut, IdentityError> {
        if !self.inner.registration_open {
            return Err(IdentityError::Forbidden {
                message: "registration is disabled".into(),
                context: None,
            });
        }

        let username = input.username.trim().to_owned();
        validate_registration(&username, &input.password)?;

        if self.inner.repo.find_by_username(&username).await?.is_some() {
            return Err(IdentityError::Conflict {
                message: "username is already taken".into(),
                context: None,
            });
        }

        let password = hash_password(&input.password)?;
        let user = self
            .inner
            .repo
            .create(NewUser {
                username,
                email: input.email,
                password,
                first_name: input.first_name,
                last_name: input.last_name,
                is_staff: false,
            })
            .await?;

        if let Err(err) = self
            .inner
            .events
            .publish(UserRegistered { user_id: user.id, username: user.username.clone() })
        {
            warn!(error = %err, user = user.id, "Failed to publish UserRegistered");
        }

        Ok(RegisterOut { id: user.id, username: user.username, email: user.email })
    }

    /// Verifies credentials and issues an access/refresh pair.
    ///
    /// # Errors
    /// [`IdentityError::Unauthorized`] for unknown usernames, wrong
    /// passwords and inactive accounts; the message is identical for all
    /// three so responses do not reveal which check failed.
    pub async fn sign_in(
        &self,
        tokens: &TokenService,
        input: SignInIn,
    ) -> Result<TokenPair, IdentityError> {
        let Some(user) = self.inner.repo.find_by_username(input.username.trim()).await? else {
            return Err(invalid_credentials());
        };

        if !user.is_active || !verify_password(&input.password, &user.password)? {
            return Err(invalid_credentials());
        }

        Ok(tokens.issue_pair(user.id, &user.username)?)
    }

    /// Exchanges a refresh token for a fresh access token.
    ///
    /// # Errors
    /// [`IdentityError::Unauthorized`] when the token is not a valid
    /// refresh token (access tokens are rejected here) or the account has
    /// been deactivated since it was issued.
    pub async fn refresh(
        &self,
        tokens: &TokenService,
        input: RefreshIn,
    ) -> Result<RefreshOut, IdentityError> {
        let claims = tokens.verify_refresh(&input.refresh).map_err(|_| IdentityError::Unauthorized {
            message: "invalid refresh token".into(),
            context: None,
        })?;

        let Some(user) = self.inner.repo.find_by_id(claims.sub).await? else {
            return Err(invalid_credentials());
        };
        if !user.is_active {
            return Err(invalid_credentials());
        }

        Ok(RefreshOut { access: tokens.issue_access(user.id, &user.username)? })
    }

    /// One page of users, optionally filtered by a case-insensitive
    /// username substring.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        page: PageParams,
    ) -> Result<Page<UserOut>, IdentityError> {
        let page = page.normalize();
        let (users, total) = self.inner.repo.search_page(search, page).await?;

        Ok(Page::new(users.into_iter().map(UserOut::from).collect(), total, page.limit))
    }

    /// Profile of the authenticated caller.
    ///
    /// # Errors
    /// [`IdentityError::Unauthorized`] when the account behind a still
    /// valid token no longer exists.
    pub async fn profile(&self, user_id: i64) -> Result<ProfileOut, IdentityError> {
        let Some(user) = self.inner.repo.find_by_id(user_id).await? else {
            return Err(invalid_credentials());
        };

        Ok(ProfileOut::from(user))
    }
}

fn invalid_credentials() -> IdentityError {
    IdentityError::Unauthorized { message: "invalid credentials".into(), context: None }
}

fn validate_registration(username: &str, password: &str) -> Result<(), IdentityError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(validation("username must be at least 5 characters"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(validation("password must be at least 8 characters"));
    }
    if !password.chars().any(char::is_alphabetic) || !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(validation("password must contain at least one letter and one digit"));
    }
    Ok(())
}

fn validation(message: &'static str) -> IdentityError {
    IdentityError::Validation { message: message.into(), context: None }
}
