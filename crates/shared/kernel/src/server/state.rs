use crate::security::token::TokenService;
use crate::server::throttle::Throttle;
use axum::extract::FromRef;
use fxhash::FxHashMap;
use slms_database::Database;
use slms_domain::config::ApiConfig;
use slms_domain::registry::{FeatureSlice, InitializedSlice};
use slms_event_bus::EventBus;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> String {
    context.as_ref().map_or_else(String::new, |ctx| format!(" ({ctx})"))
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub database: Database,
    pub events: EventBus,
    pub tokens: TokenService,
    pub throttle: Throttle,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(|initialized| initialized.state().as_any().downcast_ref::<T>())
    }

    /// Looks up a registered slice by its concrete type.
    ///
    /// # Errors
    /// Returns [`ApiStateError::MissingSlice`] if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Type ids of every registered slice, mainly for diagnostics.
    pub fn slice_ids(&self) -> impl Iterator<Item = &TypeId> {
        self.inner.slices.keys()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Database {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.database.clone()
    }
}

impl FromRef<ApiState> for EventBus {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.events.clone()
    }
}

impl FromRef<ApiState> for TokenService {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.tokens.clone()
    }
}

impl FromRef<ApiState> for Throttle {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.throttle.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    database: Option<Database>,
    events: Option<EventBus>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id(), slice);
        self
    }

    /// Registers a batch of slices in one call.
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        for slice in slices {
            self.slices.insert(slice.id(), slice);
        }
        self
    }

    /// Finalizes the state; the token service and throttle are derived from
    /// the config's security settings.
    ///
    /// # Errors
    /// Returns [`ApiStateError::Validation`] when config or database are
    /// missing. The event bus defaults to a fresh instance.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "Config is missing".into(),
            context: None,
        })?;
        let database = self.database.ok_or_else(|| ApiStateError::Validation {
            message: "Database handle is missing".into(),
            context: None,
        })?;
        let events = self.events.unwrap_or_default();
        let tokens = TokenService::new(&config.security.jwt);
        let throttle = Throttle::new(&config.security.throttle);

        Ok(ApiState {
            inner: Arc::new(ApiStateInner {
                config,
                database,
                events,
                tokens,
                throttle,
                slices: self.slices,
            }),
        })
    }
}
