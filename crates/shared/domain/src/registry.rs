//! Type-erased plumbing for feature slices.
//!
//! Each slice initializes against the shared infrastructure and hands the
//! server one [`InitializedSlice`]; the state registry indexes them by
//! `TypeId` so handlers can get their slice back fully typed.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// State owned by one feature slice, shareable across worker threads.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Downcast hook for the typed accessors on the state registry.
    fn as_any(&self) -> &dyn Any;

    /// Short stable name, used in startup logs.
    fn name(&self) -> &'static str;
}

/// One slice's boxed state, keyed by its concrete type.
#[derive(Debug)]
pub struct InitializedSlice {
    id: TypeId,
    state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), state: Box::new(state) }
    }

    /// Registry key of the concrete slice type.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Name the slice reports for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.state.name()
    }

    #[must_use]
    pub fn state(&self) -> &dyn FeatureSlice {
        self.state.as_ref()
    }
}
