//! Server plumbing shared by every feature slice: application state, the
//! pagination envelope, problem responses, the bearer-token extractor, the
//! request throttle, and the system router.

pub mod extract;
pub mod health;
pub mod page;
pub mod problem;
pub mod router;
pub mod state;
pub mod throttle;

pub use extract::AuthUser;
pub use health::mark_startup;
pub use page::{Page, PageParams};
pub use problem::Problem;
pub use router::{SYSTEM_TAG, system_router};
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
pub use throttle::{Throttle, throttle_middleware};
