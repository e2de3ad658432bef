//! Enrollment slice.
//!
//! Owns course membership: the idempotent enroll operation, the
//! authenticated user's course listing and the membership statistics.
//! Publishes [`MemberEnrolled`](slms_domain::events::MemberEnrolled) on
//! first-time enrollment only.

mod dto;
mod error;
mod repo;
mod routes;

pub use dto::{EnrollmentOut, MemberStatsOut, MyCourseOut, RoleStatOut};
pub use error::{EnrollmentError, EnrollmentErrorExt};
pub use routes::router;

use crate::repo::MemberRepo;
use fxhash::FxHashMap;
use slms_database::Database;
use slms_domain::config::ApiConfig;
use slms_domain::events::MemberEnrolled;
use slms_domain::registry::{FeatureSlice, InitializedSlice};
use slms_domain::roles::MemberRole;
use slms_event_bus::EventBus;
use slms_kernel::server::{Page, PageParams};
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
struct EnrollmentInner {
    repo: MemberRepo,
    events: EventBus,
}

/// Enrollment feature state.
#[derive(Debug, Clone)]
pub struct Enrollment {
    inner: Arc<EnrollmentInner>,
}

impl FeatureSlice for Enrollment {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        "enrollment"
    }
}

/// Initializes the enrollment slice against the shared database and bus.
///
/// # Errors
/// Currently infallible; kept fallible so wiring changes do not ripple
/// through the facade.
pub fn init(
    _config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, EnrollmentError> {
    let slice = Enrollment {
        inner: Arc::new(EnrollmentInner {
            repo: MemberRepo::new(database.clone()),
            events: events.clone(),
        }),
    };

    info!("Enrollment slice initialized");

    Ok(InitializedSlice::new(slice))
}

impl Enrollment {
    /// Enrolls the caller into a course with the `std` role.
    ///
    /// Get-or-create: re-enrolling returns the existing membership without
    /// duplicating it, and only a first-time enrollment publishes
    /// [`MemberEnrolled`]. The unique `(course_id, user_id)` index backs
    /// this against concurrent requests.
    ///
    /// # Errors
    /// [`EnrollmentError::NotFound`] for an unknown course.
    pub async fn enroll(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<EnrollmentOut, EnrollmentError> {
        if !self.inner.repo.course_exists(course_id).await? {
            return Err(EnrollmentError::NotFound {
                message: "course not found".into(),
                context: None,
            });
        }

        if let Some(existing) = self.inner.repo.find(course_id, user_id).await? {
            return Ok(EnrollmentOut::from(existing));
        }

        let member = self.inner.repo.create(course_id, user_id, MemberRole::Student).await?;

        if let Err(err) = self.inner.events.publish(MemberEnrolled {
            member_id: member.id,
            course_id,
            user_id,
        }) {
            warn!(error = %err, member = member.id, "Failed to publish MemberEnrolled");
        }

        Ok(EnrollmentOut::from(member))
    }

    /// One page of the caller's memberships, joined with the course names.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn my_courses(
        &self,
        user_id: i64,
        page: PageParams,
    ) -> Result<Page<MyCourseOut>, EnrollmentError> {
        let page = page.normalize();
        let (members, total) = self.inner.repo.page_for_user(user_id, page).await?;

        let course_ids: Vec<i64> = members.iter().map(|member| member.course_id).collect();
        let names: FxHashMap<i64, String> =
            self.inner.repo.course_names(course_ids).await?.into_iter().collect();

        let items = members
            .into_iter()
            .map(|member| MyCourseOut {
                course_name: names.get(&member.course_id).cloned().unwrap_or_default(),
                id: member.id,
                course_id: member.course_id,
                user_id: member.user_id,
                roles: member.roles,
            })
            .collect();

        Ok(Page::new(items, total, page.limit))
    }

    /// Membership totals with the per-role breakdown, ordered by role code.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn member_stats(&self) -> Result<MemberStatsOut, EnrollmentError> {
        let total_members = self.inner.repo.total_members().await?;
        let mut role_stats: Vec<RoleStatOut> = self
            .inner
            .repo
            .role_counts()
            .await?
            .into_iter()
            .map(|(roles, total)| RoleStatOut { roles, total })
            .collect();
        role_stats.sort_by(|a, b| a.roles.cmp(&b.roles));

        Ok(MemberStatsOut { total_members, role_stats })
    }
}
