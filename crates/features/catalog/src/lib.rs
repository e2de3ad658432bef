//! Course catalog slice.
//!
//! Owns course and content CRUD, the course detail with engagement
//! figures, and the two statistics endpoints (catalog prices/popularity
//! and the service-wide overview). Publishes
//! [`CourseCreated`](slms_domain::events::CourseCreated).

mod dto;
mod error;
mod repo;
mod routes;

pub use dto::{
    ContentCreateIn, ContentOut, CourseCreateIn, CourseDetailOut, CourseListParams, CourseOut,
    CoursePopularityOut, CourseSort, CourseStatsOut, OverviewOut, TeacherOut, TopContentOut,
};
pub use error::{CatalogError, CatalogErrorExt};
pub use routes::router;

use crate::repo::{CourseFilter, CourseRepo};
use fxhash::FxHashMap;
use slms_database::Database;
use slms_domain::config::ApiConfig;
use slms_domain::events::CourseCreated;
use slms_domain::registry::{FeatureSlice, InitializedSlice};
use slms_event_bus::EventBus;
use slms_kernel::server::{Page, PageParams};
use std::any::Any;
use std::sync::Arc;
use tracing::{info, warn};

/// How many contents the course detail ranks by discussion volume.
const TOP_CONTENT_COUNT: usize = 3;
/// How many courses the popular/unpopular rankings carry.
const POPULARITY_COUNT: usize = 5;

#[derive(Debug)]
struct CatalogInner {
    repo: CourseRepo,
    events: EventBus,
}

/// Catalog feature state.
#[derive(Debug, Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

impl FeatureSlice for Catalog {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}

/// Initializes the catalog slice against the shared database and bus.
///
/// # Errors
/// Currently infallible; kept fallible so wiring changes do not ripple
/// through the facade.
pub fn init(
    _config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<InitializedSlice, CatalogError> {
    let slice = Catalog {
        inner: Arc::new(CatalogInner {
            repo: CourseRepo::new(database.clone()),
            events: events.clone(),
        }),
    };

    info!("Catalog slice initialized");

    Ok(InitializedSlice::new(slice))
}

impl Catalog {
    /// One page of courses, filtered and sorted per the listing params.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn list_courses(
        &self,
        params: &CourseListParams,
        page: PageParams,
    ) -> Result<Page<CourseOut>, CatalogError> {
        let page = page.normalize();
        let filter = CourseFilter {
            search: params.search.clone(),
            price: params.price,
            sort: params.sort_key(),
        };

        let (courses, total) = self.inner.repo.list(&filter, page).await?;

        Ok(Page::new(courses.into_iter().map(CourseOut::from).collect(), total, page.limit))
    }

    /// Course detail with engagement counts, the teacher block and the
    /// most discussed contents.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for an unknown course id.
    pub async fn course_detail(&self, id: i64) -> Result<CourseDetailOut, CatalogError> {
        let Some(course) = self.inner.repo.get(id).await? else {
            return Err(course_not_found());
        };

        let (member_count, content_count, comment_count) =
            self.inner.repo.engagement_counts(id).await?;

        let teacher = self.inner.repo.teacher(course.teacher_id).await?.ok_or_else(|| {
            CatalogError::Internal {
                message: format!("teacher {} of course {id} does not exist", course.teacher_id)
                    .into(),
                context: None,
            }
        })?;

        let top_contents = self
            .inner
            .repo
            .contents_by_comment_count(id)
            .await?
            .into_iter()
            .take(TOP_CONTENT_COUNT)
            .map(|(content, comment_count)| TopContentOut {
                id: content.id,
                name: content.name,
                comment_count,
            })
            .collect();

        Ok(CourseDetailOut {
            id: course.id,
            name: course.name,
            description: course.description,
            price: course.price,
            teacher_id: course.teacher_id,
            member_count,
            content_count,
            comment_count,
            teacher: TeacherOut {
                id: teacher.id,
                username: teacher.username,
                email: teacher.email,
                first_name: teacher.first_name,
                last_name: teacher.last_name,
            },
            top_contents,
        })
    }

    /// Creates a course owned by the authenticated caller.
    ///
    /// # Errors
    /// [`CatalogError::Validation`] for an empty name or negative price.
    pub async fn create_course(
        &self,
        teacher_id: i64,
        input: CourseCreateIn,
    ) -> Result<CourseOut, CatalogError> {
        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(validation("course name must not be empty"));
        }
        if input.price < 0 {
            return Err(validation("price must be non-negative"));
        }

        let course =
            self.inner.repo.create(teacher_id, name, input.description, input.price).await?;

        if let Err(err) = self.inner.events.publish(CourseCreated {
            course_id: course.id,
            teacher_id,
            name: course.name.clone(),
        }) {
            warn!(error = %err, course = course.id, "Failed to publish CourseCreated");
        }

        Ok(CourseOut::from(course))
    }

    /// One page of a course's contents, visible to its members and its
    /// teacher.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for an unknown course,
    /// [`CatalogError::Forbidden`] for callers outside the course.
    pub async fn list_contents(
        &self,
        caller_id: i64,
        course_id: i64,
        page: PageParams,
    ) -> Result<Page<ContentOut>, CatalogError> {
        let Some(course) = self.inner.repo.get(course_id).await? else {
            return Err(course_not_found());
        };

        if course.teacher_id != caller_id && !self.inner.repo.is_member(course_id, caller_id).await?
        {
            return Err(CatalogError::Forbidden {
                message: "you are not a member of this course".into(),
                context: None,
            });
        }

        let page = page.normalize();
        let (contents, total) = self.inner.repo.contents_page(course_id, page).await?;

        Ok(Page::new(contents.into_iter().map(ContentOut::from).collect(), total, page.limit))
    }

    /// Adds content to a course; only its teacher may do so.
    ///
    /// # Errors
    /// [`CatalogError::NotFound`] for an unknown course,
    /// [`CatalogError::Forbidden`] for anyone but the teacher,
    /// [`CatalogError::Validation`] for an empty name.
    pub async fn create_content(
        &self,
        caller_id: i64,
        course_id: i64,
        input: ContentCreateIn,
    ) -> Result<ContentOut, CatalogError> {
        let Some(course) = self.inner.repo.get(course_id).await? else {
            return Err(course_not_found());
        };

        if course.teacher_id != caller_id {
            return Err(CatalogError::Forbidden {
                message: "only the course teacher can add content".into(),
                context: None,
            });
        }

        let name = input.name.trim().to_owned();
        if name.is_empty() {
            return Err(validation("content name must not be empty"));
        }

        let content = self.inner.repo.create_content(course_id, name, input.body).await?;

        Ok(ContentOut::from(content))
    }

    /// Price aggregates plus the cheapest/most expensive courses and the
    /// popularity rankings. An empty catalog yields zeroed aggregates and
    /// empty lists.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn course_stats(&self) -> Result<CourseStatsOut, CatalogError> {
        let Some(aggregates) = self.inner.repo.price_aggregates().await? else {
            return Ok(CourseStatsOut {
                course_count: 0,
                min_price: 0,
                max_price: 0,
                avg_price: 0.0,
                cheapest: Vec::new(),
                expensive: Vec::new(),
                popular: Vec::new(),
                unpopular: Vec::new(),
            });
        };

        let cheapest = self
            .inner
            .repo
            .courses_at_price(aggregates.min_price)
            .await?
            .into_iter()
            .map(CourseOut::from)
            .collect();
        let expensive = self
            .inner
            .repo
            .courses_at_price(aggregates.max_price)
            .await?
            .into_iter()
            .map(CourseOut::from)
            .collect();

        let member_counts: FxHashMap<i64, u64> =
            self.inner.repo.member_counts().await?.into_iter().collect();
        let ranked: Vec<CoursePopularityOut> = self
            .inner
            .repo
            .summaries()
            .await?
            .into_iter()
            .map(|course| CoursePopularityOut {
                member_count: member_counts.get(&course.id).copied().unwrap_or_default(),
                id: course.id,
                name: course.name,
                price: course.price,
            })
            .collect();

        let mut popular = ranked.clone();
        popular.sort_by(|a, b| b.member_count.cmp(&a.member_count).then_with(|| a.id.cmp(&b.id)));
        popular.truncate(POPULARITY_COUNT);

        let mut unpopular = ranked;
        unpopular.sort_by(|a, b| a.member_count.cmp(&b.member_count).then_with(|| a.id.cmp(&b.id)));
        unpopular.truncate(POPULARITY_COUNT);

        Ok(CourseStatsOut {
            course_count: u64::try_from(aggregates.course_count).unwrap_or_default(),
            min_price: aggregates.min_price,
            max_price: aggregates.max_price,
            avg_price: aggregates.avg_price,
            cheapest,
            expensive,
            popular,
            unpopular,
        })
    }

    /// Record counts across the service; superusers are not counted as
    /// users.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub async fn overview(&self) -> Result<OverviewOut, CatalogError> {
        let (users, courses, members, contents) = self.inner.repo.overview_counts().await?;
        Ok(OverviewOut { users, courses, members, contents })
    }
}

fn course_not_found() -> CatalogError {
    CatalogError::NotFound { message: "course not found".into(), context: None }
}

fn validation(message: &'static str) -> CatalogError {
    CatalogError::Validation { message: message.into(), context: None }
}
