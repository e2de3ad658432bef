//! Activity log: mirrors domain events into the service log.

use anyhow::{Context, Result};
use slms::domain::events::{CommentPosted, CourseCreated, MemberEnrolled, UserRegistered};
use slms_event_bus::{Event, EventBus, EventRecv};
use tracing::info;

/// Subscribes a logging listener for every domain event type.
///
/// Must run before the slices start publishing, otherwise early events
/// are dropped for lack of subscribers.
pub(crate) fn spawn(events: &EventBus) -> Result<()> {
    watch::<UserRegistered, _>(events, |e| {
        info!(user = e.user_id, username = %e.username, "User registered");
    })?;
    watch::<CourseCreated, _>(events, |e| {
        info!(course = e.course_id, teacher = e.teacher_id, name = %e.name, "Course created");
    })?;
    watch::<MemberEnrolled, _>(events, |e| {
        info!(member = e.member_id, course = e.course_id, user = e.user_id, "Member enrolled");
    })?;
    watch::<CommentPosted, _>(events, |e| {
        info!(comment = e.comment_id, content = e.content_id, user = e.user_id, "Comment posted");
    })?;

    Ok(())
}

fn watch<T, F>(events: &EventBus, log: F) -> Result<()>
where
    T: Event,
    F: Fn(&T) + Send + 'static,
{
    let mut rx = events.subscribe::<T>().context("Subscribing activity log listener")?;
    tokio::spawn(async move {
        while let Some(event) = rx.recv_event().await {
            log(event.as_ref());
        }
    });

    Ok(())
}
