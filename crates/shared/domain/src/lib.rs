//! # Domain Vocabulary
//!
//! Pure shared types for the LMS: configuration, table names, member roles and
//! the events feature slices publish. Keep it lean: no I/O, networking, or heavy
//! logic, just data and simple helpers (`serde` is the only dependency).

pub mod config;
pub mod constants;
pub mod events;
pub mod models;
pub mod registry;
pub mod roles;
