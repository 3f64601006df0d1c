//! Headless CMS integration
//!
//! Read-only collections backing the about/events/work/home pages.

pub mod client;
pub mod render;
pub mod types;

pub use client::{ContentClient, ContentError, or_empty};
pub use types::{Event, HomeCard, Project, TeamMember};
