// src/event/mod.rs

//! Activity events: the immutable unit of work submitted to the pipeline.

pub mod activity;
pub mod entity;

pub use activity::{ActivityEvent, ActivityEventBuilder, ActivityType, EntityDescriptor};
pub use entity::{ActivityDescription, EntityActivity};

/// Identifier of a user (actor or notification recipient).
pub type UserId = String;
/// Identifier of an inventory account.
pub type AccountId = String;
