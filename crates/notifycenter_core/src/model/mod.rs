//! Domain model for the notification center.
//!
//! # Responsibility
//! - Define canonical data structures used by store, view and gateway.
//! - Hold client-side form state that does not belong to any backend.
//!
//! # Invariants
//! - Every notification is identified by a non-blank string id.

pub mod notification;
pub mod onboarding;
