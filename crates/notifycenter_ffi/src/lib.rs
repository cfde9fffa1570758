//! Flutter bridge for the notification center core.

pub mod api;
