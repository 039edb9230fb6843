//! Database models and DTOs.

pub mod incident;
pub mod user;
