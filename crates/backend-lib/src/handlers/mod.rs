//! HTTP handlers.

pub mod auth;
pub mod dashboard;
pub mod pages;
