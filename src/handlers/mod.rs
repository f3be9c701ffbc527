// handlers/mod.rs - admin console endpoints
//
// Public: landing, login entry point and session endpoints.
// Protected: dashboard, folders and videos, all behind the session guard.

pub mod auth;
pub mod dashboard;
pub mod folders;
pub mod form;
pub mod pages;
pub mod videos;
