pub mod auth;
pub mod dashboard;
pub mod folders;
pub mod init;
pub mod open;
pub mod videos;
