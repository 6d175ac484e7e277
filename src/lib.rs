pub mod app;
pub mod config;
pub mod events;
pub mod jira;
pub mod markup;
pub mod print;
pub mod timeline;
pub mod ui;
