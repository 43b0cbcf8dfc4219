pub mod app;
pub mod executor;
pub mod handlers;
pub mod selection;
pub mod ui;
