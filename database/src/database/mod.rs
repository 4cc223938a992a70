pub mod commands;
pub mod control;
pub mod database;
pub mod options;
pub mod request_manager;
pub mod store;
