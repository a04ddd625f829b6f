pub mod agent;
pub mod config_store;
pub mod defaults;
pub mod runtime_controller;
