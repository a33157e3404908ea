pub mod args;
pub mod command;
pub mod config;
pub mod controller;
pub mod errors;
pub mod panel;
pub mod render;
pub mod report;
pub mod runner;
pub mod watch;
