pub mod bootstrap;
pub mod commands;
pub mod dashboard;
pub mod modals;
pub mod services;
