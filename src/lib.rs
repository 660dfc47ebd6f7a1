pub mod action;
pub mod address;
pub mod cluster;
pub mod collaborators;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod metadata;
pub mod notification;
pub mod persistence;
pub mod reducer;
pub mod state;
pub mod store;
pub mod telemetry;
