//! HTTP API handlers

pub mod accounts;
pub mod auth_layer;
pub mod catalog;
pub mod chapters;
pub mod error;
pub mod health;
pub mod login;
pub mod media;
pub mod questions;
pub mod subjects;
pub mod topics;

pub use error::ApiError;
