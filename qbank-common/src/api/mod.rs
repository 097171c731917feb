//! API types shared by the gateway server and the admin client

pub mod auth;
pub mod types;
