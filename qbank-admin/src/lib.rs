//! qbank-admin library - client core for the QBank gateway
//!
//! Holds the stateful pieces the admin and doctor screens are built on:
//! the content-tree snapshot model, the per-entity form controllers, the
//! explanation/voice lifecycle controller, and the local playback state
//! machine. Rendering is the caller's concern; everything here is plain
//! state plus gateway calls.

pub mod confirm;
pub mod forms;
pub mod gateway;
pub mod media;
pub mod player;
pub mod tree;

pub use gateway::{ClientError, Gateway, HttpGateway};
