//! Overlay session management module
//!
//! This module contains:
//! - Per-camera-side session state and message handling
//! - Message types for host input, sibling sync, and host requests

pub mod messages;
pub mod state;

pub use messages::{
    HostRequest, LayerMsg, MenuAction, Msg, NudgeDirection, PointerButton, PointerMsg, SyncMessage,
};
pub use state::OverlaySession;
