// src/conversation/mod.rs
//! Per-user conversation state machine.

pub mod commands;
pub mod engine;
pub mod state;
pub mod transition;

pub use commands::{Command, InboundEvent, ROUTER};
pub use engine::{ConversationEngine, OutboundSink};
pub use state::{ConversationState, Flow, UserSession};
