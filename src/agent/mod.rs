//! Agent module - the bounded model/tool execution loop
//!
//! Contains the transcript, the command extractor, the turn controller,
//! and the session driver boundary.

pub mod controller;
pub mod conversation;
pub mod extractor;
pub mod session;

pub use controller::{TurnController, TurnOutcome, MAX_TURNS, SYSTEM_PROMPT};
pub use conversation::Conversation;
pub use extractor::{extract, Extraction, INVALID_COMMAND};
pub use session::{SessionDriver, SessionOutcome};
