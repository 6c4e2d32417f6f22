//! Tools module - capabilities the model can invoke
//!
//! Contains the tool trait, the registry, and the SSH exec tool.

pub mod registry;
pub mod ssh;

pub use registry::{Tool, ToolRegistry};
pub use ssh::{SshExecTool, SSH_TOOL_NAME};
