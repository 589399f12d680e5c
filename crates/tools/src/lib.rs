//! External tool servers for Parley.
//!
//! Messages the tool detector flags (web searches, code runs) are handed to
//! an HTTP tool server instead of a model. Servers are configured under
//! `[tools.servers.<name>]`; the name is what a `ToolRequest` targets.

pub mod registry;
pub mod server;

pub use registry::{ToolServerRegistry, build_from_config};
pub use server::ToolServer;
