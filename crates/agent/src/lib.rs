//! The Parley assistant pipeline.
//!
//! For every inbound message:
//!
//! 1. **Record** it in conversation memory
//! 2. **Load context** (active window, topic, summary, provider preference)
//! 3. **Tool hand-off** when the message asks for a search or code run and
//!    a tool invoker is attached
//! 4. **Route** to the best available provider otherwise
//! 5. **Record** the reply with its routing metadata

pub mod assistant;
pub mod prompts;

pub use assistant::Assistant;
pub use prompts::PromptBuilder;
