//! These models represent the objects passed around by the agent
//!
//! There are two related formats we need to interact with:
//! - openai-compatible chat completion messages/tools, sent from the agent to the LLM
//! - tool calls, sent from the agent to the systems providing capabilities
//!
//! We always immediately convert the wire format into the internal structs using to/from
//! helpers, so the internal models are not an exact match to the wire format.
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
