//! Agent engine client implementations.

pub mod agent_engine;

// Re-export for convenience
pub use agent_engine::AgentEngineClient;
