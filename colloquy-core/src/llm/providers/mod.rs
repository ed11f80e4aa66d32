//! LLM provider implementations

pub mod scripted;
pub mod together;

pub use scripted::ScriptedProvider;
pub use together::TogetherProvider;
