//! LLM integration module.
//!
//! Provides an OpenAI-compatible client, the prompts for guided outline
//! descent, and the navigator that drives it.

mod client;
mod navigator;
mod prompts;

pub use client::{LlmClient, Message, Role};
pub use navigator::LlmNavigator;
pub use prompts::Prompts;
