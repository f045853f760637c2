//! # Cubist Testing
//!
//! Deterministic test doubles for agent scenarios: mock tools with scripted
//! responses and a scripted model provider that replays prepared turns.

pub mod mock_provider;
pub mod mock_tools;

pub use mock_provider::{ScriptedProvider, ScriptedTurn};
pub use mock_tools::MockTool;
