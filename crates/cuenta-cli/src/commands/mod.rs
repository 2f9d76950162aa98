//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Engine setup shared by every command, and `learn`
//! - `corpus` - Corpus and edit CSV reading/writing
//! - `hierarchy` - Derived structure listings (hierarchy, merchants)
//! - `suggest` - Suggestion commands (suggest, apply, test)
//! - `validate` - Manual edit validation

pub mod core;
pub mod corpus;
pub mod hierarchy;
pub mod suggest;
pub mod validate;

// Re-export command functions for main.rs
pub use self::core::*;
pub use hierarchy::*;
pub use suggest::*;
pub use validate::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
