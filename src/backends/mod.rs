//! Removal capability implementations
//!
//! - Command backend (runs an external background-removal program)

pub mod command;

pub use self::command::CommandRemover;

// Mock removers for unit tests
#[cfg(test)]
pub mod test_utils;
