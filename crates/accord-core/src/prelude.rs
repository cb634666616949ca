//! Prelude module - commonly used types for convenient import.
//!
//! Use `use accord_core::prelude::*;` to import all essential types.

// Value types
pub use crate::{SessionId, Timestamp};

// Permission strings
pub use crate::{FileAccess, Permission, ShellCommand};

// Directory layout
pub use crate::AccordHome;
