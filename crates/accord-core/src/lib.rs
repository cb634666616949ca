//! Accord Core - Foundation types shared by every accord crate.
//!
//! This crate provides:
//! - [`Timestamp`] and [`SessionId`] value types used in log records
//! - [`Permission`] parsing for approved permission strings
//! - [`dirs::AccordHome`], the on-disk layout of logs and persisted state

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod dirs;
pub mod permission;
pub mod types;

pub use dirs::AccordHome;
pub use permission::{FileAccess, Permission, ShellCommand};
pub use types::{SessionId, Timestamp};
