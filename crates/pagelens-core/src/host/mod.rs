//! Host-page bridge: copy and cursor-position insertion.

pub mod bridge;
pub mod memory;

pub use bridge::{copy, insert, Clipboard, HostPage};
pub use memory::InMemoryHostPage;
