//! Library crate for the netstat socket reporter

#![allow(clippy::new_without_default)]

pub mod error;
pub mod lookup;
pub mod privilege;
pub mod report;
pub mod sockets;

// CLI modules
pub mod cli {
    pub mod args;
}

// Output sinks
pub mod formats {
    pub mod csv;
    pub mod text;
    pub mod traits;
}
