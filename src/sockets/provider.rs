//! Socket table provider capability
use crate::error::NetstatError;
use crate::sockets::{Family, SockTabEntry, Transport};

/// Source of socket table entries for one transport/family at a time.
///
/// Implementations must apply `accept` before returning; callers do not
/// filter again.
pub trait SocketTableProvider {
    fn enumerate(
        &self,
        transport: Transport,
        family: Family,
        accept: &dyn Fn(&SockTabEntry) -> bool,
    ) -> Result<Vec<SockTabEntry>, NetstatError>;
}

/// Provider for hosts with no socket table backend.
pub struct UnsupportedProvider;

impl SocketTableProvider for UnsupportedProvider {
    fn enumerate(
        &self,
        _transport: Transport,
        _family: Family,
        _accept: &dyn Fn(&SockTabEntry) -> bool,
    ) -> Result<Vec<SockTabEntry>, NetstatError> {
        Err(NetstatError::Unsupported(std::env::consts::OS.to_string()))
    }
}

/// Provider for the running operating system.
pub fn system_provider() -> Box<dyn SocketTableProvider> {
    #[cfg(target_os = "linux")]
    {
        Box::new(crate::sockets::procfs_provider::ProcfsProvider::new())
    }
    #[cfg(not(target_os = "linux"))]
    {
        Box::new(UnsupportedProvider)
    }
}
