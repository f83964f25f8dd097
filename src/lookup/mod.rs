//! Endpoint formatting with best-effort reverse name resolution
use std::io;
use std::net::IpAddr;

use log::debug;

use crate::sockets::SockAddr;

/// Longest address (or host name) kept before the `:port` suffix.
pub const ADDR_WIDTH: usize = 17;

/// Reverse name lookup.
pub trait NameResolver {
    fn lookup_addr(&self, ip: &IpAddr) -> io::Result<Vec<String>>;
}

/// Resolver backed by the system's `getnameinfo`.
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    fn lookup_addr(&self, ip: &IpAddr) -> io::Result<Vec<String>> {
        dns_lookup::lookup_addr(ip).map(|name| vec![name])
    }
}

/// Renders endpoints as fixed-width `addr:port` strings.
pub struct AddrFormatter {
    resolver: Option<Box<dyn NameResolver>>,
}

impl AddrFormatter {
    /// Numeric addresses only.
    pub fn numeric() -> Self {
        Self { resolver: None }
    }

    /// Substitute resolved host names where the lookup succeeds.
    pub fn resolving(resolver: Box<dyn NameResolver>) -> Self {
        Self {
            resolver: Some(resolver),
        }
    }

    pub fn new(resolve: bool) -> Self {
        if resolve {
            Self::resolving(Box::new(SystemResolver))
        } else {
            Self::numeric()
        }
    }

    /// Format `addr` as `<addr-or-name>:<port>`. Never fails.
    pub fn format(&self, addr: &SockAddr) -> String {
        let mut host = addr.ip.to_string();

        if let Some(resolver) = &self.resolver {
            match resolver.lookup_addr(&addr.ip) {
                Ok(names) => {
                    if let Some(name) = names.into_iter().find(|n| !n.is_empty()) {
                        host = name;
                    }
                }
                Err(e) => debug!("reverse lookup of {} failed: {}", addr.ip, e),
            }
        }

        if let Some((idx, _)) = host.char_indices().nth(ADDR_WIDTH) {
            host.truncate(idx);
        }
        format!("{}:{}", host, addr.port)
    }
}
