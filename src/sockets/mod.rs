//! Socket table data model
use std::fmt;
use std::net::{IpAddr, SocketAddr};

pub mod filter;
pub mod provider;

#[cfg(target_os = "linux")]
pub mod procfs_provider;

/// One side of a socket: an IP address and a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SockAddr {
    pub ip: IpAddr,
    pub port: u16,
}

impl SockAddr {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }
}

impl From<SocketAddr> for SockAddr {
    fn from(addr: SocketAddr) -> Self {
        Self {
            ip: addr.ip(),
            port: addr.port(),
        }
    }
}

/// Kernel socket state, numbered as in `include/net/tcp_states.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkState {
    Established = 0x01,
    SynSent = 0x02,
    SynRecv = 0x03,
    FinWait1 = 0x04,
    FinWait2 = 0x05,
    TimeWait = 0x06,
    Close = 0x07,
    CloseWait = 0x08,
    LastAck = 0x09,
    Listen = 0x0a,
    Closing = 0x0b,
    NewSynRecv = 0x0c,
}

impl SkState {
    pub const ALL: [SkState; 12] = [
        SkState::Established,
        SkState::SynSent,
        SkState::SynRecv,
        SkState::FinWait1,
        SkState::FinWait2,
        SkState::TimeWait,
        SkState::Close,
        SkState::CloseWait,
        SkState::LastAck,
        SkState::Listen,
        SkState::Closing,
        SkState::NewSynRecv,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| *s as u8 == code)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkState::Established => "ESTABLISHED",
            SkState::SynSent => "SYN_SENT",
            SkState::SynRecv => "SYN_RECV",
            SkState::FinWait1 => "FIN_WAIT1",
            SkState::FinWait2 => "FIN_WAIT2",
            SkState::TimeWait => "TIME_WAIT",
            // Unconnected UDP sockets sit in CLOSE; netstat leaves the column blank.
            SkState::Close => "",
            SkState::CloseWait => "CLOSE_WAIT",
            SkState::LastAck => "LAST_ACK",
            SkState::Listen => "LISTEN",
            SkState::Closing => "CLOSING",
            SkState::NewSynRecv => "NEW_SYN_RECV",
        }
    }
}

impl fmt::Display for SkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // pad() so width/precision specifiers apply
        f.pad(self.as_str())
    }
}

/// Process owning a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: i32,
    pub name: String,
    pub exe: String,
    pub cmd: String,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(&format!("{}/{}", self.pid, self.name))
    }
}

/// A single socket table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SockTabEntry {
    pub local_addr: SockAddr,
    pub remote_addr: SockAddr,
    pub state: SkState,
    pub uid: u32,
    pub inode: u64,
    /// Owning process, when it could be determined
    pub process: Option<Process>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Ipv4,
    Ipv6,
}

impl Family {
    pub fn bit(&self) -> u8 {
        match self {
            Family::Ipv4 => Families::IPV4.0,
            Family::Ipv6 => Families::IPV6.0,
        }
    }
}

/// Protocol tag printed in the first column, e.g. `tcp6`.
pub fn proto_tag(transport: Transport, family: Family) -> &'static str {
    match (transport, family) {
        (Transport::Tcp, Family::Ipv4) => "tcp",
        (Transport::Tcp, Family::Ipv6) => "tcp6",
        (Transport::Udp, Family::Ipv4) => "udp",
        (Transport::Udp, Family::Ipv6) => "udp6",
    }
}

/// Bitmask over {IPv4, IPv6}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Families(u8);

impl Families {
    pub const IPV4: Families = Families(0x01);
    pub const IPV6: Families = Families(0x02);
    pub const BOTH: Families = Families(0x03);

    pub fn empty() -> Self {
        Families(0)
    }

    pub fn insert(&mut self, family: Family) {
        self.0 |= family.bit();
    }

    pub fn contains(&self, family: Family) -> bool {
        self.0 & family.bit() == family.bit()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Selected families in display order (IPv4 first).
    pub fn iter(&self) -> impl Iterator<Item = Family> + '_ {
        [Family::Ipv4, Family::Ipv6]
            .into_iter()
            .filter(move |f| self.contains(*f))
    }
}
