//! Turns the user's flag selection into selection criteria
use crate::sockets::{Families, Family, SkState, SockTabEntry, Transport};

/// Predicate a provider applies to each entry before returning it.
pub type AcceptFn = Box<dyn Fn(&SockTabEntry) -> bool + Send + Sync>;

/// Accepts every entry.
pub fn noop_filter() -> AcceptFn {
    Box::new(|_: &SockTabEntry| true)
}

/// Flags as selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub all: bool,
    pub listening: bool,
    pub ipv4: bool,
    pub ipv6: bool,
    pub udp: bool,
    pub tcp: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            all: false,
            listening: true,
            ipv4: false,
            ipv6: false,
            udp: false,
            tcp: false,
        }
    }
}

/// Concrete selection criteria derived from [`FilterOptions`].
pub struct Filter {
    pub families: Families,
    pub transports: Vec<Transport>,
    tcp_accept: AcceptFn,
    udp_accept: AcceptFn,
}

impl Filter {
    pub fn new(opts: &FilterOptions) -> Self {
        let mut families = Families::empty();
        if opts.ipv4 {
            families.insert(Family::Ipv4);
        }
        if opts.ipv6 {
            families.insert(Family::Ipv6);
        }
        if families.is_empty() {
            families = Families::BOTH;
        }

        let mut transports = Vec::with_capacity(2);
        if opts.udp {
            transports.push(Transport::Udp);
        }
        if opts.tcp || !opts.udp {
            transports.push(Transport::Tcp);
        }

        let tcp_accept: AcceptFn = if opts.all {
            noop_filter()
        } else if opts.listening {
            Box::new(|s: &SockTabEntry| s.state == SkState::Listen)
        } else {
            Box::new(|s: &SockTabEntry| s.state != SkState::Listen)
        };

        Self {
            families,
            transports,
            tcp_accept,
            udp_accept: noop_filter(),
        }
    }

    /// Predicate to hand to the provider for `transport`. UDP never sees the TCP state policy.
    pub fn accept_fn(&self, transport: Transport) -> &AcceptFn {
        match transport {
            Transport::Tcp => &self.tcp_accept,
            Transport::Udp => &self.udp_accept,
        }
    }

    /// (transport, family) combinations in reporting order: UDP before TCP, IPv4 before IPv6.
    pub fn combinations(&self) -> Vec<(Transport, Family)> {
        let mut combos = Vec::new();
        for transport in [Transport::Udp, Transport::Tcp] {
            if !self.transports.contains(&transport) {
                continue;
            }
            for family in self.families.iter() {
                combos.push((transport, family));
            }
        }
        combos
    }
}
