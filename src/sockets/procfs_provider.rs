//! Linux socket tables read from `/proc/net/*`, attributed to processes via `/proc/<pid>/fd`
use std::collections::HashMap;

use log::debug;
use procfs::net::{TcpState, UdpState};
use procfs::process::FDTarget;

use crate::error::NetstatError;
use crate::sockets::provider::SocketTableProvider;
use crate::sockets::{Family, Process, SkState, SockTabEntry, Transport};

pub struct ProcfsProvider;

impl ProcfsProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SocketTableProvider for ProcfsProvider {
    fn enumerate(
        &self,
        transport: Transport,
        family: Family,
        accept: &dyn Fn(&SockTabEntry) -> bool,
    ) -> Result<Vec<SockTabEntry>, NetstatError> {
        let mut entries: Vec<SockTabEntry> = read_table(transport, family)?
            .into_iter()
            .filter(|e| accept(e))
            .collect();

        if entries.is_empty() {
            return Ok(entries);
        }

        let mut owners = socket_owners();
        for entry in &mut entries {
            entry.process = owners.remove(&entry.inode);
        }
        Ok(entries)
    }
}

fn table_error(table: &str, err: procfs::ProcError) -> NetstatError {
    NetstatError::ProviderError(format!("reading /proc/net/{}: {}", table, err))
}

fn read_table(transport: Transport, family: Family) -> Result<Vec<SockTabEntry>, NetstatError> {
    let entries: Vec<SockTabEntry> = match (transport, family) {
        (Transport::Tcp, Family::Ipv4) => procfs::net::tcp()
            .map_err(|e| table_error("tcp", e))?
            .into_iter()
            .map(tcp_entry)
            .collect(),
        (Transport::Tcp, Family::Ipv6) => procfs::net::tcp6()
            .map_err(|e| table_error("tcp6", e))?
            .into_iter()
            .map(tcp_entry)
            .collect(),
        (Transport::Udp, Family::Ipv4) => procfs::net::udp()
            .map_err(|e| table_error("udp", e))?
            .into_iter()
            .map(udp_entry)
            .collect(),
        (Transport::Udp, Family::Ipv6) => procfs::net::udp6()
            .map_err(|e| table_error("udp6", e))?
            .into_iter()
            .map(udp_entry)
            .collect(),
    };
    Ok(entries)
}

fn tcp_entry(e: procfs::net::TcpNetEntry) -> SockTabEntry {
    SockTabEntry {
        local_addr: e.local_address.into(),
        remote_addr: e.remote_address.into(),
        state: tcp_state(&e.state),
        uid: e.uid,
        inode: e.inode,
        process: None,
    }
}

fn udp_entry(e: procfs::net::UdpNetEntry) -> SockTabEntry {
    SockTabEntry {
        local_addr: e.local_address.into(),
        remote_addr: e.remote_address.into(),
        state: udp_state(&e.state),
        uid: e.uid,
        inode: e.inode,
        process: None,
    }
}

#[allow(unreachable_patterns)]
fn tcp_state(state: &TcpState) -> SkState {
    match state {
        TcpState::Established => SkState::Established,
        TcpState::SynSent => SkState::SynSent,
        TcpState::SynRecv => SkState::SynRecv,
        TcpState::FinWait1 => SkState::FinWait1,
        TcpState::FinWait2 => SkState::FinWait2,
        TcpState::TimeWait => SkState::TimeWait,
        TcpState::Close => SkState::Close,
        TcpState::CloseWait => SkState::CloseWait,
        TcpState::LastAck => SkState::LastAck,
        TcpState::Listen => SkState::Listen,
        TcpState::Closing => SkState::Closing,
        TcpState::NewSynRecv => SkState::NewSynRecv,
        _ => SkState::Close,
    }
}

#[allow(unreachable_patterns)]
fn udp_state(state: &UdpState) -> SkState {
    match state {
        UdpState::Established => SkState::Established,
        UdpState::Close => SkState::Close,
        _ => SkState::Close,
    }
}

/// Map socket inode -> owning process. Processes whose fd directory we cannot
/// read (other users, when unprivileged) are skipped.
fn socket_owners() -> HashMap<u64, Process> {
    let mut owners = HashMap::new();

    let processes = match procfs::process::all_processes() {
        Ok(p) => p,
        Err(e) => {
            debug!("cannot list processes: {}", e);
            return owners;
        }
    };

    for proc in processes.flatten() {
        let fds = match proc.fd() {
            Ok(fds) => fds,
            Err(_) => continue,
        };

        let mut owner: Option<Process> = None;
        for fd in fds.flatten() {
            if let FDTarget::Socket(inode) = fd.target {
                let p = owner.get_or_insert_with(|| describe(&proc));
                owners.entry(inode).or_insert_with(|| p.clone());
            }
        }
    }

    owners
}

fn describe(proc: &procfs::process::Process) -> Process {
    Process {
        pid: proc.pid(),
        name: proc.stat().map(|s| s.comm).unwrap_or_default(),
        exe: proc
            .exe()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        cmd: proc.cmdline().map(|c| c.join(" ")).unwrap_or_default(),
    }
}
