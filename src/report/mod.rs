//! Drives one enumeration pass and renders every entry to the configured sinks
use log::{debug, warn};

use crate::error::NetstatError;
use crate::formats::traits::{ReportRow, ReportSink};
use crate::lookup::AddrFormatter;
use crate::sockets::filter::Filter;
use crate::sockets::provider::SocketTableProvider;
use crate::sockets::{proto_tag, SockTabEntry};

/// What a pass produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub console_rows: usize,
    pub csv_rows: usize,
    /// Protocol tags whose socket table could not be read
    pub failed: Vec<&'static str>,
}

pub struct Reporter<'a> {
    provider: &'a dyn SocketTableProvider,
    formatter: AddrFormatter,
    console: Box<dyn ReportSink + 'a>,
    csv: Option<Box<dyn ReportSink + 'a>>,
}

impl<'a> Reporter<'a> {
    pub fn new(
        provider: &'a dyn SocketTableProvider,
        formatter: AddrFormatter,
        console: Box<dyn ReportSink + 'a>,
    ) -> Self {
        Self {
            provider,
            formatter,
            console,
            csv: None,
        }
    }

    pub fn with_csv(mut self, csv: Box<dyn ReportSink + 'a>) -> Self {
        self.csv = Some(csv);
        self
    }

    /// Headers first, then each selected (transport, family) table in order.
    /// A table that cannot be read contributes no rows.
    pub fn run(&mut self, filter: &Filter) -> Result<ReportSummary, NetstatError> {
        let mut summary = ReportSummary::default();

        self.console.write_header()?;
        if let Some(csv) = self.csv.as_mut() {
            csv.write_header()?;
        }

        for (transport, family) in filter.combinations() {
            let proto = proto_tag(transport, family);
            let accept = filter.accept_fn(transport);

            let entries = match self.provider.enumerate(transport, family, &**accept) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("skipping {}: {}", proto, e);
                    summary.failed.push(proto);
                    continue;
                }
            };
            debug!("{}: {} entries", proto, entries.len());

            for entry in &entries {
                self.render(proto, entry, &mut summary)?;
            }
        }

        self.console.finish()?;
        if let Some(csv) = self.csv.as_mut() {
            csv.finish()?;
        }

        Ok(summary)
    }

    fn render(
        &mut self,
        proto: &'static str,
        entry: &SockTabEntry,
        summary: &mut ReportSummary,
    ) -> Result<(), NetstatError> {
        let row = ReportRow {
            proto,
            local: self.formatter.format(&entry.local_addr),
            remote: self.formatter.format(&entry.remote_addr),
            state: entry.state,
            process: entry.process.as_ref(),
        };

        if self.console.write_row(&row)? {
            summary.console_rows += 1;
        }
        if let Some(csv) = self.csv.as_mut() {
            if csv.write_row(&row)? {
                summary.csv_rows += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::csv::CsvSink;
    use crate::formats::text::ConsoleSink;
    use crate::sockets::filter::FilterOptions;
    use crate::sockets::{Family, Process, SkState, SockAddr, Transport};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::net::IpAddr;
    use std::rc::Rc;

    /// Canned tables per (transport, family); `None` means the table errors.
    #[derive(Default)]
    struct FakeProvider {
        tables: HashMap<(Transport, Family), Option<Vec<SockTabEntry>>>,
        calls: RefCell<Vec<(Transport, Family)>>,
    }

    impl FakeProvider {
        fn table(mut self, t: Transport, f: Family, entries: Vec<SockTabEntry>) -> Self {
            self.tables.insert((t, f), Some(entries));
            self
        }

        fn failing(mut self, t: Transport, f: Family) -> Self {
            self.tables.insert((t, f), None);
            self
        }
    }

    impl SocketTableProvider for FakeProvider {
        fn enumerate(
            &self,
            transport: Transport,
            family: Family,
            accept: &dyn Fn(&SockTabEntry) -> bool,
        ) -> Result<Vec<SockTabEntry>, NetstatError> {
            self.calls.borrow_mut().push((transport, family));
            match self.tables.get(&(transport, family)) {
                Some(Some(entries)) => Ok(entries.iter().filter(|e| accept(e)).cloned().collect()),
                Some(None) => Err(NetstatError::ProviderError("table missing".to_string())),
                None => Ok(Vec::new()),
            }
        }
    }

    /// Writer shared between the sink and the test.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn entry(local: &str, remote: &str, state: SkState, process: Option<Process>) -> SockTabEntry {
        let parse = |s: &str| {
            let (ip, port) = s.rsplit_once(':').unwrap();
            SockAddr::new(ip.parse::<IpAddr>().unwrap(), port.parse().unwrap())
        };
        SockTabEntry {
            local_addr: parse(local),
            remote_addr: parse(remote),
            state,
            uid: 0,
            inode: 1,
            process,
        }
    }

    fn sshd() -> Process {
        Process {
            pid: 42,
            name: "sshd".to_string(),
            exe: "/usr/bin/sshd".to_string(),
            cmd: "/usr/bin/sshd -D".to_string(),
        }
    }

    fn run(
        provider: &FakeProvider,
        opts: FilterOptions,
        with_csv: bool,
    ) -> (ReportSummary, String, Option<String>) {
        let console = SharedBuf::default();
        let csv = SharedBuf::default();
        let mut reporter = Reporter::new(
            provider,
            AddrFormatter::numeric(),
            Box::new(ConsoleSink::new(console.clone())),
        );
        if with_csv {
            reporter = reporter.with_csv(Box::new(CsvSink::from_writer(csv.clone())));
        }
        let summary = reporter.run(&Filter::new(&opts)).unwrap();
        drop(reporter);
        (
            summary,
            console.contents(),
            with_csv.then(|| csv.contents()),
        )
    }

    #[test]
    fn test_listen_entry_without_process() {
        let provider = FakeProvider::default().table(
            Transport::Tcp,
            Family::Ipv4,
            vec![entry("0.0.0.0:22", "0.0.0.0:0", SkState::Listen, None)],
        );
        let (summary, console, csv) = run(&provider, FilterOptions::default(), true);

        let lines: Vec<&str> = console.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Proto "));
        assert!(lines[1].starts_with("tcp   0.0.0.0:22"));
        assert!(lines[1].contains("LISTEN"));
        // No program name column content
        assert!(lines[1].trim_end().ends_with("LISTEN"));

        assert_eq!(csv.unwrap().lines().count(), 1);
        assert_eq!(summary.console_rows, 1);
        assert_eq!(summary.csv_rows, 0);
    }

    #[test]
    fn test_established_entry_with_process_all_and_csv() {
        let provider = FakeProvider::default().table(
            Transport::Tcp,
            Family::Ipv4,
            vec![entry(
                "10.0.0.5:22",
                "10.0.0.9:51514",
                SkState::Established,
                Some(sshd()),
            )],
        );
        let opts = FilterOptions {
            all: true,
            ..Default::default()
        };
        let (summary, console, csv) = run(&provider, opts, true);

        assert!(console.lines().nth(1).unwrap().contains("42/sshd"));
        let csv = csv.unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "tcp");
        assert_eq!(&records[0][1], "10.0.0.5:22");
        assert_eq!(&records[0][3], "ESTABLISHED");
        assert_eq!(&records[0][4], "42");
        assert_eq!(&records[0][5], "/usr/bin/sshd");
        assert_eq!(summary.csv_rows, 1);
    }

    #[test]
    fn test_default_flags_hide_established() {
        let provider = FakeProvider::default().table(
            Transport::Tcp,
            Family::Ipv4,
            vec![
                entry("10.0.0.5:22", "10.0.0.9:51514", SkState::Established, Some(sshd())),
                entry("0.0.0.0:22", "0.0.0.0:0", SkState::Listen, Some(sshd())),
            ],
        );
        let (summary, console, _) = run(&provider, FilterOptions::default(), false);
        assert_eq!(summary.console_rows, 1);
        assert!(!console.contains("ESTABLISHED"));
    }

    #[test]
    fn test_ipv6_failure_does_not_abort() {
        let provider = FakeProvider::default()
            .table(
                Transport::Tcp,
                Family::Ipv4,
                vec![entry("127.0.0.1:631", "0.0.0.0:0", SkState::Listen, None)],
            )
            .failing(Transport::Tcp, Family::Ipv6);
        let (summary, console, _) = run(&provider, FilterOptions::default(), false);

        assert_eq!(summary.console_rows, 1);
        assert_eq!(summary.failed, vec!["tcp6"]);
        assert!(console.contains("127.0.0.1:631"));
    }

    #[test]
    fn test_headers_once_with_no_entries() {
        let provider = FakeProvider::default()
            .failing(Transport::Udp, Family::Ipv4)
            .failing(Transport::Udp, Family::Ipv6)
            .failing(Transport::Tcp, Family::Ipv4);
        let opts = FilterOptions {
            udp: true,
            tcp: true,
            ..Default::default()
        };
        let (summary, console, csv) = run(&provider, opts, true);

        assert_eq!(console.lines().count(), 1);
        assert_eq!(console.matches("Proto ").count(), 1);
        assert_eq!(
            csv.unwrap(),
            "Protocol,Loc Addr,Foreign Addr,State,PID,Exe,Cmd\n"
        );
        assert_eq!(summary.failed, vec!["udp", "udp6", "tcp"]);
    }

    #[test]
    fn test_combination_order_and_row_order() {
        let provider = FakeProvider::default()
            .table(
                Transport::Udp,
                Family::Ipv6,
                vec![entry("::1:53", ":::0", SkState::Close, None)],
            )
            .table(
                Transport::Udp,
                Family::Ipv4,
                vec![
                    entry("0.0.0.0:68", "0.0.0.0:0", SkState::Close, None),
                    entry("127.0.0.53:53", "0.0.0.0:0", SkState::Close, None),
                ],
            )
            .table(
                Transport::Tcp,
                Family::Ipv4,
                vec![entry("0.0.0.0:22", "0.0.0.0:0", SkState::Listen, None)],
            );
        let opts = FilterOptions {
            udp: true,
            tcp: true,
            ..Default::default()
        };
        let (_, console, _) = run(&provider, opts, false);

        let protos: Vec<&str> = console
            .lines()
            .skip(1)
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(protos, vec!["udp", "udp", "udp6", "tcp"]);
        assert!(console.lines().nth(1).unwrap().contains("0.0.0.0:68"));
        assert_eq!(
            *provider.calls.borrow(),
            vec![
                (Transport::Udp, Family::Ipv4),
                (Transport::Udp, Family::Ipv6),
                (Transport::Tcp, Family::Ipv4),
                (Transport::Tcp, Family::Ipv6),
            ]
        );
    }

    #[test]
    fn test_udp_rows_ignore_listening_flag() {
        let provider = FakeProvider::default().table(
            Transport::Udp,
            Family::Ipv4,
            vec![
                entry("0.0.0.0:68", "0.0.0.0:0", SkState::Close, None),
                entry("10.0.0.5:40000", "10.0.0.1:53", SkState::Established, None),
            ],
        );
        let opts = FilterOptions {
            udp: true,
            ipv4: true,
            ..Default::default()
        };
        let (summary, _, _) = run(&provider, opts, false);
        assert_eq!(summary.console_rows, 2);
    }
}
