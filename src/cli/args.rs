//! Command-line argument parsing for the netstat tool
use std::ffi::OsString;

use clap::{ArgAction, Parser};

use crate::sockets::filter::FilterOptions;

/// Long option names that may also be written with a single dash (`-udp`).
const LONG_FLAGS: [&str; 8] = ["udp", "tcp", "lis", "all", "res", "csv", "help", "debug"];

#[derive(Parser, Debug)]
#[command(name = "netstat")]
#[command(about = "Display active network sockets", long_about = None)]
pub struct Cli {
    /// Display UDP sockets
    #[arg(long)]
    pub udp: bool,

    /// Display TCP sockets (default unless -udp is given)
    #[arg(long)]
    pub tcp: bool,

    /// Display only listening sockets
    #[arg(
        long = "lis",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = true,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub listening: bool,

    /// Display both listening and non-listening sockets
    #[arg(long)]
    pub all: bool,

    /// Lookup symbolic names for host addresses
    #[arg(long = "res")]
    pub resolve: bool,

    /// Display only IPv4 sockets
    #[arg(short = '4')]
    pub ipv4: bool,

    /// Display only IPv6 sockets
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Also write the result to this CSV file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<std::path::PathBuf>,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse process arguments, accepting the single-dash long form.
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            all: self.all,
            listening: self.listening,
            ipv4: self.ipv4,
            ipv6: self.ipv6,
            udp: self.udp,
            tcp: self.tcp,
        }
    }
}

/// Rewrite `-udp`, `-lis=false`, `-csv` etc. into their `--` form.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(s) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = s.strip_prefix('-') else {
                return arg;
            };
            if rest.starts_with('-') {
                return arg;
            }
            let name = rest.split('=').next().unwrap_or(rest);
            if LONG_FLAGS.contains(&name) {
                OsString::from(format!("-{}", s))
            } else {
                arg
            }
        })
        .collect()
}
