#![allow(clippy::module_name_repetitions)]
//! Host facts gathered from a staging container.
//!
//! The command battery lives here; how each command is executed is up to the
//! caller (`ExecutionContext::gather_facts`). Parsing is pure.

pub mod host;
pub mod network;

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use clap::ValueEnum;
use serde::Serialize;

pub use host::{parse_cpuinfo, parse_env, parse_meminfo, parse_release, parse_resolv};
pub use host::{CpuInfo, DnsInfo, MemInfo};
pub use network::{parse_ifconfig, InterfaceInfo, Ipv4Entry, Ipv6Entry};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, ValueEnum)]
pub enum FactCategory {
    All,
    Hw,
    Env,
    Release,
    Uname,
    Net,
}

impl FactCategory {
    const CONCRETE: [FactCategory; 5] = [
        FactCategory::Hw,
        FactCategory::Env,
        FactCategory::Release,
        FactCategory::Uname,
        FactCategory::Net,
    ];

    /// Expand a request into concrete categories; empty or `all` means everything.
    pub fn expand(requested: &[FactCategory]) -> BTreeSet<FactCategory> {
        if requested.is_empty() || requested.contains(&FactCategory::All) {
            Self::CONCRETE.into_iter().collect()
        } else {
            requested.iter().copied().collect()
        }
    }
}

impl FromStr for FactCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <FactCategory as ValueEnum>::from_str(s.trim(), true)
            .map_err(|_| format!("unknown fact category: {s}"))
    }
}

/// One introspection command of the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactCommand {
    /// Executed directly, no shell.
    Argv(&'static [&'static str]),
    /// Needs `/bin/sh -c` (glob expansion).
    Shell(&'static str),
}

const UNAME_FLAGS: [(&str, &[&str]); 8] = [
    ("machine", &["uname", "-m"]),
    ("hardware_platform", &["uname", "-i"]),
    ("nodename", &["uname", "-n"]),
    ("kernel_release", &["uname", "-r"]),
    ("kernel_version", &["uname", "-v"]),
    ("kernel_name", &["uname", "-s"]),
    ("processor", &["uname", "-p"]),
    ("operating_system", &["uname", "-o"]),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uname: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<BTreeMap<String, InterfaceInfo>>,
}

/// Run the battery for `categories` through `run` and parse every output.
pub fn gather(categories: &[FactCategory], mut run: impl FnMut(FactCommand) -> String) -> Facts {
    let mut facts = Facts::default();
    for cat in FactCategory::expand(categories) {
        match cat {
            FactCategory::Hw => {
                facts.cpu = Some(parse_cpuinfo(&run(FactCommand::Argv(&[
                    "cat",
                    "/proc/cpuinfo",
                ]))));
                facts.memory = Some(parse_meminfo(&run(FactCommand::Argv(&[
                    "cat",
                    "/proc/meminfo",
                ]))));
            }
            FactCategory::Env => {
                facts.env = Some(parse_env(&run(FactCommand::Argv(&["env"]))));
            }
            FactCategory::Release => {
                facts.release = Some(parse_release(&run(FactCommand::Shell(
                    "cat /etc/*release*",
                ))));
            }
            FactCategory::Uname => {
                let mut uname = BTreeMap::new();
                for (key, argv) in UNAME_FLAGS {
                    uname.insert(key.to_string(), run(FactCommand::Argv(argv)).trim().to_string());
                }
                facts.uname = Some(uname);
            }
            FactCategory::Net => {
                let hostname = run(FactCommand::Argv(&["cat", "/etc/hostname"]))
                    .trim()
                    .to_string();
                facts.hostname = (!hostname.is_empty()).then_some(hostname);
                facts.dns = Some(parse_resolv(&run(FactCommand::Argv(&[
                    "cat",
                    "/etc/resolv.conf",
                ]))));
                facts.interfaces = Some(parse_ifconfig(&run(FactCommand::Argv(&["ifconfig"]))));
            }
            FactCategory::All => {}
        }
    }
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canned(cmd: FactCommand) -> String {
        match cmd {
            FactCommand::Argv(["cat", "/proc/cpuinfo"]) => "processor : 0\nmodel name : Test CPU\n".into(),
            FactCommand::Argv(["cat", "/proc/meminfo"]) => "MemTotal: 2048 kB\n".into(),
            FactCommand::Argv(["env"]) => "HOME=/root\n".into(),
            FactCommand::Shell("cat /etc/*release*") => "ID=alpine\n".into(),
            FactCommand::Argv(["uname", "-m"]) => "x86_64\n".into(),
            FactCommand::Argv(["cat", "/etc/hostname"]) => "stg\n".into(),
            FactCommand::Argv(["cat", "/etc/resolv.conf"]) => "nameserver 1.1.1.1\n".into(),
            FactCommand::Argv(["ifconfig"]) => "lo: flags=73<UP,LOOPBACK>\n  inet 127.0.0.1  netmask 255.0.0.0\n".into(),
            _ => String::new(),
        }
    }

    #[test]
    fn test_expand_categories() {
        assert_eq!(FactCategory::expand(&[]).len(), 5);
        assert_eq!(
            FactCategory::expand(&[FactCategory::Hw, FactCategory::All]).len(),
            5
        );
        let only = FactCategory::expand(&[FactCategory::Net, FactCategory::Net]);
        assert_eq!(only.into_iter().collect::<Vec<_>>(), vec![FactCategory::Net]);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("HW".parse::<FactCategory>(), Ok(FactCategory::Hw));
        assert_eq!(" net ".parse::<FactCategory>(), Ok(FactCategory::Net));
        assert!("disk".parse::<FactCategory>().is_err());
    }

    #[test]
    fn test_gather_filters_by_category() {
        let mut seen = Vec::new();
        let facts = gather(&[FactCategory::Hw], |cmd| {
            seen.push(cmd);
            canned(cmd)
        });
        assert_eq!(seen.len(), 2);
        assert_eq!(facts.cpu.as_ref().map(|c| c.num_cpus), Some(1));
        assert_eq!(facts.memory.as_ref().and_then(|m| m.mem_total), Some(2));
        assert!(facts.env.is_none());
        assert!(facts.interfaces.is_none());
    }

    #[test]
    fn test_gather_all_is_idempotent() {
        let a = gather(&[FactCategory::All], canned);
        let b = gather(&[FactCategory::All], canned);
        assert_eq!(a, b);
        assert_eq!(a.hostname.as_deref(), Some("stg"));
        assert_eq!(
            a.release.as_ref().and_then(|r| r.get("ID")).map(String::as_str),
            Some("alpine")
        );
        let uname = a.uname.as_ref().unwrap();
        assert_eq!(uname["machine"], "x86_64");
        assert_eq!(uname["processor"], "");
        assert!(a.interfaces.as_ref().unwrap().contains_key("lo"));
        assert_eq!(a.dns.as_ref().unwrap().nameservers, vec!["1.1.1.1"]);
    }
}
