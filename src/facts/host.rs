//! Parsers for `/proc` files, `env`, `/etc/*release*` and `/etc/resolv.conf`.
//!
//! All parsers are line-oriented and best effort: lines that do not have the
//! expected shape are skipped.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CpuInfo {
    pub num_cpus: u32,
    pub cpu_model: String,
    pub cpu_flags: Vec<String>,
}

impl Default for CpuInfo {
    fn default() -> Self {
        Self {
            num_cpus: 0,
            cpu_model: "Unknown".to_string(),
            cpu_flags: Vec::new(),
        }
    }
}

/// Memory totals in megabytes (kB / 1024, truncated).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mem_free: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DnsInfo {
    pub nameservers: Vec<String>,
    pub sortlist: Vec<String>,
    pub domain: String,
    pub search: Vec<String>,
    pub options: Vec<String>,
}

/// Split `key: value` lines; lines with zero or several colons are ignored.
fn colon_pairs(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines().filter_map(|line| {
        let mut parts = line.split(':');
        let k = parts.next()?;
        let v = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some((k.trim(), v.trim()))
    })
}

/// Parse `cat /proc/cpuinfo`. The last `processor` index wins, so the count
/// is that index plus one.
pub fn parse_cpuinfo(text: &str) -> CpuInfo {
    let mut info = CpuInfo::default();
    for (k, v) in colon_pairs(text) {
        match k {
            "processor" => {
                if let Ok(n) = v.parse::<u32>() {
                    info.num_cpus = n.saturating_add(1);
                }
            }
            "model name" => info.cpu_model = v.to_string(),
            "flags" | "Features" => {
                info.cpu_flags = v.split_whitespace().map(str::to_string).collect();
            }
            _ => {}
        }
    }
    info
}

pub fn parse_meminfo(text: &str) -> MemInfo {
    let mut info = MemInfo::default();
    for (k, v) in colon_pairs(text) {
        let kb = match v.split_whitespace().next().and_then(|n| n.parse::<u64>().ok()) {
            Some(kb) => kb,
            None => continue,
        };
        match k {
            "MemTotal" => info.mem_total = Some(kb / 1024),
            "MemFree" => info.mem_free = Some(kb / 1024),
            _ => {}
        }
    }
    info
}

fn equals_pairs(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Parse `env` output.
pub fn parse_env(text: &str) -> BTreeMap<String, String> {
    equals_pairs(text)
}

/// Parse `cat /etc/*release*`; values keep their quotes.
pub fn parse_release(text: &str) -> BTreeMap<String, String> {
    equals_pairs(text)
}

/// Parse a resolver configuration (`/etc/resolv.conf`).
pub fn parse_resolv(text: &str) -> DnsInfo {
    let mut dns = DnsInfo::default();
    for line in text.lines() {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&key, rest)) = words.split_first() else {
            continue;
        };
        if key.starts_with('#') || key.starts_with(';') {
            continue;
        }
        let Some(&first) = rest.first() else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "nameserver" => push_unique(&mut dns.nameservers, first),
            "domain" => dns.domain = first.to_string(),
            "search" => dns.search = rest.iter().map(|s| s.to_string()).collect(),
            "sortlist" => {
                for ip in rest {
                    push_unique(&mut dns.sortlist, ip);
                }
            }
            "options" => push_unique(&mut dns.options, first),
            _ => {}
        }
    }
    dns
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|x| x == item) {
        list.push(item.to_string());
    }
}
