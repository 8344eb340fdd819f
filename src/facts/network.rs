//! `ifconfig` parsing and IPv4 netmask helpers.
//!
//! Handles both the net-tools layout (`inet addr:... Mask:...`) and the
//! BSD/iproute-era layout (`inet ... netmask ...`).

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static IFACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^\s:]+)").expect("Invalid interface regex"));
static MAC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:HWaddr|ether|address:|lladdr) ([0-9a-fA-F:]+)").expect("Invalid hwaddr regex")
});
static INET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:inet addr:|inet [^\d]*)(.*?)\s").expect("Invalid inet regex")
});
static INET6: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:inet6 addr: (.*?)/|inet6 )([0-9a-fA-F:]+)").expect("Invalid inet6 regex")
});
static MASK6: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:inet6 addr: [0-9a-fA-F:]+/(\d+)|prefixlen (\d+))(?:\s+Scope:([a-zA-Z]+)|\s+scopeid (0x[0-9a-fA-F]+))?",
    )
    .expect("Invalid inet6 prefix regex")
});
static MASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:Mask:|netmask )(?:((?:0x)?[0-9a-fA-F]{8})|([\d\.]+))")
        .expect("Invalid netmask regex")
});
static BCAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:Bcast:|broadcast )([\d\.]+)").expect("Invalid broadcast regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipv4Entry {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ipv6Entry {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefixlen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hwaddr: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inet: Vec<Ipv4Entry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inet6: Vec<Ipv6Entry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub up: Option<bool>,
}

impl InterfaceInfo {
    /// Fold a later record for the same interface into this one. Fields
    /// already set here win; address lists are unioned in first-seen order.
    pub fn merge(&mut self, later: InterfaceInfo) {
        if self.hwaddr.is_none() {
            self.hwaddr = later.hwaddr;
        }
        if self.up.is_none() {
            self.up = later.up;
        }
        for a in later.inet {
            if !self.inet.contains(&a) {
                self.inet.push(a);
            }
        }
        for a in later.inet6 {
            if !self.inet6.contains(&a) {
                self.inet6.push(a);
            }
        }
    }
}

/// `"255.255.255.0"` -> `"11111111111111111111111100000000"`.
pub fn ipv4_to_bits(addr: &str) -> String {
    addr.split('.')
        .map(|octet| format!("{:08b}", octet.trim().parse::<u8>().unwrap_or(0)))
        .collect()
}

/// Dotted netmask for a prefix length; empty for anything outside 1..=32.
pub fn cidr_to_ipv4_netmask(bits: u32) -> String {
    if !(1..=32).contains(&bits) {
        return String::new();
    }
    let mask: u32 = u32::MAX << (32 - bits);
    let o = mask.to_be_bytes();
    format!("{}.{}.{}.{}", o[0], o[1], o[2], o[3])
}

/// `0xffffff00` -> `"255.255.255.0"` (only the number of set bits matters).
pub fn number_of_set_bits_to_ipv4_netmask(mask: u32) -> String {
    cidr_to_ipv4_netmask(mask.count_ones())
}

/// Split ifconfig output into per-interface blocks: a block starts at every
/// line that is not indented.
fn interface_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    for line in text.lines() {
        let starts_block = line.chars().next().is_some_and(|c| !c.is_whitespace());
        if starts_block || blocks.is_empty() {
            blocks.push(Vec::new());
        }
        if let Some(b) = blocks.last_mut() {
            b.push(line);
        }
    }
    blocks
}

fn parse_netmask(line: &str) -> Option<String> {
    let caps = MASK.captures(line)?;
    if let Some(hex) = caps.get(1) {
        let digits = hex.as_str().trim_start_matches("0x");
        let value = u32::from_str_radix(digits, 16).ok()?;
        Some(number_of_set_bits_to_ipv4_netmask(value))
    } else {
        caps.get(2).map(|m| m.as_str().to_string())
    }
}

fn parse_block(lines: &[&str]) -> (String, InterfaceInfo) {
    let mut name = String::new();
    let mut info = InterfaceInfo::default();
    let mut up = false;

    for line in lines {
        if let Some(m) = IFACE.captures(line).and_then(|c| c.get(1)) {
            name = m.as_str().to_string();
        }
        if let Some(m) = MAC.captures(line).and_then(|c| c.get(1)) {
            info.hwaddr = Some(m.as_str().to_string());
        }
        if let Some(m) = INET.captures(line).and_then(|c| c.get(1)) {
            info.inet.push(Ipv4Entry {
                address: m.as_str().to_string(),
                netmask: parse_netmask(line),
                broadcast: BCAST
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .map(|b| b.as_str().to_string()),
            });
        }
        if let Some(caps) = INET6.captures(line) {
            if let Some(addr) = caps.get(1).or_else(|| caps.get(2)) {
                let mask = MASK6.captures(line);
                let pick = |a: usize, b: usize| {
                    mask.as_ref()
                        .and_then(|c| c.get(a).or_else(|| c.get(b)))
                        .map(|m| m.as_str().to_string())
                };
                info.inet6.push(Ipv6Entry {
                    address: addr.as_str().to_string(),
                    prefixlen: pick(1, 2),
                    scope: pick(3, 4),
                });
            }
        }
        if line.contains("UP") {
            up = true;
        }
    }
    info.up = Some(up);
    (name, info)
}

/// Parse `ifconfig` output into interface records keyed by name. An
/// interface that appears in several blocks is merged with
/// [`InterfaceInfo::merge`].
pub fn parse_ifconfig(text: &str) -> BTreeMap<String, InterfaceInfo> {
    let mut out: BTreeMap<String, InterfaceInfo> = BTreeMap::new();
    for block in interface_blocks(text) {
        let (name, info) = parse_block(&block);
        if name.is_empty() {
            continue;
        }
        match out.get_mut(&name) {
            Some(existing) => existing.merge(info),
            None => {
                out.insert(name, info);
            }
        }
    }
    out
}
