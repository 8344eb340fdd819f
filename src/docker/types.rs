#![allow(clippy::module_name_repetitions)]
//! Records parsed from `docker images` / `docker ps` JSON lines.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Docker renders most `--format '{{json .}}'` fields as strings, but some
/// engines emit numbers or arrays for `Size`, `Labels` or `Ports`.
fn lenient_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        serde_json::Value::Array(items) => items
            .iter()
            .map(|i| match i {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Image {
    #[serde(rename = "ID", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "Repository", default, deserialize_with = "lenient_string")]
    pub repository: String,
    #[serde(rename = "Tag", default, deserialize_with = "lenient_string")]
    pub tag: String,
    #[serde(rename = "Size", default, deserialize_with = "lenient_string")]
    pub size: String,
    #[serde(rename = "CreatedAt", default, deserialize_with = "lenient_string")]
    pub created_at: String,
}

impl Image {
    /// The `repository:tag` reference used for existence checks.
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Container {
    #[serde(rename = "ID", default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "Names", default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "Image", default, deserialize_with = "lenient_string")]
    pub image: String,
    #[serde(rename = "Status", default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(rename = "Labels", default, deserialize_with = "lenient_string")]
    pub labels: String,
    #[serde(rename = "Mounts", default, deserialize_with = "lenient_string")]
    pub mounts: String,
    #[serde(rename = "Ports", default, deserialize_with = "lenient_string")]
    pub ports: String,
    #[serde(rename = "Command", default, deserialize_with = "lenient_string")]
    pub command: String,
    #[serde(rename = "CreatedAt", default, deserialize_with = "lenient_string")]
    pub created_at: String,
    #[serde(rename = "Networks", default, deserialize_with = "lenient_string")]
    pub networks: String,
    #[serde(rename = "RunningFor", default, deserialize_with = "lenient_string")]
    pub running_for: String,
}

impl Container {
    /// `Labels` is rendered as `k=v,k2=v2`; entries without `=` map to "".
    pub fn label_map(&self) -> BTreeMap<String, String> {
        split_list(&self.labels)
            .into_iter()
            .map(|kv| match kv.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (kv.to_string(), String::new()),
            })
            .collect()
    }

    pub fn mount_list(&self) -> Vec<&str> {
        split_list(&self.mounts)
    }

    pub fn port_list(&self) -> Vec<&str> {
        split_list(&self.ports)
    }
}

fn split_list(s: &str) -> Vec<&str> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
