//! Ansible dynamic inventory document.
//!
//! The shape is fixed: a single `iag_devices` child group under `all`, with
//! every host's variables under `_meta.hostvars` so Ansible never needs to
//! call back with `--host`.

use serde::Serialize;
use serde_json::{Map, Value};

use super::device::{Device, Variables};
use crate::error::{Error, Result};

pub const DEVICE_GROUP: &str = "iag_devices";

/// Only this device name gets its host name derived from `ansible_host`.
const RENAMED_DEVICE: &str = "device1";
const STRIPPED_PREFIXES: [&str; 3] = ["sandbox-", "lab-", "test-"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllGroup {
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostGroup {
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub hostvars: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryDocument {
    pub all: AllGroup,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iag_devices: Option<HostGroup>,
    #[serde(rename = "_meta")]
    pub meta: Meta,
}

impl InventoryDocument {
    /// The document emitted when the gateway could not be queried.
    pub fn empty() -> Self {
        Self {
            all: AllGroup {
                hosts: Vec::new(),
                children: None,
            },
            iag_devices: None,
            meta: Meta {
                hostvars: Map::new(),
            },
        }
    }

    /// Build the inventory from devices in API order.
    ///
    /// Devices without variables are dropped. Hosts are not de-duplicated: a
    /// repeated host name is listed twice and its hostvars entry ends up
    /// holding the last device's variables.
    pub fn from_devices(devices: &[Device]) -> Result<Self> {
        let mut hosts = Vec::with_capacity(devices.len());
        let mut hostvars = Map::new();

        for device in devices {
            if device.variables.is_empty() {
                continue;
            }
            let host = host_name(device)?;
            hostvars.insert(
                host.clone(),
                Value::Object(device.variables.clone()),
            );
            hosts.push(host);
        }

        Ok(Self {
            all: AllGroup {
                hosts: hosts.clone(),
                children: Some(vec![DEVICE_GROUP.to_string()]),
            },
            iag_devices: Some(HostGroup { hosts }),
            meta: Meta { hostvars },
        })
    }

    /// Variables for one host, empty when the host is unknown.
    pub fn host_vars(&self, host: &str) -> Variables {
        self.meta
            .hostvars
            .get(host)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    pub fn hosts(&self) -> &[String] {
        &self.all.hosts
    }
}

/// Inventory host name for a device.
///
/// A `device1` whose `ansible_host` is set (non-empty, non-zero, non-null)
/// but not a string cannot be renamed and fails the whole build.
pub fn host_name(device: &Device) -> Result<String> {
    if device.name != RENAMED_DEVICE {
        return Ok(device.name.clone());
    }
    match device.ansible_host() {
        Some(Value::String(fqdn)) if !fqdn.is_empty() => Ok(short_host_name(fqdn).to_string()),
        Some(value) if is_set(value) => Err(Error::AnsibleHost {
            device: device.name.clone(),
            value: value.to_string(),
        }),
        _ => Ok(device.name.clone()),
    }
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// First DNS label with at most one environment prefix removed.
fn short_host_name(fqdn: &str) -> &str {
    let base = fqdn.split('.').next().unwrap_or(fqdn);
    STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| base.strip_prefix(prefix))
        .unwrap_or(base)
}
