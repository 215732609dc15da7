// ── Device discovery ──
//
// Fetch the edge inventory once and split it into push-eligible
// template groups and skip records. `partition` is pure so each rule
// can be exercised without a manager.

use indexmap::IndexMap;
use tracing::{debug, info};
use vpush_api::{EdgeDevice, ManagerClient};

use crate::error::CoreError;
use crate::matcher::DevicePatterns;
use crate::model::{Device, SkipReason, SkipRecord, TemplateGroup};

/// Result of filtering the inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Push-eligible devices keyed by template id, in first-seen order.
    pub groups: IndexMap<String, TemplateGroup>,
    /// Matched devices that will not be pushed.
    pub skipped: Vec<SkipRecord>,
    /// Devices matching the patterns, skipped ones included.
    pub matched: usize,
}

impl Discovery {
    /// Number of devices across all template groups.
    pub fn eligible(&self) -> usize {
        self.groups.values().map(|g| g.devices.len()).sum()
    }
}

/// Fetch all edge devices and partition them against `patterns`.
pub async fn discover(
    client: &ManagerClient,
    patterns: &DevicePatterns,
) -> Result<Discovery, CoreError> {
    let inventory = client.list_vedges().await?;
    let total = inventory.len();
    let discovery = partition(inventory, patterns);

    info!(
        inventory = total,
        matched = discovery.matched,
        eligible = discovery.eligible(),
        skipped = discovery.skipped.len(),
        templates = discovery.groups.len(),
        "discovered edge devices"
    );
    Ok(discovery)
}

/// Apply the discovery rules, in order:
///
/// 1. unconfigured devices are dropped silently and not counted
/// 2. devices matching no pattern are dropped and not counted
/// 3. matched devices without a template are skipped
/// 4. unreachable matched devices are skipped
/// 5. the rest join the group of their template
pub fn partition(
    inventory: impl IntoIterator<Item = EdgeDevice>,
    patterns: &DevicePatterns,
) -> Discovery {
    let mut discovery = Discovery::default();

    for edge in inventory {
        let Some(device) = Device::from_edge(edge) else {
            continue;
        };

        if !patterns.matches(&device.system_ip, &device.host_name) {
            continue;
        }
        discovery.matched += 1;

        let Some(template) = device.template.clone() else {
            debug!(host = %device.host_name, "no device template attached");
            discovery
                .skipped
                .push(SkipRecord::new(device, SkipReason::NoTemplate));
            continue;
        };

        if !device.reachable {
            debug!(host = %device.host_name, "device unreachable");
            discovery
                .skipped
                .push(SkipRecord::new(device, SkipReason::Unreachable));
            continue;
        }

        discovery
            .groups
            .entry(template.id.clone())
            .or_insert_with(|| TemplateGroup::new(&template))
            .devices
            .push(device);
    }

    discovery
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn edge(name: &str, ip: &str, template: Option<(&str, &str)>, reachable: bool) -> EdgeDevice {
        EdgeDevice {
            system_ip: Some(ip.into()),
            host_name: Some(name.into()),
            uuid: Some(format!("uuid-{name}")),
            template: template.map(|(_, name)| name.into()),
            template_id: template.map(|(id, _)| id.into()),
            reachability: Some(if reachable { "reachable" } else { "unreachable" }.into()),
        }
    }

    fn patterns(globs: &[&str]) -> DevicePatterns {
        DevicePatterns::new(globs).unwrap()
    }

    fn host_names(group: &TemplateGroup) -> Vec<&str> {
        group.devices.iter().map(|d| d.host_name.as_str()).collect()
    }

    #[test]
    fn groups_by_template_and_skips_unreachable() {
        let inventory = vec![
            edge("edge-1", "10.0.0.1", Some(("T1", "branch")), true),
            edge("edge-2", "10.0.0.2", Some(("T1", "branch")), true),
            edge("edge-3", "10.0.0.3", Some(("T1", "branch")), false),
        ];

        let discovery = partition(inventory, &patterns(&["edge-*"]));

        assert_eq!(discovery.matched, 3);
        assert_eq!(discovery.groups.len(), 1);
        assert_eq!(host_names(&discovery.groups["T1"]), vec!["edge-1", "edge-2"]);
        assert_eq!(discovery.skipped.len(), 1);
        assert_eq!(discovery.skipped[0].device.host_name, "edge-3");
        assert_eq!(discovery.skipped[0].reason, SkipReason::Unreachable);
        assert!(discovery.skipped[0].reason.to_string().contains("unreachable"));
    }

    #[test]
    fn unattached_device_is_skipped_exactly_once() {
        let inventory = vec![edge("edge-1", "10.0.0.1", None, false)];

        let discovery = partition(inventory, &patterns(&["*"]));

        assert_eq!(discovery.matched, 1);
        assert!(discovery.groups.is_empty());
        assert_eq!(discovery.skipped.len(), 1);
        assert_eq!(discovery.skipped[0].reason, SkipReason::NoTemplate);
        assert!(
            discovery.skipped[0]
                .reason
                .to_string()
                .contains("not attached to a device template")
        );
    }

    #[test]
    fn unconfigured_devices_are_invisible() {
        let mut no_ip = edge("edge-1", "10.0.0.1", Some(("T1", "branch")), true);
        no_ip.system_ip = None;
        let mut no_name = edge("edge-2", "10.0.0.2", None, true);
        no_name.host_name = None;
        let mut no_uuid = edge("edge-3", "10.0.0.3", Some(("T1", "branch")), false);
        no_uuid.uuid = Some(String::new());

        let discovery = partition(vec![no_ip, no_name, no_uuid], &patterns(&["*"]));

        assert_eq!(discovery, Discovery::default());
    }

    #[test]
    fn unmatched_devices_are_not_counted() {
        let inventory = vec![
            edge("core-1", "10.9.0.1", Some(("T1", "core")), true),
            edge("edge-1", "10.0.0.1", None, true),
        ];

        let discovery = partition(inventory, &patterns(&["core-*"]));

        assert_eq!(discovery.matched, 1);
        assert!(discovery.skipped.is_empty());
        assert_eq!(host_names(&discovery.groups["T1"]), vec!["core-1"]);
    }

    #[test]
    fn ip_patterns_match_system_ip() {
        let inventory = vec![
            edge("a", "10.0.0.1", Some(("T1", "branch")), true),
            edge("b", "10.0.1.1", Some(("T1", "branch")), true),
        ];

        let discovery = partition(inventory, &patterns(&["10.0.0.?"]));

        assert_eq!(discovery.matched, 1);
        assert_eq!(host_names(&discovery.groups["T1"]), vec!["a"]);
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let inventory = vec![
            edge("e1", "10.0.0.1", Some(("T2", "hub")), true),
            edge("e2", "10.0.0.2", Some(("T1", "branch")), true),
            edge("e3", "10.0.0.3", Some(("T2", "hub")), true),
        ];

        let discovery = partition(inventory, &patterns(&["*"]));

        let order: Vec<&str> = discovery.groups.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["T2", "T1"]);
        assert_eq!(host_names(&discovery.groups["T2"]), vec!["e1", "e3"]);
        assert_eq!(discovery.groups["T1"].name, "branch");
        assert_eq!(discovery.eligible(), 3);
    }
}
