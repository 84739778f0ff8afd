//! Explicit per-entity audit snapshots.
//!
//! Each function emits the entity's stable serde schema as a JSON value;
//! rollback deserializes the same schema back into the entity. Secrets
//! (node API keys) never enter a snapshot.

use powerblockade_domain::{Blocklist, ForwardZone, ManualEntry, Node};
use serde_json::{json, Value};

pub fn blocklist_snapshot(bl: &Blocklist) -> Value {
    serde_json::to_value(bl).unwrap_or(Value::Null)
}

pub fn forward_zone_snapshot(zone: &ForwardZone) -> Value {
    serde_json::to_value(zone).unwrap_or(Value::Null)
}

pub fn manual_entry_snapshot(entry: &ManualEntry) -> Value {
    serde_json::to_value(entry).unwrap_or(Value::Null)
}

pub fn blocking_state_snapshot(state: &str) -> Value {
    json!({ "blocking_state": state })
}

/// Node snapshots redact the API key.
pub fn node_snapshot(node: &Node) -> Value {
    json!({
        "id": node.id,
        "name": node.name,
        "ip_address": node.ip_address,
        "version": node.version,
        "status": node.status.as_str(),
        "config_version": node.config_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerblockade_domain::{BlocklistFormat, ListType, NodeStatus};

    #[test]
    fn blocklist_snapshot_round_trips() {
        let bl = Blocklist::new(
            "ads".to_string(),
            "https://lists.example/ads.txt".to_string(),
            BlocklistFormat::Hosts,
            ListType::Block,
        );
        let snap = blocklist_snapshot(&bl);
        let back: Blocklist = serde_json::from_value(snap).unwrap();
        assert_eq!(back.url, bl.url);
        assert_eq!(back.format, bl.format);
    }

    #[test]
    fn node_snapshot_excludes_the_api_key() {
        let mut node = Node::new("edge-1".to_string(), "super-secret".to_string());
        node.status = NodeStatus::Active;
        let snap = node_snapshot(&node);
        assert!(snap.get("api_key").is_none());
        assert_eq!(snap["name"], "edge-1");
    }
}
