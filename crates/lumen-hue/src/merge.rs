//! Reconciling discovery batches with the known bridge list

use std::sync::Arc;
use tracing::debug;

use crate::bridge::{Bridge, BridgeDescriptor, BridgeStatus};
use crate::transport::BridgeTransport;

/// What a merge did to the known bridge list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Bridges appended because their id was unknown
    pub added: usize,
    /// Placeholders replaced by discovered state
    pub promoted: usize,
    /// Entries matching a live bridge, left as they were
    pub untouched: usize,
}

impl MergeSummary {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.promoted > 0
    }
}

/// Merge a discovery batch into `known`
///
/// Matching is by bridge id only. An `Undiscovered` match is replaced wholesale
/// by the discovered state; any other match is left alone so credentials are
/// never reset by a later scan. Unknown ids are appended, so existing entries
/// keep their positions.
pub fn merge_discovered(
    known: &mut Vec<Bridge>,
    found: Vec<BridgeDescriptor>,
    transport: &Arc<dyn BridgeTransport>,
) -> MergeSummary {
    let mut summary = MergeSummary::default();

    for descriptor in found {
        match known.iter_mut().find(|b| b.id == descriptor.id) {
            Some(existing) if existing.status == BridgeStatus::Undiscovered => {
                debug!(bridge = %descriptor.id, address = %descriptor.ip(), "Promoting placeholder bridge");
                *existing = Bridge::from_descriptor(descriptor, transport.clone());
                summary.promoted += 1;
            }
            Some(existing) => {
                debug!(bridge = %existing.id, status = ?existing.status, "Bridge already known");
                summary.untouched += 1;
            }
            None => {
                debug!(bridge = %descriptor.id, address = %descriptor.ip(), "New bridge discovered");
                known.push(Bridge::from_descriptor(descriptor, transport.clone()));
                summary.added += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Light;
    use crate::transport::OfflineTransport;
    use std::net::Ipv4Addr;

    fn transport() -> Arc<dyn BridgeTransport> {
        Arc::new(OfflineTransport)
    }

    fn descriptor(id: &str, last_octet: u8, status: BridgeStatus) -> BridgeDescriptor {
        BridgeDescriptor {
            id: id.to_string(),
            address: Ipv4Addr::new(192, 168, 1, last_octet).into(),
            status,
            friendly_name: format!("Bridge {}", id),
            ..Default::default()
        }
    }

    fn authenticated_bridge(id: &str) -> Bridge {
        let mut bridge = Bridge::new(transport(), id, Ipv4Addr::new(192, 168, 1, 1).into());
        bridge.status = BridgeStatus::Authenticated;
        bridge.username = "user".to_string();
        bridge.clientkey = "key".to_string();
        bridge.devices.push(Light {
            uniqueid: "abcd".to_string(),
            id: 1,
            bridgeid: id.to_string(),
            ..Light::default()
        });
        bridge
    }

    fn snapshot(bridges: &[Bridge]) -> Vec<(String, u32, BridgeStatus, String, String, usize)> {
        bridges
            .iter()
            .map(|b| {
                (
                    b.id.clone(),
                    b.address,
                    b.status,
                    b.username.clone(),
                    b.clientkey.clone(),
                    b.devices.len(),
                )
            })
            .collect()
    }

    #[test]
    fn test_new_bridge_appended() {
        let transport = transport();
        let mut known = vec![authenticated_bridge("A")];

        let summary = merge_discovered(
            &mut known,
            vec![descriptor("B", 2, BridgeStatus::Discovered)],
            &transport,
        );

        assert_eq!(summary.added, 1);
        assert_eq!(known.len(), 2);
        assert_eq!(known[0].id, "A");
        assert_eq!(known[1].id, "B");
        assert_eq!(known[1].ip(), Ipv4Addr::new(192, 168, 1, 2));
    }

    #[test]
    fn test_placeholder_promoted() {
        let transport = transport();
        let mut known = vec![
            authenticated_bridge("A"),
            Bridge::new(transport.clone(), "B", Ipv4Addr::new(10, 0, 0, 9).into()),
        ];

        let summary = merge_discovered(
            &mut known,
            vec![descriptor("B", 7, BridgeStatus::Discovered)],
            &transport,
        );

        assert_eq!(summary.promoted, 1);
        assert_eq!(known.len(), 2);
        assert_eq!(known[1].id, "B");
        assert_eq!(known[1].status, BridgeStatus::Discovered);
        assert_eq!(known[1].ip(), Ipv4Addr::new(192, 168, 1, 7));
        assert_eq!(known[1].friendly_name, "Bridge B");
    }

    #[test]
    fn test_live_bridge_untouched() {
        let transport = transport();
        let mut known = vec![authenticated_bridge("A")];
        let before = snapshot(&known);

        let mut stale = descriptor("A", 99, BridgeStatus::Discovered);
        stale.username = "other".to_string();
        let summary = merge_discovered(&mut known, vec![stale], &transport);

        assert_eq!(summary.untouched, 1);
        assert!(!summary.changed());
        assert_eq!(snapshot(&known), before);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let transport = transport();
        let batch = vec![
            descriptor("A", 1, BridgeStatus::Discovered),
            descriptor("C", 3, BridgeStatus::Discovered),
        ];
        let mut known = vec![
            authenticated_bridge("A"),
            Bridge::new(transport.clone(), "B", 0),
        ];

        merge_discovered(&mut known, batch.clone(), &transport);
        let once = snapshot(&known);
        let summary = merge_discovered(&mut known, batch, &transport);

        assert_eq!(snapshot(&known), once);
        assert_eq!(summary.untouched, 2);
        assert_eq!(known.len(), 3);
        assert_eq!(known[0].username, "user");
    }

    #[test]
    fn test_promotion_is_idempotent() {
        let transport = transport();
        let batch = vec![descriptor("B", 2, BridgeStatus::Discovered)];
        let mut known = vec![Bridge::new(transport.clone(), "B", 0)];

        let first = merge_discovered(&mut known, batch.clone(), &transport);
        assert_eq!(first.promoted, 1);
        let once = snapshot(&known);

        let second = merge_discovered(&mut known, batch, &transport);
        assert_eq!(snapshot(&known), once);
        assert_eq!(second.promoted, 0);
        assert_eq!(second.untouched, 1);
        assert!(!second.changed());
        assert_eq!(known.len(), 1);
        assert_eq!(known[0].status, BridgeStatus::Discovered);
        assert_eq!(known[0].ip(), Ipv4Addr::new(192, 168, 1, 2));
    }

    #[test]
    fn test_later_entries_processed_after_match() {
        let transport = transport();
        let mut known = vec![authenticated_bridge("A")];

        let summary = merge_discovered(
            &mut known,
            vec![
                descriptor("A", 1, BridgeStatus::Discovered),
                descriptor("B", 2, BridgeStatus::Discovered),
            ],
            &transport,
        );

        assert_eq!(summary.untouched, 1);
        assert_eq!(summary.added, 1);
        assert_eq!(known.len(), 2);
    }

    #[test]
    fn test_duplicate_ids_in_batch() {
        let transport = transport();
        let mut known = Vec::new();

        merge_discovered(
            &mut known,
            vec![
                descriptor("A", 1, BridgeStatus::Discovered),
                descriptor("A", 2, BridgeStatus::Discovered),
            ],
            &transport,
        );

        assert_eq!(known.len(), 1);
        assert_eq!(known[0].ip(), Ipv4Addr::new(192, 168, 1, 1));
    }

    #[test]
    fn test_empty_batch() {
        let transport = transport();
        let mut known = vec![authenticated_bridge("A")];
        let summary = merge_discovered(&mut known, Vec::new(), &transport);
        assert_eq!(summary, MergeSummary::default());
        assert_eq!(known.len(), 1);
    }
}
