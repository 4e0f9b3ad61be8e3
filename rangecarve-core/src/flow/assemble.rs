use std::collections::{BTreeMap, HashSet};

use tracing::{info, warn};

use crate::domain::{Connection, FlowKey, PairKey, TransportRecord};
use crate::error::FlowError;
use crate::policy::{CarveOptions, DirectionPolicy};

/// Result of one grouping pass.
#[derive(Debug, Default)]
pub struct GroupOutcome {
    pub connections: Vec<Connection>,
    pub rejected: Vec<FlowError>,
    /// Records discarded because they touched an excluded port.
    pub excluded: u64,
}

/// Groups decoded records into bidirectional connections.
#[derive(Clone, Debug)]
pub struct FlowAssembler {
    excluded_ports: Vec<u16>,
    policy: DirectionPolicy,
}

impl Default for FlowAssembler {
    fn default() -> Self {
        Self::from_options(&CarveOptions::default())
    }
}

impl FlowAssembler {
    pub fn new(excluded_ports: Vec<u16>, policy: DirectionPolicy) -> Self {
        Self {
            excluded_ports,
            policy,
        }
    }

    pub fn from_options(opts: &CarveOptions) -> Self {
        Self::new(opts.excluded_ports.clone(), opts.direction)
    }

    fn is_excluded(&self, key: &FlowKey) -> bool {
        self.excluded_ports.iter().any(|p| key.touches_port(*p))
    }

    /// Build every connection in one batch. Rejected pairs are reported in
    /// the outcome and never abort the pass.
    pub fn group(&self, records: Vec<TransportRecord>) -> GroupOutcome {
        let mut out = GroupOutcome::default();

        let mut flows: BTreeMap<FlowKey, Vec<TransportRecord>> = BTreeMap::new();
        for rec in records {
            let key = rec.key();
            if self.is_excluded(&key) {
                out.excluded += 1;
                continue;
            }
            flows.entry(key).or_default().push(rec);
        }

        let keys: Vec<FlowKey> = flows.keys().copied().collect();
        let mut visited: HashSet<PairKey> = HashSet::with_capacity(keys.len());

        for key in keys {
            if !visited.insert(PairKey::of(&key)) {
                continue;
            }
            let mirror = key.mirror();
            let Some(mut forward) = flows.remove(&key) else {
                continue;
            };
            let backward = if mirror == key {
                None
            } else {
                flows.remove(&mirror)
            };
            let Some(mut backward) = backward.filter(|v| !v.is_empty()) else {
                warn!("no mirror flow for {key}");
                out.rejected.push(FlowError::IncompleteFlow(key));
                continue;
            };

            // segments can arrive out of order; equal sequence numbers keep capture order
            forward.sort_by_key(|r| r.seq);
            backward.sort_by_key(|r| r.seq);

            let forward_is_client = match self.resolve(&key, &forward, &backward) {
                Ok(v) => v,
                Err(e) => {
                    warn!("dropping flow pair: {e}");
                    out.rejected.push(e);
                    continue;
                }
            };

            let c = if forward_is_client {
                Connection {
                    client_key: key,
                    server_key: mirror,
                    client_segments: forward,
                    server_segments: backward,
                }
            } else {
                Connection {
                    client_key: mirror,
                    server_key: key,
                    client_segments: backward,
                    server_segments: forward,
                }
            };
            info!(
                "connection, client key {} | {}, server key {} | {}",
                c.client_key,
                c.client_segments.len(),
                c.server_key,
                c.server_segments.len()
            );
            out.connections.push(c);
        }

        out
    }

    /// `Ok(true)` when `key` is the client-to-server direction.
    fn resolve(
        &self,
        key: &FlowKey,
        forward: &[TransportRecord],
        backward: &[TransportRecord],
    ) -> Result<bool, FlowError> {
        let fwd_syn = forward.first().is_some_and(|r| r.is_syn());
        let back_syn = backward.first().is_some_and(|r| r.is_syn());
        match (fwd_syn, back_syn) {
            (true, false) => Ok(true),
            (false, true) => Ok(false),
            (false, false) => self
                .port_hint(key)
                .ok_or(FlowError::NoHandshakeObserved(*key, key.mirror())),
            (true, true) => self
                .port_hint(key)
                .ok_or(FlowError::AmbiguousHandshake(*key, key.mirror())),
        }
    }

    /// Servers answer from the lower (service) port.
    fn port_hint(&self, key: &FlowKey) -> Option<bool> {
        match self.policy {
            DirectionPolicy::Strict => None,
            DirectionPolicy::PortHint => match key.src_port.cmp(&key.dst_port) {
                std::cmp::Ordering::Greater => Some(true),
                std::cmp::Ordering::Less => Some(false),
                std::cmp::Ordering::Equal => None,
            },
        }
    }
}
