//! Electrical connectivity over conductors.
//!
//! Transformers are not edges: each connected component is a single voltage
//! zone fed by whichever winding lands on it.

use std::collections::HashMap;

use ff_core::BusId;
use petgraph::unionfind::UnionFind;
use tracing::debug;

use crate::model::{Bus, Line};

pub(crate) struct Zones {
    sets: UnionFind<usize>,
}

impl Zones {
    pub(crate) fn from_lines(bus_count: usize, lines: &[Line]) -> Self {
        let mut sets = UnionFind::new(bus_count);
        for line in lines {
            sets.union(line.from.bus.as_usize(), line.to.bus.as_usize());
        }
        Self { sets }
    }

    pub(crate) fn zone(&self, bus: BusId) -> usize {
        self.sets.find(bus.as_usize())
    }

    /// Spread each fed bus's kV over its zone. The first feed of a zone wins.
    pub(crate) fn propagate_kv(&self, buses: &mut [Bus], feeds: &[(BusId, f64)]) {
        let mut zone_kv: HashMap<usize, f64> = HashMap::new();
        for &(bus, kv) in feeds {
            let zone = self.zone(bus);
            match zone_kv.get(&zone) {
                Some(existing) if (existing - kv).abs() > 1e-9 => {
                    debug!(bus = %bus, existing, kv, "zone already has a voltage base");
                }
                Some(_) => {}
                None => {
                    zone_kv.insert(zone, kv);
                }
            }
        }
        for bus in buses.iter_mut() {
            if bus.kv_base.is_none() {
                bus.kv_base = zone_kv.get(&self.zone(bus.id)).copied();
            }
        }
    }
}
