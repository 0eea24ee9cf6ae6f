//! Geometry view of a compiled network, keyed by the model's element names.
//!
//! Only coordinates are exposed here; drawing belongs to whatever consumes it.

use crate::model::{NetworkModel, TransformerKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoKind {
    Bus,
    SubstationTransformer,
    DistributionTransformer,
    Capacitor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub id: String,
    pub kind: GeoKind,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoLine {
    pub id: String,
    pub coords: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct GeoModel {
    pub points: Vec<GeoPoint>,
    pub lines: Vec<GeoLine>,
}

impl GeoModel {
    pub fn from_model(model: &NetworkModel) -> Self {
        let mut geo = GeoModel::default();

        for bus in &model.buses {
            if let Some((x, y)) = bus.coord {
                geo.points.push(GeoPoint {
                    id: bus.name.clone(),
                    kind: GeoKind::Bus,
                    x,
                    y,
                });
            }
        }

        for tx in &model.transformers {
            let kind = match tx.kind {
                TransformerKind::Substation => GeoKind::SubstationTransformer,
                TransformerKind::Distribution { .. } => GeoKind::DistributionTransformer,
                _ => continue,
            };
            // Substations sit at their MV busbar, distribution units at their MV tap.
            let anchor = match kind {
                GeoKind::SubstationTransformer => tx.secondary,
                _ => tx.primary,
            };
            if let Some((x, y)) = model.bus(anchor).coord {
                geo.points.push(GeoPoint {
                    id: tx.name.clone(),
                    kind,
                    x,
                    y,
                });
            }
        }

        for cap in &model.capacitors {
            if let Some((x, y)) = model.bus(cap.bus).coord {
                geo.points.push(GeoPoint {
                    id: cap.name.clone(),
                    kind: GeoKind::Capacitor,
                    x,
                    y,
                });
            }
        }

        for line in model.mv_lines() {
            let from = model.bus(line.from.bus).coord;
            let to = model.bus(line.to.bus).coord;
            if let (Some(a), Some(b)) = (from, to) {
                geo.lines.push(GeoLine {
                    id: line.name.clone(),
                    coords: vec![a, b],
                });
            }
        }

        geo
    }

    pub fn point(&self, id: &str) -> Option<&GeoPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn line(&self, id: &str) -> Option<&GeoLine> {
        self.lines.iter().find(|l| l.id == id)
    }
}
