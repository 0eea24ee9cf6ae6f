//! Inventory counts of a compiled network.

use core::fmt;

use ff_core::{CustomerClass, PhaseConfig};

use crate::model::{DistributionLayout, NetworkModel, TransformerKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSummary {
    pub residential_substations: usize,
    pub residential_customers: usize,
    pub commercial_substations: usize,
    pub commercial_customers: usize,
    pub swer_mv_transformers: usize,
    pub regulators: usize,
    pub capacitors: usize,
    pub swer_lv_transformers: usize,
    pub generators: usize,
    pub mv_length_km: f64,
    pub mv_swer_length_km: f64,
    pub lv_length_km: f64,
    pub lv_swer_length_km: f64,
}

impl NetworkSummary {
    pub fn from_model(model: &NetworkModel) -> Self {
        let mut summary = NetworkSummary::default();

        for tx in &model.transformers {
            match &tx.kind {
                TransformerKind::Distribution { layout, class, .. } => {
                    match class {
                        Some(CustomerClass::Residential) => summary.residential_substations += 1,
                        Some(CustomerClass::Commercial) => summary.commercial_substations += 1,
                        None => {}
                    }
                    if *layout != DistributionLayout::ThreePhase {
                        summary.swer_lv_transformers += 1;
                    }
                }
                TransformerKind::SwerIsolating => summary.swer_mv_transformers += 1,
                TransformerKind::Regulator { .. } => summary.regulators += 1,
                TransformerKind::Substation => {}
            }
        }

        for load in &model.loads {
            match load.class {
                CustomerClass::Residential => summary.residential_customers += 1,
                CustomerClass::Commercial => summary.commercial_customers += 1,
            }
        }

        summary.capacitors = model.capacitors.len();
        summary.generators = model.generators.len();

        for line in model.mv_lines() {
            summary.mv_length_km += line.length_km();
            if line.config == PhaseConfig::Single {
                summary.mv_swer_length_km += line.length_km();
            }
        }
        for line in model.lv_lines() {
            summary.lv_length_km += line.length_km();
            if line.config == PhaseConfig::Single {
                summary.lv_swer_length_km += line.length_km();
            }
        }

        summary
    }

    /// Labelled rows with zero quantities left out.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let counts = [
            ("LV residential substations", self.residential_substations),
            ("LV residential customers", self.residential_customers),
            ("LV non-residential substations", self.commercial_substations),
            ("LV non-residential customers", self.commercial_customers),
            ("SWER MV transformers", self.swer_mv_transformers),
            ("Voltage regulators", self.regulators),
            ("MV capacitors", self.capacitors),
            ("SWER LV transformers", self.swer_lv_transformers),
            ("LV generators", self.generators),
        ];
        let lengths = [
            ("MV conductor length", self.mv_length_km),
            ("MV SWER conductor length", self.mv_swer_length_km),
            ("LV conductor length", self.lv_length_km),
            ("LV SWER conductor length", self.lv_swer_length_km),
        ];

        let mut rows: Vec<(&'static str, String)> = counts
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(label, n)| (label, n.to_string()))
            .collect();
        rows.extend(
            lengths
                .into_iter()
                .filter(|(_, km)| (km * 100.0).round() > 0.0)
                .map(|(label, km)| (label, format!("{km:.2} km"))),
        );
        rows
    }
}

impl fmt::Display for NetworkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        writeln!(f, "| {:width$} | Quantity |", "Parameter")?;
        writeln!(f, "|{}|----------|", "-".repeat(width + 2))?;
        for (label, value) in rows {
            writeln!(f, "| {label:width$} | {value} |")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rows_are_omitted() {
        let summary = NetworkSummary {
            residential_substations: 2,
            residential_customers: 40,
            mv_length_km: 12.345,
            ..Default::default()
        };
        let rows = summary.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], ("MV conductor length", "12.35 km".to_string()));
        assert!(summary.to_string().contains("LV residential customers"));
        assert!(!summary.to_string().contains("regulators"));
    }
}
