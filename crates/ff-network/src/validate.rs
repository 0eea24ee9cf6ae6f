//! Structural checks applied during and after compilation.

use std::collections::HashSet;

use crate::error::{NetworkError, NetworkResult};
use crate::model::NetworkModel;

pub(crate) fn unique<'a>(
    names: impl IntoIterator<Item = &'a str>,
    context: &'static str,
) -> NetworkResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_ascii_lowercase()) {
            return Err(NetworkError::DuplicateId {
                id: name.to_string(),
                context,
            });
        }
    }
    Ok(())
}

pub(crate) fn finite(field: impl Into<String>, value: f64) -> NetworkResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(NetworkError::invalid(field, value, "must be finite"))
    }
}

pub(crate) fn non_negative(field: impl Into<String>, value: f64) -> NetworkResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(NetworkError::invalid(field, value, "must be a non-negative number"))
    }
}

pub(crate) fn positive(field: impl Into<String>, value: f64) -> NetworkResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(NetworkError::invalid(field, value, "must be positive"))
    }
}

pub(crate) fn power_factor(field: impl Into<String>, value: f64) -> NetworkResult<f64> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(NetworkError::invalid(field, value, "power factor must be in (0, 1]"))
    }
}

pub(crate) fn phase_count(field: impl Into<String>, value: u8) -> NetworkResult<u8> {
    if (1..=3).contains(&value) {
        Ok(value)
    } else {
        Err(NetworkError::invalid(field, value, "expected 1, 2 or 3"))
    }
}

/// Whole-model invariants: unique names per class, every id in range.
pub(crate) fn validate_model(model: &NetworkModel) -> NetworkResult<()> {
    unique(model.buses.iter().map(|b| b.name.as_str()), "buses")?;
    unique(model.lines.iter().map(|l| l.name.as_str()), "lines")?;
    unique(model.transformers.iter().map(|t| t.name.as_str()), "transformers")?;
    unique(model.capacitors.iter().map(|c| c.name.as_str()), "capacitors")?;
    unique(model.loads.iter().map(|l| l.name.as_str()), "loads")?;
    unique(model.generators.iter().map(|g| g.name.as_str()), "generators")?;

    let bus_count = model.buses.len();
    let in_range = |bus: ff_core::BusId, element: &str, field: &'static str| {
        if bus.as_usize() < bus_count {
            Ok(())
        } else {
            Err(NetworkError::ReferentialIntegrity {
                element: element.to_string(),
                field,
                id: bus.to_string(),
            })
        }
    };
    for line in &model.lines {
        in_range(line.from.bus, &line.name, "bus1")?;
        in_range(line.to.bus, &line.name, "bus2")?;
        if model.linecodes.get(&line.linecode).is_none() {
            return Err(NetworkError::ReferentialIntegrity {
                element: line.name.clone(),
                field: "linecode",
                id: line.linecode.clone(),
            });
        }
    }
    for tx in &model.transformers {
        in_range(tx.primary, &tx.name, "primary")?;
        in_range(tx.secondary, &tx.name, "secondary")?;
    }
    for cap in &model.capacitors {
        in_range(cap.bus, &cap.name, "bus1")?;
    }
    for load in &model.loads {
        in_range(load.bus, &load.name, "bus1")?;
    }
    for generator in &model.generators {
        in_range(generator.bus, &generator.name, "bus1")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_case_insensitive() {
        let err = unique(["Load_1", "load_1"], "loads").unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateId { context: "loads", .. }));
        assert!(unique(["a", "b"], "loads").is_ok());
    }

    #[test]
    fn numeric_guards() {
        assert!(positive("kva", 0.0).is_err());
        assert!(non_negative("length", 0.0).is_ok());
        assert!(power_factor("pf", 1.2).is_err());
        assert!(power_factor("pf", 0.95).is_ok());
        assert!(finite("x", f64::INFINITY).is_err());
        assert!(phase_count("phases", 0).is_err());
    }
}
