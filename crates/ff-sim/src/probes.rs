//! What gets measured after each solve, resolved once from the model.

use ff_circuit::{BusRef, CircuitError, ElementRef, SolverSession};
use ff_network::NetworkModel;
use ff_results::{
    AssetRating, LoadRecord, MetricError, MetricResult, apparent_power, phase_average,
};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone)]
pub struct LineProbe {
    pub element: ElementRef,
    pub phases: usize,
    pub ampacity: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct TransformerProbe {
    pub element: ElementRef,
    pub conductors: usize,
    pub rated_kva: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct LoadProbe {
    pub element: ElementRef,
    pub bus: BusRef,
    pub phases: usize,
    /// Generation attributed to this load, with its phase count.
    pub generation: Vec<(ElementRef, usize)>,
}

#[derive(Debug, Clone)]
pub struct Probes {
    pub lines: Vec<LineProbe>,
    pub transformers: Vec<TransformerProbe>,
    pub substation: TransformerProbe,
    pub loads: Vec<LoadProbe>,
}

impl Probes {
    pub fn from_model(model: &NetworkModel) -> SimResult<Self> {
        let substation = model.substation().ok_or(SimError::NoSubstation)?;
        Ok(Self {
            lines: model
                .mv_lines()
                .map(|line| LineProbe {
                    element: ElementRef::line(line),
                    phases: usize::from(line.config.phase_count()),
                    ampacity: line.ampacity,
                })
                .collect(),
            transformers: model
                .distribution_transformers()
                .map(|tx| TransformerProbe {
                    element: ElementRef::transformer(tx),
                    conductors: tx.primary_conductors(),
                    rated_kva: tx.rated_kva,
                })
                .collect(),
            substation: TransformerProbe {
                element: ElementRef::transformer(substation),
                conductors: substation.primary_conductors(),
                rated_kva: substation.rated_kva,
            },
            loads: model
                .loads
                .iter()
                .zip(model.generation_by_load())
                .map(|(load, generation)| LoadProbe {
                    element: ElementRef::load(load),
                    bus: BusRef::of(model, load.bus),
                    phases: usize::from(load.phases),
                    generation: generation
                        .into_iter()
                        .map(|g| (ElementRef::generator(g), usize::from(g.phases)))
                        .collect(),
                })
                .collect(),
        })
    }

    pub fn transformer_ratings(&self) -> Vec<AssetRating> {
        self.transformers
            .iter()
            .map(|t| AssetRating::new(&t.element.name, t.rated_kva))
            .collect()
    }

    pub fn line_ratings(&self) -> Vec<AssetRating> {
        self.lines
            .iter()
            .map(|l| AssetRating::new(&l.element.name, l.ampacity))
            .collect()
    }
}

/// A reading shorter than the element's phase metadata is a protocol fault.
fn checked(element: &ElementRef, value: MetricResult<f64>) -> SimResult<f64> {
    value.map_err(|e| match e {
        MetricError::ShortVector { expected, got } => {
            SimError::Circuit(CircuitError::PhaseMismatch {
                element: element.to_string(),
                expected,
                got,
            })
        }
        other => SimError::Circuit(CircuitError::protocol(other.to_string())),
    })
}

impl LineProbe {
    /// Mean phase current magnitude at the sending end, amps.
    pub fn read<S: SolverSession>(&self, session: &mut S) -> SimResult<f64> {
        let currents = session.currents(&self.element)?;
        checked(&self.element, phase_average(&currents, self.phases))
    }
}

impl TransformerProbe {
    /// Apparent power through the primary terminal, kVA.
    pub fn read<S: SolverSession>(&self, session: &mut S) -> SimResult<f64> {
        let powers = session.powers(&self.element)?;
        checked(&self.element, apparent_power(&powers, self.conductors))
    }
}

fn sum_pq(element: &ElementRef, pq: &[f64], conductors: usize) -> SimResult<(f64, f64)> {
    let expected = 2 * conductors.max(1);
    if pq.len() < expected {
        return Err(SimError::Circuit(CircuitError::PhaseMismatch {
            element: element.to_string(),
            expected,
            got: pq.len(),
        }));
    }
    Ok(pq[..expected]
        .chunks_exact(2)
        .fold((0.0, 0.0), |(p, q), pair| (p + pair[0], q + pair[1])))
}

impl LoadProbe {
    pub fn read<S: SolverSession>(&self, session: &mut S) -> SimResult<LoadRecord> {
        let voltages = session.bus_voltages(&self.bus)?;
        let (mut p, mut q) = sum_pq(&self.element, &session.powers(&self.element)?, self.phases)?;
        for (generator, phases) in &self.generation {
            let (gp, gq) = sum_pq(generator, &session.powers(generator)?, *phases)?;
            p += gp;
            q += gq;
        }
        Ok(LoadRecord {
            load: self.element.name.clone(),
            bus: self.bus.name().to_string(),
            voltage_v: voltages.iter().step_by(2).copied().collect(),
            p_kw: p,
            q_kvar: q,
        })
    }
}
