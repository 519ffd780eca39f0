//! The simulation engine seam.
//!
//! Everything numerical (gating kinetics, the integration scheme, stepping) belongs to the
//! engine. A cell only creates sections, inserts mechanisms, reads and writes attributes and
//! asks for recordings through [`Engine`].

use itertools::Itertools;
use log::{debug, info};

use crate::channels::{Mechanism, MechanismLibrary};
use crate::compartments::{Compartment, Compartments, SectionId};
use crate::error::{CellError, Result};
use crate::parameters::Attribute;
use crate::recording::{ProbeId, StateVariable};

pub trait Engine {
    fn create_section(&mut self, name: &str, nseg: usize) -> SectionId;

    fn set_geometry(&mut self, section: SectionId, length: f64, diam: f64) -> Result<()>;

    /// Fails with [`CellError::MissingMechanism`] if the mechanism is not loaded
    fn insert(&mut self, section: SectionId, mechanism: Mechanism) -> Result<()>;

    fn set_attribute(&mut self, section: SectionId, attr: Attribute, value: f64) -> Result<()>;

    /// `None` when the section does not carry the attribute
    fn attribute(&self, section: SectionId, attr: Attribute) -> Option<f64>;

    /// Records simulated time on every step
    fn record_time(&mut self) -> ProbeId;

    /// Records `var` at relative position `location` (0..=1) of the section on every step
    fn record(&mut self, section: SectionId, location: f64, var: StateVariable)
    -> Result<ProbeId>;

    /// Samples appended so far; empty for unknown probes
    fn samples(&self, probe: ProbeId) -> &[f64];

    /// Current simulated time (ms)
    fn time(&self) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ProbeSource {
    Time,
    Value {
        section: SectionId,
        location: f64,
        var: StateVariable,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Probe {
    source: ProbeSource,
    samples: Vec<f64>,
}

/// An in-process engine that holds section state and appends probe samples
/// but never integrates: state only changes when the host writes it.
///
/// Useful for hosting a cell outside a full simulator and for driving
/// recordings with externally computed traces.
#[derive(Debug, Default, Clone)]
pub struct StaticEngine {
    library: MechanismLibrary,
    compartments: Compartments,
    probes: Vec<Probe>,
    t: f64,
}

impl StaticEngine {
    pub fn new(library: MechanismLibrary) -> Self {
        debug!("Mechanism library: [{}]", library.iter().join(", "));
        StaticEngine {
            library,
            ..Default::default()
        }
    }

    pub fn section(&self, section: SectionId) -> Result<&Compartment> {
        self.compartments
            .get(section)
            .ok_or(CellError::UnknownSection(section.0))
    }

    fn section_mut(&mut self, section: SectionId) -> Result<&mut Compartment> {
        self.compartments
            .get_mut(section)
            .ok_or(CellError::UnknownSection(section.0))
    }

    pub fn set_state(&mut self, section: SectionId, var: StateVariable, value: f64) -> Result<()> {
        self.section_mut(section)?.set_state(var, value)
    }

    /// Resets time to zero, sets every section to `v_init`, drops recorded samples
    /// and takes the first sample.
    pub fn finitialize(&mut self, v_init: f64) -> Result<()> {
        self.t = 0.0;
        for compartment in self.compartments.components.iter_mut() {
            compartment.set_state(StateVariable::V, v_init)?;
        }
        for probe in self.probes.iter_mut() {
            probe.samples.clear();
        }
        debug!("finitialize v_init={} over {} probes", v_init, self.probes.len());
        self.sample();
        Ok(())
    }

    /// Moves time forward by `dt` and appends one sample to every probe
    pub fn advance(&mut self, dt: f64) {
        self.t += dt;
        self.sample();
    }

    fn sample(&mut self) {
        let t = self.t;
        let compartments = &self.compartments;
        for probe in self.probes.iter_mut() {
            let value = match probe.source {
                ProbeSource::Time => Some(t),
                ProbeSource::Value { section, var, .. } => {
                    compartments.get(section).and_then(|c| c.state(var))
                }
            };
            probe.samples.push(value.unwrap_or(f64::NAN));
        }
    }

    /// Where a probe was bound, `None` for the time probe
    pub fn probe_location(&self, probe: ProbeId) -> Option<f64> {
        match self.probes.get(probe.0)?.source {
            ProbeSource::Time => None,
            ProbeSource::Value { location, .. } => Some(location),
        }
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }
}

impl Engine for StaticEngine {
    fn create_section(&mut self, name: &str, nseg: usize) -> SectionId {
        let section = self.compartments.create(name, nseg);
        debug!("Created section {} ({:?})", name, section);
        section
    }

    fn set_geometry(&mut self, section: SectionId, length: f64, diam: f64) -> Result<()> {
        self.section_mut(section)?.set_geometry(length, diam);
        Ok(())
    }

    fn insert(&mut self, section: SectionId, mechanism: Mechanism) -> Result<()> {
        if !self.library.contains(mechanism) {
            return Err(CellError::MissingMechanism(mechanism.name().to_owned()));
        }
        let compartment = self.section_mut(section)?;
        if compartment.insert(mechanism) {
            info!(
                "Inserted {} into {}; now carries [{}]",
                mechanism,
                compartment.name(),
                compartment.mechanisms().join(", ")
            );
        }
        Ok(())
    }

    fn set_attribute(&mut self, section: SectionId, attr: Attribute, value: f64) -> Result<()> {
        self.section_mut(section)?.set_attribute(attr, value)
    }

    fn attribute(&self, section: SectionId, attr: Attribute) -> Option<f64> {
        self.compartments.get(section)?.attribute(attr)
    }

    fn record_time(&mut self) -> ProbeId {
        self.probes.push(Probe {
            source: ProbeSource::Time,
            samples: Vec::new(),
        });
        ProbeId(self.probes.len() - 1)
    }

    fn record(
        &mut self,
        section: SectionId,
        location: f64,
        var: StateVariable,
    ) -> Result<ProbeId> {
        if self.section(section)?.state(var).is_none() {
            return Err(CellError::UnknownStateVariable(var.name().to_owned()));
        }
        self.probes.push(Probe {
            source: ProbeSource::Value {
                section,
                location: location.clamp(0.0, 1.0),
                var,
            },
            samples: Vec::new(),
        });
        Ok(ProbeId(self.probes.len() - 1))
    }

    fn samples(&self, probe: ProbeId) -> &[f64] {
        self.probes
            .get(probe.0)
            .map(|probe| probe.samples.as_slice())
            .unwrap_or(&[])
    }

    fn time(&self) -> f64 {
        self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_requires_loaded_mechanism() {
        let mut engine =
            StaticEngine::new(MechanismLibrary::from_iter([Mechanism::Leak, Mechanism::Na]));
        let soma = engine.create_section("soma", 1);
        engine.insert(soma, Mechanism::Na).unwrap();
        assert_eq!(
            engine.insert(soma, Mechanism::Hyper),
            Err(CellError::MissingMechanism("hyper".to_owned()))
        );
        assert_eq!(engine.attribute(soma, Attribute::GbarHyper), None);
        assert_eq!(engine.attribute(soma, Attribute::GbarNa), Some(0.0));
    }

    #[test]
    fn test_unknown_section() {
        let mut engine = StaticEngine::default();
        assert_eq!(
            engine.set_geometry(SectionId(3), 1.0, 1.0),
            Err(CellError::UnknownSection(3))
        );
        assert_eq!(engine.attribute(SectionId(3), Attribute::L), None);
    }

    #[test]
    fn test_record_needs_the_mechanism() {
        let mut engine = StaticEngine::default();
        let soma = engine.create_section("soma", 1);
        assert_eq!(
            engine.record(soma, 0.5, StateVariable::IkKdr),
            Err(CellError::UnknownStateVariable("ik_kdr".to_owned()))
        );
        assert!(engine.record(soma, 0.5, StateVariable::V).is_ok());
    }

    #[test]
    fn test_probes_fill_only_when_time_advances() {
        let mut engine = StaticEngine::default();
        let soma = engine.create_section("soma", 1);
        engine.insert(soma, Mechanism::Kdr).unwrap();
        let t = engine.record_time();
        let ik = engine.record(soma, 0.5, StateVariable::IkKdr).unwrap();
        let v = engine.record(soma, 0.5, StateVariable::V).unwrap();
        assert!(engine.samples(t).is_empty());
        assert!(engine.samples(ik).is_empty());
        assert_eq!(engine.probe_location(v), Some(0.5));
        assert_eq!(engine.probe_location(t), None);

        engine.finitialize(-60.0).unwrap();
        engine.set_state(soma, StateVariable::IkKdr, 0.3).unwrap();
        engine.advance(0.025);
        engine.advance(0.025);

        assert_eq!(engine.samples(t), &[0.0, 0.025, 0.05]);
        assert_eq!(engine.samples(ik), &[0.0, 0.3, 0.3]);
        assert_eq!(engine.samples(v), &[-60.0, -60.0, -60.0]);
        assert_eq!(engine.time(), 0.05);

        engine.finitialize(-65.0).unwrap();
        assert_eq!(engine.samples(t), &[0.0]);
        assert_eq!(engine.samples(ProbeId(99)), &[] as &[f64]);
    }
}
