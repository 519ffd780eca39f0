use std::collections::BTreeSet;
use std::f64::consts::PI;

use crate::channels::Mechanism;
use crate::error::{CellError, Result};
use crate::parameters::Attribute;
use crate::recording::StateVariable;

/// Resting potential a fresh section starts from (mV)
pub const DEFAULT_V_INIT: f64 = -65.0;

/// Index into the engine's compartment arena
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub struct SectionId(pub usize);

/// Mechanism-provided attributes. `None` until a mechanism bringing the attribute is inserted.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Biophysics {
    gbar_leak: Option<f64>,
    eleak: Option<f64>,
    gbar_na: Option<f64>,
    ena: Option<f64>,
    gbar_kdr: Option<f64>,
    ek: Option<f64>,
    tauca_capool: Option<f64>,
    fca_capool: Option<f64>,
    cai: Option<f64>,
    cao: Option<f64>,
    gbar_cas: Option<f64>,
    gbar_ka: Option<f64>,
    gbar_kca: Option<f64>,
    gbar_cat: Option<f64>,
    gbar_hyper: Option<f64>,
    eh: Option<f64>,
}

impl Biophysics {
    fn slot(&self, attr: Attribute) -> Option<&Option<f64>> {
        let slot = match attr {
            Attribute::L | Attribute::Diam | Attribute::Nseg | Attribute::Cm | Attribute::V => {
                return None;
            }
            Attribute::GbarLeak => &self.gbar_leak,
            Attribute::Eleak => &self.eleak,
            Attribute::GbarNa => &self.gbar_na,
            Attribute::Ena => &self.ena,
            Attribute::GbarKdr => &self.gbar_kdr,
            Attribute::Ek => &self.ek,
            Attribute::TaucaCapool => &self.tauca_capool,
            Attribute::FcaCapool => &self.fca_capool,
            Attribute::Cai => &self.cai,
            Attribute::Cao => &self.cao,
            Attribute::GbarCas => &self.gbar_cas,
            Attribute::GbarKa => &self.gbar_ka,
            Attribute::GbarKca => &self.gbar_kca,
            Attribute::GbarCat => &self.gbar_cat,
            Attribute::GbarHyper => &self.gbar_hyper,
            Attribute::Eh => &self.eh,
        };
        Some(slot)
    }

    fn slot_mut(&mut self, attr: Attribute) -> Option<&mut Option<f64>> {
        let slot = match attr {
            Attribute::L | Attribute::Diam | Attribute::Nseg | Attribute::Cm | Attribute::V => {
                return None;
            }
            Attribute::GbarLeak => &mut self.gbar_leak,
            Attribute::Eleak => &mut self.eleak,
            Attribute::GbarNa => &mut self.gbar_na,
            Attribute::Ena => &mut self.ena,
            Attribute::GbarKdr => &mut self.gbar_kdr,
            Attribute::Ek => &mut self.ek,
            Attribute::TaucaCapool => &mut self.tauca_capool,
            Attribute::FcaCapool => &mut self.fca_capool,
            Attribute::Cai => &mut self.cai,
            Attribute::Cao => &mut self.cao,
            Attribute::GbarCas => &mut self.gbar_cas,
            Attribute::GbarKa => &mut self.gbar_ka,
            Attribute::GbarKca => &mut self.gbar_kca,
            Attribute::GbarCat => &mut self.gbar_cat,
            Attribute::GbarHyper => &mut self.gbar_hyper,
            Attribute::Eh => &mut self.eh,
        };
        Some(slot)
    }

    pub fn get(&self, attr: Attribute) -> Option<f64> {
        self.slot(attr).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    pub(crate) name: String, // Name string for easier identification
    idx: SectionId,          // Index into our compartments list
    nseg: usize,

    length: f64,
    diam: f64,
    cm: f64,

    mechanisms: BTreeSet<Mechanism>,
    biophysics: Biophysics,

    v: f64,
    currents: [f64; 8],
}

impl Compartment {
    /// Geometry matches a fresh NEURON section: 100 um long, 500 um wide
    fn new(name: &str, idx: SectionId, nseg: usize) -> Compartment {
        Compartment {
            name: name.to_owned(),
            idx,
            nseg: nseg.max(1),
            length: 100.0,
            diam: 500.0,
            cm: 1.0,
            mechanisms: BTreeSet::new(),
            biophysics: Biophysics::default(),
            v: DEFAULT_V_INIT,
            currents: [0.0; 8],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn idx(&self) -> SectionId {
        self.idx
    }

    pub fn nseg(&self) -> usize {
        self.nseg
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn diam(&self) -> f64 {
        self.diam
    }

    /// Lateral membrane area of the cylinder (um^2)
    pub fn area(&self) -> f64 {
        PI * self.length * self.diam
    }

    pub fn set_geometry(&mut self, length: f64, diam: f64) {
        self.length = length;
        self.diam = diam;
    }

    pub fn has_mechanism(&self, mechanism: Mechanism) -> bool {
        self.mechanisms.contains(&mechanism)
    }

    pub fn mechanisms(&self) -> impl Iterator<Item = Mechanism> + '_ {
        self.mechanisms.iter().copied()
    }

    /// Adds the mechanism and any attribute it brings that the section does not carry yet.
    /// Shared ion attributes keep their current value. Returns false if already inserted.
    pub fn insert(&mut self, mechanism: Mechanism) -> bool {
        if !self.mechanisms.insert(mechanism) {
            return false;
        }
        for &(attr, default) in mechanism.attributes() {
            if let Some(slot) = self.biophysics.slot_mut(attr) {
                slot.get_or_insert(default);
            }
        }
        true
    }

    pub fn attribute(&self, attr: Attribute) -> Option<f64> {
        match attr {
            Attribute::L => Some(self.length),
            Attribute::Diam => Some(self.diam),
            Attribute::Nseg => Some(self.nseg as f64),
            Attribute::Cm => Some(self.cm),
            Attribute::V => Some(self.v),
            _ => self.biophysics.get(attr),
        }
    }

    /// Fails if no inserted mechanism provides the attribute
    pub fn set_attribute(&mut self, attr: Attribute, value: f64) -> Result<()> {
        match attr {
            Attribute::L => self.length = value,
            Attribute::Diam => self.diam = value,
            // Rounded to a whole segment count, never below one
            Attribute::Nseg => self.nseg = (value.round() as usize).max(1),
            Attribute::Cm => self.cm = value,
            Attribute::V => self.v = value,
            _ => match self.biophysics.slot_mut(attr) {
                Some(Some(current)) => *current = value,
                _ => return Err(CellError::UnknownParameter(attr.name().to_owned())),
            },
        }
        Ok(())
    }

    /// Current value of a recordable variable, `None` if its mechanism is absent
    pub fn state(&self, var: StateVariable) -> Option<f64> {
        match var {
            StateVariable::V => Some(self.v),
            StateVariable::Cai => self.biophysics.get(Attribute::Cai),
            current => self.current_slot(current).map(|slot| self.currents[slot]),
        }
    }

    pub fn set_state(&mut self, var: StateVariable, value: f64) -> Result<()> {
        match var {
            StateVariable::V => self.v = value,
            StateVariable::Cai => self.set_attribute(Attribute::Cai, value)?,
            current => {
                let slot = self
                    .current_slot(current)
                    .ok_or_else(|| CellError::UnknownStateVariable(current.name().to_owned()))?;
                self.currents[slot] = value;
            }
        }
        Ok(())
    }

    /// Storage slot of a membrane current whose mechanism is inserted
    fn current_slot(&self, var: StateVariable) -> Option<usize> {
        let slot = current_slot(var)?;
        var.mechanism()
            .filter(|mechanism| self.has_mechanism(*mechanism))
            .map(|_| slot)
    }
}

fn current_slot(var: StateVariable) -> Option<usize> {
    match var {
        StateVariable::IleakLeak => Some(0),
        StateVariable::InaNa => Some(1),
        StateVariable::IkKdr => Some(2),
        StateVariable::IcaCas => Some(3),
        StateVariable::IcaCat => Some(4),
        StateVariable::IkKa => Some(5),
        StateVariable::IkKca => Some(6),
        StateVariable::IhHyper => Some(7),
        StateVariable::V | StateVariable::Cai => None,
    }
}

/// Every section the engine has created, indexed by [`SectionId`]
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Compartments {
    pub components: Vec<Compartment>,
}

impl Compartments {
    pub fn create(&mut self, name: &str, nseg: usize) -> SectionId {
        let idx = SectionId(self.components.len());
        self.components.push(Compartment::new(name, idx, nseg));
        idx
    }

    pub fn get(&self, section: SectionId) -> Option<&Compartment> {
        self.components.get(section.0)
    }

    pub fn get_mut(&mut self, section: SectionId) -> Option<&mut Compartment> {
        self.components.get_mut(section.0)
    }
}
