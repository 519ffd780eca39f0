//!
//! The membrane mechanisms inserted into the soma. Their kinetics are compiled into the
//! simulation engine; here we only describe what each one adds to a section.
//! Naming follows the NMODL suffixes: https://nrn.readthedocs.io/en/latest/guide/mechanisms.html
//!

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::CellError;
use crate::parameters::{Attribute, Parameter};

#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub enum Mechanism {
    /// Passive leak conductance
    Leak,
    /// Fast sodium
    Na,
    /// Delayed-rectifier potassium
    Kdr,
    /// Intracellular calcium pool
    CaPool,
    /// Slow calcium
    CaS,
    /// A-type potassium
    KA,
    /// Calcium-activated potassium
    KCa,
    /// T-type calcium
    CaT,
    /// Hyperpolarization-activated cation current
    Hyper,
}

impl Mechanism {
    /// Insertion order of the half-center oscillator soma
    pub const ALL: [Mechanism; 9] = [
        Mechanism::Leak,
        Mechanism::Na,
        Mechanism::Kdr,
        Mechanism::CaPool,
        Mechanism::CaS,
        Mechanism::KA,
        Mechanism::KCa,
        Mechanism::CaT,
        Mechanism::Hyper,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mechanism::Leak => "leak",
            Mechanism::Na => "na",
            Mechanism::Kdr => "kdr",
            Mechanism::CaPool => "capool",
            Mechanism::CaS => "cas",
            Mechanism::KA => "ka",
            Mechanism::KCa => "kca",
            Mechanism::CaT => "cat",
            Mechanism::Hyper => "hyper",
        }
    }

    /// Attributes that become available on a section once this mechanism is inserted,
    /// with the value the mechanism starts out with.
    /// Ion attributes (`ek`, `cai`, ...) are shared between every mechanism using the ion.
    pub fn attributes(&self) -> &'static [(Attribute, f64)] {
        match self {
            Mechanism::Leak => &[(Attribute::GbarLeak, 0.0), (Attribute::Eleak, -70.0)],
            Mechanism::Na => &[(Attribute::GbarNa, 0.0), (Attribute::Ena, 50.0)],
            Mechanism::Kdr => &[(Attribute::GbarKdr, 0.0), (Attribute::Ek, -77.0)],
            Mechanism::CaPool => &[
                (Attribute::TaucaCapool, 1.0),
                (Attribute::FcaCapool, 1.0),
                (Attribute::Cai, 5e-5),
                (Attribute::Cao, 2.0),
            ],
            Mechanism::CaS => &[
                (Attribute::GbarCas, 0.0),
                (Attribute::Cai, 5e-5),
                (Attribute::Cao, 2.0),
            ],
            Mechanism::KA => &[(Attribute::GbarKa, 0.0), (Attribute::Ek, -77.0)],
            Mechanism::KCa => &[
                (Attribute::GbarKca, 0.0),
                (Attribute::Ek, -77.0),
                (Attribute::Cai, 5e-5),
            ],
            Mechanism::CaT => &[
                (Attribute::GbarCat, 0.0),
                (Attribute::Cai, 5e-5),
                (Attribute::Cao, 2.0),
            ],
            Mechanism::Hyper => &[(Attribute::GbarHyper, 0.0), (Attribute::Eh, -30.0)],
        }
    }

    /// Maximal conductance parameter, if the mechanism carries a current
    pub fn conductance(&self) -> Option<Parameter> {
        match self {
            Mechanism::Leak => Some(Parameter::GbarLeak),
            Mechanism::Na => Some(Parameter::GbarNa),
            Mechanism::Kdr => Some(Parameter::GbarKdr),
            Mechanism::CaPool => None,
            Mechanism::CaS => Some(Parameter::GbarCas),
            Mechanism::KA => Some(Parameter::GbarKa),
            Mechanism::KCa => Some(Parameter::GbarKca),
            Mechanism::CaT => Some(Parameter::GbarCat),
            Mechanism::Hyper => Some(Parameter::GbarHyper),
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mechanism {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mechanism::ALL
            .into_iter()
            .find(|mechanism| mechanism.name() == s)
            .ok_or_else(|| CellError::MissingMechanism(s.to_owned()))
    }
}

/// The set of mechanisms an engine has loaded and can insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MechanismLibrary {
    loaded: BTreeSet<Mechanism>,
}

impl Default for MechanismLibrary {
    fn default() -> Self {
        Self::from_iter(Mechanism::ALL)
    }
}

impl FromIterator<Mechanism> for MechanismLibrary {
    fn from_iter<I: IntoIterator<Item = Mechanism>>(iter: I) -> Self {
        MechanismLibrary {
            loaded: iter.into_iter().collect(),
        }
    }
}

impl MechanismLibrary {
    pub fn contains(&self, mechanism: Mechanism) -> bool {
        self.loaded.contains(&mechanism)
    }

    pub fn unload(&mut self, mechanism: Mechanism) {
        self.loaded.remove(&mechanism);
    }

    pub fn iter(&self) -> impl Iterator<Item = Mechanism> + '_ {
        self.loaded.iter().copied()
    }
}
