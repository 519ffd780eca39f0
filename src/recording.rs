use std::fmt;
use std::str::FromStr;

use crate::channels::Mechanism;
use crate::error::CellError;
use crate::figure::Color;
use crate::parameters::Parameter;

/// Location along the soma the value probes sample
pub const PROBE_LOCATION: f64 = 0.5;

/// Recordable quantities of the soma
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub enum StateVariable {
    IleakLeak,
    InaNa,
    IkKdr,
    IcaCas,
    IcaCat,
    IkKa,
    IkKca,
    IhHyper,
    /// Membrane potential
    V,
    /// Intracellular calcium concentration
    Cai,
}

impl StateVariable {
    /// Recording order. The first eight are the plotted currents.
    pub const ALL: [StateVariable; 10] = [
        StateVariable::IleakLeak,
        StateVariable::InaNa,
        StateVariable::IkKdr,
        StateVariable::IcaCas,
        StateVariable::IcaCat,
        StateVariable::IkKa,
        StateVariable::IkKca,
        StateVariable::IhHyper,
        StateVariable::V,
        StateVariable::Cai,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StateVariable::IleakLeak => "ileak_leak",
            StateVariable::InaNa => "ina_na",
            StateVariable::IkKdr => "ik_kdr",
            StateVariable::IcaCas => "ica_cas",
            StateVariable::IcaCat => "ica_cat",
            StateVariable::IkKa => "ik_ka",
            StateVariable::IkKca => "ik_kca",
            StateVariable::IhHyper => "ih_hyper",
            StateVariable::V => "v",
            StateVariable::Cai => "cai",
        }
    }

    /// Mechanism that writes this variable; `v` and `cai` belong to the section itself
    pub fn mechanism(&self) -> Option<Mechanism> {
        match self {
            StateVariable::IleakLeak => Some(Mechanism::Leak),
            StateVariable::InaNa => Some(Mechanism::Na),
            StateVariable::IkKdr => Some(Mechanism::Kdr),
            StateVariable::IcaCas => Some(Mechanism::CaS),
            StateVariable::IcaCat => Some(Mechanism::CaT),
            StateVariable::IkKa => Some(Mechanism::KA),
            StateVariable::IkKca => Some(Mechanism::KCa),
            StateVariable::IhHyper => Some(Mechanism::Hyper),
            StateVariable::V | StateVariable::Cai => None,
        }
    }

    /// The `gbar_*` gating whether this current is drawn
    pub fn conductance(&self) -> Option<Parameter> {
        self.mechanism().and_then(|mechanism| mechanism.conductance())
    }

    /// Trace color in the current panel
    pub fn color(&self) -> Option<Color> {
        match self {
            StateVariable::IleakLeak => Some(Color::Black),
            StateVariable::InaNa => Some(Color::Yellow),
            StateVariable::IkKdr => Some(Color::Red),
            StateVariable::IcaCas => Some(Color::Orange),
            StateVariable::IcaCat => Some(Color::Brown),
            StateVariable::IkKa => Some(Color::Pink),
            StateVariable::IkKca => Some(Color::Green),
            StateVariable::IhHyper => Some(Color::Cyan),
            StateVariable::V | StateVariable::Cai => None,
        }
    }

    pub fn is_current(&self) -> bool {
        self.mechanism().is_some()
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for StateVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StateVariable {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateVariable::ALL
            .into_iter()
            .find(|var| var.name() == s)
            .ok_or_else(|| CellError::UnknownStateVariable(s.to_owned()))
    }
}

/// Handle to an engine-owned recording vector
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub struct ProbeId(pub usize);

/// The probes one cell watches: simulated time plus one per [`StateVariable`]
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSet {
    time: ProbeId,
    values: [ProbeId; StateVariable::ALL.len()],
}

impl ProbeSet {
    pub fn new(time: ProbeId, values: [ProbeId; StateVariable::ALL.len()]) -> Self {
        ProbeSet { time, values }
    }

    pub fn time(&self) -> ProbeId {
        self.time
    }

    pub fn get(&self, var: StateVariable) -> ProbeId {
        self.values[var.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateVariable, ProbeId)> + '_ {
        StateVariable::ALL
            .into_iter()
            .map(|var| (var, self.get(var)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
