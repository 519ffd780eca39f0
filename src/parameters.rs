use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CellError, Result};

/// Soma length (um)
pub const SOMA_LENGTH: f64 = 1000.0;
/// Soma diameter (um), giving Pi * 1000 * 9.99593 ~= 3.14e4 um^2 of membrane
pub const SOMA_DIAMETER: f64 = 9.99593;
/// Specific membrane capacitance (uF/cm^2)
pub const SOMA_CM: f64 = 1.0;

/// Reversal potentials and calcium concentrations set right after insertion,
/// before the conductances in [`ParameterTable`] are applied.
pub const MEMBRANE_PROPERTIES: [(Attribute, f64); 6] = [
    (Attribute::Eleak, -60.0),
    (Attribute::Ena, 50.0),
    (Attribute::Ek, -80.0),
    (Attribute::Cao, 3.0),
    (Attribute::Cai, 50e-6),
    (Attribute::Eh, -20.0),
];

/// Every attribute a section can carry, named as the engine names them
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub enum Attribute {
    L,
    Diam,
    Nseg,
    Cm,
    /// Membrane potential at the section center
    V,
    GbarLeak,
    Eleak,
    GbarNa,
    Ena,
    GbarKdr,
    Ek,
    TaucaCapool,
    FcaCapool,
    Cai,
    Cao,
    GbarCas,
    GbarKa,
    GbarKca,
    GbarCat,
    GbarHyper,
    Eh,
}

impl Attribute {
    pub const ALL: [Attribute; 21] = [
        Attribute::L,
        Attribute::Diam,
        Attribute::Nseg,
        Attribute::Cm,
        Attribute::V,
        Attribute::GbarLeak,
        Attribute::Eleak,
        Attribute::GbarNa,
        Attribute::Ena,
        Attribute::GbarKdr,
        Attribute::Ek,
        Attribute::TaucaCapool,
        Attribute::FcaCapool,
        Attribute::Cai,
        Attribute::Cao,
        Attribute::GbarCas,
        Attribute::GbarKa,
        Attribute::GbarKca,
        Attribute::GbarCat,
        Attribute::GbarHyper,
        Attribute::Eh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::L => "L",
            Attribute::Diam => "diam",
            Attribute::Nseg => "nseg",
            Attribute::Cm => "cm",
            Attribute::V => "v",
            Attribute::GbarLeak => "gbar_leak",
            Attribute::Eleak => "eleak",
            Attribute::GbarNa => "gbar_na",
            Attribute::Ena => "ena",
            Attribute::GbarKdr => "gbar_kdr",
            Attribute::Ek => "ek",
            Attribute::TaucaCapool => "tauca_capool",
            Attribute::FcaCapool => "fca_capool",
            Attribute::Cai => "cai",
            Attribute::Cao => "cao",
            Attribute::GbarCas => "gbar_cas",
            Attribute::GbarKa => "gbar_ka",
            Attribute::GbarKca => "gbar_kca",
            Attribute::GbarCat => "gbar_cat",
            Attribute::GbarHyper => "gbar_hyper",
            Attribute::Eh => "eh",
        }
    }

    pub fn from_name(name: &str) -> Option<Attribute> {
        Attribute::ALL.into_iter().find(|attr| attr.name() == name)
    }

    /// Geometry, capacitance and voltage exist on every section, mechanism or not
    pub fn is_intrinsic(&self) -> bool {
        matches!(
            self,
            Attribute::L | Attribute::Diam | Attribute::Nseg | Attribute::Cm | Attribute::V
        )
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Attribute {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self> {
        Attribute::from_name(s).ok_or_else(|| CellError::UnknownParameter(s.to_owned()))
    }
}

/// Keys of the parameter table: maximal conductances plus the calcium pool constants
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
pub enum Parameter {
    GbarLeak,
    GbarNa,
    GbarKdr,
    GbarKa,
    GbarKca,
    GbarCas,
    GbarCat,
    GbarHyper,
    TaucaCapool,
    FcaCapool,
}

impl Parameter {
    pub const ALL: [Parameter; 10] = [
        Parameter::GbarLeak,
        Parameter::GbarNa,
        Parameter::GbarKdr,
        Parameter::GbarKa,
        Parameter::GbarKca,
        Parameter::GbarCas,
        Parameter::GbarCat,
        Parameter::GbarHyper,
        Parameter::TaucaCapool,
        Parameter::FcaCapool,
    ];

    pub fn attribute(&self) -> Attribute {
        match self {
            Parameter::GbarLeak => Attribute::GbarLeak,
            Parameter::GbarNa => Attribute::GbarNa,
            Parameter::GbarKdr => Attribute::GbarKdr,
            Parameter::GbarKa => Attribute::GbarKa,
            Parameter::GbarKca => Attribute::GbarKca,
            Parameter::GbarCas => Attribute::GbarCas,
            Parameter::GbarCat => Attribute::GbarCat,
            Parameter::GbarHyper => Attribute::GbarHyper,
            Parameter::TaucaCapool => Attribute::TaucaCapool,
            Parameter::FcaCapool => Attribute::FcaCapool,
        }
    }

    pub fn name(&self) -> &'static str {
        self.attribute().name()
    }

    pub fn from_name(name: &str) -> Option<Parameter> {
        Parameter::ALL.into_iter().find(|param| param.name() == name)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default value for every [`Parameter`]. A key without a default cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterTable {
    values: [f64; Parameter::ALL.len()],
}

impl Default for ParameterTable {
    fn default() -> Self {
        let mut table = ParameterTable {
            values: [0.0; Parameter::ALL.len()],
        };
        table.set(Parameter::GbarLeak, 0.0004);
        table.set(Parameter::GbarNa, 0.12); // (.1~.5)
        table.set(Parameter::GbarKdr, 0.12); // (.1~.5)
        table.set(Parameter::GbarKa, 0.1); // (.1~.5)
        table.set(Parameter::GbarKca, 0.01); // (.01~.05)
        table.set(Parameter::GbarCas, 0.005); // (.001~.01)
        table.set(Parameter::GbarCat, 0.007); // (.005~.01)
        table.set(Parameter::GbarHyper, 0.0002); // (.0001~.0003)
        table.set(Parameter::TaucaCapool, 20.0);
        table.set(Parameter::FcaCapool, 1.2);
        table
    }
}

impl ParameterTable {
    pub fn get(&self, param: Parameter) -> f64 {
        self.values[param.index()]
    }

    fn set(&mut self, param: Parameter, value: f64) {
        self.values[param.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Parameter, f64)> + '_ {
        Parameter::ALL.into_iter().map(|param| (param, self.get(param)))
    }
}

/// Caller supplied parameter assignments. `None` asks for the table default.
///
/// Decodes from a JSON object where `null` is the unset marker:
/// `{"gbar_kca": 0.0, "gbar_na": null}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(BTreeMap<String, Option<f64>>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), Some(value));
        self
    }

    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.0.insert(name.into(), None);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> + '_ {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<S: Into<String>> FromIterator<(S, Option<f64>)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (S, Option<f64>)>>(iter: I) -> Self {
        Overrides(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}
