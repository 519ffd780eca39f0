//! The half-center oscillator cell: a single soma carrying nine membrane mechanisms.
//!
//! Built from the HCO cell template parameters. Conductances are in S/cm^2,
//! potentials in mV, concentrations in mM.

use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, info};

use crate::channels::Mechanism;
use crate::compartments::SectionId;
use crate::engine::Engine;
use crate::error::{CellError, Result};
use crate::figure::{Color, Figure, LegendLocation, Series};
use crate::parameters::{
    Attribute, MEMBRANE_PROPERTIES, Parameter, ParameterTable, SOMA_CM, SOMA_DIAMETER,
    SOMA_LENGTH,
};
use crate::recording::{PROBE_LOCATION, ProbeId, ProbeSet, StateVariable};

/// Vertical gap between the stacked panels
const PANEL_HSPACE: f64 = 0.1;
const VOLTAGE_RANGE: (f64, f64) = (-90.0, 60.0);
const CALCIUM_RANGE: (f64, f64) = (0.0, 0.4);

/// Which side of the oscillator a cell sits on; only affects how it is drawn
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellIdentity {
    #[default]
    A,
    B,
}

impl CellIdentity {
    /// Any positive id is the second cell
    pub fn from_id(cellid: i64) -> Self {
        if cellid > 0 {
            CellIdentity::B
        } else {
            CellIdentity::A
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CellIdentity::A => "Cell A",
            CellIdentity::B => "Cell B",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            CellIdentity::A => Color::Blue,
            CellIdentity::B => Color::Red,
        }
    }
}

/// Handles to one configured soma inside an [`Engine`].
///
/// The engine owns the section and the recordings; the cell remembers where they are
/// and which defaults apply. Every operation takes the engine it was built in.
#[derive(Debug, Clone, PartialEq)]
pub struct HcoCell {
    soma: SectionId,
    defaults: ParameterTable,
    probes: ProbeSet,
}

impl HcoCell {
    /// Fails with [`CellError::MissingMechanism`] naming the first mechanism the engine lacks
    pub fn new<E: Engine>(engine: &mut E) -> Result<HcoCell> {
        let soma = engine.create_section("soma", 1);
        engine.set_geometry(soma, SOMA_LENGTH, SOMA_DIAMETER)?;

        let defaults = ParameterTable::default();
        define_membrane_properties(engine, soma)?;
        assign(
            engine,
            soma,
            &defaults,
            defaults.iter().map(|(param, value)| (param.name(), Some(value))),
        )?;

        let cell = HcoCell {
            soma,
            defaults,
            probes: setup_record(engine, soma)?,
        };
        info!(
            "Built HCO soma {:?} with [{}] and {} probes",
            soma,
            Mechanism::ALL.iter().join(", "),
            cell.probes.len()
        );
        Ok(cell)
    }

    pub fn soma(&self) -> SectionId {
        self.soma
    }

    pub fn defaults(&self) -> &ParameterTable {
        &self.defaults
    }

    pub fn probes(&self) -> &ProbeSet {
        &self.probes
    }

    /// Assigns each `(name, value)` pair to the soma.
    ///
    /// `None` restores the table default for a table key and is ignored for any other name.
    /// A concrete value for a name the soma does not carry is an error.
    pub fn set_biophysics<E, I, K>(&self, engine: &mut E, attributes: I) -> Result<()>
    where
        E: Engine,
        I: IntoIterator<Item = (K, Option<f64>)>,
        K: AsRef<str>,
    {
        assign(engine, self.soma, &self.defaults, attributes)
    }

    /// Current value of each named attribute
    pub fn get_biophysics<E, I, K>(&self, engine: &E, names: I) -> Result<BTreeMap<String, f64>>
    where
        E: Engine,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                let name = name.as_ref();
                Attribute::from_name(name)
                    .and_then(|attr| engine.attribute(self.soma, attr))
                    .map(|value| (name.to_owned(), value))
                    .ok_or_else(|| CellError::MissingParameter(name.to_owned()))
            })
            .collect()
    }

    pub fn get<E: Engine>(&self, engine: &E, param: Parameter) -> Result<f64> {
        engine
            .attribute(self.soma, param.attribute())
            .ok_or_else(|| CellError::MissingParameter(param.name().to_owned()))
    }

    pub fn set<E: Engine>(&self, engine: &mut E, param: Parameter, value: f64) -> Result<()> {
        engine.set_attribute(self.soma, param.attribute(), value)
    }

    pub fn time<'e, E: Engine>(&self, engine: &'e E) -> &'e [f64] {
        engine.samples(self.probes.time())
    }

    pub fn record<'e, E: Engine>(&self, engine: &'e E, var: StateVariable) -> &'e [f64] {
        engine.samples(self.probes.get(var))
    }

    /// Voltage, the active currents and the calcium pool as three stacked panels.
    ///
    /// A current is drawn only while its maximal conductance is above zero.
    pub fn render<E: Engine>(
        &self,
        engine: &E,
        identity: CellIdentity,
        figure_size: Option<(f64, f64)>,
    ) -> Result<Figure> {
        let t = self.time(engine);
        let clr = identity.color();

        let mut fig = Figure::subplots(figure_size, PANEL_HSPACE);
        let [voltage, currents, calcium] = &mut fig.panels;

        voltage.set_title(identity.title());
        voltage.plot(Series::new(t, self.record(engine, StateVariable::V), clr));
        voltage.set_ylim(VOLTAGE_RANGE.0, VOLTAGE_RANGE.1);
        voltage.set_ylabel("Membrane Voltage (mV)");

        calcium.plot(Series::new(t, self.record(engine, StateVariable::Cai), clr));
        calcium.set_ylim(CALCIUM_RANGE.0, CALCIUM_RANGE.1);
        calcium.set_ylabel("Calcium Pool (mM)");

        let plotted = &StateVariable::ALL[..StateVariable::ALL.len() - 2];
        for var in plotted {
            let (Some(gbar), Some(color)) = (var.conductance(), var.color()) else {
                continue;
            };
            if self.get(engine, gbar)? > 0.0 {
                let series = Series::new(t, self.record(engine, *var), color);
                currents.plot(series.with_label(var.name()));
            }
        }
        currents.set_legend(LegendLocation::UpperRight);
        currents.set_ylabel("Current (nA/cm^2)");

        if let (Some(first), Some(last)) = (t.first(), t.last()) {
            calcium.set_xlim(*first, *last);
        }
        calcium.set_xlabel("Time (ms)");

        Ok(fig)
    }
}

fn define_membrane_properties<E: Engine>(engine: &mut E, soma: SectionId) -> Result<()> {
    engine.set_attribute(soma, Attribute::Cm, SOMA_CM)?;
    for mechanism in Mechanism::ALL {
        engine.insert(soma, mechanism)?;
    }
    for (attr, value) in MEMBRANE_PROPERTIES {
        engine.set_attribute(soma, attr, value)?;
    }
    Ok(())
}

fn assign<E, I, K>(
    engine: &mut E,
    soma: SectionId,
    defaults: &ParameterTable,
    attributes: I,
) -> Result<()>
where
    E: Engine,
    I: IntoIterator<Item = (K, Option<f64>)>,
    K: AsRef<str>,
{
    for (name, value) in attributes {
        let name = name.as_ref();
        match value {
            Some(value) => {
                let attr = Attribute::from_name(name)
                    .ok_or_else(|| CellError::UnknownParameter(name.to_owned()))?;
                engine.set_attribute(soma, attr, value)?;
                debug!("{} = {}", name, value);
            }
            None => match Parameter::from_name(name) {
                Some(param) => {
                    let value = defaults.get(param);
                    engine.set_attribute(soma, param.attribute(), value)?;
                    debug!("{} reset to default {}", name, value);
                }
                // No default to fall back to; left untouched on purpose
                None => debug!("Ignoring reset of {}: not a default parameter", name),
            },
        }
    }
    Ok(())
}

fn setup_record<E: Engine>(engine: &mut E, soma: SectionId) -> Result<ProbeSet> {
    let time = engine.record_time();
    let mut values = [ProbeId(0); StateVariable::ALL.len()];
    for (slot, var) in values.iter_mut().zip(StateVariable::ALL) {
        *slot = engine.record(soma, PROBE_LOCATION, var)?;
    }
    Ok(ProbeSet::new(time, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::MechanismLibrary;
    use crate::compartments::DEFAULT_V_INIT;
    use crate::engine::StaticEngine;
    use crate::parameters::Overrides;

    fn build() -> (StaticEngine, HcoCell) {
        let mut engine = StaticEngine::default();
        let cell = HcoCell::new(&mut engine).unwrap();
        (engine, cell)
    }

    fn current_labels(fig: &Figure) -> Vec<&str> {
        fig.panels[1].labels()
    }

    #[test]
    fn test_defaults_after_construction() {
        let (engine, cell) = build();
        for (param, value) in ParameterTable::default().iter() {
            let got = cell.get_biophysics(&engine, [param.name()]).unwrap();
            assert_eq!(got[param.name()], value, "{param}");
        }
        let got = cell.get_biophysics(&engine, ["gbar_na"]).unwrap();
        assert_eq!(got, BTreeMap::from([("gbar_na".to_owned(), 0.12)]));
    }

    #[test]
    fn test_soma_geometry_and_membrane_properties() {
        let (engine, cell) = build();
        let got = cell
            .get_biophysics(&engine, ["L", "diam", "cm", "eleak", "ena", "ek", "cao", "cai", "eh"])
            .unwrap();
        assert_eq!(got["L"], 1000.0);
        assert_eq!(got["diam"], 9.99593);
        assert_eq!(got["cm"], 1.0);
        assert_eq!(got["eleak"], -60.0);
        assert_eq!(got["ena"], 50.0);
        assert_eq!(got["ek"], -80.0);
        assert_eq!(got["cao"], 3.0);
        assert_eq!(got["cai"], 50e-6);
        assert_eq!(got["eh"], -20.0);

        let soma = engine.section(cell.soma()).unwrap();
        assert_eq!(soma.name(), "soma");
        assert_eq!(soma.nseg(), 1);
        assert!(Mechanism::ALL.iter().all(|m| soma.has_mechanism(*m)));
    }

    #[test]
    fn test_set_then_get_round_trips() {
        let (mut engine, cell) = build();
        for (i, param) in Parameter::ALL.iter().enumerate() {
            let value = 0.5 + i as f64;
            cell.set_biophysics(&mut engine, [(param.name(), Some(value))])
                .unwrap();
            let got = cell.get_biophysics(&engine, [param.name()]).unwrap();
            assert_eq!(got[param.name()], value);
        }
    }

    #[test]
    fn test_unset_restores_default() {
        let (mut engine, cell) = build();
        cell.set_biophysics(&mut engine, [("gbar_kdr", Some(0.4)), ("gbar_kdr", Some(0.3))])
            .unwrap();
        cell.set_biophysics(&mut engine, [("gbar_kdr", None)]).unwrap();
        assert_eq!(cell.get(&engine, Parameter::GbarKdr), Ok(0.12));

        // Idempotent
        cell.set_biophysics(&mut engine, [("gbar_kdr", None)]).unwrap();
        assert_eq!(cell.get(&engine, Parameter::GbarKdr), Ok(0.12));
    }

    #[test]
    fn test_unset_restores_every_default() {
        let (mut engine, cell) = build();
        for (param, default) in ParameterTable::default().iter() {
            cell.set_biophysics(&mut engine, [(param.name(), Some(default + 1.0))])
                .unwrap();
            assert_eq!(cell.get(&engine, param), Ok(default + 1.0), "{param}");

            cell.set_biophysics(&mut engine, [(param.name(), None)]).unwrap();
            assert_eq!(cell.get(&engine, param), Ok(default), "{param}");
        }
    }

    #[test]
    fn test_nseg_and_v_through_biophysics() {
        let (mut engine, cell) = build();
        assert_eq!(
            cell.get_biophysics(&engine, ["nseg"]).unwrap(),
            BTreeMap::from([("nseg".to_owned(), 1.0)])
        );
        assert_eq!(
            cell.get_biophysics(&engine, ["v"]).unwrap(),
            BTreeMap::from([("v".to_owned(), DEFAULT_V_INIT)])
        );

        cell.set_biophysics(&mut engine, [("v", Some(-70.0))]).unwrap();
        assert_eq!(cell.get_biophysics(&engine, ["v"]).unwrap()["v"], -70.0);

        // No default for v, so a reset leaves it alone
        cell.set_biophysics(&mut engine, [("v", None)]).unwrap();
        assert_eq!(cell.get_biophysics(&engine, ["v"]).unwrap()["v"], -70.0);
    }

    #[test]
    fn test_unset_unknown_name_is_silently_ignored() {
        // Kept as-is: a reset for a name without a default changes nothing and is not an error
        let (mut engine, cell) = build();
        let names: Vec<_> = Attribute::ALL.iter().map(|attr| attr.name()).collect();
        let before = cell.get_biophysics(&engine, names.iter()).unwrap();

        cell.set_biophysics(&mut engine, [("nonexistent_param", None), ("eleak", None)])
            .unwrap();

        assert_eq!(cell.get_biophysics(&engine, names.iter()).unwrap(), before);
    }

    #[test]
    fn test_set_unknown_name_with_value_fails() {
        let (mut engine, cell) = build();
        assert_eq!(
            cell.set_biophysics(&mut engine, [("gbar_nap", Some(1.0))]),
            Err(CellError::UnknownParameter("gbar_nap".to_owned()))
        );
    }

    #[test]
    fn test_get_missing_parameter() {
        let (engine, cell) = build();
        assert_eq!(
            cell.get_biophysics(&engine, ["nonexistent_param"]),
            Err(CellError::MissingParameter("nonexistent_param".to_owned()))
        );
        assert_eq!(
            cell.get_biophysics(&engine, ["gbar_na", "nonexistent_param"]),
            Err(CellError::MissingParameter("nonexistent_param".to_owned()))
        );
    }

    #[test]
    fn test_missing_mechanism_aborts_construction() {
        let mut library = MechanismLibrary::default();
        library.unload(Mechanism::KCa);
        let mut engine = StaticEngine::new(library);
        assert_eq!(
            HcoCell::new(&mut engine),
            Err(CellError::MissingMechanism("kca".to_owned()))
        );
        assert_eq!(engine.probe_count(), 0);
    }

    #[test]
    fn test_probes_empty_until_time_advances() {
        let (mut engine, cell) = build();
        assert_eq!(cell.probes().len(), 10);
        assert_eq!(engine.probe_count(), 11);
        assert!(cell.time(&engine).is_empty());
        for (var, probe) in cell.probes().iter() {
            assert!(engine.samples(probe).is_empty(), "{var}");
            assert_eq!(engine.probe_location(probe), Some(0.5));
        }

        engine.finitialize(-65.0).unwrap();
        engine.advance(0.1);
        assert_eq!(cell.time(&engine).len(), 2);
        assert_eq!(cell.record(&engine, StateVariable::V), &[-65.0, -65.0]);
        assert_eq!(cell.record(&engine, StateVariable::Cai), &[50e-6, 50e-6]);
    }

    #[test]
    fn test_render_layout() {
        let (mut engine, cell) = build();
        engine.finitialize(-65.0).unwrap();
        for _ in 0..4 {
            engine.advance(0.5);
        }

        let fig = cell.render(&engine, CellIdentity::A, Some((10.0, 8.0))).unwrap();
        assert_eq!(fig.panels.len(), 3);
        assert_eq!(fig.size, Some((10.0, 8.0)));
        assert!(fig.sharex);

        let [voltage, currents, calcium] = &fig.panels;
        assert_eq!(voltage.title.as_deref(), Some("Cell A"));
        assert_eq!(voltage.ylim, Some((-90.0, 60.0)));
        assert_eq!(voltage.series[0].color, Color::Blue);
        assert_eq!(voltage.xlabel, None);

        assert_eq!(
            current_labels(&fig),
            vec!["ileak_leak", "ina_na", "ik_kdr", "ica_cas", "ica_cat", "ik_ka", "ik_kca", "ih_hyper"]
        );
        assert_eq!(currents.series[6].color, Color::Green);
        assert_eq!(currents.legend, Some(LegendLocation::UpperRight));
        assert_eq!(currents.xlabel, None);

        assert_eq!(calcium.ylim, Some((0.0, 0.4)));
        assert_eq!(calcium.xlim, Some((0.0, 2.0)));
        assert_eq!(calcium.xlabel.as_deref(), Some("Time (ms)"));
        assert_eq!(calcium.series[0].len(), 5);
    }

    #[test]
    fn test_render_second_cell() {
        let (engine, cell) = build();
        let fig = cell.render(&engine, CellIdentity::from_id(1), None).unwrap();
        assert_eq!(fig.panels[0].title.as_deref(), Some("Cell B"));
        assert_eq!(fig.panels[2].series[0].color, Color::Red);
        // Nothing recorded yet
        assert_eq!(fig.panels[2].xlim, None);
        assert!(fig.panels[0].series[0].is_empty());
    }

    #[test]
    fn test_render_skips_disabled_currents() {
        let (mut engine, cell) = build();
        cell.set_biophysics(&mut engine, [("gbar_kca", Some(0.0))]).unwrap();
        let fig = cell.render(&engine, CellIdentity::A, None).unwrap();
        assert!(!current_labels(&fig).contains(&"ik_kca"));
        assert_eq!(current_labels(&fig).len(), 7);

        // Strictly positive only; negative and zero are both off
        cell.set_biophysics(&mut engine, [("gbar_na", Some(-0.1)), ("gbar_kca", None)])
            .unwrap();
        let fig = cell.render(&engine, CellIdentity::A, None).unwrap();
        assert!(current_labels(&fig).contains(&"ik_kca"));
        assert!(!current_labels(&fig).contains(&"ina_na"));
    }

    #[test]
    fn test_each_current_follows_its_conductance() {
        let currents: Vec<_> = StateVariable::ALL
            .into_iter()
            .filter(StateVariable::is_current)
            .collect();
        assert_eq!(currents.len(), 8);

        for off in &currents {
            let (mut engine, cell) = build();
            let gbar = off.conductance().unwrap();
            cell.set(&mut engine, gbar, 0.0).unwrap();

            let fig = cell.render(&engine, CellIdentity::A, None).unwrap();
            let labels = current_labels(&fig);
            for var in &currents {
                let enabled = cell.get(&engine, var.conductance().unwrap()).unwrap() > 0.0;
                assert_eq!(labels.contains(&var.name()), enabled, "{off} off, {var}");
                assert_eq!(enabled, var != off);
            }
            assert_eq!(labels.len(), 7);
        }
    }

    #[test]
    fn test_overrides_from_json() {
        let (mut engine, cell) = build();
        cell.set(&mut engine, Parameter::GbarCat, 0.01).unwrap();

        let overrides =
            Overrides::from_json(r#"{"gbar_cas": 0.008, "gbar_cat": null, "typo": null}"#).unwrap();
        cell.set_biophysics(&mut engine, overrides.iter()).unwrap();

        assert_eq!(cell.get(&engine, Parameter::GbarCas), Ok(0.008));
        assert_eq!(cell.get(&engine, Parameter::GbarCat), Ok(0.007));
    }

    #[test]
    fn test_two_cells_share_an_engine() {
        let mut engine = StaticEngine::default();
        let a = HcoCell::new(&mut engine).unwrap();
        let b = HcoCell::new(&mut engine).unwrap();
        assert_ne!(a.soma(), b.soma());

        b.set(&mut engine, Parameter::GbarHyper, 0.0003).unwrap();
        assert_eq!(a.get(&engine, Parameter::GbarHyper), Ok(0.0002));
        assert_eq!(b.get(&engine, Parameter::GbarHyper), Ok(0.0003));
    }
}
