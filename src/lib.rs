//! # hco_cell
//!
//! A single-compartment half-center oscillator (HCO) neuron for compartmental simulators.
//!
//! The crate configures a soma (geometry, nine membrane mechanisms, their conductances),
//! wires up recordings of its state variables and describes diagnostic figures.
//! Channel kinetics and time integration stay with the simulation [`Engine`].
//!
//! ```
//! use hco_cell::{CellIdentity, HcoCell, StaticEngine};
//!
//! let mut engine = StaticEngine::default();
//! let cell = HcoCell::new(&mut engine).unwrap();
//! cell.set_biophysics(&mut engine, [("gbar_kca", Some(0.0))]).unwrap();
//!
//! engine.finitialize(-65.0).unwrap();
//! engine.advance(0.025);
//! let fig = cell.render(&engine, CellIdentity::A, None).unwrap();
//! assert!(!fig.panels[1].labels().contains(&"ik_kca"));
//! ```

pub mod cell;
pub mod channels;
pub mod compartments;
pub mod engine;
pub mod error;
pub mod figure;
pub mod parameters;
pub mod recording;

#[cfg(feature = "python")]
mod python;

pub use cell::{CellIdentity, HcoCell};
pub use channels::{Mechanism, MechanismLibrary};
pub use compartments::{Compartment, SectionId};
pub use engine::{Engine, StaticEngine};
pub use error::{CellError, Result};
pub use figure::{Color, Figure, LegendLocation, Panel, Series};
pub use parameters::{Attribute, Overrides, Parameter, ParameterTable};
pub use recording::{ProbeId, ProbeSet, StateVariable};
