use std::collections::BTreeMap;

use pyo3::exceptions::{PyAttributeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::cell::{CellIdentity, HcoCell};
use crate::compartments::DEFAULT_V_INIT;
use crate::engine::{Engine, StaticEngine};
use crate::error::CellError;
use crate::recording::StateVariable;

impl From<CellError> for PyErr {
    fn from(err: CellError) -> PyErr {
        match err {
            CellError::MissingParameter(_)
            | CellError::UnknownParameter(_)
            | CellError::UnknownStateVariable(_) => PyAttributeError::new_err(err.to_string()),
            CellError::MissingMechanism(_)
            | CellError::UnknownSection(_)
            | CellError::Serialization(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

/// One HCO cell hosted in its own in-process engine
#[pyclass(name = "HCOCellTemplate")]
pub struct PyHcoCell {
    engine: StaticEngine,
    cell: HcoCell,
}

#[pymethods]
impl PyHcoCell {
    #[new]
    fn new() -> PyResult<Self> {
        let mut engine = StaticEngine::default();
        let cell = HcoCell::new(&mut engine)?;
        Ok(Self { engine, cell })
    }

    /// `None` as a value restores the default for that parameter
    #[pyo3(signature = (**attributes))]
    fn set_biophysics(&mut self, attributes: Option<&Bound<'_, PyDict>>) -> PyResult<()> {
        let Some(attributes) = attributes else {
            return Ok(());
        };
        let mut pairs = Vec::with_capacity(attributes.len());
        for (name, value) in attributes.iter() {
            pairs.push((name.extract::<String>()?, value.extract::<Option<f64>>()?));
        }
        self.cell.set_biophysics(&mut self.engine, pairs)?;
        Ok(())
    }

    /// Only the keyword names are used; their values are replaced by the current ones
    #[pyo3(signature = (**attributes))]
    fn get_biophysics(
        &self,
        attributes: Option<&Bound<'_, PyDict>>,
    ) -> PyResult<BTreeMap<String, f64>> {
        let mut names = Vec::new();
        if let Some(attributes) = attributes {
            for (name, _) in attributes.iter() {
                names.push(name.extract::<String>()?);
            }
        }
        Ok(self.cell.get_biophysics(&self.engine, names)?)
    }

    /// Figure description as JSON, ready for a matplotlib frontend
    #[pyo3(signature = (cellid=0, figsize=None))]
    fn plot_vars(&self, cellid: i64, figsize: Option<(f64, f64)>) -> PyResult<String> {
        let fig = self
            .cell
            .render(&self.engine, CellIdentity::from_id(cellid), figsize)?;
        Ok(fig.to_json()?)
    }

    #[pyo3(signature = (v_init=DEFAULT_V_INIT))]
    fn finitialize(&mut self, v_init: f64) -> PyResult<()> {
        Ok(self.engine.finitialize(v_init)?)
    }

    fn advance(&mut self, dt: f64) {
        self.engine.advance(dt);
    }

    #[getter]
    fn t(&self) -> Vec<f64> {
        self.cell.time(&self.engine).to_vec()
    }

    fn record(&self, name: &str) -> PyResult<Vec<f64>> {
        let var: StateVariable = name.parse()?;
        Ok(self.cell.record(&self.engine, var).to_vec())
    }

    fn __repr__(&self) -> String {
        format!("HCOCellTemplate(t={:.3}ms)", self.engine.time())
    }
}

#[pymodule]
mod hco_cell {
    #[pymodule_export]
    use super::PyHcoCell;
}
