//! Python Bindings
//!
//! Field values cross the boundary as JSON text, so Python callers decide
//! how to decode them.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde_json::Value;

use crate::diff::diff;
use crate::error::ReactiveError;
use crate::reactive::Variable;

impl From<ReactiveError> for PyErr {
    fn from(err: ReactiveError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

fn parse(json: &str) -> PyResult<Value> {
    serde_json::from_str(json).map_err(|err| PyValueError::new_err(format!("invalid JSON: {err}")))
}

/// Python-exposed Variable type.
#[pyclass(name = "Variable")]
pub struct PyVariable {
    inner: Variable,
}

#[pymethods]
impl PyVariable {
    /// Create a variable from a JSON object.
    #[new]
    fn new(json: &str) -> PyResult<Self> {
        let inner = Variable::new(&parse(json)?)?;
        Ok(Self { inner })
    }

    /// Get a field as JSON text, or `None` if it is absent.
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|value| value.to_string())
    }

    /// Set a field from JSON text.
    fn set(&self, key: &str, json: &str) -> PyResult<()> {
        self.inner.set(key, parse(json)?);
        Ok(())
    }

    /// The whole record as JSON text.
    fn snapshot(&self) -> String {
        self.inner.snapshot().to_value().to_string()
    }

    #[getter]
    fn id(&self) -> u64 {
        self.inner.id().raw()
    }

    fn subscriber_count(&self, key: &str) -> usize {
        self.inner.subscriber_count(key)
    }

    fn __repr__(&self) -> String {
        format!("Variable(id={}, value={})", self.id(), self.snapshot())
    }
}

/// Minimal edit script between two string lists, as `(tag, value)` pairs
/// with tags `+`, `-` and `=`.
#[pyfunction]
fn edit_script(a: Vec<String>, b: Vec<String>) -> Vec<(String, String)> {
    diff(&a, &b, |x, y| x == y)
        .into_iter()
        .map(|edit| (edit.tag().to_string(), edit.into_value()))
        .collect()
}

/// Python module definition.
///
/// This function is called by Python when importing the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyVariable>()?;
    m.add_function(wrap_pyfunction!(edit_script, m)?)?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
