use pyo3::prelude::*;
use pyo3::types::{PyAny, PyDict, PyList, PyModule};

use yamlgate_core::{validate_str, RunMode, ValidationError, ValidationReport, ValidatorOptions};

fn error_to_py(py: Python<'_>, err: &ValidationError) -> PyResult<Py<PyAny>> {
    let dict = PyDict::new(py);
    dict.set_item("line", err.line_no)?;
    dict.set_item("kind", err.kind.as_str())?;
    dict.set_item("message", &err.message)?;
    Ok(dict.unbind().into())
}

fn report_to_py(py: Python<'_>, report: &ValidationReport) -> PyResult<Py<PyAny>> {
    let errors = PyList::empty(py);
    for err in &report.errors {
        errors.append(error_to_py(py, err)?)?;
    }
    let dict = PyDict::new(py);
    dict.set_item("valid", report.valid)?;
    dict.set_item("errors", errors)?;
    Ok(dict.unbind().into())
}

#[pyfunction]
#[pyo3(signature = (text, fail_fast = false, allow_top_level_sequence = false))]
fn validate(
    py: Python<'_>,
    text: &str,
    fail_fast: bool,
    allow_top_level_sequence: bool,
) -> PyResult<Py<PyAny>> {
    let options = ValidatorOptions {
        mode: if fail_fast {
            RunMode::FailFast
        } else {
            RunMode::CollectAll
        },
        allow_top_level_sequence,
        // Python callers only ever see the report.
        retain_tree: false,
        ..ValidatorOptions::default()
    };
    let report = py.detach(|| validate_str(text, &options));
    report_to_py(py, &report)
}

#[pyfunction]
fn is_valid(py: Python<'_>, text: &str) -> bool {
    let options = ValidatorOptions {
        retain_tree: false,
        ..ValidatorOptions::fail_fast()
    };
    py.detach(|| validate_str(text, &options).valid)
}

#[pymodule]
fn _yamlgate_native(_py: Python<'_>, m: Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(validate, &m)?)?;
    m.add_function(wrap_pyfunction!(is_valid, &m)?)?;
    Ok(())
}
