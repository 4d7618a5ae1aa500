use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(e: crate::EditError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pyfunction]
fn edit_file(path: &str, edits_json: &str) -> PyResult<String> {
    let ops = crate::parse_operations_from_json(edits_json).map_err(to_py_err)?;
    crate::apply_batch(path, &ops)
        .map(str::to_string)
        .map_err(to_py_err)
}

#[pyfunction]
fn read_lines(path: &str, start_line: i64, end_line: i64) -> PyResult<Vec<String>> {
    let (start, end) = crate::window::window_bounds(start_line, end_line).map_err(to_py_err)?;
    crate::read_window(path, start, end).map_err(to_py_err)
}

#[pyfunction]
fn edit_text(text: &str, edits_json: &str) -> PyResult<Vec<String>> {
    let ops = crate::parse_operations_from_json(edits_json).map_err(to_py_err)?;
    let doc = crate::edit_text(text, &ops).map_err(to_py_err)?;
    Ok(doc.into_lines())
}

#[pymodule]
fn lnedit(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(edit_file, m)?)?;
    m.add_function(wrap_pyfunction!(read_lines, m)?)?;
    m.add_function(wrap_pyfunction!(edit_text, m)?)?;
    Ok(())
}
