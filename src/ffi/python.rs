// In: src/ffi/python.rs

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use serde_json::Value;
use std::path::PathBuf;

use crate::config::{
    Annotations, Bearing, ContinueStraight, FlagOrName, Geometries, Overview, RouteOptions,
};
use crate::engine::Engine;
use crate::response::RouteResult;
use crate::types::Coordinate;

//==================================================================================
// I. Engine
//==================================================================================

#[pyclass(name = "Engine", module = "osrmc", frozen)]
pub struct PyEngine {
    inner: Engine,
}

#[pymethods]
impl PyEngine {
    /// Loads the data set at `base_path`, or attaches to the shared-memory
    /// data set when no path is given.
    #[new]
    #[pyo3(signature = (base_path = None))]
    fn new(py: Python<'_>, base_path: Option<PathBuf>) -> PyResult<Self> {
        let engine = py.allow_threads(|| match base_path {
            Some(path) => Engine::new(path),
            None => Engine::shared_memory(),
        })?;
        Ok(Self { inner: engine })
    }

    /// Computes a route through `coordinates`, a sequence of
    /// `(longitude, latitude)` pairs. Returns `None` if the engine produced
    /// no response.
    #[pyo3(signature = (
        coordinates,
        bearings = Vec::new(),
        radiuses = Vec::new(),
        generate_hints = false,
        hints = Vec::new(),
        alternatives = false,
        steps = false,
        annotations = None,
        geometries = "polyline",
        overview = None,
        continue_straight = None
    ))]
    #[allow(clippy::too_many_arguments)]
    fn route(
        &self,
        py: Python<'_>,
        coordinates: Vec<(f64, f64)>,
        bearings: Vec<(i16, i16)>,
        radiuses: Vec<f64>,
        generate_hints: bool,
        hints: Vec<String>,
        alternatives: bool,
        steps: bool,
        annotations: Option<&Bound<'_, PyAny>>,
        geometries: &str,
        overview: Option<&Bound<'_, PyAny>>,
        continue_straight: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<Option<PyRoute>> {
        // 1. Parse the loosely typed keyword arguments into the typed option set.
        let options = RouteOptions {
            bearings: bearings.into_iter().map(Bearing::from).collect(),
            radiuses,
            generate_hints,
            hints,
            alternatives,
            steps,
            annotations: parse_option::<Annotations>(annotations)?,
            geometries: geometries.parse::<Geometries>().map_err(PyValueError::new_err)?,
            overview: parse_option::<Overview>(overview)?,
            continue_straight: parse_option::<ContinueStraight>(continue_straight)?,
        };
        let coordinates: Vec<Coordinate> = coordinates.into_iter().map(Coordinate::from).collect();

        // 2. Run the query with the GIL released.
        let result = py.allow_threads(|| self.inner.route(&coordinates, &options))?;
        Ok(result.map(|result| PyRoute { result }))
    }

    /// Computes the travel-time matrix between every pair of `coordinates`,
    /// as a list of rows. Returns `None` if the engine produced no response.
    fn table(&self, py: Python<'_>, coordinates: Vec<(f64, f64)>) -> PyResult<Option<Vec<Vec<f32>>>> {
        let coordinates: Vec<Coordinate> = coordinates.into_iter().map(Coordinate::from).collect();
        let result = py.allow_threads(|| self.inner.table(&coordinates))?;
        Ok(result.map(|table| table.to_rows()))
    }

    /// Like `table`, with distances in meters.
    fn distance_table(
        &self,
        py: Python<'_>,
        coordinates: Vec<(f64, f64)>,
    ) -> PyResult<Option<Vec<Vec<f32>>>> {
        let coordinates: Vec<Coordinate> = coordinates.into_iter().map(Coordinate::from).collect();
        let result = py.allow_threads(|| self.inner.distance_table(&coordinates))?;
        Ok(result.map(|table| table.to_rows()))
    }
}

/// Accepts either a Python `bool` or a `str` for options like `overview=False`
/// and `overview="full"`. `None` selects the option's default.
fn parse_option<T>(value: Option<&Bound<'_, PyAny>>) -> PyResult<T>
where
    T: Default + TryFrom<FlagOrName, Error = String>,
{
    let Some(value) = value else {
        return Ok(T::default());
    };
    let raw = match value.extract::<bool>() {
        Ok(flag) => FlagOrName::Flag(flag),
        Err(_) => FlagOrName::Name(value.extract::<String>()?),
    };
    T::try_from(raw).map_err(PyValueError::new_err)
}

//==================================================================================
// II. Route Result
//==================================================================================

#[pyclass(name = "Route", module = "osrmc", frozen)]
pub struct PyRoute {
    result: RouteResult,
}

#[pymethods]
impl PyRoute {
    /// True iff the engine answered with code `"Ok"`.
    fn status(&self) -> bool {
        self.result.status()
    }

    #[getter]
    fn code(&self) -> String {
        self.result.code().to_string()
    }

    #[getter]
    fn routes(&self, py: Python<'_>) -> PyResult<PyObject> {
        values_to_py(py, self.result.routes())
    }

    #[getter]
    fn waypoints(&self, py: Python<'_>) -> PyResult<PyObject> {
        values_to_py(py, self.result.waypoints())
    }

    /// Sum of `distance` over all returned routes, in meters.
    #[getter]
    fn distance(&self) -> f64 {
        self.result.distance()
    }

    /// Sum of `duration` over all returned routes, in seconds.
    #[getter]
    fn duration(&self) -> f64 {
        self.result.duration()
    }

    /// The full decoded response.
    #[getter]
    fn response(&self, py: Python<'_>) -> PyResult<PyObject> {
        value_to_py(py, self.result.value())
    }

    fn __repr__(&self) -> String {
        format!(
            "Route(code={:?}, routes={}, distance={}, duration={})",
            self.result.code(),
            self.result.routes().len(),
            self.result.distance(),
            self.result.duration()
        )
    }
}

//==================================================================================
// III. JSON -> Python conversion
//==================================================================================

fn value_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    let object = match value {
        Value::Null => py.None(),
        Value::Bool(flag) => (*flag).into_py(py),
        Value::Number(number) => match (number.as_i64(), number.as_u64()) {
            (Some(signed), _) => signed.into_py(py),
            (None, Some(unsigned)) => unsigned.into_py(py),
            (None, None) => number.as_f64().unwrap_or(f64::NAN).into_py(py),
        },
        Value::String(text) => text.as_str().into_py(py),
        Value::Array(items) => values_to_py(py, items)?,
        Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (key, item) in map {
                dict.set_item(key, value_to_py(py, item)?)?;
            }
            dict.into_py(py)
        }
    };
    Ok(object)
}

fn values_to_py(py: Python<'_>, items: &[Value]) -> PyResult<PyObject> {
    let list = PyList::empty_bound(py);
    for item in items {
        list.append(value_to_py(py, item)?)?;
    }
    Ok(list.into_py(py))
}

//==================================================================================
// IV. Module Functions
//==================================================================================

/// Turns on `[LEVEL] message` logging of the binding's diagnostics, to stderr
/// or appended to `log_file`.
#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None))]
pub fn enable_verbose_logging_py(log_file: Option<PathBuf>) -> PyResult<()> {
    crate::logging::enable_verbose_logging(log_file)?;
    Ok(())
}
