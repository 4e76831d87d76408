// In: src/native/mock.rs

//! An instrumented, in-process stand-in for libosrmc used by the unit tests.
//!
//! It hands out fake opaque pointers, keeps every live object in a table, and
//! counts constructions, destructions and error objects, so tests can assert
//! that every code path leaves zero live handles and zero unreleased errors.
//! Individual native calls can be scripted to fail, return null, or return a
//! malformed JSON document.

use parking_lot::Mutex;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_ulong};
use std::sync::Arc;

use crate::native::api::{NativeApi, RawError, RawHandle, OSRMC_VERSION_MAJOR};
use crate::native::error_channel::copy_native_str;

/// Data sets the mock engine can "load".
const DEFAULT_DATASETS: [&str; 2] = ["testdata/monaco", "data/monaco"];

/// A scripted outcome for the next call of one native operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    /// Behave normally.
    Pass,
    /// Return null (or the accessor's sentinel) without touching the error slot.
    Null,
    /// Populate the error slot.
    Error { code: String, message: String },
    /// `osrmc_response_json` only: return this text instead of the response.
    Json(String),
}

impl Scripted {
    pub fn error(code: &str, message: &str) -> Self {
        Scripted::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }
}

struct MockError {
    code: CString,
    message: CString,
}

#[derive(Debug)]
enum MockObject {
    Config { base_path: Option<String> },
    Osrm,
    RouteParams { coordinates: Vec<(f32, f32)> },
    TableParams { coordinates: Vec<(f32, f32)>, distances: bool },
    TableAnnotations { distance: bool },
    RouteResponse { json: CString, routes: Vec<(f32, f32)> },
    TableResponse {
        json: CString,
        durations: Vec<Vec<f32>>,
        distances: Option<Vec<Vec<f32>>>,
    },
}

impl MockObject {
    fn kind(&self) -> &'static str {
        match self {
            MockObject::Config { .. } => "config",
            MockObject::Osrm => "osrm",
            MockObject::RouteParams { .. } => "route_params",
            MockObject::TableParams { .. } => "table_params",
            MockObject::TableAnnotations { .. } => "table_annotations",
            MockObject::RouteResponse { .. } => "route_response",
            MockObject::TableResponse { .. } => "table_response",
        }
    }
}

#[derive(Default)]
struct State {
    next_id: usize,
    live: HashMap<usize, MockObject>,
    live_errors: HashSet<usize>,
    errors_raised: usize,
    destructs: usize,
    destruct_order: Vec<&'static str>,
    invalid_destructs: usize,
    calls: HashMap<&'static str, usize>,
    scripts: HashMap<&'static str, VecDeque<Scripted>>,
    datasets: HashSet<String>,
    last_base_path: Option<Option<String>>,
    last_options_json: Option<String>,
    // Keeps scripted JSON strings alive for the pointers handed out.
    retained: Vec<CString>,
}

impl State {
    fn enter(&mut self, op: &'static str) -> Scripted {
        *self.calls.entry(op).or_default() += 1;
        self.scripts
            .get_mut(op)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Scripted::Pass)
    }

    fn insert(&mut self, object: MockObject) -> RawHandle {
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(id, object);
        id as RawHandle
    }

    fn get(&self, raw: RawHandle) -> &MockObject {
        self.live
            .get(&(raw as usize))
            .unwrap_or_else(|| panic!("use of dead or unknown handle {:p}", raw))
    }

    fn get_mut(&mut self, raw: RawHandle) -> &mut MockObject {
        self.live
            .get_mut(&(raw as usize))
            .unwrap_or_else(|| panic!("use of dead or unknown handle {:p}", raw))
    }

    fn remove(&mut self, raw: RawHandle, kind: &'static str) {
        match self.live.remove(&(raw as usize)) {
            Some(object) if object.kind() == kind => {
                self.destructs += 1;
                self.destruct_order.push(kind);
            }
            Some(object) => {
                self.invalid_destructs += 1;
                self.live.insert(raw as usize, object);
            }
            None => self.invalid_destructs += 1,
        }
    }

    unsafe fn raise(&mut self, error: *mut RawError, code: &str, message: &str) {
        assert!(!error.is_null(), "fallible call issued without an error slot");
        assert!((*error).is_null(), "error slot reused without being released");
        let boxed = Box::new(MockError {
            code: CString::new(code).unwrap(),
            message: CString::new(message).unwrap(),
        });
        let raw = Box::into_raw(boxed) as RawError;
        self.live_errors.insert(raw as usize);
        self.errors_raised += 1;
        *error = raw;
    }

    /// Applies a non-`Pass` script to a handle-returning call.
    unsafe fn fail(&mut self, script: Scripted, error: *mut RawError) -> RawHandle {
        if let Scripted::Error { code, message } = script {
            self.raise(error, &code, &message);
        }
        std::ptr::null_mut()
    }
}

/// Leak-counting double of the native library.
pub struct MockOsrmc {
    state: Mutex<State>,
}

impl MockOsrmc {
    pub fn new() -> Self {
        let state = State {
            datasets: DEFAULT_DATASETS.iter().map(|d| d.to_string()).collect(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn api(self: &Arc<Self>) -> Arc<dyn NativeApi> {
        Arc::clone(self) as Arc<dyn NativeApi>
    }

    /// Queues an outcome for the next call of `op`. Calls beyond the queue pass.
    pub fn script(&self, op: &'static str, outcome: Scripted) {
        self.state
            .lock()
            .scripts
            .entry(op)
            .or_default()
            .push_back(outcome);
    }

    /// Lets `op` pass `n` times, then applies `outcome` once.
    pub fn script_after(&self, op: &'static str, n: usize, outcome: Scripted) {
        for _ in 0..n {
            self.script(op, Scripted::Pass);
        }
        self.script(op, outcome);
    }

    /// Writes an error object into `error`, as a failing native call would.
    pub fn raise(&self, error: *mut RawError, outcome: Scripted) {
        if let Scripted::Error { code, message } = outcome {
            unsafe { self.state.lock().raise(error, &code, &message) };
        }
    }

    pub fn live_handles(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn destructs(&self) -> usize {
        self.state.lock().destructs
    }

    /// Kinds of every successfully destructed object, oldest first.
    pub fn destruct_order(&self) -> Vec<&'static str> {
        self.state.lock().destruct_order.clone()
    }

    pub fn live_errors(&self) -> usize {
        self.state.lock().live_errors.len()
    }

    pub fn errors_raised(&self) -> usize {
        self.state.lock().errors_raised
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.state.lock().calls.get(op).copied().unwrap_or(0)
    }

    pub fn last_base_path(&self) -> Option<Option<String>> {
        self.state.lock().last_base_path.clone()
    }

    pub fn last_options_json(&self) -> Option<String> {
        self.state.lock().last_options_json.clone()
    }

    /// Asserts the invariant every test ends with: nothing leaked, nothing
    /// destructed twice.
    pub fn assert_clean(&self) {
        let state = self.state.lock();
        let live: Vec<_> = state.live.values().map(MockObject::kind).collect();
        assert!(live.is_empty(), "leaked handles: {:?}", live);
        assert!(state.live_errors.is_empty(), "leaked error objects");
        assert_eq!(state.invalid_destructs, 0, "double or mismatched destruct");
    }
}

impl Default for MockOsrmc {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockOsrmc {
    fn drop(&mut self) {
        // Free error objects a failing test may have left behind.
        for raw in self.state.get_mut().live_errors.drain() {
            drop(unsafe { Box::from_raw(raw as *mut MockError) });
        }
    }
}

/// Equirectangular distance in meters, plenty for synthetic responses.
fn distance_m(a: (f32, f32), b: (f32, f32)) -> f32 {
    let (lon1, lat1) = (a.0.to_radians(), a.1.to_radians());
    let (lon2, lat2) = (b.0.to_radians(), b.1.to_radians());
    let x = (lon2 - lon1) * ((lat1 + lat2) / 2.0).cos();
    let y = lat2 - lat1;
    (x * x + y * y).sqrt() * 6_371_000.0
}

/// Synthetic travel time at 10 m/s.
fn duration_s(meters: f32) -> f32 {
    meters / 10.0
}

fn invalid_coordinate(coordinates: &[(f32, f32)]) -> Option<(f32, f32)> {
    coordinates
        .iter()
        .copied()
        .find(|(lon, lat)| !(-180.0..=180.0).contains(lon) || !(-90.0..=90.0).contains(lat))
}

fn index_error() -> (&'static str, &'static str) {
    ("Exception", "vector::_M_range_check: __n >= this->size()")
}

impl NativeApi for MockOsrmc {
    fn version(&self) -> u32 {
        OSRMC_VERSION_MAJOR << 16
    }

    fn is_abi_compatible(&self) -> bool {
        true
    }

    unsafe fn error_code(&self, error: RawError) -> *const c_char {
        (*(error as *const MockError)).code.as_ptr()
    }

    unsafe fn error_message(&self, error: RawError) -> *const c_char {
        (*(error as *const MockError)).message.as_ptr()
    }

    unsafe fn error_destruct(&self, error: RawError) {
        let mut state = self.state.lock();
        assert!(
            state.live_errors.remove(&(error as usize)),
            "error object released twice"
        );
        drop(Box::from_raw(error as *mut MockError));
    }

    unsafe fn config_construct(&self, base_path: *const c_char, error: *mut RawError) -> RawHandle {
        let mut state = self.state.lock();
        let script = state.enter("osrmc_config_construct");
        let base_path = copy_native_str(base_path);
        state.last_base_path = Some(base_path.clone());
        match script {
            Scripted::Pass => state.insert(MockObject::Config { base_path }),
            other => state.fail(other, error),
        }
    }

    unsafe fn config_destruct(&self, config: RawHandle) {
        self.state.lock().remove(config, "config");
    }

    unsafe fn osrm_construct(&self, config: RawHandle, error: *mut RawError) -> RawHandle {
        let mut state = self.state.lock();
        let script = state.enter("osrmc_osrm_construct");
        if script != Scripted::Pass {
            return state.fail(script, error);
        }
        let missing = match state.get(config) {
            MockObject::Config {
                base_path: Some(path),
            } if !state.datasets.contains(path) => Some(path.clone()),
            MockObject::Config { .. } => None,
            other => panic!("osrm_construct given a {} handle", other.kind()),
        };
        match missing {
            Some(path) => {
                let message = format!("missing file: {}.hsgr", path);
                state.raise(error, "Exception", &message);
                std::ptr::null_mut()
            }
            None => state.insert(MockObject::Osrm),
        }
    }

    unsafe fn osrm_destruct(&self, osrm: RawHandle) {
        self.state.lock().remove(osrm, "osrm");
    }

    unsafe fn route_params_construct(&self, error: *mut RawError) -> RawHandle {
        let mut state = self.state.lock();
        match state.enter("osrmc_route_params_construct") {
            Scripted::Pass => state.insert(MockObject::RouteParams {
                coordinates: Vec::new(),
            }),
            other => state.fail(other, error),
        }
    }

    unsafe fn route_params_destruct(&self, params: RawHandle) {
        self.state.lock().remove(params, "route_params");
    }

    unsafe fn table_params_construct(&self, error: *mut RawError) -> RawHandle {
        let mut state = self.state.lock();
        match state.enter("osrmc_table_params_construct") {
            Scripted::Pass => state.insert(MockObject::TableParams {
                coordinates: Vec::new(),
                distances: false,
            }),
            other => state.fail(other, error),
        }
    }

    unsafe fn table_params_destruct(&self, params: RawHandle) {
        self.state.lock().remove(params, "table_params");
    }

    unsafe fn table_annotations_construct(&self, error: *mut RawError) -> RawHandle {
        let mut state = self.state.lock();
        match state.enter("osrmc_table_annotations_construct") {
            Scripted::Pass => state.insert(MockObject::TableAnnotations { distance: false }),
            other => state.fail(other, error),
        }
    }

    unsafe fn table_annotations_destruct(&self, annotations: RawHandle) {
        self.state.lock().remove(annotations, "table_annotations");
    }

    unsafe fn table_annotations_enable_distance(
        &self,
        annotations: RawHandle,
        enable: bool,
        error: *mut RawError,
    ) {
        let mut state = self.state.lock();
        if let Scripted::Error { code, message } =
            state.enter("osrmc_table_annotations_enable_distance")
        {
            state.raise(error, &code, &message);
            return;
        }
        match state.get_mut(annotations) {
            MockObject::TableAnnotations { distance } => *distance = enable,
            other => panic!("table_annotations_enable_distance given a {} handle", other.kind()),
        }
    }

    unsafe fn table_params_set_annotations(
        &self,
        params: RawHandle,
        annotations: RawHandle,
        error: *mut RawError,
    ) {
        let mut state = self.state.lock();
        if let Scripted::Error { code, message } = state.enter("osrmc_table_params_set_annotations")
        {
            state.raise(error, &code, &message);
            return;
        }
        let enabled = match state.get(annotations) {
            MockObject::TableAnnotations { distance } => *distance,
            other => panic!("table_params_set_annotations given a {} handle", other.kind()),
        };
        match state.get_mut(params) {
            MockObject::TableParams { distances, .. } => *distances = enabled,
            other => panic!("table_params_set_annotations given a {} handle", other.kind()),
        }
    }

    unsafe fn params_add_coordinate(
        &self,
        params: RawHandle,
        longitude: f32,
        latitude: f32,
        error: *mut RawError,
    ) {
        let mut state = self.state.lock();
        if let Scripted::Error { code, message } = state.enter("osrmc_params_add_coordinate") {
            state.raise(error, &code, &message);
            return;
        }
        match state.get_mut(params) {
            MockObject::RouteParams { coordinates }
            | MockObject::TableParams { coordinates, .. } => {
                coordinates.push((longitude, latitude))
            }
            other => panic!("add_coordinate given a {} handle", other.kind()),
        }
    }

    unsafe fn params_add_coordinate_with(
        &self,
        params: RawHandle,
        longitude: f32,
        latitude: f32,
        _radius: f32,
        _bearing: c_int,
        _range: c_int,
        error: *mut RawError,
    ) {
        let mut state = self.state.lock();
        if let Scripted::Error { code, message } = state.enter("osrmc_params_add_coordinate_with")
        {
            state.raise(error, &code, &message);
            return;
        }
        match state.get_mut(params) {
            MockObject::RouteParams { coordinates }
            | MockObject::TableParams { coordinates, .. } => {
                coordinates.push((longitude, latitude))
            }
            other => panic!("add_coordinate_with given a {} handle", other.kind()),
        }
    }

    unsafe fn route(
        &self,
        osrm: RawHandle,
        params: RawHandle,
        options_json: *const c_char,
        error: *mut RawError,
    ) -> RawHandle {
        let mut state = self.state.lock();
        let script = state.enter("osrmc_route");
        state.last_options_json = copy_native_str(options_json);
        assert!(matches!(state.get(osrm), MockObject::Osrm));
        if script != Scripted::Pass {
            return state.fail(script, error);
        }

        let coordinates = match state.get(params) {
            MockObject::RouteParams { coordinates } => coordinates.clone(),
            other => panic!("route given a {} handle", other.kind()),
        };
        if let Some((lon, lat)) = invalid_coordinate(&coordinates) {
            let message = format!("Invalid coordinate value ({}, {}).", lon, lat);
            state.raise(error, "InvalidValue", &message);
            return std::ptr::null_mut();
        }
        if coordinates.len() < 2 {
            state.raise(error, "InvalidOptions", "Number of coordinates needs to be at least two.");
            return std::ptr::null_mut();
        }

        let alternatives = state
            .last_options_json
            .as_deref()
            .and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok())
            .map_or(false, |v| v["alternatives"] == json!(true));

        let base: f32 = coordinates
            .windows(2)
            .map(|w| distance_m(w[0], w[1]))
            .sum();
        let mut routes = vec![(base, duration_s(base))];
        if alternatives {
            let detour = base * 1.25;
            routes.push((detour, duration_s(detour)));
        }

        let document = json!({
            "code": "Ok",
            "routes": routes.iter().map(|(d, t)| json!({
                "distance": d,
                "duration": t,
                "weight_name": "routability",
                "legs": [],
            })).collect::<Vec<_>>(),
            "waypoints": coordinates.iter().map(|(lon, lat)| json!({
                "name": "",
                "location": [lon, lat],
            })).collect::<Vec<_>>(),
        });
        let json = CString::new(document.to_string()).unwrap();
        state.insert(MockObject::RouteResponse { json, routes })
    }

    unsafe fn route_response_destruct(&self, response: RawHandle) {
        self.state.lock().remove(response, "route_response");
    }

    unsafe fn route_response_distance(
        &self,
        response: RawHandle,
        index: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        let mut state = self.state.lock();
        state.enter("osrmc_route_response_distance");
        let found = match state.get(response) {
            MockObject::RouteResponse { routes, .. } => routes.get(index as usize).map(|r| r.0),
            other => panic!("route_response_distance given a {} handle", other.kind()),
        };
        match found {
            Some(value) => value,
            None => {
                let (code, message) = index_error();
                state.raise(error, code, message);
                f32::INFINITY
            }
        }
    }

    unsafe fn route_response_duration(
        &self,
        response: RawHandle,
        index: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        let mut state = self.state.lock();
        state.enter("osrmc_route_response_duration");
        let found = match state.get(response) {
            MockObject::RouteResponse { routes, .. } => routes.get(index as usize).map(|r| r.1),
            other => panic!("route_response_duration given a {} handle", other.kind()),
        };
        match found {
            Some(value) => value,
            None => {
                let (code, message) = index_error();
                state.raise(error, code, message);
                f32::INFINITY
            }
        }
    }

    unsafe fn table(&self, osrm: RawHandle, params: RawHandle, error: *mut RawError) -> RawHandle {
        let mut state = self.state.lock();
        let script = state.enter("osrmc_table");
        assert!(matches!(state.get(osrm), MockObject::Osrm));
        if script != Scripted::Pass {
            return state.fail(script, error);
        }

        let (coordinates, with_distances) = match state.get(params) {
            MockObject::TableParams {
                coordinates,
                distances,
            } => (coordinates.clone(), *distances),
            other => panic!("table given a {} handle", other.kind()),
        };
        if let Some((lon, lat)) = invalid_coordinate(&coordinates) {
            let message = format!("Invalid coordinate value ({}, {}).", lon, lat);
            state.raise(error, "InvalidValue", &message);
            return std::ptr::null_mut();
        }

        let meters: Vec<Vec<f32>> = coordinates
            .iter()
            .map(|&s| coordinates.iter().map(|&t| distance_m(s, t)).collect())
            .collect();
        let durations: Vec<Vec<f32>> = meters
            .iter()
            .map(|row| row.iter().map(|&m| duration_s(m)).collect())
            .collect();
        let distances = with_distances.then_some(meters);

        let mut document = json!({ "code": "Ok", "durations": durations });
        if let Some(distances) = &distances {
            document["distances"] = json!(distances);
        }
        let json = CString::new(document.to_string()).unwrap();
        state.insert(MockObject::TableResponse {
            json,
            durations,
            distances,
        })
    }

    unsafe fn table_response_destruct(&self, response: RawHandle) {
        self.state.lock().remove(response, "table_response");
    }

    unsafe fn table_response_duration(
        &self,
        response: RawHandle,
        from: c_ulong,
        to: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        let mut state = self.state.lock();
        let script = state.enter("osrmc_table_response_duration");
        if let Scripted::Error { code, message } = script {
            state.raise(error, &code, &message);
            return f32::INFINITY;
        }
        let found = match state.get(response) {
            MockObject::TableResponse { durations, .. } => durations
                .get(from as usize)
                .and_then(|row| row.get(to as usize))
                .copied(),
            other => panic!("table_response_duration given a {} handle", other.kind()),
        };
        match found {
            Some(value) => value,
            None => {
                let (code, message) = index_error();
                state.raise(error, code, message);
                f32::INFINITY
            }
        }
    }

    unsafe fn table_response_distance(
        &self,
        response: RawHandle,
        from: c_ulong,
        to: c_ulong,
        error: *mut RawError,
    ) -> f32 {
        let mut state = self.state.lock();
        let script = state.enter("osrmc_table_response_distance");
        if let Scripted::Error { code, message } = script {
            state.raise(error, &code, &message);
            return f32::INFINITY;
        }
        let found = match state.get(response) {
            MockObject::TableResponse {
                distances: None, ..
            } => {
                state.raise(error, "NoTable", "Table request not configured to return distances");
                return f32::INFINITY;
            }
            MockObject::TableResponse {
                distances: Some(distances),
                ..
            } => distances
                .get(from as usize)
                .and_then(|row| row.get(to as usize))
                .copied(),
            other => panic!("table_response_distance given a {} handle", other.kind()),
        };
        match found {
            Some(value) => value,
            None => {
                let (code, message) = index_error();
                state.raise(error, code, message);
                f32::INFINITY
            }
        }
    }

    unsafe fn response_json(&self, response: RawHandle) -> *const c_char {
        let mut state = self.state.lock();
        match state.enter("osrmc_response_json") {
            Scripted::Null => return std::ptr::null(),
            Scripted::Json(text) => {
                let text = CString::new(text).unwrap();
                let ptr = text.as_ptr();
                state.retained.push(text);
                return ptr;
            }
            _ => {}
        }
        match state.get(response) {
            MockObject::RouteResponse { json, .. } | MockObject::TableResponse { json, .. } => {
                json.as_ptr()
            }
            other => panic!("response_json given a {} handle", other.kind()),
        }
    }
}
