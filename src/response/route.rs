// In: src/response/route.rs

use serde_json::Value;
use std::os::raw::c_ulong;

use crate::error::{OsrmError, Result};
use crate::native::error_channel::{self, NativeFailure};
use crate::native::handle::{self, Handle};
use crate::response::json;

/// A live native route response.
#[derive(Debug)]
pub struct RouteResponse {
    handle: Handle<handle::RouteResponse>,
}

impl RouteResponse {
    pub(crate) fn new(handle: Handle<handle::RouteResponse>) -> Self {
        Self { handle }
    }

    /// Distance in meters of the route alternative at `index`, read directly
    /// from the native response.
    pub fn distance(&self, index: usize) -> Result<f32> {
        let api = self.handle.api();
        error_channel::call(api.as_ref(), "osrmc_route_response_distance", |err| unsafe {
            api.route_response_distance(self.handle.as_raw(), index as c_ulong, err)
        })
        .map_err(NativeFailure::into_request)
    }

    /// Duration in seconds of the route alternative at `index`.
    pub fn duration(&self, index: usize) -> Result<f32> {
        let api = self.handle.api();
        error_channel::call(api.as_ref(), "osrmc_route_response_duration", |err| unsafe {
            api.route_response_duration(self.handle.as_raw(), index as c_ulong, err)
        })
        .map_err(NativeFailure::into_request)
    }

    /// Converts the full response into an owned JSON value.
    pub fn to_value(&self) -> Result<Value> {
        json::to_value(&self.handle)
    }
}

/// A decoded route response.
///
/// Every accessor is computed from the underlying value on each call; the
/// value itself is never modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    response: Value,
}

impl RouteResult {
    /// Wraps a decoded response after checking it has the shape the
    /// accessors rely on.
    pub fn from_value(response: Value) -> Result<Self> {
        const OP: &str = "RouteResult::from_value";
        let conversion = |message: String| OsrmError::Conversion {
            operation: OP,
            message,
        };

        match response.get("code") {
            Some(Value::String(_)) => {}
            Some(other) => {
                return Err(conversion(format!(
                    "'code' is {}, expected a string",
                    json::type_name(other)
                )))
            }
            None => return Err(conversion("response has no 'code'".to_string())),
        }

        match response.get("routes") {
            None => {}
            Some(Value::Array(routes)) => {
                for (i, route) in routes.iter().enumerate() {
                    for field in ["distance", "duration"] {
                        if !route.get(field).map_or(false, Value::is_number) {
                            return Err(conversion(format!(
                                "routes[{}].{} is missing or not a number",
                                i, field
                            )));
                        }
                    }
                }
            }
            Some(other) => {
                return Err(conversion(format!(
                    "'routes' is {}, expected an array",
                    json::type_name(other)
                )))
            }
        }

        Ok(Self { response })
    }

    /// True iff the engine answered with code `"Ok"`.
    pub fn status(&self) -> bool {
        self.code() == "Ok"
    }

    pub fn code(&self) -> &str {
        self.response["code"].as_str().unwrap_or_default()
    }

    /// The route alternatives, best first.
    pub fn routes(&self) -> &[Value] {
        self.response["routes"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The input coordinates snapped to the road network.
    pub fn waypoints(&self) -> &[Value] {
        self.response["waypoints"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Sum of `distance` over all returned routes.
    pub fn distance(&self) -> f64 {
        self.sum("distance")
    }

    /// Sum of `duration` over all returned routes.
    pub fn duration(&self) -> f64 {
        self.sum("duration")
    }

    fn sum(&self, field: &str) -> f64 {
        self.routes()
            .iter()
            .filter_map(|route| route[field].as_f64())
            .sum()
    }

    pub fn value(&self) -> &Value {
        &self.response
    }

    pub fn into_value(self) -> Value {
        self.response
    }
}
