// In: src/request/route.rs

use std::ffi::CString;
use std::sync::Arc;

use crate::config::{Bearing, RouteOptions};
use crate::error::{OsrmError, Result};
use crate::native::api::NativeApi;
use crate::native::error_channel::{self, NativeFailure};
use crate::native::handle::{self, Handle, OsrmHandle};
use crate::response::RouteResponse;
use crate::types::Coordinate;

/// Builds one route request: the ordered waypoints live in a native params
/// object, the options are marshaled at submission.
#[derive(Debug)]
pub struct RouteRequestBuilder {
    params: Handle<handle::RouteParams>,
    len: usize,
}

impl RouteRequestBuilder {
    pub fn construct(api: &Arc<dyn NativeApi>) -> Result<Self> {
        let params = Handle::construct_with(api, "osrmc_route_params_construct", |err| unsafe {
            api.route_params_construct(err)
        })?;
        Ok(Self { params, len: 0 })
    }

    /// Appends a waypoint. Order is the order of travel.
    pub fn add_coordinate(&mut self, coordinate: Coordinate) -> Result<()> {
        super::add_coordinate(&self.params, coordinate)?;
        self.len += 1;
        Ok(())
    }

    /// Appends a waypoint with a snapping radius (meters) and a bearing
    /// restriction.
    pub fn add_coordinate_with(
        &mut self,
        coordinate: Coordinate,
        radius: f32,
        bearing: Bearing,
    ) -> Result<()> {
        super::add_coordinate_with(&self.params, coordinate, radius, bearing)?;
        self.len += 1;
        Ok(())
    }

    /// Number of waypoints added so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Runs the route service.
    ///
    /// `options` are checked against the waypoint count and handed over as a
    /// single JSON document. Returns `Ok(None)` if the engine produced no
    /// response and reported no error.
    pub fn submit(&self, osrm: &OsrmHandle, options: &RouteOptions) -> Result<Option<RouteResponse>> {
        options.validate(self.len)?;
        self.submit_validated(osrm, options)
    }

    /// [`submit`](Self::submit) for options already validated against this
    /// builder's waypoint count.
    pub(crate) fn submit_validated(
        &self,
        osrm: &OsrmHandle,
        options: &RouteOptions,
    ) -> Result<Option<RouteResponse>> {
        const OP: &str = "osrmc_route";

        let options_json = CString::new(options.to_native_json()?)
            .map_err(|_| OsrmError::invalid_request(OP, "route options contain a NUL byte"))?;

        log::debug!("submitting route request with {} coordinates", self.len);
        let api = self.params.api();
        let raw = error_channel::call(api.as_ref(), OP, |err| unsafe {
            api.route(osrm.as_raw(), self.params.as_raw(), options_json.as_ptr(), err)
        })
        .map_err(NativeFailure::into_request)?;

        Ok(Handle::adopt(api, raw).map(RouteResponse::new))
    }
}
