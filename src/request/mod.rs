// In: src/request/mod.rs

//! Request builders: a native parameters object plus the coordinates added to it.
//!
//! Both services share the coordinate calls; only submission differs. Every
//! coordinate is passed through the error channel individually, so a rejected
//! coordinate fails at the call that added it.

pub mod route;
pub mod table;

pub use route::RouteRequestBuilder;
pub use table::TableRequestBuilder;

use crate::config::Bearing;
use crate::error::Result;
use crate::native::error_channel::{self, NativeFailure};
use crate::native::handle::{self, Handle, HandleKind};
use crate::types::Coordinate;

/// Handle kinds that accept `osrmc_params_add_coordinate*` calls.
pub(crate) trait ParamsKind: HandleKind {}

impl ParamsKind for handle::RouteParams {}
impl ParamsKind for handle::TableParams {}

pub(crate) fn add_coordinate<K: ParamsKind>(
    params: &Handle<K>,
    coordinate: Coordinate,
) -> Result<()> {
    let (longitude, latitude) = coordinate.to_native();
    let api = params.api();
    error_channel::call(api.as_ref(), "osrmc_params_add_coordinate", |err| unsafe {
        api.params_add_coordinate(params.as_raw(), longitude, latitude, err)
    })
    .map_err(NativeFailure::into_request)
}

pub(crate) fn add_coordinate_with<K: ParamsKind>(
    params: &Handle<K>,
    coordinate: Coordinate,
    radius: f32,
    bearing: Bearing,
) -> Result<()> {
    let (longitude, latitude) = coordinate.to_native();
    let api = params.api();
    error_channel::call(api.as_ref(), "osrmc_params_add_coordinate_with", |err| unsafe {
        api.params_add_coordinate_with(
            params.as_raw(),
            longitude,
            latitude,
            radius,
            bearing.bearing.into(),
            bearing.range.into(),
            err,
        )
    })
    .map_err(NativeFailure::into_request)
}
