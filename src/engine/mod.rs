// In: src/engine/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Engine Facade
// ====================================================================================
//
// `Engine` is the one-call API over the native layer. Each query builds, submits,
// reads and releases its native objects within the call; only the config and the
// engine instance live as long as the `Engine` value.
//
// Route:
//
//   1. [RouteOptions::validate]         -> host-side checks, no native call yet
//   2. [RouteRequestBuilder]            -> params construct + one add per coordinate
//   3. [RouteRequestBuilder::submit]    -> options marshaled once as JSON
//   4. [RouteResponse::to_value]        -> JSON bridge, owned `serde_json::Value`
//   5. [RouteResult::from_value]        -> shape check, computed accessors
//
// Table:
//
//   1. [TableRequestBuilder]            -> params construct + one add per coordinate
//   2. [TableRequestBuilder::submit]    -> native table service
//   3. [TableResponse::durations]       -> N² scalar accessor calls into an `Array2`
//
// `distance_table` also sets distance annotations on the params and reads
// [TableResponse::distances] instead.
//
// Builders and responses are dropped (and so destructed) on every exit path.
//
// ====================================================================================

use std::path::Path;
use std::sync::Arc;

use crate::config::{LibraryConfig, RouteOptions};
use crate::error::{OsrmError, Result};
use crate::native::{ConfigHandle, NativeApi, NativeLibrary, OsrmHandle};
use crate::request::{RouteRequestBuilder, TableRequestBuilder};
use crate::response::{RouteResult, TableResponse, TableResult};
use crate::types::Coordinate;

/// A routing engine bound to one data set.
///
/// Read-only queries may be issued concurrently from several threads.
#[derive(Debug)]
pub struct Engine {
    osrm: OsrmHandle,
}

impl Engine {
    /// Loads the data set at `base_path` (the `.osrm` base name) using the
    /// process-wide library, located via `OSRMC_LIBRARY` or the platform default.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(&LibraryConfig::from_env(), Some(base_path.as_ref()))
    }

    /// Attaches to a data set already loaded into shared memory.
    pub fn shared_memory() -> Result<Self> {
        Self::from_config(&LibraryConfig::from_env(), None)
    }

    /// Like [`new`](Self::new), with an explicit library location. `None`
    /// selects shared-memory mode.
    pub fn from_config(library: &LibraryConfig, base_path: Option<&Path>) -> Result<Self> {
        let api: Arc<dyn NativeApi> = NativeLibrary::global(library)?;
        Self::with_api(api, base_path)
    }

    /// Builds the config and engine over an arbitrary native implementation.
    ///
    /// If the engine fails to build, the config built before it is released
    /// before the error is returned. Otherwise the config lives exactly as
    /// long as the engine.
    pub fn with_api(api: Arc<dyn NativeApi>, base_path: Option<&Path>) -> Result<Self> {
        match base_path {
            Some(path) => log::debug!("constructing engine for {}", path.display()),
            None => log::debug!("constructing engine over shared memory"),
        }
        let config = ConfigHandle::construct(&api, base_path)?;
        let osrm = OsrmHandle::construct(Arc::new(config))?;
        Ok(Self { osrm })
    }

    /// Computes a route through `coordinates` in order.
    ///
    /// Returns `Ok(None)` when the engine produced no response without
    /// reporting an error.
    pub fn route(
        &self,
        coordinates: &[Coordinate],
        options: &RouteOptions,
    ) -> Result<Option<RouteResult>> {
        let builder = self.route_request(coordinates, options)?;
        let response = match builder.submit_validated(&self.osrm, options)? {
            Some(response) => response,
            None => return Ok(None),
        };
        let value = response.to_value()?;
        RouteResult::from_value(value).map(Some)
    }

    /// Distance (meters) and duration (seconds) of the best route, read
    /// through the scalar accessors without decoding the JSON document.
    pub fn route_summary(
        &self,
        coordinates: &[Coordinate],
        options: &RouteOptions,
    ) -> Result<Option<(f32, f32)>> {
        let builder = self.route_request(coordinates, options)?;
        match builder.submit_validated(&self.osrm, options)? {
            Some(response) => Ok(Some((response.distance(0)?, response.duration(0)?))),
            None => Ok(None),
        }
    }

    /// Computes the travel-time matrix between every pair of `coordinates`.
    pub fn table(&self, coordinates: &[Coordinate]) -> Result<Option<TableResult>> {
        match self.table_response(coordinates, false)? {
            Some(response) => response.durations().map(Some),
            None => Ok(None),
        }
    }

    /// Computes the travel-distance matrix (meters) between every pair of
    /// `coordinates`.
    pub fn distance_table(&self, coordinates: &[Coordinate]) -> Result<Option<TableResult>> {
        match self.table_response(coordinates, true)? {
            Some(response) => response.distances().map(Some),
            None => Ok(None),
        }
    }

    fn table_response(
        &self,
        coordinates: &[Coordinate],
        distances: bool,
    ) -> Result<Option<TableResponse>> {
        if coordinates.is_empty() {
            return Err(OsrmError::invalid_request(
                "osrmc_table",
                "table request has no coordinates",
            ));
        }

        let mut builder = TableRequestBuilder::construct(self.api())?;
        if distances {
            builder.request_distances()?;
        }
        for &coordinate in coordinates {
            builder.add_coordinate(coordinate)?;
        }
        builder.submit(&self.osrm)
    }

    /// Builds the params object for `coordinates`. Options are validated
    /// first, so a bad option set issues no native call at all, and are then
    /// submitted with `submit_validated`.
    fn route_request(
        &self,
        coordinates: &[Coordinate],
        options: &RouteOptions,
    ) -> Result<RouteRequestBuilder> {
        options.validate(coordinates.len())?;
        let mut builder = RouteRequestBuilder::construct(self.api())?;
        for &coordinate in coordinates {
            builder.add_coordinate(coordinate)?;
        }
        Ok(builder)
    }

    /// The engine instance, for submitting hand-built requests.
    pub fn osrm(&self) -> &OsrmHandle {
        &self.osrm
    }

    pub fn config(&self) -> &Arc<ConfigHandle> {
        self.osrm.config()
    }

    /// The native implementation every handle of this engine calls into.
    pub fn api(&self) -> &Arc<dyn NativeApi> {
        self.osrm.api()
    }
}
