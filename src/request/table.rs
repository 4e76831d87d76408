// In: src/request/table.rs

use std::sync::Arc;

use crate::error::{OsrmError, Result};
use crate::native::api::NativeApi;
use crate::native::error_channel::{self, NativeFailure};
use crate::native::handle::{self, Handle, OsrmHandle};
use crate::response::TableResponse;
use crate::types::Coordinate;

/// Builds one symmetric table request: every coordinate is both a source and
/// a destination.
#[derive(Debug)]
pub struct TableRequestBuilder {
    params: Handle<handle::TableParams>,
    len: usize,
}

impl TableRequestBuilder {
    pub fn construct(api: &Arc<dyn NativeApi>) -> Result<Self> {
        let params = Handle::construct_with(api, "osrmc_table_params_construct", |err| unsafe {
            api.table_params_construct(err)
        })?;
        Ok(Self { params, len: 0 })
    }

    pub fn add_coordinate(&mut self, coordinate: Coordinate) -> Result<()> {
        super::add_coordinate(&self.params, coordinate)?;
        self.len += 1;
        Ok(())
    }

    /// Asks the engine for a distance matrix (meters) next to the durations,
    /// readable through [`TableResponse::distance`].
    pub fn request_distances(&mut self) -> Result<()> {
        let api = self.params.api();
        let annotations: Handle<handle::TableAnnotations> =
            Handle::construct_with(api, "osrmc_table_annotations_construct", |err| unsafe {
                api.table_annotations_construct(err)
            })?;

        error_channel::call(api.as_ref(), "osrmc_table_annotations_enable_distance", |err| unsafe {
            api.table_annotations_enable_distance(annotations.as_raw(), true, err)
        })
        .map_err(NativeFailure::into_request)?;

        // The params keep a copy; the annotations object is released on return.
        error_channel::call(api.as_ref(), "osrmc_table_params_set_annotations", |err| unsafe {
            api.table_params_set_annotations(self.params.as_raw(), annotations.as_raw(), err)
        })
        .map_err(NativeFailure::into_request)
    }

    /// Number of coordinates added so far; the response matrix is `len × len`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Runs the table service. Returns `Ok(None)` if the engine produced no
    /// response and reported no error.
    pub fn submit(&self, osrm: &OsrmHandle) -> Result<Option<TableResponse>> {
        const OP: &str = "osrmc_table";

        if self.len == 0 {
            return Err(OsrmError::invalid_request(OP, "table request has no coordinates"));
        }

        log::debug!("submitting table request with {} coordinates", self.len);
        let api = self.params.api();
        let raw = error_channel::call(api.as_ref(), OP, |err| unsafe {
            api.table(osrm.as_raw(), self.params.as_raw(), err)
        })
        .map_err(NativeFailure::into_request)?;

        Ok(Handle::adopt(api, raw).map(|handle| TableResponse::new(handle, self.len)))
    }
}
