// In: src/response/table.rs

use ndarray::Array2;
use serde_json::Value;
use std::ops::Index;
use std::os::raw::c_ulong;

use crate::error::{OsrmError, Result};
use crate::native::api::{NativeApi, RawError, RawHandle};
use crate::native::error_channel::{self, NativeFailure};
use crate::native::handle::{self, Handle};
use crate::response::json;

const DURATION_OP: &str = "osrmc_table_response_duration";
const DISTANCE_OP: &str = "osrmc_table_response_distance";

/// A live native table response for a symmetric request over `len`
/// coordinates.
#[derive(Debug)]
pub struct TableResponse {
    handle: Handle<handle::TableResponse>,
    len: usize,
}

impl TableResponse {
    pub(crate) fn new(handle: Handle<handle::TableResponse>, len: usize) -> Self {
        Self { handle, len }
    }

    /// Number of coordinates the request was built from.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Travel time in seconds from coordinate `source` to coordinate
    /// `destination`.
    ///
    /// Both indices must be below [`len`](Self::len); otherwise this fails
    /// with `Index` without calling into the native layer.
    pub fn duration(&self, source: usize, destination: usize) -> Result<f32> {
        self.cell(DURATION_OP, source, destination, |api, raw, from, to, err| unsafe {
            api.table_response_duration(raw, from, to, err)
        })
    }

    /// Travel distance in meters from `source` to `destination`. Same index
    /// rules as [`duration`](Self::duration); fails with the native `NoTable`
    /// error unless the request asked for distances.
    pub fn distance(&self, source: usize, destination: usize) -> Result<f32> {
        self.cell(DISTANCE_OP, source, destination, |api, raw, from, to, err| unsafe {
            api.table_response_distance(raw, from, to, err)
        })
    }

    fn cell<F>(
        &self,
        operation: &'static str,
        source: usize,
        destination: usize,
        read: F,
    ) -> Result<f32>
    where
        F: FnOnce(&dyn NativeApi, RawHandle, c_ulong, c_ulong, *mut RawError) -> f32,
    {
        if source >= self.len || destination >= self.len {
            return Err(OsrmError::Index {
                operation,
                source_index: source,
                destination_index: destination,
                len: self.len,
            });
        }

        let api = self.handle.api();
        error_channel::call(api.as_ref(), operation, |err| {
            read(
                api.as_ref(),
                self.handle.as_raw(),
                source as c_ulong,
                destination as c_ulong,
                err,
            )
        })
        .map_err(NativeFailure::into_request)
    }

    /// Reads the full N×N duration matrix, one native accessor call per cell.
    /// The first failing cell aborts the whole read.
    pub fn durations(&self) -> Result<TableResult> {
        self.matrix(Self::duration)
    }

    /// Reads the full N×N distance matrix, like [`durations`](Self::durations).
    pub fn distances(&self) -> Result<TableResult> {
        self.matrix(Self::distance)
    }

    fn matrix(&self, read: impl Fn(&Self, usize, usize) -> Result<f32>) -> Result<TableResult> {
        let mut matrix = Array2::<f32>::zeros((self.len, self.len));
        for ((source, destination), cell) in matrix.indexed_iter_mut() {
            *cell = read(self, source, destination)?;
        }
        Ok(TableResult { values: matrix })
    }

    /// Converts the full response into an owned JSON value.
    pub fn to_value(&self) -> Result<Value> {
        json::to_value(&self.handle)
    }
}

/// An N×N matrix of travel times (seconds) or distances (meters); entry
/// `(s, t)` is the value from source `s` to destination `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableResult {
    values: Array2<f32>,
}

impl TableResult {
    /// Number of coordinates, i.e. rows (and columns) of the matrix.
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, source: usize, destination: usize) -> Option<f32> {
        self.values.get((source, destination)).copied()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn into_array(self) -> Array2<f32> {
        self.values
    }

    /// The matrix as nested rows, source-major.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        self.values.outer_iter().map(|row| row.to_vec()).collect()
    }
}

impl Index<(usize, usize)> for TableResult {
    type Output = f32;

    fn index(&self, (source, destination): (usize, usize)) -> &f32 {
        &self.values[[source, destination]]
    }
}
