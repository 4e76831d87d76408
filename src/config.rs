// In: src/config.rs

//! Typed configuration for the binding.
//!
//! `RouteOptions` is the single record describing every recognized route
//! option and its default. It is validated against the request's coordinate
//! count and marshaled to the native layer in one pass as a JSON document,
//! never one native call per option. `LibraryConfig` describes where the
//! shared `libosrmc` library lives.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{OsrmError, Result};

/// Environment variable consulted by [`LibraryConfig::from_env`].
pub const LIBRARY_PATH_ENV: &str = "OSRMC_LIBRARY";

//==================================================================================
// I. Option Value Enums
//==================================================================================

/// Wire shape shared by options that accept either a boolean or a keyword,
/// e.g. `overview: false` vs `overview: "full"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum FlagOrName {
    Flag(bool),
    Name(String),
}

fn unknown_value(option: &str, value: &str, expected: &str) -> String {
    format!("Invalid {} '{}'. Must be {}.", option, value, expected)
}

/// Format of the returned route geometry.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Geometries {
    /// **Default:** Google polyline encoding with precision 5.
    #[default]
    Polyline,
    /// Polyline encoding with precision 6.
    Polyline6,
    /// A GeoJSON `LineString`.
    GeoJson,
}

impl FromStr for Geometries {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "polyline" => Ok(Geometries::Polyline),
            "polyline6" => Ok(Geometries::Polyline6),
            "geojson" => Ok(Geometries::GeoJson),
            _ => Err(unknown_value(
                "geometries",
                s,
                "'polyline', 'polyline6' or 'geojson'",
            )),
        }
    }
}

/// How much of the route geometry the response contains.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(try_from = "FlagOrName", into = "FlagOrName")]
pub enum Overview {
    #[default]
    Simplified,
    Full,
    /// No overview geometry at all. Serialized as the literal `false`.
    False,
}

impl TryFrom<FlagOrName> for Overview {
    type Error = String;

    fn try_from(value: FlagOrName) -> std::result::Result<Self, Self::Error> {
        match value {
            FlagOrName::Flag(false) => Ok(Overview::False),
            FlagOrName::Name(name) if name == "simplified" => Ok(Overview::Simplified),
            FlagOrName::Name(name) if name == "full" => Ok(Overview::Full),
            FlagOrName::Name(name) if name == "false" => Ok(Overview::False),
            other => Err(unknown_value(
                "overview",
                &format!("{:?}", other),
                "'simplified', 'full' or false",
            )),
        }
    }
}

impl From<Overview> for FlagOrName {
    fn from(value: Overview) -> Self {
        match value {
            Overview::Simplified => FlagOrName::Name("simplified".to_string()),
            Overview::Full => FlagOrName::Name("full".to_string()),
            Overview::False => FlagOrName::Flag(false),
        }
    }
}

/// Whether the route may U-turn at waypoints. `Default` defers to the
/// engine's profile.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(try_from = "FlagOrName", into = "FlagOrName")]
pub enum ContinueStraight {
    #[default]
    Default,
    True,
    False,
}

impl TryFrom<FlagOrName> for ContinueStraight {
    type Error = String;

    fn try_from(value: FlagOrName) -> std::result::Result<Self, Self::Error> {
        match value {
            FlagOrName::Flag(true) => Ok(ContinueStraight::True),
            FlagOrName::Flag(false) => Ok(ContinueStraight::False),
            FlagOrName::Name(name) if name == "default" => Ok(ContinueStraight::Default),
            FlagOrName::Name(name) => Err(unknown_value(
                "continue_straight",
                &name,
                "'default', true or false",
            )),
        }
    }
}

impl From<ContinueStraight> for FlagOrName {
    fn from(value: ContinueStraight) -> Self {
        match value {
            ContinueStraight::Default => FlagOrName::Name("default".to_string()),
            ContinueStraight::True => FlagOrName::Flag(true),
            ContinueStraight::False => FlagOrName::Flag(false),
        }
    }
}

/// Per-segment metadata attached to each route leg.
///
/// `false` disables annotations and `true` requests all of them; the named
/// variants request a single kind.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(try_from = "FlagOrName", into = "FlagOrName")]
pub enum Annotations {
    #[default]
    None,
    All,
    Nodes,
    Distance,
    Duration,
    Datasources,
    Weight,
    Speed,
}

impl Annotations {
    const NAMED: [(&'static str, Annotations); 6] = [
        ("nodes", Annotations::Nodes),
        ("distance", Annotations::Distance),
        ("duration", Annotations::Duration),
        ("datasources", Annotations::Datasources),
        ("weight", Annotations::Weight),
        ("speed", Annotations::Speed),
    ];
}

impl TryFrom<FlagOrName> for Annotations {
    type Error = String;

    fn try_from(value: FlagOrName) -> std::result::Result<Self, Self::Error> {
        match value {
            FlagOrName::Flag(false) => Ok(Annotations::None),
            FlagOrName::Flag(true) => Ok(Annotations::All),
            FlagOrName::Name(name) => Annotations::NAMED
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, a)| *a)
                .ok_or_else(|| {
                    unknown_value(
                        "annotations",
                        &name,
                        "a boolean or one of 'nodes', 'distance', 'duration', \
                         'datasources', 'weight', 'speed'",
                    )
                }),
        }
    }
}

impl From<Annotations> for FlagOrName {
    fn from(value: Annotations) -> Self {
        match value {
            Annotations::None => FlagOrName::Flag(false),
            Annotations::All => FlagOrName::Flag(true),
            named => Annotations::NAMED
                .iter()
                .find(|(_, a)| *a == named)
                .map(|(n, _)| FlagOrName::Name((*n).to_string()))
                .unwrap_or(FlagOrName::Flag(true)),
        }
    }
}

/// A `(bearing, range)` pair in degrees, restricting which road segments a
/// waypoint may snap to. Serialized as a two-element array.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "(i16, i16)", into = "(i16, i16)")]
pub struct Bearing {
    pub bearing: i16,
    pub range: i16,
}

impl Bearing {
    pub fn new(bearing: i16, range: i16) -> Self {
        Self { bearing, range }
    }
}

impl From<(i16, i16)> for Bearing {
    fn from((bearing, range): (i16, i16)) -> Self {
        Self { bearing, range }
    }
}

impl From<Bearing> for (i16, i16) {
    fn from(b: Bearing) -> Self {
        (b.bearing, b.range)
    }
}

//==================================================================================
// II. RouteOptions
//==================================================================================

/// Every option recognized by a route request, with its default.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RouteOptions {
    /// One `(bearing, range)` per coordinate, or empty.
    pub bearings: Vec<Bearing>,
    /// One snapping radius in meters per coordinate, or empty.
    pub radiuses: Vec<f64>,
    /// Whether the response should include hints for later requests.
    pub generate_hints: bool,
    /// Base64 hints from an earlier response, one per coordinate, or empty.
    pub hints: Vec<String>,
    pub alternatives: bool,
    pub steps: bool,
    pub annotations: Annotations,
    pub geometries: Geometries,
    pub overview: Overview,
    pub continue_straight: ContinueStraight,
}

impl RouteOptions {
    /// Checks per-coordinate option lists against the request size and the
    /// numeric ranges the engine accepts.
    pub fn validate(&self, coordinates: usize) -> Result<()> {
        const OP: &str = "RouteOptions::validate";

        let per_coordinate = [
            ("bearings", self.bearings.len()),
            ("radiuses", self.radiuses.len()),
            ("hints", self.hints.len()),
        ];
        for (name, len) in per_coordinate {
            if len != 0 && len != coordinates {
                return Err(OsrmError::invalid_request(
                    OP,
                    format!(
                        "'{}' has {} entries but the request has {} coordinates",
                        name, len, coordinates
                    ),
                ));
            }
        }

        if let Some(b) = self
            .bearings
            .iter()
            .find(|b| !(0..=360).contains(&b.bearing) || !(0..=180).contains(&b.range))
        {
            return Err(OsrmError::invalid_request(
                OP,
                format!(
                    "bearing ({}, {}) outside 0..=360 / 0..=180",
                    b.bearing, b.range
                ),
            ));
        }

        if let Some(r) = self.radiuses.iter().find(|r| !r.is_finite() || **r < 0.0) {
            return Err(OsrmError::invalid_request(
                OP,
                format!("radius {} must be a finite, non-negative number", r),
            ));
        }

        Ok(())
    }

    /// Marshals the full option set into the JSON document the native
    /// `osrmc_route` call consumes.
    pub fn to_native_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

//==================================================================================
// III. Library Location
//==================================================================================

/// Where to find the shared `libosrmc` library and how strictly to check it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LibraryConfig {
    /// Path or bare file name handed to the dynamic loader.
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,

    /// If true, refuse to use a library whose major ABI version differs.
    #[serde(default = "default_true")]
    pub require_abi_compatible: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            require_abi_compatible: true,
        }
    }
}

impl LibraryConfig {
    /// Default config, with `library_path` overridden by `OSRMC_LIBRARY` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(LIBRARY_PATH_ENV).filter(|p| !p.is_empty()) {
            config.library_path = PathBuf::from(path);
        }
        config
    }
}

/// Platform file name of the library, e.g. `libosrmc.so`.
fn default_library_path() -> PathBuf {
    PathBuf::from(libloading::library_filename("osrmc"))
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}
