/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// How a failure is handled by the evaluation path.
#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, Eq, Hash, PartialEq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Bad input data; the offending geofence or value is skipped or clamped.
    DataQuality,
    /// A shape that breaks a structural invariant reached the predicates; skipped.
    InvariantViolation,
    /// Configuration or file loading outside the evaluation path.
    Setup,
}

#[macros::add_error]
pub enum AppError {
    InternalError(String),
    InvalidConfiguration(String),
    GeoJsonParseError(String),
    SerializationError(String),
    DeserializationError(String),
    InvalidRadius(f64),
    InvalidBounds(f64, f64, f64, f64),
    InvalidBuffer(f64),
    DegeneratePolygon(usize),
    InvalidGeofenceCoordinate(f64, f64),
    DuplicateGeofenceId(String),
    CoordinateOutOfRange(f64, f64),
    NonMonotonicTimestamp(String, i64),
    InvalidSpeed(String, f64),
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidConfiguration(err) => format!("Invalid configuration : {err}"),
            AppError::GeoJsonParseError(err) => format!("Failed to parse GeoJSON : {err}"),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::InvalidRadius(radius) => {
                format!("Circle radius must be positive : {radius}")
            }
            AppError::InvalidBounds(north, south, east, west) => {
                format!("Rectangle bounds need north > south and east > west : (N : {north}, S : {south}, E : {east}, W : {west})")
            }
            AppError::InvalidBuffer(buffer) => {
                format!("Buffer distance must be finite and non-negative : {buffer}")
            }
            AppError::DegeneratePolygon(vertices) => {
                format!("Polygon has {vertices} distinct vertices, at least 3 required")
            }
            AppError::InvalidGeofenceCoordinate(lat, lon) => {
                format!("Geofence vertex is out of range : (Lat : {lat}, Lon : {lon})")
            }
            AppError::DuplicateGeofenceId(geofence_id) => {
                format!("Geofence id {geofence_id} is already taken, later definition ignored")
            }
            AppError::CoordinateOutOfRange(lat, lon) => {
                format!("Reported coordinate is out of range : (Lat : {lat}, Lon : {lon})")
            }
            AppError::NonMonotonicTimestamp(vehicle_id, elapsed_ms) => {
                format!("Report for vehicle {vehicle_id} is not newer than the previous one (elapsed {elapsed_ms} ms), elapsed clamped to zero")
            }
            AppError::InvalidSpeed(vehicle_id, speed) => {
                format!("Report for vehicle {vehicle_id} carries an invalid speed : {speed}")
            }
        }
    }

    pub fn code(&self) -> String {
        match self {
            AppError::InternalError(_) => "INTERNAL_ERROR",
            AppError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            AppError::GeoJsonParseError(_) => "GEOJSON_PARSE_ERROR",
            AppError::SerializationError(_) => "SERIALIZATION_ERROR",
            AppError::DeserializationError(_) => "DESERIALIZATION_ERROR",
            AppError::InvalidRadius(_) => "INVALID_RADIUS",
            AppError::InvalidBounds(_, _, _, _) => "INVALID_BOUNDS",
            AppError::InvalidBuffer(_) => "INVALID_BUFFER",
            AppError::DegeneratePolygon(_) => "DEGENERATE_POLYGON",
            AppError::InvalidGeofenceCoordinate(_, _) => "INVALID_GEOFENCE_COORDINATE",
            AppError::DuplicateGeofenceId(_) => "DUPLICATE_GEOFENCE_ID",
            AppError::CoordinateOutOfRange(_, _) => "COORDINATE_OUT_OF_RANGE",
            AppError::NonMonotonicTimestamp(_, _) => "NON_MONOTONIC_TIMESTAMP",
            AppError::InvalidSpeed(_, _) => "INVALID_SPEED",
        }
        .to_string()
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::DegeneratePolygon(_) => ErrorCategory::InvariantViolation,
            AppError::InvalidRadius(_)
            | AppError::InvalidBounds(_, _, _, _)
            | AppError::InvalidBuffer(_)
            | AppError::InvalidGeofenceCoordinate(_, _)
            | AppError::DuplicateGeofenceId(_)
            | AppError::CoordinateOutOfRange(_, _)
            | AppError::NonMonotonicTimestamp(_, _)
            | AppError::InvalidSpeed(_, _) => ErrorCategory::DataQuality,
            AppError::InternalError(_)
            | AppError::InvalidConfiguration(_)
            | AppError::GeoJsonParseError(_)
            | AppError::SerializationError(_)
            | AppError::DeserializationError(_) => ErrorCategory::Setup,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::DeserializationError(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::InternalError(error.to_string())
    }
}
