/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::tools::error::{AppError, ErrorCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[macros::impl_getter]
pub struct VehicleId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
#[macros::impl_getter]
pub struct GeofenceId(pub String);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
#[macros::impl_getter]
pub struct Latitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
#[macros::impl_getter]
pub struct Longitude(pub f64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
#[macros::impl_getter]
pub struct TimeStamp(pub DateTime<Utc>);
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, PartialOrd, Copy, Default)]
#[macros::impl_getter]
pub struct Meters(pub f64);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Copy)]
#[macros::impl_getter]
pub struct Seconds(pub u32);

/// Ground speed as reported by the device, in km/h.
#[derive(Serialize, Clone, Debug, PartialEq, PartialOrd, Copy)]
#[macros::impl_getter]
pub struct SpeedInKmph(pub f64);
impl<'de> Deserialize<'de> for SpeedInKmph {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{Error, Unexpected};

        struct SpeedVisitor;

        #[allow(clippy::needless_lifetimes)]
        impl<'de> serde::de::Visitor<'de> for SpeedVisitor {
            type Value = SpeedInKmph;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str(
                    "a number (integer/float) or a string containing a floating-point number",
                )
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(SpeedInKmph(value))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
                Ok(SpeedInKmph(v as f64))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
                Ok(SpeedInKmph(v as f64))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                value
                    .trim()
                    .parse::<f64>()
                    .map(SpeedInKmph)
                    .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_any(SpeedVisitor)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub lat: Latitude,
    pub lon: Longitude,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Point {
            lat: Latitude(lat),
            lon: Longitude(lon),
        }
    }

    pub fn is_valid(&self) -> bool {
        let Latitude(lat) = self.lat;
        let Longitude(lon) = self.lon;
        lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
    }
}

/// Governs whether entering a geofence raises an alert.
#[derive(
    Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaKind {
    #[serde(alias = "entrance")]
    Entrance,
    #[serde(alias = "alert")]
    Alert,
    #[serde(alias = "critical")]
    Critical,
    #[serde(alias = "checkpoint")]
    Checkpoint,
}

impl AreaKind {
    pub fn raises_entry_alert(&self) -> bool {
        matches!(self, AreaKind::Alert | AreaKind::Critical)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Circle {
        center: Point,
        radius: Meters,
    },
    Rectangle {
        north: Latitude,
        south: Latitude,
        east: Longitude,
        west: Longitude,
    },
    Polygon {
        vertices: Vec<Point>,
    },
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Geofence {
    pub id: GeofenceId,
    pub name: String,
    pub kind: AreaKind,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default)]
    pub buffer: Meters,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionKind {
    Entered,
    Exited,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TransitionEvent {
    pub vehicle_id: VehicleId,
    pub geofence_id: GeofenceId,
    pub geofence_name: String,
    pub area_kind: AreaKind,
    pub kind: TransitionKind,
    pub location: Point,
    pub timestamp: TimeStamp,
}

#[derive(Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub enum AlertKind {
    #[strum(serialize = "area_violation_alert")]
    #[serde(rename = "area_violation_alert")]
    AreaViolationAlert,
    #[strum(serialize = "area_violation_critical")]
    #[serde(rename = "area_violation_critical")]
    AreaViolationCritical,
    #[strum(serialize = "idle_timeout")]
    #[serde(rename = "idle_timeout")]
    IdleTimeout,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AlertRequest {
    pub vehicle_id: VehicleId,
    pub geofence_id: Option<GeofenceId>,
    pub alert_kind: AlertKind,
    pub message: String,
    pub location: Point,
    pub timestamp: TimeStamp,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct IdleThresholds {
    pub speed: SpeedInKmph,
    pub duration: Seconds,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct IdleResult {
    pub is_idle: bool,
    pub just_crossed_threshold: bool,
    pub idle_duration_seconds: f64,
}

/// One position report as sent by a device.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PositionReport {
    pub vehicle_id: VehicleId,
    pub latitude: Latitude,
    pub longitude: Longitude,
    #[serde(default)]
    pub speed: Option<SpeedInKmph>,
    pub timestamp: TimeStamp,
}

impl PositionReport {
    pub fn location(&self) -> Point {
        Point {
            lat: self.latitude,
            lon: self.longitude,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DataQualityIssue {
    pub category: ErrorCategory,
    pub code: String,
    pub message: String,
    pub geofence_id: Option<GeofenceId>,
}

impl DataQualityIssue {
    pub fn new(error: &AppError, geofence_id: Option<GeofenceId>) -> Self {
        DataQualityIssue {
            category: error.category(),
            code: error.code(),
            message: error.message(),
            geofence_id,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EvaluationResult {
    pub alerts: Vec<AlertRequest>,
    pub transitions: Vec<TransitionEvent>,
    pub is_idle: bool,
    pub idle_duration_seconds: f64,
    pub data_quality: Vec<DataQualityIssue>,
}
