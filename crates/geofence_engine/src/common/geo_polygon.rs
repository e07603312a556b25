/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::*;
use crate::tools::error::AppError;
use geo::{coord, BoundingRect, Coord, LineString};
use geojson::{feature::Id, Feature, GeoJson, Position, Value};
use rustc_hash::FxHashSet;
use serde_json::Value as JsonValue;
use std::fs;
use std::str::FromStr;
use tracing::{info, warn};

/// Loads geofence definitions from a GeoJSON FeatureCollection on disk.
///
/// Features that cannot be mapped to a geofence are logged and skipped; shape invariants
/// (radius, bounds, vertex count) are left to evaluation time.
pub fn read_geofences(config_path: &str, default_buffer: Meters) -> Result<Vec<Geofence>, AppError> {
    let contents = fs::read_to_string(config_path).map_err(|err| {
        AppError::InvalidConfiguration(format!("Failed to read {config_path} : {err}"))
    })?;
    let geofences = parse_geofences(&contents, default_buffer)?;
    info!(
        tag = "[Geofences Loaded]",
        path = %config_path,
        count = geofences.len()
    );
    Ok(geofences)
}

pub fn parse_geofences(geojson_str: &str, default_buffer: Meters) -> Result<Vec<Geofence>, AppError> {
    let geojson = GeoJson::from_str(geojson_str)
        .map_err(|err| AppError::GeoJsonParseError(err.to_string()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(AppError::GeoJsonParseError(
                "Expected a FeatureCollection, found a bare Geometry".to_string(),
            ))
        }
    };

    let mut seen: FxHashSet<GeofenceId> = FxHashSet::default();
    Ok(features
        .iter()
        .enumerate()
        .filter_map(|(idx, feature)| {
            let geofence = to_geofence(feature, default_buffer).and_then(|geofence| {
                if seen.insert(geofence.id.to_owned()) {
                    Ok(geofence)
                } else {
                    Err(AppError::DuplicateGeofenceId(geofence.id.0))
                }
            });
            match geofence {
                Ok(geofence) => Some(geofence),
                Err(err) => {
                    warn!(tag = "[Feature Skipped]", index = idx, error = %err.message());
                    None
                }
            }
        })
        .collect())
}

fn to_geofence(feature: &Feature, default_buffer: Meters) -> Result<Geofence, AppError> {
    let id = match (string_property(feature, "id"), &feature.id) {
        (Some(id), _) => id,
        (None, Some(Id::String(id))) => id.to_owned(),
        (None, Some(Id::Number(id))) => id.to_string(),
        (None, None) => return Err(malformed("missing id")),
    };
    let name = string_property(feature, "name").unwrap_or_else(|| id.to_owned());
    let kind = string_property(feature, "kind")
        .ok_or_else(|| malformed("missing kind"))
        .and_then(|kind| {
            AreaKind::from_str(&kind).map_err(|_| malformed(&format!("unknown kind {kind}")))
        })?;
    let buffer = match feature.property("buffer_distance") {
        Some(value) => Meters(number(value).ok_or_else(|| malformed("buffer_distance"))?),
        None => default_buffer,
    };
    let is_active = feature
        .property("is_active")
        .and_then(JsonValue::as_bool)
        .unwrap_or(true);

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| malformed("missing geometry"))?;
    let shape = match &geometry.value {
        Value::Point(position) => {
            let radius = feature
                .property("radius")
                .and_then(number)
                .ok_or_else(|| malformed("point feature without radius"))?;
            Shape::Circle {
                center: to_point(position)?,
                radius: Meters(radius),
            }
        }
        Value::Polygon(rings) => {
            let exterior = rings
                .first()
                .ok_or_else(|| malformed("polygon without rings"))?;
            if string_property(feature, "shape").as_deref() == Some("rectangle") {
                to_rectangle(exterior)?
            } else {
                Shape::Polygon {
                    vertices: exterior.iter().map(to_point).collect::<Result<_, _>>()?,
                }
            }
        }
        _ => return Err(malformed("unsupported geometry type")),
    };

    Ok(Geofence {
        id: GeofenceId(id),
        name,
        kind,
        shape,
        buffer,
        is_active,
    })
}

fn to_rectangle(exterior: &[Position]) -> Result<Shape, AppError> {
    let line_string = LineString::new(
        exterior
            .iter()
            .map(to_coord)
            .collect::<Result<Vec<Coord<f64>>, AppError>>()?,
    );
    let rect = line_string
        .bounding_rect()
        .ok_or_else(|| malformed("empty rectangle ring"))?;
    Ok(Shape::Rectangle {
        north: Latitude(rect.max().y),
        south: Latitude(rect.min().y),
        east: Longitude(rect.max().x),
        west: Longitude(rect.min().x),
    })
}

// GeoJSON positions are [lon, lat].
fn to_coord(position: &Position) -> Result<Coord<f64>, AppError> {
    match position.as_slice() {
        [lon, lat, ..] => Ok(coord! { x: *lon, y: *lat }),
        _ => Err(malformed("position needs two coordinates")),
    }
}

fn to_point(position: &Position) -> Result<Point, AppError> {
    to_coord(position).map(|coord| Point::new(coord.y, coord.x))
}

fn string_property(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        JsonValue::String(value) => Some(value.to_owned()),
        JsonValue::Number(value) => Some(value.to_string()),
        _ => None,
    }
}

fn number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(number) => number.trim().parse().ok(),
        _ => None,
    }
}

fn malformed(reason: &str) -> AppError {
    AppError::GeoJsonParseError(reason.to_string())
}
