/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::types::*;
use geo::{coord, Coord};
use std::f64::consts::PI;

/// Mean Earth radius, same constant the haversine helpers in the tracking service use.
pub const EARTH_RADIUS_METERS: f64 = 6371000.0;

/// Length of one degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_METERS * PI / 180.0;

/// Slack applied on boundary comparisons so that points built exactly on an edge stay inside
/// despite floating point round-off.
pub const BOUNDARY_TOLERANCE_METERS: f64 = 1e-6;

// Keeps the longitude scale finite at the poles.
const MIN_LONGITUDE_SCALE: f64 = 1e-9;

fn deg2rad(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Signed longitude difference `to - from`, wrapped into [-180, 180).
pub fn longitude_delta(Longitude(from): Longitude, Longitude(to): Longitude) -> f64 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Length in metres of one degree of longitude at the given latitude.
pub fn meters_per_degree_longitude(Latitude(lat): Latitude) -> f64 {
    METERS_PER_DEGREE * deg2rad(lat).cos().max(MIN_LONGITUDE_SCALE)
}

pub fn meters_to_degrees_latitude(Meters(meters): Meters) -> f64 {
    meters / METERS_PER_DEGREE
}

pub fn meters_to_degrees_longitude(Meters(meters): Meters, at: Latitude) -> f64 {
    meters / meters_per_degree_longitude(at)
}

/// Local equirectangular projection of `point` about `origin`.
///
/// Returns east (`x`) and north (`y`) offsets in metres, with the longitude axis scaled by
/// `cos(origin latitude)`. Good to well under a metre over the few kilometres a geofence spans;
/// no geodesic correction is attempted.
pub fn project(origin: &Point, point: &Point) -> Coord<f64> {
    let x = longitude_delta(origin.lon, point.lon) * meters_per_degree_longitude(origin.lat);
    let y = (point.lat.inner() - origin.lat.inner()) * METERS_PER_DEGREE;
    coord! { x: x, y: y }
}

/// Inverse of [`project`]: the point lying `offset` metres east/north of `origin`.
pub fn unproject(origin: &Point, offset: Coord<f64>) -> Point {
    let lat = origin.lat.inner() + offset.y / METERS_PER_DEGREE;
    let lon = origin.lon.inner() + offset.x / meters_per_degree_longitude(origin.lat);
    Point::new(lat, lon)
}

pub fn elapsed_millis(TimeStamp(from): TimeStamp, TimeStamp(to): TimeStamp) -> i64 {
    (to - from).num_milliseconds()
}
