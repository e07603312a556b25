/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

//! Point-in-shape predicates shared by every consumer of geofence geometry.
//!
//! All shapes are closed regions: a point on the boundary is inside. Buffers grow the shape
//! outward by a distance in metres before the test.

use crate::common::types::*;
use crate::common::utils::{
    meters_to_degrees_latitude, meters_to_degrees_longitude, project, BOUNDARY_TOLERANCE_METERS,
};
use crate::tools::error::AppError;
use geo::{coord, Coord, EuclideanDistance, Line};

/// Decides whether `point` lies inside `shape` grown by `buffer`.
///
/// # Errors
///
/// Returns the invariant the shape (or buffer) breaks; callers skip the shape for this report.
pub fn contains(point: &Point, shape: &Shape, buffer: Meters) -> Result<bool, AppError> {
    check_buffer(buffer)?;
    match shape {
        Shape::Circle { center, radius } => circle_contains(point, center, *radius, buffer),
        Shape::Rectangle {
            north,
            south,
            east,
            west,
        } => rectangle_contains(point, *north, *south, *east, *west, buffer),
        Shape::Polygon { vertices } => polygon_contains(point, vertices, buffer),
    }
}

/// Checks the structural invariants of a shape without evaluating any point.
pub fn validate_shape(shape: &Shape) -> Result<(), AppError> {
    match shape {
        Shape::Circle { center, radius } => check_circle(center, *radius),
        Shape::Rectangle {
            north,
            south,
            east,
            west,
        } => check_rectangle(*north, *south, *east, *west),
        Shape::Polygon { vertices } => polygon_ring(vertices).map(|_| ()),
    }
}

impl Geofence {
    pub fn validate(&self) -> Result<(), AppError> {
        check_buffer(self.buffer)?;
        validate_shape(&self.shape)
    }

    pub fn contains(&self, point: &Point) -> Result<bool, AppError> {
        contains(point, &self.shape, self.buffer)
    }
}

fn check_buffer(Meters(buffer): Meters) -> Result<(), AppError> {
    if buffer.is_finite() && buffer >= 0.0 {
        Ok(())
    } else {
        Err(AppError::InvalidBuffer(buffer))
    }
}

fn check_vertex(point: &Point) -> Result<(), AppError> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(AppError::InvalidGeofenceCoordinate(
            point.lat.inner(),
            point.lon.inner(),
        ))
    }
}

fn check_circle(center: &Point, Meters(radius): Meters) -> Result<(), AppError> {
    check_vertex(center)?;
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(AppError::InvalidRadius(radius))
    }
}

fn check_rectangle(
    north: Latitude,
    south: Latitude,
    east: Longitude,
    west: Longitude,
) -> Result<(), AppError> {
    check_vertex(&Point {
        lat: north,
        lon: east,
    })?;
    check_vertex(&Point {
        lat: south,
        lon: west,
    })?;
    if north > south && east > west {
        Ok(())
    } else {
        Err(AppError::InvalidBounds(
            north.inner(),
            south.inner(),
            east.inner(),
            west.inner(),
        ))
    }
}

fn circle_contains(
    point: &Point,
    center: &Point,
    radius: Meters,
    buffer: Meters,
) -> Result<bool, AppError> {
    check_circle(center, radius)?;
    let offset = project(center, point);
    let distance = offset.x.hypot(offset.y);
    Ok(distance <= radius.inner() + buffer.inner() + BOUNDARY_TOLERANCE_METERS)
}

fn rectangle_contains(
    point: &Point,
    north: Latitude,
    south: Latitude,
    east: Longitude,
    west: Longitude,
    buffer: Meters,
) -> Result<bool, AppError> {
    check_rectangle(north, south, east, west)?;

    // Buffer degrees are taken at the rectangle's mid latitude so the expansion does not depend
    // on where the tested point sits.
    let mid_latitude = Latitude((north.inner() + south.inner()) / 2.0);
    let buffer_lat = meters_to_degrees_latitude(buffer);
    let buffer_lon = meters_to_degrees_longitude(buffer, mid_latitude);

    let Latitude(lat) = point.lat;
    let Longitude(lon) = point.lon;

    Ok(south.inner() - buffer_lat <= lat
        && lat <= north.inner() + buffer_lat
        && west.inner() - buffer_lon <= lon
        && lon <= east.inner() + buffer_lon)
}

/// Normalises a vertex ring: drops consecutive duplicates and an explicit closing vertex, then
/// checks that at least three distinct vertices remain.
fn polygon_ring(vertices: &[Point]) -> Result<Vec<Point>, AppError> {
    for vertex in vertices {
        check_vertex(vertex)?;
    }

    let mut ring = vertices.to_vec();
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }

    if ring.len() < 3 {
        return Err(AppError::DegeneratePolygon(ring.len()));
    }
    Ok(ring)
}

/// Even-odd ray casting with a nearest-edge buffer.
///
/// The ring is projected into metres around the tested point, which then sits at the origin.
/// A point whose distance to the nearest edge is within `buffer` counts as inside; with a zero
/// buffer this is exactly the on-boundary case. Otherwise a ray is cast toward increasing
/// longitude and edge crossings are counted.
fn polygon_contains(point: &Point, vertices: &[Point], buffer: Meters) -> Result<bool, AppError> {
    let ring = polygon_ring(vertices)?;
    let projected: Vec<Coord<f64>> = ring.iter().map(|vertex| project(point, vertex)).collect();

    let origin = geo::Point::from(coord! { x: 0.0, y: 0.0 });
    let nearest_edge = ring_edges(&projected)
        .map(|edge| origin.euclidean_distance(&edge))
        .fold(f64::INFINITY, f64::min);

    if nearest_edge <= buffer.inner() + BOUNDARY_TOLERANCE_METERS {
        return Ok(true);
    }

    Ok(ray_crossings_are_odd(&projected))
}

fn ring_edges(ring: &[Coord<f64>]) -> impl Iterator<Item = Line<f64>> + '_ {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(start, end)| Line::new(*start, *end))
}

fn ray_crossings_are_odd(ring: &[Coord<f64>]) -> bool {
    ring_edges(ring).fold(false, |inside, Line { start, end }| {
        // Half-open rule on y so a vertex lying exactly on the ray is counted once.
        if (start.y > 0.0) != (end.y > 0.0) {
            let x_crossing = start.x + (0.0 - start.y) * (end.x - start.x) / (end.y - start.y);
            if x_crossing > 0.0 {
                return !inside;
            }
        }
        inside
    })
}
