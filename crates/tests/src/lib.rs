/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod scenarios;

#[cfg(test)]
mod fixtures {
    use chrono::{Duration, TimeZone, Utc};
    use geofence_engine::common::types::*;

    pub const SAMPLE_GEOFENCES: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../geo_config/sample_geofences.geojson"
    );

    pub const DEV_CONFIG: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../dhall-configs/dev/geofence_engine.dhall"
    );

    pub fn report(
        vehicle: &str,
        lat: f64,
        lon: f64,
        speed: Option<f64>,
        seconds: i64,
    ) -> PositionReport {
        PositionReport {
            vehicle_id: VehicleId(vehicle.to_string()),
            latitude: Latitude(lat),
            longitude: Longitude(lon),
            speed: speed.map(SpeedInKmph),
            timestamp: TimeStamp(
                Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap() + Duration::seconds(seconds),
            ),
        }
    }

    pub fn thresholds() -> IdleThresholds {
        IdleThresholds {
            speed: SpeedInKmph(1.0),
            duration: Seconds(300),
        }
    }

    pub fn circle(id: &str, kind: AreaKind, lat: f64, lon: f64, radius: f64) -> Geofence {
        Geofence {
            id: GeofenceId(id.to_string()),
            name: id.to_string(),
            kind,
            shape: Shape::Circle {
                center: Point::new(lat, lon),
                radius: Meters(radius),
            },
            buffer: Meters(0.0),
            is_active: true,
        }
    }
}
