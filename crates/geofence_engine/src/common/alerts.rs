/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::detection::DetectionContext;
use crate::common::types::*;

fn area_violation_kind(area_kind: AreaKind) -> Option<AlertKind> {
    match area_kind {
        AreaKind::Alert => Some(AlertKind::AreaViolationAlert),
        AreaKind::Critical => Some(AlertKind::AreaViolationCritical),
        AreaKind::Entrance | AreaKind::Checkpoint => None,
    }
}

/// Turns one report's transitions and idle result into alert requests.
///
/// Entries into ALERT or CRITICAL areas raise one alert each, in transition order; an idle
/// threshold crossing raises one more at the end. Nothing else alerts.
pub fn dispatch(
    transitions: &[TransitionEvent],
    idle: &IdleResult,
    context: &DetectionContext,
) -> Vec<AlertRequest> {
    let mut alerts: Vec<AlertRequest> = transitions
        .iter()
        .filter(|transition| transition.kind == TransitionKind::Entered)
        .filter_map(|transition| {
            area_violation_kind(transition.area_kind).map(|alert_kind| AlertRequest {
                vehicle_id: context.vehicle_id.to_owned(),
                geofence_id: Some(transition.geofence_id.to_owned()),
                alert_kind,
                message: format!(
                    "Vehicle entered {} area: {}",
                    transition.area_kind.to_string().to_lowercase(),
                    transition.geofence_name
                ),
                location: context.location,
                timestamp: context.timestamp,
            })
        })
        .collect();

    if idle.just_crossed_threshold {
        alerts.push(AlertRequest {
            vehicle_id: context.vehicle_id.to_owned(),
            geofence_id: None,
            alert_kind: AlertKind::IdleTimeout,
            message: format!(
                "Vehicle has been idle for {} seconds",
                idle.idle_duration_seconds.round() as i64
            ),
            location: context.location,
            timestamp: context.timestamp,
        });
    }

    alerts
}
