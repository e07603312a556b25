/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::alerts::dispatch;
use crate::common::detection::{DetectionContext, VehicleState};
use crate::common::registry::GeofenceSnapshot;
use crate::common::types::*;
use crate::tools::error::AppError;
use crate::tools::prometheus::{
    ALERT_REQUESTS, DATA_QUALITY_ISSUES, GEOFENCE_TRANSITIONS, TOTAL_POSITION_REPORTS,
};
use tracing::warn;

/// Runs one position report through presence tracking, idle tracking and alert dispatch.
///
/// Never fails: bad input is clamped or skipped and shows up in `data_quality`.
pub fn evaluate(
    state: &mut VehicleState,
    report: &PositionReport,
    snapshot: &GeofenceSnapshot,
    thresholds: &IdleThresholds,
) -> EvaluationResult {
    let context = DetectionContext::from(report);
    let mut data_quality = Vec::new();

    let transitions = if context.location.is_valid() {
        let (transitions, issues) = state
            .presence
            .update(&context, snapshot.active_geofences());
        data_quality.extend(issues);
        transitions
    } else {
        data_quality.push(DataQualityIssue::new(
            &AppError::CoordinateOutOfRange(
                context.location.lat.inner(),
                context.location.lon.inner(),
            ),
            None,
        ));
        vec![]
    };

    let idle = match report.speed {
        Some(SpeedInKmph(speed)) if speed.is_finite() => {
            let (idle, issue) =
                state
                    .idle
                    .update(&context, SpeedInKmph(speed.max(0.0)), thresholds);
            data_quality.extend(issue.map(|err| DataQualityIssue::new(&err, None)));
            idle
        }
        Some(SpeedInKmph(speed)) => {
            data_quality.push(DataQualityIssue::new(
                &AppError::InvalidSpeed(context.vehicle_id.0.to_owned(), speed),
                None,
            ));
            IdleResult {
                idle_duration_seconds: state.idle.accumulated_seconds(),
                ..IdleResult::default()
            }
        }
        None => {
            state.idle.reset(context.timestamp);
            IdleResult::default()
        }
    };

    let alerts = dispatch(&transitions, &idle, &context);

    record(&context, &transitions, &alerts, &data_quality);

    EvaluationResult {
        alerts,
        transitions,
        is_idle: idle.is_idle,
        idle_duration_seconds: idle.idle_duration_seconds,
        data_quality,
    }
}

fn record(
    context: &DetectionContext,
    transitions: &[TransitionEvent],
    alerts: &[AlertRequest],
    data_quality: &[DataQualityIssue],
) {
    TOTAL_POSITION_REPORTS.inc();
    for transition in transitions {
        GEOFENCE_TRANSITIONS
            .with_label_values(&[
                transition.kind.to_string().as_str(),
                transition.area_kind.to_string().as_str(),
            ])
            .inc();
    }
    for alert in alerts {
        ALERT_REQUESTS
            .with_label_values(&[alert.alert_kind.to_string().as_str()])
            .inc();
    }
    for issue in data_quality {
        DATA_QUALITY_ISSUES
            .with_label_values(&[issue.code.as_str()])
            .inc();
        if issue.geofence_id.is_none() {
            warn!(
                tag = "[Data Quality]",
                vehicle_id = %context.vehicle_id.0,
                code = %issue.code,
                message = %issue.message
            );
        }
    }
}
