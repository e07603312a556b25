/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::detection::DetectionContext;
use crate::common::types::*;
use crate::common::utils::elapsed_millis;
use crate::tools::error::AppError;

/// Running idle episode of one vehicle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleIdleState {
    accumulated_seconds: f64,
    alerted: bool,
    last_report: Option<TimeStamp>,
}

impl VehicleIdleState {
    /// Folds one report into the episode.
    ///
    /// Time is measured between report timestamps, never by counting reports. A report that is
    /// not newer than the latest one seen contributes zero seconds and comes back as an error
    /// for the caller to record; the state is still updated.
    ///
    /// # Returns
    ///
    /// * `IdleResult` - idle status after this report; `just_crossed_threshold` is set at most
    ///   once per episode.
    /// * `Option<AppError>` - `NonMonotonicTimestamp` when elapsed time had to be clamped.
    pub fn update(
        &mut self,
        context: &DetectionContext,
        speed: SpeedInKmph,
        thresholds: &IdleThresholds,
    ) -> (IdleResult, Option<AppError>) {
        let mut issue = None;

        let elapsed_seconds = match self.last_report {
            None => 0.0,
            Some(last_report) => {
                let elapsed_ms = elapsed_millis(last_report, context.timestamp);
                if elapsed_ms <= 0 {
                    issue = Some(AppError::NonMonotonicTimestamp(
                        context.vehicle_id.0.to_owned(),
                        elapsed_ms,
                    ));
                    0.0
                } else {
                    elapsed_ms as f64 / 1000.0
                }
            }
        };
        self.last_report = Some(
            self.last_report
                .map_or(context.timestamp, |last_report| last_report.max(context.timestamp)),
        );

        let stationary = speed < thresholds.speed;
        if stationary {
            self.accumulated_seconds += elapsed_seconds;
        } else {
            self.accumulated_seconds = 0.0;
            self.alerted = false;
        }

        // A moving vehicle is never idle, even with a zero duration threshold.
        let is_idle =
            stationary && self.accumulated_seconds >= thresholds.duration.inner() as f64;
        let just_crossed_threshold = is_idle && !self.alerted;
        if just_crossed_threshold {
            self.alerted = true;
        }

        (
            IdleResult {
                is_idle,
                just_crossed_threshold,
                idle_duration_seconds: self.accumulated_seconds,
            },
            issue,
        )
    }

    /// Ends the current episode without touching the report clock.
    pub fn reset(&mut self, timestamp: TimeStamp) {
        self.accumulated_seconds = 0.0;
        self.alerted = false;
        self.last_report = Some(
            self.last_report
                .map_or(timestamp, |last_report| last_report.max(timestamp)),
        );
    }

    pub fn accumulated_seconds(&self) -> f64 {
        self.accumulated_seconds
    }
}
