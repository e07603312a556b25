/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
#![allow(clippy::expect_used)]

use crate::tools::error::AppError;
use once_cell::sync::Lazy;
use prometheus::{
    opts, register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

pub static TOTAL_POSITION_REPORTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "geofence_position_reports_total",
        "Total Position Reports Evaluated"
    )
    .expect("Failed to register total position reports metrics")
});

pub static GEOFENCE_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("geofence_transitions_total", "Geofence Transitions"),
        &["kind", "area_kind"]
    )
    .expect("Failed to register geofence transitions metrics")
});

pub static ALERT_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("geofence_alert_requests_total", "Alert Requests Produced"),
        &["alert_kind"]
    )
    .expect("Failed to register alert requests metrics")
});

pub static DATA_QUALITY_ISSUES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("geofence_data_quality_issues_total", "Data Quality Issues"),
        &["code"]
    )
    .expect("Failed to register data quality issues metrics")
});

pub static EVALUATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        opts!(
            "geofence_evaluation_duration_seconds",
            "Per Report Evaluation Latency"
        )
        .into(),
        &[]
    )
    .expect("Failed to register evaluation duration metrics")
});

/// Observes the time elapsed since `$start` (an `Instant`) on `EVALUATION_DURATION`.
#[macro_export]
macro_rules! evaluation_duration {
    ($start:expr) => {
        let duration = $start.elapsed().as_secs_f64();
        $crate::tools::prometheus::EVALUATION_DURATION
            .with_label_values(&[])
            .observe(duration);
    };
}

/// Renders every registered collector in the Prometheus text exposition format.
pub fn gather_metrics() -> Result<String, AppError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|err| AppError::SerializationError(err.to_string()))?;
    String::from_utf8(buffer).map_err(|err| AppError::SerializationError(err.to_string()))
}
