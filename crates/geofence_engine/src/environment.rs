/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::{
    common::{geo_polygon::read_geofences, types::*},
    engine::GeofenceEngine,
    tools::{error::AppError, logger::LoggerConfig},
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub logger_cfg: LoggerConfig,
    pub geofence_config: String,
    pub idle_speed_threshold: f64,
    pub idle_duration_threshold: u32,
    pub default_buffer_meters: f64,
    pub dump_metrics: bool,
}

pub fn read_dhall_config(config_path: &str) -> Result<AppConfig, AppError> {
    serde_dhall::from_file(config_path)
        .parse::<AppConfig>()
        .map_err(|err| AppError::InvalidConfiguration(format!("Error reading config: {err}")))
}

pub struct AppState {
    pub engine: GeofenceEngine,
    pub thresholds: IdleThresholds,
    pub dump_metrics: bool,
}

impl AppState {
    pub fn new(app_config: AppConfig) -> Result<AppState, AppError> {
        if !app_config.idle_speed_threshold.is_finite() || app_config.idle_speed_threshold < 0.0 {
            return Err(AppError::InvalidConfiguration(format!(
                "idle_speed_threshold must be a non-negative number : {}",
                app_config.idle_speed_threshold
            )));
        }

        let geofences = read_geofences(
            &app_config.geofence_config,
            Meters(app_config.default_buffer_meters),
        )?;

        let thresholds = IdleThresholds {
            speed: SpeedInKmph(app_config.idle_speed_threshold),
            duration: Seconds(app_config.idle_duration_threshold),
        };

        info!(
            tag = "[App State]",
            geofences = geofences.len(),
            idle_speed_threshold = app_config.idle_speed_threshold,
            idle_duration_threshold = app_config.idle_duration_threshold
        );

        Ok(AppState {
            engine: GeofenceEngine::new(geofences),
            thresholds,
            dump_metrics: app_config.dump_metrics,
        })
    }
}
