/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use geofence_engine::{
    common::types::PositionReport,
    environment::{read_dhall_config, AppState},
    tools::{
        error::AppError,
        logger::*,
        prometheus::gather_metrics,
    },
};
use std::{
    env::var,
    io::{self, BufRead, BufWriter, Write},
};

fn main() -> Result<(), AppError> {
    let dhall_config_path = var("GEOFENCE_ENGINE_CONFIG")
        .unwrap_or_else(|_| "./dhall-configs/dev/geofence_engine.dhall".to_string());
    let app_config = read_dhall_config(&dhall_config_path)?;

    let _guard = setup_tracing(&app_config.logger_cfg)?;

    let app_state = AppState::new(app_config)?;

    let stdin = io::stdin();
    let mut stdout = BufWriter::new(io::stdout().lock());
    let (mut evaluated, mut skipped) = (0usize, 0usize);

    for (line_no, line) in stdin.lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let report = match serde_json::from_str::<PositionReport>(&line) {
            Ok(report) => report,
            Err(err) => {
                warn!(tag = "[Malformed Report]", line = line_no + 1, error = %err);
                skipped += 1;
                continue;
            }
        };

        let result = app_state.engine.evaluate(&report, &app_state.thresholds);
        let output = serde_json::to_string(&result)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        writeln!(stdout, "{output}")?;
        evaluated += 1;
    }
    stdout.flush()?;

    info!(tag = "[Replay Finished]", evaluated, skipped);

    if app_state.dump_metrics {
        eprintln!("{}", gather_metrics()?);
    }

    Ok(())
}
