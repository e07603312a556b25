/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::fixtures::*;
use geofence_engine::{
    common::{geo_polygon::read_geofences, types::*},
    engine::GeofenceEngine,
    environment::{read_dhall_config, AppState},
    tools::logger::LogLevel,
};

fn sample_engine() -> GeofenceEngine {
    let geofences = read_geofences(SAMPLE_GEOFENCES, Meters(0.0)).expect("sample geofences");
    GeofenceEngine::new(geofences)
}

#[test]
fn sample_geofences_load_into_ordered_snapshot() {
    let engine = sample_engine();
    let snapshot = engine.registry().snapshot();
    let ids: Vec<&str> = snapshot
        .active_geofences()
        .iter()
        .map(|geofence| geofence.id.0.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "asok-checkpoint",
            "democracy-monument",
            "grand-palace",
            "lumphini-depot"
        ]
    );
    assert!(snapshot
        .active_geofences()
        .iter()
        .all(|geofence| geofence.validate().is_ok()));
}

#[test]
fn city_trip_raises_area_and_idle_alerts_once() {
    let engine = sample_engine();
    let limits = thresholds();
    let mut results = vec![
        engine.evaluate(&report("bkk-101", 13.7000, 100.4000, Some(40.0), 0), &limits),
        engine.evaluate(&report("bkk-101", 13.7563, 100.5018, Some(35.0), 30), &limits),
        engine.evaluate(&report("bkk-101", 13.7500, 100.4913, Some(20.0), 60), &limits),
    ];
    // Parked at the depot for six minutes, then drives off.
    for seconds in (90..=420).step_by(30) {
        results.push(engine.evaluate(
            &report("bkk-101", 13.7350, 100.5375, Some(0.0), seconds),
            &limits,
        ));
    }
    results.push(engine.evaluate(
        &report("bkk-101", 13.7350, 100.5375, Some(30.0), 450),
        &limits,
    ));

    let transitions: Vec<(String, TransitionKind)> = results
        .iter()
        .flat_map(|result| result.transitions.iter())
        .map(|transition| (transition.geofence_id.0.to_owned(), transition.kind))
        .collect();
    assert_eq!(
        transitions,
        vec![
            ("democracy-monument".to_string(), TransitionKind::Entered),
            ("democracy-monument".to_string(), TransitionKind::Exited),
            ("grand-palace".to_string(), TransitionKind::Entered),
            ("grand-palace".to_string(), TransitionKind::Exited),
            ("lumphini-depot".to_string(), TransitionKind::Entered),
        ]
    );

    let alerts: Vec<&AlertRequest> = results
        .iter()
        .flat_map(|result| result.alerts.iter())
        .collect();
    assert_eq!(alerts.len(), 3);
    assert_eq!(alerts[0].alert_kind, AlertKind::AreaViolationAlert);
    assert_eq!(
        alerts[0].message,
        "Vehicle entered alert area: Democracy Monument"
    );
    assert_eq!(alerts[1].alert_kind, AlertKind::AreaViolationCritical);
    assert_eq!(alerts[2].alert_kind, AlertKind::IdleTimeout);
    assert_eq!(alerts[2].geofence_id, None);
    assert_eq!(alerts[2].message, "Vehicle has been idle for 300 seconds");

    // 12 parked reports (t=90..420), then moving again.
    let parked = &results[3..15];
    assert!(parked[..9].iter().all(|result| !result.is_idle));
    assert!(parked[9..].iter().all(|result| result.is_idle));
    assert!(!results[15].is_idle);
    assert!(results
        .iter()
        .all(|result| result.data_quality.is_empty()));
}

#[test]
fn concave_checkpoint_tracks_presence_without_alerts() {
    let engine = sample_engine();
    let limits = thresholds();

    let inside = engine.evaluate(&report("bkk-7", 13.7460, 100.5560, Some(20.0), 0), &limits);
    // Inside the notch of the polygon, well beyond its buffer.
    let notch = engine.evaluate(&report("bkk-7", 13.7510, 100.5560, Some(20.0), 30), &limits);

    assert_eq!(inside.transitions.len(), 1);
    assert_eq!(inside.transitions[0].kind, TransitionKind::Entered);
    assert_eq!(inside.transitions[0].area_kind, AreaKind::Checkpoint);
    assert!(inside.alerts.is_empty());
    assert_eq!(notch.transitions.len(), 1);
    assert_eq!(notch.transitions[0].kind, TransitionKind::Exited);
}

#[test]
fn inactive_geofence_is_never_evaluated() {
    let engine = sample_engine();
    let result = engine.evaluate(
        &report("bkk-9", 13.7230, 100.5150, Some(20.0), 0),
        &thresholds(),
    );
    assert!(result.transitions.is_empty());
}

#[test]
fn malformed_geofence_does_not_block_the_rest() {
    let engine = GeofenceEngine::new(vec![
        circle("broken", AreaKind::Critical, 13.7563, 100.5018, 0.0),
        circle("healthy", AreaKind::Alert, 13.7563, 100.5018, 50.0),
    ]);

    let result = engine.evaluate(
        &report("bkk-3", 13.7563, 100.5018, Some(10.0), 0),
        &thresholds(),
    );

    assert_eq!(result.transitions.len(), 1);
    assert_eq!(result.transitions[0].geofence_id, GeofenceId("healthy".to_string()));
    assert_eq!(result.alerts.len(), 1);
    assert_eq!(result.data_quality.len(), 1);
    assert_eq!(result.data_quality[0].code, "INVALID_RADIUS");
    assert_eq!(
        result.data_quality[0].geofence_id,
        Some(GeofenceId("broken".to_string()))
    );
}

#[test]
fn position_reports_parse_from_ndjson_lines() {
    let lines = [
        r#"{"vehicle_id":"v1","latitude":13.75,"longitude":100.5,"speed":"0.5","timestamp":"2024-01-01T00:00:00Z"}"#,
        r#"{"vehicle_id":"v1","latitude":13.75,"longitude":100.5,"speed":12,"timestamp":"2024-01-01T00:00:30Z"}"#,
        r#"{"vehicle_id":"v1","latitude":13.75,"longitude":100.5,"timestamp":"2024-01-01T00:01:00Z"}"#,
    ];
    let reports: Vec<PositionReport> = lines
        .iter()
        .map(|line| serde_json::from_str(line).expect("valid report"))
        .collect();

    assert_eq!(reports[0].speed, Some(SpeedInKmph(0.5)));
    assert_eq!(reports[1].speed, Some(SpeedInKmph(12.0)));
    assert_eq!(reports[2].speed, None);
    assert!(serde_json::from_str::<PositionReport>(r#"{"vehicle_id":"v1"}"#).is_err());
}

#[test]
fn evaluation_result_serializes_with_wire_names() {
    let engine = GeofenceEngine::new(vec![circle(
        "gate",
        AreaKind::Critical,
        13.7563,
        100.5018,
        100.0,
    )]);
    let result = engine.evaluate(
        &report("v2", 13.7563, 100.5018, Some(5.0), 0),
        &thresholds(),
    );
    let json = serde_json::to_value(&result).expect("serializable");

    assert_eq!(json["transitions"][0]["kind"], "ENTERED");
    assert_eq!(json["transitions"][0]["area_kind"], "CRITICAL");
    assert_eq!(json["alerts"][0]["alert_kind"], "area_violation_critical");
    assert_eq!(json["is_idle"], false);
}

#[test]
fn dev_config_builds_app_state() {
    let mut app_config = read_dhall_config(DEV_CONFIG).expect("dev config");
    assert_eq!(app_config.logger_cfg.level, LogLevel::INFO);
    assert_eq!(app_config.idle_duration_threshold, 300);

    app_config.geofence_config = SAMPLE_GEOFENCES.to_string();
    let app_state = AppState::new(app_config).expect("app state");
    assert_eq!(app_state.thresholds, thresholds());
    assert_eq!(app_state.engine.registry().snapshot().len(), 4);

    let mut missing = read_dhall_config(DEV_CONFIG).expect("dev config");
    missing.geofence_config = "/nonexistent/geofences.geojson".to_string();
    assert!(AppState::new(missing).is_err());
}

#[test]
fn repeated_geofence_id_does_not_flap() {
    let engine = GeofenceEngine::new(vec![
        circle("dup", AreaKind::Alert, 13.7563, 100.5018, 100.0),
        circle("dup", AreaKind::Alert, 13.9000, 100.7000, 100.0),
    ]);
    assert_eq!(engine.registry().snapshot().len(), 1);
    assert_eq!(
        engine.registry().snapshot().issues()[0].code,
        "DUPLICATE_GEOFENCE_ID"
    );

    let results: Vec<EvaluationResult> = (0..5)
        .map(|step| {
            engine.evaluate(
                &report("bkk-dup", 13.7563, 100.5018, Some(0.0), step * 30),
                &IdleThresholds {
                    speed: SpeedInKmph(1.0),
                    duration: Seconds(3600),
                },
            )
        })
        .collect();

    let transitions: usize = results.iter().map(|result| result.transitions.len()).sum();
    let alerts: usize = results.iter().map(|result| result.alerts.len()).sum();
    assert_eq!(transitions, 1);
    assert_eq!(alerts, 1);
}

#[test]
fn zero_idle_duration_leaves_moving_vehicle_alone() {
    let engine = GeofenceEngine::new(vec![]);
    let limits = IdleThresholds {
        speed: SpeedInKmph(1.0),
        duration: Seconds(0),
    };
    let results: Vec<EvaluationResult> = (0..5)
        .map(|step| {
            engine.evaluate(
                &report("bkk-fast", 13.7000 + step as f64 * 0.001, 100.4000, Some(60.0), step * 30),
                &limits,
            )
        })
        .collect();
    assert!(results
        .iter()
        .all(|result| !result.is_idle && result.alerts.is_empty()));

    let parked = engine.evaluate(&report("bkk-fast", 13.7050, 100.4000, Some(0.0), 150), &limits);
    assert!(parked.is_idle);
    assert_eq!(parked.alerts.len(), 1);
    assert_eq!(parked.alerts[0].alert_kind, AlertKind::IdleTimeout);
}
