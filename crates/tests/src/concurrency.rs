/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::fixtures::*;
use futures::future::join_all;
use geofence_engine::{common::types::*, engine::GeofenceEngine};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const ZONE_LAT: f64 = 13.7563;
const ZONE_LON: f64 = 100.5018;

fn zone_engine() -> Arc<GeofenceEngine> {
    Arc::new(GeofenceEngine::new(vec![circle(
        "zone",
        AreaKind::Alert,
        ZONE_LAT,
        ZONE_LON,
        150.0,
    )]))
}

/// Each vehicle zig-zags in and out of the zone on its own blocking task.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn vehicles_evaluate_independently_in_parallel() {
    let engine = zone_engine();
    let vehicles = 64;
    let laps = 10;

    let handles = (0..vehicles).map(|vehicle| {
        let engine = engine.to_owned();
        tokio::task::spawn_blocking(move || {
            let vehicle_id = format!("veh-{vehicle}");
            (0..laps * 2)
                .map(|step| {
                    let lat = if step % 2 == 0 { ZONE_LAT } else { 13.9000 };
                    engine.evaluate(
                        &report(&vehicle_id, lat, ZONE_LON, Some(30.0), step as i64 * 10),
                        &thresholds(),
                    )
                })
                .collect::<Vec<EvaluationResult>>()
        })
    });

    let per_vehicle: Vec<Vec<EvaluationResult>> = join_all(handles)
        .await
        .into_iter()
        .map(|handle| handle.expect("Spawn block failure"))
        .collect();

    for results in &per_vehicle {
        let entered = results
            .iter()
            .flat_map(|result| result.transitions.iter())
            .filter(|transition| transition.kind == TransitionKind::Entered)
            .count();
        let alerts: usize = results.iter().map(|result| result.alerts.len()).sum();
        assert_eq!(entered, laps);
        assert_eq!(alerts, laps);
    }
    assert_eq!(engine.tracked_vehicles().len(), vehicles);
    // Every vehicle finished outside.
    assert!(engine.occupancy().is_empty());
}

/// Many tasks race on a single vehicle; the per-vehicle lock keeps the diff consistent.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_vehicle_reports_are_serialized() {
    let engine = zone_engine();

    let handles = (0..32).map(|_| {
        let engine = engine.to_owned();
        tokio::task::spawn_blocking(move || {
            engine.evaluate(
                &report("shared", ZONE_LAT, ZONE_LON, Some(30.0), 0),
                &thresholds(),
            )
        })
    });

    let results: Vec<EvaluationResult> = join_all(handles)
        .await
        .into_iter()
        .map(|handle| handle.expect("Spawn block failure"))
        .collect();

    let entered: usize = results.iter().map(|result| result.transitions.len()).sum();
    let alerts: usize = results.iter().map(|result| result.alerts.len()).sum();
    assert_eq!(entered, 1);
    assert_eq!(alerts, 1);
    assert_eq!(
        engine.occupancy().get(&GeofenceId("zone".to_string())),
        Some(&1)
    );
}

/// Swapping in an equivalent snapshot mid-stream must not produce spurious transitions.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn registry_swap_during_evaluation_is_seamless() {
    let engine = zone_engine();
    let done = Arc::new(AtomicBool::new(false));

    let swapper = {
        let engine = engine.to_owned();
        let done = done.to_owned();
        tokio::task::spawn_blocking(move || {
            let mut swaps = 0u64;
            while !done.load(Ordering::Relaxed) {
                engine.registry().replace(vec![circle(
                    "zone",
                    AreaKind::Alert,
                    ZONE_LAT,
                    ZONE_LON,
                    150.0,
                )]);
                swaps += 1;
            }
            swaps
        })
    };

    let handles = (0..16).map(|vehicle| {
        let engine = engine.to_owned();
        tokio::task::spawn_blocking(move || {
            let vehicle_id = format!("swap-{vehicle}");
            (0..200)
                .map(|step| {
                    engine
                        .evaluate(
                            &report(&vehicle_id, ZONE_LAT, ZONE_LON, Some(30.0), step),
                            &thresholds(),
                        )
                        .transitions
                        .len()
                })
                .sum::<usize>()
        })
    });

    let transitions: Vec<usize> = join_all(handles)
        .await
        .into_iter()
        .map(|handle| handle.expect("Spawn block failure"))
        .collect();
    done.store(true, Ordering::Relaxed);
    let swaps = swapper.await.expect("Spawn block failure");

    assert!(transitions.iter().all(|count| *count == 1));
    assert!(engine.registry().snapshot().version() > swaps);
}
