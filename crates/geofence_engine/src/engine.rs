/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::detection::VehicleState;
use crate::common::evaluation;
use crate::common::registry::{GeofenceRegistry, GeofenceSnapshot};
use crate::common::types::*;
use crate::evaluation_duration;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Thread-safe entry point: owns the geofence registry and the state of every vehicle.
///
/// Reports for different vehicles evaluate in parallel; reports for the same vehicle are
/// serialized on that vehicle's lock.
#[derive(Default)]
pub struct GeofenceEngine {
    registry: GeofenceRegistry,
    vehicles: RwLock<FxHashMap<VehicleId, Arc<Mutex<VehicleState>>>>,
}

impl GeofenceEngine {
    pub fn new(geofences: Vec<Geofence>) -> Self {
        Self {
            registry: GeofenceRegistry::new(geofences),
            vehicles: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn registry(&self) -> &GeofenceRegistry {
        &self.registry
    }

    /// Evaluates `report` against the registry's current snapshot.
    #[macros::measure_duration]
    pub fn evaluate(&self, report: &PositionReport, thresholds: &IdleThresholds) -> EvaluationResult {
        let snapshot = self.registry.snapshot();
        self.evaluate_with_snapshot(report, &snapshot, thresholds)
    }

    /// Evaluates `report` against a snapshot the caller holds for the whole batch.
    pub fn evaluate_with_snapshot(
        &self,
        report: &PositionReport,
        snapshot: &GeofenceSnapshot,
        thresholds: &IdleThresholds,
    ) -> EvaluationResult {
        let start = Instant::now();
        let cell = self.vehicle_cell(&report.vehicle_id);
        let result = {
            let mut state = cell.lock();
            evaluation::evaluate(&mut state, report, snapshot, thresholds)
        };
        evaluation_duration!(start);
        result
    }

    fn vehicle_cell(&self, vehicle_id: &VehicleId) -> Arc<Mutex<VehicleState>> {
        if let Some(cell) = self.vehicles.read().get(vehicle_id) {
            return cell.to_owned();
        }
        let mut vehicles = self.vehicles.write();
        vehicles
            .entry(vehicle_id.to_owned())
            .or_insert_with(|| {
                debug!(tag = "[Vehicle Tracked]", vehicle_id = %vehicle_id.0);
                Arc::new(Mutex::new(VehicleState::default()))
            })
            .to_owned()
    }

    /// Forgets everything about a vehicle. Returns whether it was tracked.
    pub fn evict(&self, vehicle_id: &VehicleId) -> bool {
        let evicted = self.vehicles.write().remove(vehicle_id).is_some();
        if evicted {
            info!(tag = "[Vehicle Evicted]", vehicle_id = %vehicle_id.0);
        }
        evicted
    }

    /// Number of tracked vehicles currently inside each geofence.
    pub fn occupancy(&self) -> FxHashMap<GeofenceId, usize> {
        let cells: Vec<Arc<Mutex<VehicleState>>> =
            self.vehicles.read().values().cloned().collect();
        let mut occupancy: FxHashMap<GeofenceId, usize> = FxHashMap::default();
        for cell in cells {
            let state = cell.lock();
            for geofence_id in state.presence.inside_geofences() {
                *occupancy.entry(geofence_id.to_owned()).or_insert(0) += 1;
            }
        }
        occupancy
    }

    pub fn tracked_vehicles(&self) -> Vec<VehicleId> {
        let mut vehicle_ids: Vec<VehicleId> = self.vehicles.read().keys().cloned().collect();
        vehicle_ids.sort();
        vehicle_ids
    }
}
