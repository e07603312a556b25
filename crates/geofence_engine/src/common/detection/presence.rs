/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::detection::DetectionContext;
use crate::common::types::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

/// Last known inside/outside status of one vehicle for every geofence it has been evaluated
/// against. A geofence without an entry counts as outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleGeoState {
    inside: FxHashMap<GeofenceId, bool>,
}

impl VehicleGeoState {
    /// Tests the report against each geofence and emits a transition whenever the status flips.
    ///
    /// A geofence whose shape cannot be evaluated keeps its previous status and is reported
    /// as a data quality issue instead. Entries for geofences missing from `geofences` are
    /// dropped without emitting anything.
    pub fn update(
        &mut self,
        context: &DetectionContext,
        geofences: &[Geofence],
    ) -> (Vec<TransitionEvent>, Vec<DataQualityIssue>) {
        let mut transitions = Vec::new();
        let mut issues = Vec::new();

        let current: FxHashSet<&GeofenceId> =
            geofences.iter().map(|geofence| &geofence.id).collect();
        self.inside
            .retain(|geofence_id, _| current.contains(geofence_id));

        for geofence in geofences {
            let now_inside = match geofence.contains(&context.location) {
                Ok(now_inside) => now_inside,
                Err(err) => {
                    warn!(
                        tag = "[Geofence Skipped]",
                        geofence_id = %geofence.id.0,
                        vehicle_id = %context.vehicle_id.0,
                        error = %err.message()
                    );
                    issues.push(DataQualityIssue::new(&err, Some(geofence.id.to_owned())));
                    continue;
                }
            };

            let was_inside = self.is_inside(&geofence.id);
            if now_inside != was_inside {
                transitions.push(TransitionEvent {
                    vehicle_id: context.vehicle_id.to_owned(),
                    geofence_id: geofence.id.to_owned(),
                    geofence_name: geofence.name.to_owned(),
                    area_kind: geofence.kind,
                    kind: if now_inside {
                        TransitionKind::Entered
                    } else {
                        TransitionKind::Exited
                    },
                    location: context.location,
                    timestamp: context.timestamp,
                });
            }
            self.inside.insert(geofence.id.to_owned(), now_inside);
        }

        (transitions, issues)
    }

    pub fn is_inside(&self, geofence_id: &GeofenceId) -> bool {
        self.inside.get(geofence_id).copied().unwrap_or(false)
    }

    pub fn inside_geofences(&self) -> impl Iterator<Item = &GeofenceId> {
        self.inside
            .iter()
            .filter_map(|(geofence_id, inside)| inside.then_some(geofence_id))
    }
}
