/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::*;
use crate::tools::error::AppError;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::{info, warn};

/// Immutable set of active geofences, ordered by id with one geofence per id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeofenceSnapshot {
    version: u64,
    geofences: Vec<Geofence>,
    issues: Vec<DataQualityIssue>,
}

impl GeofenceSnapshot {
    /// Keeps only active geofences. When an id repeats, the first definition in input order
    /// wins and every later one is dropped with a `DUPLICATE_GEOFENCE_ID` issue.
    pub fn new(version: u64, geofences: Vec<Geofence>) -> Self {
        let mut geofences: Vec<Geofence> = geofences
            .into_iter()
            .filter(|geofence| geofence.is_active)
            .collect();
        geofences.sort_by(|a, b| a.id.cmp(&b.id));

        let mut issues = Vec::new();
        geofences.dedup_by(|later, kept| {
            if later.id != kept.id {
                return false;
            }
            let err = AppError::DuplicateGeofenceId(later.id.0.to_owned());
            warn!(
                tag = "[Geofence Skipped]",
                geofence_id = %later.id.0,
                name = %later.name,
                error = %err.message()
            );
            issues.push(DataQualityIssue::new(&err, Some(later.id.to_owned())));
            true
        });

        Self {
            version,
            geofences,
            issues,
        }
    }

    pub fn active_geofences(&self) -> &[Geofence] {
        &self.geofences
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Definitions dropped while building the snapshot.
    pub fn issues(&self) -> &[DataQualityIssue] {
        &self.issues
    }

    pub fn get(&self, geofence_id: &GeofenceId) -> Option<&Geofence> {
        self.geofences
            .binary_search_by(|geofence| geofence.id.cmp(geofence_id))
            .ok()
            .map(|idx| &self.geofences[idx])
    }

    pub fn len(&self) -> usize {
        self.geofences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geofences.is_empty()
    }
}

/// Shared handle to the current snapshot.
///
/// Readers take an `Arc` and keep evaluating against it even if a refresh lands meanwhile;
/// a refresh always publishes a whole new snapshot.
pub struct GeofenceRegistry {
    current: ArcSwap<GeofenceSnapshot>,
}

impl GeofenceRegistry {
    pub fn new(geofences: Vec<Geofence>) -> Self {
        Self {
            current: ArcSwap::from_pointee(GeofenceSnapshot::new(1, geofences)),
        }
    }

    pub fn snapshot(&self) -> Arc<GeofenceSnapshot> {
        self.current.load_full()
    }

    /// Publishes `geofences` as the next snapshot and returns its version.
    ///
    /// Concurrent refreshes each get their own version; the one published last wins.
    pub fn replace(&self, geofences: Vec<Geofence>) -> u64 {
        let prepared = GeofenceSnapshot::new(0, geofences);
        let previous = self.current.rcu(|current| {
            Arc::new(GeofenceSnapshot {
                version: current.version() + 1,
                ..prepared.clone()
            })
        });
        let version = previous.version() + 1;
        info!(
            tag = "[Geofence Registry]",
            version,
            active = prepared.len(),
            skipped = prepared.issues().len(),
            "Publishing geofence snapshot"
        );
        version
    }
}

impl Default for GeofenceRegistry {
    fn default() -> Self {
        Self::new(vec![])
    }
}
