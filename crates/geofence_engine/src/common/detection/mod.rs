/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::common::types::*;

mod idle;
mod presence;

pub use idle::VehicleIdleState;
pub use presence::VehicleGeoState;

/// Report data shared by the trackers
#[derive(Debug, Clone)]
pub struct DetectionContext {
    pub vehicle_id: VehicleId,
    pub location: Point,
    pub timestamp: TimeStamp,
}

impl From<&PositionReport> for DetectionContext {
    fn from(report: &PositionReport) -> Self {
        DetectionContext {
            vehicle_id: report.vehicle_id.to_owned(),
            location: report.location(),
            timestamp: report.timestamp,
        }
    }
}

/// Everything the engine remembers about one vehicle between reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleState {
    pub presence: VehicleGeoState,
    pub idle: VehicleIdleState,
}
