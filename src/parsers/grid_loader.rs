use crate::config::RoomColumn;
use crate::models::{Mode, Operation};
use crate::parsers::operation_parser::parse_operation;
use log::{debug, warn};
use std::collections::BTreeMap;

/// Operations keyed by logical time point.
///
/// Built once by [`GridLoader::load`] and read-only afterwards. Only time
/// points with at least one operation appear as keys; within a key the
/// operations keep the column order of the source row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioGrid {
    operations: BTreeMap<u32, Vec<Operation>>,
}

impl ScenarioGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `operation` under its own `time_point`.
    pub fn push(&mut self, operation: Operation) {
        self.operations.entry(operation.time_point).or_default().push(operation);
    }

    /// Occupied time points, ascending.
    pub fn time_points(&self) -> Vec<u32> {
        self.operations.keys().copied().collect()
    }

    pub fn operations_at(&self, time_point: u32) -> &[Operation] {
        self.operations.get(&time_point).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &[Operation])> + '_ {
        self.operations.iter().map(|(t, ops)| (*t, ops.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn time_point_count(&self) -> usize {
        self.operations.len()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.values().map(Vec::len).sum()
    }
}

impl FromIterator<Operation> for ScenarioGrid {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut grid = ScenarioGrid::new();
        for operation in iter {
            grid.push(operation);
        }
        grid
    }
}

/// Converts scenario rows into a [`ScenarioGrid`].
///
/// Column 0 of every row is the time point. The configured room table maps
/// the remaining columns to rooms. A cell starting with the expect-failure
/// marker is parsed without the marker and flagged `expected_to_fail`.
#[derive(Debug, Clone)]
pub struct GridLoader {
    rooms: Vec<RoomColumn>,
    expect_failure_marker: String,
    default_mode: Mode,
}

impl GridLoader {
    pub fn new(rooms: Vec<RoomColumn>, expect_failure_marker: impl Into<String>) -> Self {
        let mut rooms = rooms;
        rooms.sort_by_key(|room| room.column);
        Self {
            rooms,
            expect_failure_marker: expect_failure_marker.into(),
            default_mode: Mode::default(),
        }
    }

    /// Operating mode stamped on every parsed operation.
    pub fn with_default_mode(mut self, mode: Mode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn load<R, C>(&self, rows: &[R]) -> ScenarioGrid
    where
        R: AsRef<[C]>,
        C: AsRef<str>,
    {
        let mut grid = ScenarioGrid::new();

        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let Some(time_cell) = row.first() else {
                warn!("Row {} is empty, skipping", row_idx + 1);
                continue;
            };

            let time_point = match time_cell.as_ref().trim().parse::<u32>() {
                Ok(t) => t,
                Err(e) => {
                    warn!(
                        "Row {}: time point '{}' is not a non-negative integer ({}), skipping",
                        row_idx + 1,
                        time_cell.as_ref(),
                        e
                    );
                    continue;
                }
            };

            for room in &self.rooms {
                let Some(cell) = row.get(room.column) else {
                    continue;
                };
                if let Some(operation) = self.parse_cell(cell.as_ref(), &room.room_id) {
                    debug!("t={} column {} -> {}", time_point, room.column, operation);
                    grid.push(operation.with_mode(self.default_mode).at(time_point));
                } else if !cell.as_ref().trim().is_empty() {
                    warn!(
                        "Row {}: unrecognised cell '{}' for room {}, skipping",
                        row_idx + 1,
                        cell.as_ref(),
                        room.room_id
                    );
                }
            }
        }

        grid
    }

    fn parse_cell(&self, cell: &str, room_id: &str) -> Option<Operation> {
        let value = cell.trim();
        if !self.expect_failure_marker.is_empty() {
            if let Some(rest) = value.strip_prefix(self.expect_failure_marker.as_str()) {
                return parse_operation(rest, room_id).map(Operation::expect_failure);
            }
        }
        parse_operation(value, room_id)
    }
}
