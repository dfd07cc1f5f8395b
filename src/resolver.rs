//! Fills in the half of a temperature / fan-speed pair that an operation
//! left unspecified.
//!
//! The merge itself ([`resolve`]) is pure; [`fetch_snapshot`] does the
//! best-effort network read and [`resolve_operation`] chains the two.

use crate::client::DeviceApi;
use crate::models::{
    Command, Operation, OperationKind, RoomStateSnapshot, DEFAULT_FAN_SPEED, DEFAULT_TARGET_TEMPERATURE,
};
use log::warn;

/// Builds the command for `operation`, taking missing fields from `snapshot`
/// and then from the hard defaults (25.0 / MIDDLE).
pub fn resolve(operation: &Operation, snapshot: Option<&RoomStateSnapshot>) -> Command {
    let room_id = operation.room_id.clone();
    let target_temperature = operation
        .target_temperature
        .or_else(|| snapshot.and_then(|s| s.target_temperature))
        .unwrap_or(DEFAULT_TARGET_TEMPERATURE);
    let fan_speed = operation
        .fan_speed
        .or_else(|| snapshot.and_then(|s| s.fan_speed))
        .unwrap_or(DEFAULT_FAN_SPEED);

    match operation.kind {
        OperationKind::PowerOn => Command::PowerOn {
            room_id,
            mode: operation.mode,
            target_temperature,
            fan_speed,
        },
        OperationKind::PowerOff => Command::PowerOff { room_id },
        OperationKind::SetTemperature | OperationKind::SetFanSpeed | OperationKind::SetTemperatureAndFanSpeed => {
            Command::ChangeState {
                room_id,
                target_temperature,
                fan_speed,
            }
        }
    }
}

/// Reads the room's current state. Any failure is logged and reported as
/// `None`; it never fails the operation.
pub async fn fetch_snapshot<A: DeviceApi + ?Sized>(api: &A, room_id: &str) -> Option<RoomStateSnapshot> {
    match api.get_status(room_id).await {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("Status query for room {} failed, using defaults: {}", room_id, e);
            None
        }
    }
}

/// Resolves `operation` into a command, querying the device only when a field
/// is missing.
pub async fn resolve_operation<A: DeviceApi + ?Sized>(api: &A, operation: &Operation) -> Command {
    let snapshot = if operation.is_partial() {
        fetch_snapshot(api, &operation.room_id).await
    } else {
        None
    };
    resolve(operation, snapshot.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FanSpeed, Mode};
    use crate::parsers::operation_parser::parse_operation;
    use crate::tests::test_helpers::MockDevice;

    fn snapshot(temp: Option<f64>, fan: Option<FanSpeed>) -> RoomStateSnapshot {
        RoomStateSnapshot {
            target_temperature: temp,
            fan_speed: fan,
        }
    }

    #[test]
    fn test_power_on_without_state_uses_defaults() {
        let op = parse_operation("开机", "101").unwrap();
        assert_eq!(
            resolve(&op, None),
            Command::PowerOn {
                room_id: "101".to_string(),
                mode: Mode::Cool,
                target_temperature: 25.0,
                fan_speed: FanSpeed::Middle,
            }
        );
    }

    #[test]
    fn test_power_on_restores_previous_settings() {
        let op = parse_operation("开机", "101").unwrap();
        let cmd = resolve(&op, Some(&snapshot(Some(20.0), Some(FanSpeed::High))));
        assert_eq!(
            cmd,
            Command::PowerOn {
                room_id: "101".to_string(),
                mode: Mode::Cool,
                target_temperature: 20.0,
                fan_speed: FanSpeed::High,
            }
        );
    }

    #[test]
    fn test_set_fan_merges_temperature() {
        let op = parse_operation("高", "104").unwrap();
        let cmd = resolve(&op, Some(&snapshot(Some(22.0), Some(FanSpeed::Low))));
        assert_eq!(
            cmd,
            Command::ChangeState {
                room_id: "104".to_string(),
                target_temperature: 22.0,
                fan_speed: FanSpeed::High,
            }
        );

        let cmd = resolve(&op, None);
        assert_eq!(
            cmd,
            Command::ChangeState {
                room_id: "104".to_string(),
                target_temperature: 25.0,
                fan_speed: FanSpeed::High,
            }
        );
    }

    #[test]
    fn test_set_temperature_merges_fan_and_partial_snapshot() {
        let op = parse_operation("18", "101").unwrap();
        let cmd = resolve(&op, Some(&snapshot(Some(30.0), None)));
        assert_eq!(
            cmd,
            Command::ChangeState {
                room_id: "101".to_string(),
                target_temperature: 18.0,
                fan_speed: FanSpeed::Middle,
            }
        );
    }

    #[test]
    fn test_full_pair_ignores_snapshot() {
        let op = parse_operation("18, 低", "103").unwrap();
        let cmd = resolve(&op, Some(&snapshot(Some(30.0), Some(FanSpeed::High))));
        assert_eq!(
            cmd,
            Command::ChangeState {
                room_id: "103".to_string(),
                target_temperature: 18.0,
                fan_speed: FanSpeed::Low,
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_operation_falls_back_when_status_fails() {
        let device = MockDevice::new();
        device.fail_status_queries();
        let op = parse_operation("高", "101").unwrap();

        let cmd = resolve_operation(&device, &op).await;
        assert_eq!(
            cmd,
            Command::ChangeState {
                room_id: "101".to_string(),
                target_temperature: 25.0,
                fan_speed: FanSpeed::High,
            }
        );
        assert_eq!(device.status_queries(), 1);
    }

    #[tokio::test]
    async fn test_resolve_operation_only_queries_partial_operations() {
        let device = MockDevice::new();

        resolve_operation(&device, &parse_operation("关机", "101").unwrap()).await;
        resolve_operation(&device, &parse_operation("20, 中", "101").unwrap()).await;
        assert_eq!(device.status_queries(), 0);

        resolve_operation(&device, &parse_operation("19", "101").unwrap()).await;
        assert_eq!(device.status_queries(), 1);
    }
}
