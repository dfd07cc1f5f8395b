//! Turns a single scenario cell into an [`Operation`].
//!
//! Grammar, first match wins:
//! 1. power-on token (`开机`)
//! 2. power-off token (`关机`)
//! 3. `<temperature>,<fan speed>` (ASCII or full-width comma, exactly two parts)
//! 4. bare temperature
//! 5. bare fan speed word (`高` / `中` / `低`)
//!
//! Anything else yields `None`.

use crate::models::{FanSpeed, Operation, OperationKind, DEFAULT_FAN_SPEED};

const POWER_ON_TOKENS: [&str; 2] = ["开机", "power on"];
const POWER_OFF_TOKENS: [&str; 2] = ["关机", "power off"];
const SEPARATORS: [char; 2] = [',', '，'];

/// Maps a fan-speed word to its enum value, `None` if the word is not in the vocabulary.
pub fn fan_speed_from_word(word: &str) -> Option<FanSpeed> {
    match word.trim() {
        "高" | "high" => Some(FanSpeed::High),
        "中" | "medium" => Some(FanSpeed::Middle),
        "低" | "low" => Some(FanSpeed::Low),
        _ => None,
    }
}

fn parse_temperature(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|t| t.is_finite())
}

/// Parses one cell for `room_id`. The returned operation has `time_point` 0;
/// the grid loader stamps the real one.
pub fn parse_operation(token: &str, room_id: &str) -> Option<Operation> {
    let value = token.trim();
    if value.is_empty() {
        return None;
    }

    if POWER_ON_TOKENS.contains(&value) {
        // Temperature and fan speed are left to the state resolver so a room
        // can come back on with its previous settings.
        return Some(Operation::new(room_id, OperationKind::PowerOn));
    }

    if POWER_OFF_TOKENS.contains(&value) {
        return Some(Operation::new(room_id, OperationKind::PowerOff));
    }

    if value.contains(SEPARATORS) {
        let parts: Vec<&str> = value.split(SEPARATORS).collect();
        let &[temp_part, fan_part] = parts.as_slice() else {
            return None;
        };
        let temperature = parse_temperature(temp_part)?;
        let fan_speed = fan_speed_from_word(fan_part).unwrap_or(DEFAULT_FAN_SPEED);
        return Some(
            Operation::new(room_id, OperationKind::SetTemperatureAndFanSpeed)
                .with_temperature(temperature)
                .with_fan_speed(fan_speed),
        );
    }

    if let Some(temperature) = parse_temperature(value) {
        return Some(Operation::new(room_id, OperationKind::SetTemperature).with_temperature(temperature));
    }

    fan_speed_from_word(value)
        .map(|fan_speed| Operation::new(room_id, OperationKind::SetFanSpeed).with_fan_speed(fan_speed))
}
