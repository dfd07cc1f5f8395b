use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Temperature used when neither the scenario nor the device supplies one.
pub const DEFAULT_TARGET_TEMPERATURE: f64 = 25.0;

pub const DEFAULT_FAN_SPEED: FanSpeed = FanSpeed::Middle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FanSpeed {
    Low,
    Middle,
    High,
}

impl FanSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanSpeed::Low => "LOW",
            FanSpeed::Middle => "MIDDLE",
            FanSpeed::High => "HIGH",
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Cool,
    Heat,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Cool => f.write_str("COOL"),
            Mode::Heat => f.write_str("HEAT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    PowerOn,
    PowerOff,
    SetTemperature,
    SetFanSpeed,
    SetTemperatureAndFanSpeed,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OperationKind::PowerOn => "power on",
            OperationKind::PowerOff => "power off",
            OperationKind::SetTemperature => "set temperature",
            OperationKind::SetFanSpeed => "set fan speed",
            OperationKind::SetTemperatureAndFanSpeed => "set temperature and fan speed",
        };
        f.write_str(label)
    }
}

/// One scheduled action against one room.
///
/// `target_temperature` and `fan_speed` are `None` where the scenario cell did
/// not specify them; the state resolver fills the gaps before dispatch.
/// A parsed `PowerOn` always carries `None` for both: the resolver supplies the
/// room's last settings, or [`DEFAULT_TARGET_TEMPERATURE`] and
/// [`DEFAULT_FAN_SPEED`] when the room has none.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub time_point: u32, // logical minutes from scenario start
    pub room_id: String,
    pub kind: OperationKind,
    pub target_temperature: Option<f64>,
    pub fan_speed: Option<FanSpeed>,
    pub mode: Mode,
    pub expected_to_fail: bool,
}

impl Operation {
    pub fn new(room_id: impl Into<String>, kind: OperationKind) -> Self {
        Self {
            time_point: 0,
            room_id: room_id.into(),
            kind,
            target_temperature: None,
            fan_speed: None,
            mode: Mode::default(),
            expected_to_fail: false,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.target_temperature = Some(temperature);
        self
    }

    pub fn with_fan_speed(mut self, fan_speed: FanSpeed) -> Self {
        self.fan_speed = Some(fan_speed);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn at(mut self, time_point: u32) -> Self {
        self.time_point = time_point;
        self
    }

    pub fn expect_failure(mut self) -> Self {
        self.expected_to_fail = true;
        self
    }

    /// True when the operation leaves one of the co-dependent fields to be
    /// resolved from device state.
    pub fn is_partial(&self) -> bool {
        match self.kind {
            OperationKind::PowerOff => false,
            _ => self.target_temperature.is_none() || self.fan_speed.is_none(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.room_id, self.kind)?;
        if let Some(temp) = self.target_temperature {
            write!(f, " temp={}℃", temp)?;
        }
        if let Some(fan) = self.fan_speed {
            write!(f, " fan={}", fan)?;
        }
        if self.expected_to_fail {
            f.write_str(" (expected to fail)")?;
        }
        Ok(())
    }
}

// Unknown fan speed strings from the device read as "no data"
fn deserialize_lenient_fan_speed<'de, D>(deserializer: D) -> Result<Option<FanSpeed>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        Some("LOW") => Some(FanSpeed::Low),
        Some("MIDDLE") => Some(FanSpeed::Middle),
        Some("HIGH") => Some(FanSpeed::High),
        _ => None,
    })
}

/// Last known device state for a room, fetched fresh for every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct RoomStateSnapshot {
    #[serde(rename = "targetTemp", default)]
    pub target_temperature: Option<f64>,
    #[serde(rename = "fanSpeed", default, deserialize_with = "deserialize_lenient_fan_speed")]
    pub fan_speed: Option<FanSpeed>,
}

/// A fully specified call against the device API.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PowerOn {
        room_id: String,
        mode: Mode,
        target_temperature: f64,
        fan_speed: FanSpeed,
    },
    PowerOff {
        room_id: String,
    },
    ChangeState {
        room_id: String,
        target_temperature: f64,
        fan_speed: FanSpeed,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PowerOn { mode, target_temperature, fan_speed, .. } => {
                write!(f, "mode={} temp={}℃ fan={}", mode, target_temperature, fan_speed)
            }
            Command::PowerOff { .. } => f.write_str("off"),
            Command::ChangeState { target_temperature, fan_speed, .. } => {
                write!(f, "temp={}℃ fan={}", target_temperature, fan_speed)
            }
        }
    }
}

/// Raw dispatcher verdict before expectation handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub succeeded: bool,
    pub message: String,
}

impl Outcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            message: "ok".to_string(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }
}

/// Recorded verdict for one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub time_point: u32,
    pub room_id: String,
    pub kind: OperationKind,
    pub succeeded: bool,
    pub message: String,
}
