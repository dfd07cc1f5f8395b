use crate::client::{ApiResponse, DeviceApi};
use crate::errors::ApiError;
use crate::models::{Command, Outcome};
use log::error;

/// Issues exactly one API call for `command`. Non-2xx statuses and transport
/// errors both come back as a failed [`Outcome`]; nothing is retried.
pub async fn dispatch<A: DeviceApi + ?Sized>(api: &A, command: &Command) -> Outcome {
    let response = match command {
        Command::PowerOn {
            room_id,
            mode,
            target_temperature,
            fan_speed,
        } => api.power_on(room_id, *mode, *target_temperature, *fan_speed).await,
        Command::PowerOff { room_id } => api.power_off(room_id).await,
        Command::ChangeState {
            room_id,
            target_temperature,
            fan_speed,
        } => api.change_state(room_id, *target_temperature, *fan_speed).await,
    };

    let outcome = outcome_from_response(response);
    if !outcome.succeeded {
        error!("Dispatch of {:?} failed: {}", command, outcome.message);
    }
    outcome
}

fn outcome_from_response(response: Result<ApiResponse, ApiError>) -> Outcome {
    match response {
        Ok(response) if response.is_success() => Outcome::success(),
        Ok(response) => Outcome::failure(
            ApiError::Status {
                status: response.status,
                body: response.body,
            }
            .to_string(),
        ),
        Err(e) => Outcome::failure(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FanSpeed, Mode};
    use crate::tests::test_helpers::{MockDevice, RecordedCall};

    #[tokio::test]
    async fn test_each_command_makes_one_call() {
        let device = MockDevice::new();

        let outcome = dispatch(
            &device,
            &Command::PowerOn {
                room_id: "101".to_string(),
                mode: Mode::Cool,
                target_temperature: 25.0,
                fan_speed: FanSpeed::Middle,
            },
        )
        .await;
        assert!(outcome.succeeded);

        dispatch(
            &device,
            &Command::ChangeState {
                room_id: "101".to_string(),
                target_temperature: 18.0,
                fan_speed: FanSpeed::Middle,
            },
        )
        .await;
        dispatch(&device, &Command::PowerOff { room_id: "101".to_string() }).await;

        assert_eq!(
            device.calls(),
            vec![
                RecordedCall::PowerOn {
                    room_id: "101".to_string(),
                    mode: Mode::Cool,
                    target_temperature: 25.0,
                    fan_speed: FanSpeed::Middle,
                },
                RecordedCall::ChangeState {
                    room_id: "101".to_string(),
                    target_temperature: 18.0,
                    fan_speed: FanSpeed::Middle,
                },
                RecordedCall::PowerOff { room_id: "101".to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_command_is_a_failure() {
        let device = MockDevice::new();

        // The mock rejects state changes for rooms that are off.
        let outcome = dispatch(
            &device,
            &Command::ChangeState {
                room_id: "102".to_string(),
                target_temperature: 19.0,
                fan_speed: FanSpeed::Low,
            },
        )
        .await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.message, "HTTP 500: Room is OFF");
        assert_eq!(device.calls().len(), 1);
    }

    #[test]
    fn test_outcome_from_transport_error() {
        let outcome = outcome_from_response(Err(ApiError::Decode {
            endpoint: "status".to_string(),
            message: "bad json".to_string(),
        }));
        assert!(!outcome.succeeded);
        assert!(outcome.message.contains("bad json"));
    }
}
