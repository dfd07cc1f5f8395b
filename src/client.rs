//! Device-control API collaborator.
//!
//! [`DeviceApi`] is the seam between the scheduler and the hotel
//! air-conditioning backend. [`HttpDeviceApi`] talks to the real REST service;
//! tests substitute an in-memory device.

use crate::errors::{ApiError, RunnerError};
use crate::models::{FanSpeed, Mode, RoomStateSnapshot};
use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use std::time::Duration;

/// Status and body of a command call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn power_on(
        &self,
        room_id: &str,
        mode: Mode,
        target_temperature: f64,
        fan_speed: FanSpeed,
    ) -> Result<ApiResponse, ApiError>;

    async fn power_off(&self, room_id: &str) -> Result<ApiResponse, ApiError>;

    async fn change_state(
        &self,
        room_id: &str,
        target_temperature: f64,
        fan_speed: FanSpeed,
    ) -> Result<ApiResponse, ApiError>;

    /// Current target temperature and fan speed for `room_id`.
    async fn get_status(&self, room_id: &str) -> Result<RoomStateSnapshot, ApiError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PowerOnRequest<'a> {
    room_id: &'a str,
    mode: Mode,
    target_temp: f64,
    fan_speed: FanSpeed,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChangeStateRequest<'a> {
    room_id: &'a str,
    target_temp: f64,
    fan_speed: FanSpeed,
}

/// REST client for the `/guest` endpoints of the hotel backend.
pub struct HttpDeviceApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpDeviceApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, RunnerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().map_err(RunnerError::Client)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/guest/{}", self.base_url, path)
    }

    async fn read_response(endpoint: &str, response: reqwest::Response) -> Result<ApiResponse, ApiError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source: e,
        })?;
        debug!("{} -> HTTP {} {}", endpoint, status, body);
        Ok(ApiResponse { status, body })
    }
}

#[async_trait]
impl DeviceApi for HttpDeviceApi {
    async fn power_on(
        &self,
        room_id: &str,
        mode: Mode,
        target_temperature: f64,
        fan_speed: FanSpeed,
    ) -> Result<ApiResponse, ApiError> {
        let endpoint = self.endpoint("powerOn");
        let request = PowerOnRequest {
            room_id,
            mode,
            target_temp: target_temperature,
            fan_speed,
        };
        debug!("POST {} {:?}", endpoint, request);

        let response = self
            .http_client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        Self::read_response(&endpoint, response).await
    }

    async fn power_off(&self, room_id: &str) -> Result<ApiResponse, ApiError> {
        let endpoint = self.endpoint("powerOff");
        debug!("POST {} roomId={}", endpoint, room_id);

        let response = self
            .http_client
            .post(&endpoint)
            .query(&[("roomId", room_id)])
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        Self::read_response(&endpoint, response).await
    }

    async fn change_state(
        &self,
        room_id: &str,
        target_temperature: f64,
        fan_speed: FanSpeed,
    ) -> Result<ApiResponse, ApiError> {
        let endpoint = self.endpoint("changeState");
        let request = ChangeStateRequest {
            room_id,
            target_temp: target_temperature,
            fan_speed,
        };
        debug!("POST {} {:?}", endpoint, request);

        let response = self
            .http_client
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        Self::read_response(&endpoint, response).await
    }

    async fn get_status(&self, room_id: &str) -> Result<RoomStateSnapshot, ApiError> {
        let endpoint = self.endpoint("status");
        let response = self
            .http_client
            .get(&endpoint)
            .query(&[("roomId", room_id)])
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let response = Self::read_response(&endpoint, response).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}
