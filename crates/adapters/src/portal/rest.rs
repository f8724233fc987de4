// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! REST portal client
//!
//! Thin wire adapter over the portal's private JSON API. Authentication
//! beyond a bearer token (browser session bootstrap, OTP retrieval) is
//! handled outside this process and only the resulting token is passed in.

use super::{PortalClient, PortalError, QueuePhase, QueueTicket};
use async_trait::async_trait;
use cw_core::{AvailabilityQuery, BookingConfirmation, BookingRequest, DateRange, Site};
use serde::Deserialize;
use std::time::Duration;

/// Portal client speaking JSON over HTTP
#[derive(Clone)]
pub struct RestPortalClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SiteDto {
    id: String,
    name: String,
    site_type: String,
    price_per_night: f64,
    bookable: bool,
}

impl From<SiteDto> for Site {
    fn from(dto: SiteDto) -> Self {
        Site {
            id: dto.id,
            name: dto.name,
            site_type: dto.site_type,
            price_per_night: dto.price_per_night,
            bookable: dto.bookable,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BookingDto {
    reference: String,
    site_id: String,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
}

#[derive(Debug, Deserialize)]
struct QueueDto {
    status: String,
    position: Option<u32>,
    estimated_wait_secs: Option<u64>,
    ttl_secs: u64,
}

impl RestPortalClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn map_send_error(error: reqwest::Error) -> PortalError {
        if error.is_timeout() {
            PortalError::Timeout
        } else if error.is_decode() {
            PortalError::InvalidResponse(error.to_string())
        } else {
            PortalError::Network(error.to_string())
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PortalError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let err = match status.as_u16() {
            401 | 403 => PortalError::AuthenticationRequired(format!("status {}", status)),
            409 => {
                let body = response.text().await.unwrap_or_default();
                PortalError::BookingConflict(body)
            }
            code if status.is_server_error() => PortalError::Server { status: code },
            code => PortalError::InvalidResponse(format!("unexpected status {}", code)),
        };
        Err(err)
    }

    fn ticket_from(dto: QueueDto) -> Result<QueueTicket, PortalError> {
        let phase = match dto.status.as_str() {
            "waiting" => QueuePhase::Waiting,
            "active" => QueuePhase::Active,
            other => {
                return Err(PortalError::InvalidResponse(format!(
                    "unknown queue status: {}",
                    other
                )))
            }
        };
        Ok(QueueTicket {
            phase,
            position: dto.position,
            estimated_wait: dto.estimated_wait_secs.map(Duration::from_secs),
            ttl: Duration::from_secs(dto.ttl_secs),
        })
    }
}

#[async_trait]
impl PortalClient for RestPortalClient {
    async fn check_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<Site>, PortalError> {
        let mut request = self
            .request(reqwest::Method::GET, "/api/availability")
            .query(&[
                ("campground", query.campground_id.as_str()),
                ("start", &query.range.start.to_string()),
                ("end", &query.range.end.to_string()),
                ("guests", &query.guests.to_string()),
            ]);
        if let Some(site_type) = &query.site_type {
            request = request.query(&[("site_type", site_type.as_str())]);
        }

        let response = request.send().await.map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;
        let sites: Vec<SiteDto> = response.json().await.map_err(Self::map_send_error)?;
        Ok(sites.into_iter().map(Site::from).collect())
    }

    async fn create_booking(
        &self,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, PortalError> {
        let response = self
            .request(reqwest::Method::POST, "/api/bookings")
            .json(&serde_json::json!({
                "campground": request.campground_id,
                "site": request.site_id,
                "start": request.range.start,
                "end": request.range.end,
                "guests": request.guests,
            }))
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;
        let dto: BookingDto = response.json().await.map_err(Self::map_send_error)?;
        Ok(BookingConfirmation {
            reference: dto.reference,
            site_id: dto.site_id,
            range: DateRange::new(dto.start, dto.end),
        })
    }

    async fn cancel_booking(&self, reference: &str) -> Result<(), PortalError> {
        let response = self
            .request(
                reqwest::Method::DELETE,
                &format!("/api/bookings/{}", reference),
            )
            .send()
            .await
            .map_err(Self::map_send_error)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn join_queue(&self) -> Result<QueueTicket, PortalError> {
        let response = self
            .request(reqwest::Method::POST, "/api/queue/join")
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;
        let dto: QueueDto = response.json().await.map_err(Self::map_send_error)?;
        Self::ticket_from(dto)
    }

    async fn refresh_queue(&self) -> Result<QueueTicket, PortalError> {
        let response = self
            .request(reqwest::Method::POST, "/api/queue/refresh")
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_status(response).await?;
        let dto: QueueDto = response.json().await.map_err(Self::map_send_error)?;
        Self::ticket_from(dto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client =
            RestPortalClient::new("https://portal.example/", None, Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "https://portal.example");
    }

    #[test]
    fn queue_dto_maps_to_ticket() {
        let ticket = RestPortalClient::ticket_from(QueueDto {
            status: "waiting".to_string(),
            position: Some(8),
            estimated_wait_secs: Some(240),
            ttl_secs: 600,
        })
        .unwrap();

        assert_eq!(ticket.phase, QueuePhase::Waiting);
        assert_eq!(ticket.position, Some(8));
        assert_eq!(ticket.estimated_wait, Some(Duration::from_secs(240)));
        assert_eq!(ticket.ttl, Duration::from_secs(600));
    }

    #[test]
    fn unknown_queue_status_is_invalid() {
        let result = RestPortalClient::ticket_from(QueueDto {
            status: "paused".to_string(),
            position: None,
            estimated_wait_secs: None,
            ttl_secs: 60,
        });
        assert!(matches!(result, Err(PortalError::InvalidResponse(_))));
    }
}
