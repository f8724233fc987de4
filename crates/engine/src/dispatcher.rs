// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification fan-out with delivery auditing
//!
//! The message itself is persisted by the runtime before dispatch; delivery
//! here is best-effort per provider with one retry, and every attempt chain
//! ends in exactly one audit record.

use cw_adapters::{build_channel, ChannelAdapter};
use cw_core::{Clock, DeliveryRecord, DeliveryStatus, IdGen, NotificationMessage, Provider};
use cw_storage::JsonStore;
use std::sync::Arc;

/// Routes one message to every enabled provider
pub struct NotificationDispatcher {
    channels: Vec<(Provider, Arc<dyn ChannelAdapter>)>,
    retry_limit: u32,
}

impl NotificationDispatcher {
    /// Build channel adapters from provider configuration
    pub fn new(providers: &[Provider], retry_limit: u32) -> Self {
        let channels = providers
            .iter()
            .filter(|p| p.enabled)
            .map(|p| (p.clone(), build_channel(&p.config)))
            .collect();
        Self {
            channels,
            retry_limit,
        }
    }

    /// Use pre-built channels; disabled providers are still filtered out
    pub fn with_channels(
        channels: Vec<(Provider, Arc<dyn ChannelAdapter>)>,
        retry_limit: u32,
    ) -> Self {
        Self {
            channels: channels.into_iter().filter(|(p, _)| p.enabled).collect(),
            retry_limit,
        }
    }

    pub fn provider_count(&self) -> usize {
        self.channels.len()
    }

    /// Deliver the message through every enabled provider, writing one
    /// audit record per provider. Delivery failure never propagates.
    pub async fn dispatch(
        &self,
        message: &NotificationMessage,
        store: &JsonStore,
        id_gen: &impl IdGen,
        clock: &impl Clock,
    ) -> Vec<DeliveryRecord> {
        let mut records = Vec::with_capacity(self.channels.len());

        for (provider, channel) in &self.channels {
            // The audit row exists before the first attempt
            let mut record = DeliveryRecord {
                id: id_gen.next(),
                message_id: message.id.clone(),
                provider_id: provider.id.clone(),
                status: DeliveryStatus::Pending,
                attempts: 0,
                created_at: clock.now_utc(),
            };
            if let Err(error) = store.save_delivery(&record) {
                tracing::error!(error = %error, "failed to persist delivery record");
            }

            let mut attempts = 0;
            let status = loop {
                attempts += 1;
                match channel.deliver(message).await {
                    Ok(()) => break DeliveryStatus::Sent,
                    Err(error) if attempts <= self.retry_limit => {
                        tracing::warn!(
                            provider = %provider.name,
                            channel = channel.channel(),
                            error = %error,
                            attempt = attempts,
                            "delivery failed, retrying"
                        );
                    }
                    Err(error) => {
                        tracing::error!(
                            provider = %provider.name,
                            channel = channel.channel(),
                            error = %error,
                            "delivery failed permanently"
                        );
                        break DeliveryStatus::Failed {
                            error: error.to_string(),
                        };
                    }
                }
            };

            record.status = status;
            record.attempts = attempts;
            if let Err(error) = store.save_delivery(&record) {
                tracing::error!(error = %error, "failed to persist delivery record");
            }
            records.push(record);
        }

        records
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
