// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Email notifications via SMTP

use super::{ChannelAdapter, NotifyError};
use async_trait::async_trait;
use cw_core::{NotificationMessage, SmtpConfig};
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

/// SMTP email channel (STARTTLS relay)
#[derive(Clone)]
pub struct EmailChannel {
    config: SmtpConfig,
    to: String,
}

impl EmailChannel {
    pub fn new(config: SmtpConfig, to: impl Into<String>) -> Self {
        Self {
            config,
            to: to.into(),
        }
    }

    fn subject(message: &NotificationMessage) -> String {
        format!("[Camp Warden] {}", message.title)
    }

    fn body(message: &NotificationMessage) -> String {
        format!(
            "{}\n\nKind: {}\nCreated: {}\n",
            message.body, message.kind, message.created_at
        )
    }
}

#[async_trait]
impl ChannelAdapter for EmailChannel {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.config
                    .from
                    .parse()
                    .map_err(|e| NotifyError::Failed(format!("bad from address: {}", e)))?,
            )
            .to(self
                .to
                .parse()
                .map_err(|e| NotifyError::Failed(format!("bad to address: {}", e)))?)
            .subject(Self::subject(message))
            .header(ContentType::TEXT_PLAIN)
            .body(Self::body(message))
            .map_err(|e| NotifyError::Failed(e.to_string()))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
                .map_err(|e| NotifyError::Smtp(e.to_string()))?
                .port(self.config.port);

        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let transport = builder.build();
        transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Smtp(e.to_string()))?;

        Ok(())
    }
}
