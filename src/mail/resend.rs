use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::context::Context;
use crate::domain::OutboundMessage;
use crate::mail::{MailError, MailTransport};

const TRANSPORT: &str = "resend";
const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

/// Resend's REST API. The message maps onto its payload field for field.
pub struct ResendClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    timeout: time::Duration,
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

impl ResendClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> ResendClient {
        ResendClient {
            http_client: Client::new(),
            base_url,
            api_key,
            timeout: timeout.unwrap_or(REQUEST_TIMEOUT),
        }
    }

    async fn post(&self, message: &OutboundMessage) -> Result<(), reqwest::Error> {
        self.http_client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .json(&SendEmailRequest {
                from: &message.from,
                to: &message.to,
                subject: &message.subject,
                html: &message.html,
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[async_trait]
impl MailTransport for ResendClient {
    fn name(&self) -> &'static str {
        TRANSPORT
    }

    #[tracing::instrument(
        name = "Sending a mail through Resend",
        skip(self, ctx, message),
        fields(recipients = message.to.len())
    )]
    async fn send(&self, ctx: &Context, message: &OutboundMessage) -> Result<(), MailError> {
        if message.to.is_empty() {
            return Err(MailError::EmptyRecipients {
                transport: TRANSPORT,
            });
        }

        ctx.run(self.post(message))
            .await?
            .map_err(|source| MailError::Request {
                transport: TRANSPORT,
                source,
            })
    }
}
