use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::context::Context;
use crate::domain::OutboundMessage;
use crate::mail::{MailError, MailTransport};

const TRANSPORT: &str = "sendgrid";
const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

pub struct SendGridClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    timeout: time::Duration,
}

#[derive(serde::Serialize)]
pub struct SendEmailBody {
    personalizations: Vec<SengridPersonalization>,
    from: SengridEmail,
    subject: String,
    content: Vec<SengridContent>,
}

#[derive(serde::Serialize)]
struct SengridEmail {
    email: String,
}

#[derive(serde::Serialize)]
struct SengridPersonalization {
    to: Vec<SengridEmail>,
}

#[derive(serde::Serialize)]
struct SengridContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

impl SendGridClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> SendGridClient {
        SendGridClient {
            http_client: Client::new(),
            base_url,
            api_key,
            timeout: timeout.unwrap_or(REQUEST_TIMEOUT),
        }
    }

    async fn post(&self, message: &OutboundMessage) -> Result<(), reqwest::Error> {
        let url = format!("{}/mail/send", self.base_url);
        // One personalization per recipient, so subscribers never see each other's address.
        let body = SendEmailBody {
            from: SengridEmail {
                email: message.from.clone(),
            },
            personalizations: message
                .to
                .iter()
                .map(|recipient| SengridPersonalization {
                    to: vec![SengridEmail {
                        email: recipient.clone(),
                    }],
                })
                .collect(),
            subject: message.subject.clone(),
            content: vec![SengridContent {
                content_type: String::from("text/html"),
                value: message.html.clone(),
            }],
        };

        self.http_client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?
            .error_for_status()?; // return an error when server response status code is 4xx or 5xx

        Ok(())
    }
}

#[async_trait]
impl MailTransport for SendGridClient {
    fn name(&self) -> &'static str {
        TRANSPORT
    }

    #[tracing::instrument(
        name = "Sending a mail through SendGrid",
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
