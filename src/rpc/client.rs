use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::context::Context;
use crate::rpc::{RetryPolicy, RpcError, RpcErrorBody, RpcStatus, TIMEOUT_HEADER};

/// Client side of a single peer service. Every call goes through the retry policy.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http_client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RpcClient {
    pub fn new(base_url: String, retry: RetryPolicy) -> RpcClient {
        RpcClient {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    pub async fn unary<Req, Resp>(
        &self,
        ctx: &Context,
        method: &'static str,
        request: &Req,
    ) -> Result<Resp, RpcError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let url = format!("{}/rpc/{}", self.base_url, method);

        self.retry
            .call(ctx, method, |attempt_ctx| {
                self.send_once(attempt_ctx, &url, request)
            })
            .await
    }

    async fn send_once<Req, Resp>(
        &self,
        ctx: Context,
        url: &str,
        request: &Req,
    ) -> Result<Resp, RpcError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let mut builder = self.http_client.post(url).json(request);

        if let Some(remaining) = ctx.remaining() {
            builder = builder
                .header(TIMEOUT_HEADER, remaining.as_millis().to_string())
                .timeout(remaining);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();

        if status.is_success() {
            return response.json::<Resp>().await.map_err(|err| {
                RpcError::new(
                    RpcStatus::Internal,
                    format!("failed to decode response: {}", err),
                )
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;

        Err(match serde_json::from_slice::<RpcErrorBody>(&body) {
            Ok(error_body) => RpcError::new(error_body.code, error_body.message),
            Err(_) => RpcError::new(
                RpcStatus::from_http(status),
                String::from_utf8_lossy(&body).into_owned(),
            ),
        })
    }
}

fn transport_error(err: reqwest::Error) -> RpcError {
    let status = if err.is_timeout() {
        RpcStatus::DeadlineExceeded
    } else if err.is_connect() {
        RpcStatus::Unavailable
    } else {
        RpcStatus::Unknown
    };

    RpcError::new(status, err.to_string())
}
