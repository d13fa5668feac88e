use actix_web::{web, HttpResponse, ResponseError};
use reqwest::StatusCode;

use crate::context::Context;
use crate::rpc::clients::SubscriptionClient;
use crate::rpc::{RpcError, RpcStatus};
use crate::startup::gateway::RequestTimeouts;

#[derive(serde::Deserialize, Debug)]
pub struct SubscribeForm {
    pub email: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct SubscribeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[tracing::instrument(
    name = "Creating a new subscriber handler",
    skip(form, subscription, timeouts),
    fields(subscriber_email = %form.email)
)]
pub async fn handle_create_subscription(
    form: web::Form<SubscribeForm>,
    subscription: web::Data<SubscriptionClient>,
    timeouts: web::Data<RequestTimeouts>,
) -> Result<HttpResponse, SubscribeRouteError> {
    let ctx = Context::with_timeout(timeouts.subscribe);

    subscription
        .subscribe(&ctx, &form.email)
        .await
        .map_err(SubscribeRouteError)?;

    Ok(HttpResponse::Ok().json(SubscribeResponse {
        success: true,
        message: Some("added email".into()),
        error: None,
    }))
}

#[derive(thiserror::Error)]
#[error("{}", .0.message)]
pub struct SubscribeRouteError(#[source] RpcError);

impl std::fmt::Debug for SubscribeRouteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self.0)
    }
}

impl ResponseError for SubscribeRouteError {
    fn status_code(&self) -> StatusCode {
        match self.0.status {
            RpcStatus::AlreadyExists => StatusCode::CONFLICT,
            RpcStatus::InvalidArgument => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(SubscribeResponse {
            success: false,
            message: None,
            error: Some(self.to_string()),
        })
    }
}
