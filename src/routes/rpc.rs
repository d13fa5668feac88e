//! Server side of the service methods. Each handler runs under the budget the caller sent.

use actix_web::{web, HttpRequest};

use crate::mail::{MailError, MailTransport};
use crate::rates::{RateError, RateSource};
use crate::rpc::proto::{Empty, Mail, RateResponse, SubscribeRequest};
use crate::rpc::{request_context, RpcError, RpcStatus};
use crate::subscription::SubscriptionService;

#[tracing::instrument(name = "GetRate", skip(request, rates))]
pub async fn get_rate(
    request: HttpRequest,
    rates: web::Data<dyn RateSource>,
) -> Result<web::Json<RateResponse>, RpcError> {
    let ctx = request_context(&request);
    let rate = rates.convert(&ctx).await.map_err(rate_rpc_error)?;

    Ok(web::Json(RateResponse { rate }))
}

#[tracing::instrument(
    name = "SendMail",
    skip(request, transport, body),
    fields(recipients = body.to.len(), subject = %body.subject)
)]
pub async fn send_mail(
    request: HttpRequest,
    transport: web::Data<dyn MailTransport>,
    body: web::Json<Mail>,
) -> Result<web::Json<Empty>, RpcError> {
    if body.to.is_empty() {
        return Err(RpcError::new(
            RpcStatus::InvalidArgument,
            "recipients cannot be empty",
        ));
    }

    let ctx = request_context(&request);
    transport
        .send(&ctx, &body)
        .await
        .map_err(mail_rpc_error)?;

    Ok(web::Json(Empty {}))
}

#[tracing::instrument(name = "Subscribe", skip(request, service, body))]
pub async fn subscribe(
    request: HttpRequest,
    service: web::Data<SubscriptionService>,
    body: web::Json<SubscribeRequest>,
) -> Result<web::Json<Empty>, RpcError> {
    let ctx = request_context(&request);
    service.subscribe(&ctx, &body.email).await?;

    Ok(web::Json(Empty {}))
}

fn rate_rpc_error(err: RateError) -> RpcError {
    tracing::error!(error = ?err, "Failed to get the rate");

    // Every provider failure reaches here wrapped by the chain, so only an
    // interrupted lookup keeps a status of its own.
    match err.context_error() {
        Some(ctx_err) => RpcError::from(ctx_err),
        None => RpcError::new(RpcStatus::Unavailable, err.to_string()),
    }
}

fn mail_rpc_error(err: MailError) -> RpcError {
    tracing::error!(error = ?err, "Failed to send mail");

    match err {
        MailError::Cancelled(ctx_err) => RpcError::from(ctx_err),
        MailError::EmptyRecipients { .. } => {
            RpcError::new(RpcStatus::InvalidArgument, err.to_string())
        }
        err => RpcError::new(RpcStatus::Internal, err.to_string()),
    }
}
