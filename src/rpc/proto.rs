//! Request and response messages of the service methods.

pub const GET_RATE: &str = "GetRate";
pub const SUBSCRIBE: &str = "Subscribe";
pub const SEND_MAIL: &str = "SendMail";

pub use crate::domain::OutboundMessage as Mail;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RateResponse {
    pub rate: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}
