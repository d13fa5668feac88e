pub mod currency_pair;
pub mod outbound_message;
pub mod subscriber;
pub mod subscriber_email;

pub use currency_pair::CurrencyPair;
pub use outbound_message::OutboundMessage;
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;
