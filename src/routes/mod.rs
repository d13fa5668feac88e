pub mod health_check;
pub mod rate;
pub mod rpc;
pub mod subscriptions;

pub use health_check::health_check;
pub use rate::get_rate;
pub use subscriptions::handle_create_subscription;
