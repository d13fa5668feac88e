pub mod mailer;
pub mod rate_watcher;
pub mod subscription;

pub use mailer::MailerClient;
pub use rate_watcher::RateWatcherClient;
pub use subscription::SubscriptionClient;
