use rate_notifier::config::get_configuration;
use rate_notifier::startup::mailer::Application;
use rate_notifier::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("mailer".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config).await?;

    tracing::info!("mailer listening on port {}", application.get_port());

    application.run_until_stop().await
}
