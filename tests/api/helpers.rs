use reqwest::Response;
use secrecy::Secret;
use serde::Serialize;
use sqlx::{migrate, Connection, Executor, PgConnection, PgPool};
use uuid::Uuid;
use wiremock::MockServer;

use rate_notifier::config::{
    get_configuration, DatabaseSettings, ProviderSettings, ScheduleSettings, Settings,
    TransportSettings,
};
use rate_notifier::startup::{gateway, mailer, rate_watcher, subscription};
use rate_notifier::storage::get_connection_db_pool;

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
}

fn test_configuration() -> Settings {
    let mut config = get_configuration().expect("Missing configuration file.");

    // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
    // take into account: when port is 0, the OS will search for the first available port
    config.gateway.application.port = 0;
    config.rate_watcher.application.port = 0;
    config.mailer.application.port = 0;
    config.subscription.application.port = 0;

    config
}

impl TestApp {
    fn new(port: u16) -> TestApp {
        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            api_client: reqwest::Client::new(),
        }
    }

    pub async fn spawn_gateway(rate_watcher: &MockServer, subscription: &MockServer) -> TestApp {
        TestApp::spawn_gateway_at(rate_watcher.uri(), subscription.uri()).await
    }

    pub async fn spawn_gateway_at(rate_watcher_url: String, subscription_url: String) -> TestApp {
        let mut config = test_configuration();
        config.gateway.rate_watcher_url = rate_watcher_url;
        config.gateway.subscription_url = subscription_url;

        let application = gateway::Application::build(config)
            .await
            .expect("Failed to build gateway.");
        let test_app = TestApp::new(application.get_port());

        tokio::spawn(application.run_until_stop());

        test_app
    }

    /// Every provider in `providers` points at `provider_server`, in the given order.
    pub async fn spawn_rate_watcher(provider_server: &MockServer, providers: &[&str]) -> TestApp {
        let mut config = test_configuration();
        config.rate_watcher.providers = providers
            .iter()
            .map(|kind| provider(kind, provider_server.uri()))
            .collect();

        let application = rate_watcher::Application::build(config)
            .await
            .expect("Failed to build rate watcher.");
        let test_app = TestApp::new(application.get_port());

        tokio::spawn(application.run_until_stop());

        test_app
    }

    pub async fn spawn_mailer(sendgrid: &MockServer, resend: Option<&MockServer>) -> TestApp {
        let mut config = test_configuration();
        config.mailer.primary = TransportSettings::Sendgrid {
            base_url: sendgrid.uri(),
            api_key: Secret::new("sendgrid-key".into()),
        };
        config.mailer.fallback = resend.map(|server| TransportSettings::Resend {
            base_url: server.uri(),
            api_key: Secret::new("resend-key".into()),
        });

        let application = mailer::Application::build(config)
            .await
            .expect("Failed to build mailer.");
        let test_app = TestApp::new(application.get_port());

        tokio::spawn(application.run_until_stop());

        test_app
    }

    /// Runs against a fresh database, returned alongside the app to inspect what it stored.
    pub async fn spawn_subscription(rate_watcher: &MockServer, mailer: &MockServer) -> (TestApp, PgPool) {
        let mut config = test_configuration();
        config.subscription.rate_watcher_url = rate_watcher.uri();
        config.subscription.mailer_url = mailer.uri();
        // Keeps the broadcast loop quiet for the lifetime of a test.
        config.subscription.schedule = ScheduleSettings::Interval { seconds: 3600 };

        let db_pool = configure_db(&mut config.database).await;

        let application = subscription::Application::build(config)
            .await
            .expect("Failed to build subscription service.");
        let test_app = TestApp::new(application.get_port());

        tokio::spawn(application.run_until_stop());

        (test_app, db_pool)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.api_client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_subscribe(&self, body: &str) -> Response {
        self.api_client
            .post(format!("{}/api/subscribe", self.address))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_rpc<T: Serialize>(&self, method: &str, body: &T) -> Response {
        self.api_client
            .post(format!("{}/rpc/{}", self.address, method))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

fn provider(kind: &str, base_url: String) -> ProviderSettings {
    let api_key = || Secret::new("provider-key".to_string());

    match kind {
        "exchangerate" => ProviderSettings::Exchangerate {
            base_url,
            api_key: api_key(),
        },
        "cryptocompare" => ProviderSettings::Cryptocompare {
            base_url,
            api_key: api_key(),
        },
        "privat" => ProviderSettings::Privat { base_url },
        "exchange_api" => ProviderSettings::ExchangeApi { base_url },
        unknown => panic!("{} is not a rate provider", unknown),
    }
}

/// Creates a uniquely named database, runs the migrations on it and points `db_config` at it.
pub async fn configure_db(db_config: &mut DatabaseSettings) -> PgPool {
    let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));

    // Create database
    let mut connection = PgConnection::connect_with(&db_config.without_db())
        .await
        .expect("Failed to connect to Postgres.");

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    // Execute migrations
    db_config.name = db_test_name;

    let db_pool = get_connection_db_pool(db_config);

    migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations.");

    db_pool
}

pub async fn test_db_pool() -> PgPool {
    let mut config = test_configuration();

    configure_db(&mut config.database).await
}
