use std::time::Duration;

use config::{Config, ConfigError, File};
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};

use crate::domain::{CurrencyPair, SubscriberEmail};
use crate::rpc::{RetryPolicy, RpcStatus};
use crate::scheduler::Trigger;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub rpc: RpcSettings,
    pub gateway: GatewaySettings,
    pub rate_watcher: RateWatcherSettings,
    pub mailer: MailerSettings,
    pub subscription: SubscriptionSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub name: String,
    pub require_ssl: bool,
}

#[derive(serde::Deserialize, Clone)]
pub struct RpcSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub per_attempt_timeout_milliseconds: u64,
    pub retry_codes: Vec<RpcStatus>,
}

#[derive(serde::Deserialize, Clone)]
pub struct GatewaySettings {
    pub application: ApplicationSettings,
    pub rate_watcher_url: String,
    pub subscription_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub rate_timeout_milliseconds: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub subscribe_timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct RateWatcherSettings {
    pub application: ApplicationSettings,
    pub base: String,
    pub target: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    /// Tried in this order.
    pub providers: Vec<ProviderSettings>,
}

#[derive(serde::Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderSettings {
    Exchangerate {
        base_url: String,
        api_key: Secret<String>,
    },
    Cryptocompare {
        base_url: String,
        api_key: Secret<String>,
    },
    Privat {
        base_url: String,
    },
    ExchangeApi {
        base_url: String,
    },
}

#[derive(serde::Deserialize, Clone)]
pub struct MailerSettings {
    pub application: ApplicationSettings,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    pub primary: TransportSettings,
    pub fallback: Option<TransportSettings>,
}

#[derive(serde::Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportSettings {
    Sendgrid {
        base_url: String,
        api_key: Secret<String>,
    },
    Resend {
        base_url: String,
        api_key: Secret<String>,
    },
}

#[derive(serde::Deserialize, Clone)]
pub struct SubscriptionSettings {
    pub application: ApplicationSettings,
    pub sender_email: String,
    pub rate_watcher_url: String,
    pub mailer_url: String,
    pub schedule: ScheduleSettings,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub cooldown_seconds: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub claim_lease_seconds: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub broadcast_timeout_seconds: u64,
}

#[derive(serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleSettings {
    Interval {
        #[serde(deserialize_with = "deserialize_number_from_string")]
        seconds: u64,
    },
    Daily {
        #[serde(deserialize_with = "deserialize_number_from_string")]
        hour: u32,
        #[serde(deserialize_with = "deserialize_number_from_string")]
        minute: u32,
    },
}

impl ApplicationSettings {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseSettings {
    /// Connection options for the server itself, used to create databases.
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };

        PgConnectOptions::new()
            .host(&self.host)
            .password(self.password.expose_secret())
            .username(&self.username)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn get_db_options(&self) -> PgConnectOptions {
        let mut db_options = self.without_db().database(&self.name);

        db_options.log_statements(tracing::log::LevelFilter::Trace);

        db_options
    }
}

impl RpcSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_codes.clone(),
            self.max_attempts,
            Duration::from_millis(self.per_attempt_timeout_milliseconds),
        )
    }
}

impl GatewaySettings {
    pub fn rate_timeout(&self) -> Duration {
        Duration::from_millis(self.rate_timeout_milliseconds)
    }

    pub fn subscribe_timeout(&self) -> Duration {
        Duration::from_millis(self.subscribe_timeout_milliseconds)
    }
}

impl RateWatcherSettings {
    pub fn pair(&self) -> CurrencyPair {
        CurrencyPair::new(&self.base, &self.target)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

impl ProviderSettings {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderSettings::Exchangerate { .. } => "exchangerate",
            ProviderSettings::Cryptocompare { .. } => "cryptocompare",
            ProviderSettings::Privat { .. } => "privat",
            ProviderSettings::ExchangeApi { .. } => "exchange_api",
        }
    }
}

impl MailerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

impl SubscriptionSettings {
    pub fn get_sender_email(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender_email.clone())
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_seconds)
    }

    pub fn claim_lease(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.claim_lease_seconds)
    }

    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_secs(self.broadcast_timeout_seconds)
    }
}

impl ScheduleSettings {
    pub fn trigger(&self) -> Trigger {
        match self {
            ScheduleSettings::Interval { seconds } => Trigger::Every(Duration::from_secs(*seconds)),
            ScheduleSettings::Daily { hour, minute } => Trigger::DailyAt {
                hour: *hour,
                minute: *minute,
            },
        }
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir()
        .map_err(|err| ConfigError::Message(format!("Failed to determine the current directory: {}", err)))?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_GATEWAY__APPLICATION__PORT would set Settings.gateway.application.port
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
