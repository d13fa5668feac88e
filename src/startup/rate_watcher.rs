use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::config::{ProviderSettings, RateWatcherSettings, Settings};
use crate::rates::providers::{
    CryptoCompareClient, ExchangeApiClient, ExchangeRateClient, PrivatClient,
};
use crate::rates::{RateSource, RateSourceChain, WithLogging};
use crate::routes::{health_check, rpc};
use crate::rpc::proto::GET_RATE;
use crate::startup::{bind, invalid_config};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let rates = build_rate_source(&config.rate_watcher)?;

        let (listener, port) = bind(&config.rate_watcher.application)?;
        let server = run(listener, rates)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Builds the provider chain in configured priority order. Every provider is
/// logged on its own and the chain as a whole is logged once more.
pub fn build_rate_source(
    settings: &RateWatcherSettings,
) -> Result<Arc<dyn RateSource>, std::io::Error> {
    let pair = settings.pair();
    let timeout = Some(settings.timeout());

    let mut sources = settings.providers.iter().map(|provider| {
        let name = provider.name();
        let source: Arc<dyn RateSource> = match provider.clone() {
            ProviderSettings::Exchangerate { base_url, api_key } => Arc::new(WithLogging::new(
                ExchangeRateClient::new(base_url, api_key, pair.clone(), timeout),
                name,
            )),
            ProviderSettings::Cryptocompare { base_url, api_key } => Arc::new(WithLogging::new(
                CryptoCompareClient::new(base_url, api_key, pair.clone(), timeout),
                name,
            )),
            ProviderSettings::Privat { base_url } => Arc::new(WithLogging::new(
                PrivatClient::new(base_url, pair.clone(), timeout),
                name,
            )),
            ProviderSettings::ExchangeApi { base_url } => Arc::new(WithLogging::new(
                ExchangeApiClient::new(base_url, pair.clone(), timeout),
                name,
            )),
        };
        source
    });

    let primary = sources
        .next()
        .ok_or_else(|| invalid_config("at least one rate provider must be configured"))?;
    let chain = sources.fold(RateSourceChain::new(primary), RateSourceChain::with_source);

    tracing::info!(providers = chain.len(), pair = %pair, "Rate source chain built");

    Ok(Arc::new(WithLogging::new(chain, "rate chain")))
}

pub fn run(listener: TcpListener, rates: Arc<dyn RateSource>) -> Result<Server, std::io::Error> {
    let rates: web::Data<dyn RateSource> = web::Data::from(rates);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route(
                &format!("/rpc/{}", GET_RATE),
                web::post().to(rpc::get_rate),
            )
            .app_data(rates.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
