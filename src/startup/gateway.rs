use std::net::TcpListener;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::config::Settings;
use crate::routes::{get_rate, handle_create_subscription, health_check};
use crate::rpc::clients::{RateWatcherClient, SubscriptionClient};
use crate::startup::bind;

/// Budget of each public request, covering every retry behind it.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeouts {
    pub rate: Duration,
    pub subscribe: Duration,
}

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let retry = config.rpc.retry_policy();
        let rate_watcher =
            RateWatcherClient::new(config.gateway.rate_watcher_url.clone(), retry.clone());
        let subscription = SubscriptionClient::new(config.gateway.subscription_url.clone(), retry);
        let timeouts = RequestTimeouts {
            rate: config.gateway.rate_timeout(),
            subscribe: config.gateway.subscribe_timeout(),
        };

        let (listener, port) = bind(&config.gateway.application)?;
        let server = run(listener, rate_watcher, subscription, timeouts)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    rate_watcher: RateWatcherClient,
    subscription: SubscriptionClient,
    timeouts: RequestTimeouts,
) -> Result<Server, std::io::Error> {
    let rate_watcher = web::Data::new(rate_watcher);
    let subscription = web::Data::new(subscription);
    let timeouts = web::Data::new(timeouts);

    let server = HttpServer::new(move || {
        App::new()
            // Adds a span, with a request id, around every incoming request
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/rate", web::get().to(get_rate))
                    .route("/subscribe", web::post().to(handle_create_subscription)),
            )
            .app_data(rate_watcher.clone())
            .app_data(subscription.clone())
            .app_data(timeouts.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
