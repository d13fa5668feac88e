use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_actix_web::TracingLogger;

use crate::broadcast::{BroadcastSender, CooldownGate, RateFormatter};
use crate::config::Settings;
use crate::rates::{RateSource, RateSourceChain, WithLogging};
use crate::routes::{health_check, rpc};
use crate::rpc::clients::{MailerClient, RateWatcherClient};
use crate::rpc::proto::SUBSCRIBE;
use crate::scheduler::{Scheduler, SendAdapter};
use crate::startup::{bind, invalid_config};
use crate::storage::{get_connection_db_pool, PostgresLastBroadcast, PostgresSubscribers};
use crate::subscription::SubscriptionService;

/// The subscription RPC server plus the scheduled broadcast running next to it.
pub struct Application {
    port: u16,
    server: Server,
    broadcasts: JoinHandle<()>,
    stop_broadcasts: CancellationToken,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);
        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

        let subscribers = Arc::new(PostgresSubscribers::new(db_pool.clone()));
        let settings = &config.subscription;
        let retry = config.rpc.retry_policy();

        let sender_email = settings.get_sender_email().map_err(invalid_config)?;
        let rates: Arc<dyn RateSource> = Arc::new(WithLogging::new(
            RateSourceChain::new(Arc::new(RateWatcherClient::new(
                settings.rate_watcher_url.clone(),
                retry.clone(),
            ))),
            "rate watcher",
        ));
        let mailer = Arc::new(MailerClient::new(settings.mailer_url.clone(), retry));

        let sender = BroadcastSender::new(
            subscribers.clone(),
            rates,
            mailer,
            RateFormatter::new(config.rate_watcher.pair()),
            sender_email.to_string(),
        );
        let gate = CooldownGate::new(
            settings.cooldown(),
            settings.claim_lease(),
            Arc::new(PostgresLastBroadcast::new(db_pool)),
            sender,
        );
        let scheduler = Scheduler::from_trigger(settings.schedule.trigger())
            .map_err(|err| invalid_config(err.to_string()))?;
        let stop_broadcasts = scheduler.shutdown_token();

        tracing::info!(schedule = ?settings.schedule, "Scheduling rate broadcasts");
        let broadcasts = scheduler.schedule(SendAdapter::new(gate, settings.broadcast_timeout()));

        let service = SubscriptionService::new(subscribers);
        let (listener, port) = bind(&settings.application)?;
        let server = run(listener, service)?;

        Ok(Self {
            port,
            server,
            broadcasts,
            stop_broadcasts,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        let result = self.server.await;

        self.stop_broadcasts.cancel();
        if let Err(err) = self.broadcasts.await {
            tracing::error!(error = ?err, "Broadcast scheduler ended abnormally");
        }

        result
    }
}

pub fn run(listener: TcpListener, service: SubscriptionService) -> Result<Server, std::io::Error> {
    let service = web::Data::new(service);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route(
                &format!("/rpc/{}", SUBSCRIBE),
                web::post().to(rpc::subscribe),
            )
            .app_data(service.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
