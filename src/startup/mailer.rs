use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::config::{MailerSettings, Settings, TransportSettings};
use crate::mail::{MailDeliveryChain, MailTransport, ResendClient, SendGridClient};
use crate::routes::{health_check, rpc};
use crate::rpc::proto::SEND_MAIL;
use crate::startup::bind;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let transport = build_delivery_chain(&config.mailer);

        let (listener, port) = bind(&config.mailer.application)?;
        let server = run(listener, transport)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn build_delivery_chain(settings: &MailerSettings) -> Arc<dyn MailTransport> {
    let timeout = settings.timeout();
    let mut chain = MailDeliveryChain::new(build_transport(&settings.primary, timeout));

    if let Some(fallback) = &settings.fallback {
        chain = chain.with_fallback(build_transport(fallback, timeout));
    }

    Arc::new(chain)
}

fn build_transport(settings: &TransportSettings, timeout: Duration) -> Arc<dyn MailTransport> {
    match settings.clone() {
        TransportSettings::Sendgrid { base_url, api_key } => {
            Arc::new(SendGridClient::new(base_url, api_key, Some(timeout)))
        }
        TransportSettings::Resend { base_url, api_key } => {
            Arc::new(ResendClient::new(base_url, api_key, Some(timeout)))
        }
    }
}

pub fn run(
    listener: TcpListener,
    transport: Arc<dyn MailTransport>,
) -> Result<Server, std::io::Error> {
    let transport: web::Data<dyn MailTransport> = web::Data::from(transport);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route(
                &format!("/rpc/{}", SEND_MAIL),
                web::post().to(rpc::send_mail),
            )
            .app_data(transport.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
