//! src/startup.rs
use crate::configuration::Settings;
use crate::email::Resend;
use crate::routes::{health_check, send_otp};
use crate::secret_store::{RestSecretStore, SecretStore};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn build(config: Settings) -> Result<Application, anyhow::Error> {
    let address = format!("{}:{}", config.application.host, config.application.port);
    let tcp_listener =
        TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;
    let port = tcp_listener.local_addr()?.port();

    let secret_store = RestSecretStore::new(
        config.secret_store.project_url(),
        config.secret_store.service_role_key(),
    );
    let resend = Resend::try_from(config.email).context("Invalid sender address")?;

    let server = run(tcp_listener, Arc::new(secret_store), resend)?;

    Ok(Application { port, server })
}

pub fn run(
    listener: TcpListener,
    secret_store: Arc<dyn SecretStore>,
    resend: Resend,
) -> Result<Server, std::io::Error> {
    let secret_store = web::Data::from(secret_store);
    let resend = web::Data::new(resend);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/send-otp", web::route().to(send_otp))
            .app_data(secret_store.clone())
            .app_data(resend.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
