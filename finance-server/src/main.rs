#[macro_use]
extern crate tracing;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context};
use rustls::{Certificate, PrivateKey, ServerConfig};
use rustls_pemfile::{certs, pkcs8_private_keys};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use finance_lib::config::{Config, SSLConfig};
use finance_lib::error::{json_error_handler, path_error_handler};
use finance_lib::transaction::service::TransactionService;

const SERVICE_NAME: &str = "finance-server";

#[actix_web::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    let tracing_guard = tracing::subscriber::set_default(subscriber);
    info!("tracing initialized");

    let config = match get_config_file() {
        Some(config_path) => {
            info!(config_path = %config_path.display(), "Reading config file");
            Config::from_file(config_path)?
        }
        None => {
            info!("No config file found, reading config from environment");
            Config::from_env()?
        }
    };

    let telemetry_layer = config
        .telemetry
        .as_ref()
        .map(|telemetry| finance_lib::tracing::create_opentelemetry_layer(SERVICE_NAME, telemetry))
        .transpose()?;

    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default())
        .with(telemetry_layer);
    tracing::subscriber::set_global_default(subscriber).context("Unable to set up tracing")?;
    drop(tracing_guard);

    let (user_repo, transaction_repo, health_check) =
        finance_repo::sqlx_repo::create_repos(&config.database_url, config.max_pool_size).await?;

    let transaction_service = Data::new(TransactionService::new(
        user_repo.clone(),
        transaction_repo,
    ));
    let user_repo = Data::new(user_repo);
    let health_check = Data::new(health_check);
    let signups_enabled = config.signups_enabled;
    if signups_enabled {
        info!("Signups are enabled");
    }

    let server = HttpServer::new(move || {
        App::new()
            .app_data(transaction_service.clone())
            .app_data(user_repo.clone())
            .app_data(health_check.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .wrap(finance_lib::tracing::create_middleware())
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .service(finance_lib::api_service(signups_enabled))
    });
    let server = match &config.ssl {
        None => {
            warn!("Using http");
            server.bind(&config.bind_address)?
        }
        Some(ssl_config) => {
            info!("Using https");
            server.bind_rustls(&config.bind_address, load_rustls_config(ssl_config)?)?
        }
    };
    info!(bind_address = %config.bind_address, "Starting server");
    server.run().await?;

    Ok(())
}

fn get_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn load_rustls_config(ssl_config: &SSLConfig) -> Result<ServerConfig, anyhow::Error> {
    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth();

    let mut cert_file = BufReader::new(
        File::open(&ssl_config.certificate_chain_file)
            .context("Error opening certificate chain file")?,
    );
    let mut key_file = BufReader::new(
        File::open(&ssl_config.private_key_file).context("Error opening private key file")?,
    );

    let cert_chain = certs(&mut cert_file)
        .context("Unable to read certificate chain file")?
        .into_iter()
        .map(Certificate)
        .collect();
    let mut keys: Vec<PrivateKey> = pkcs8_private_keys(&mut key_file)
        .context("Unable to read private key file")?
        .into_iter()
        .map(PrivateKey)
        .collect();

    if keys.is_empty() {
        bail!("No private key found in file");
    }

    config
        .with_single_cert(cert_chain, keys.remove(0))
        .context("Invalid certificate or private key")
}
