mod api;
mod auth;
mod cache;
mod config;
mod datastore;
mod forms;
mod metrics;
mod veil;

use crate::api::posts::ListingCache;
use crate::config::{Config, Settings};
use crate::datastore::sqlite::SqliteStore;
use actix_web::{
    dev::{Service, ServiceResponse},
    middleware, web, App, HttpServer,
};
use futures::future::FutureExt;
use std::time::Duration;
use tracing::{info, warn, Level};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args: Vec<_> = std::env::args().collect();
    let [_, config_file_path, ..] = &args[..] else {
        eprintln!("First argument should be path to config file");
        return Ok(());
    };

    let config = Config::from_file(config_file_path);

    // Set up logger output
    let subscriber_builder = tracing_subscriber::fmt().with_max_level(Level::DEBUG);
    if config.human_logs {
        subscriber_builder.init();
    } else {
        subscriber_builder.json().init();
    }

    info!("starting quill");

    // Build the SQLite store
    let db = SqliteStore::new(
        &config.db_path,
        config.db_pool_size,
        Duration::from_secs(config.db_connection_timeout),
    )
    .expect("couldn't open the database");
    db.ensure_schema().expect("couldn't apply the schema");
    prometheus::register(Box::new(db.clone())).expect("couldn't register DB metrics");

    if config.disable_auth {
        warn!("Auth is disabled. This should only happen in testing.");
    }
    let state = api::State { ds: db };
    let settings = Settings::from_config(&config);
    let listing_cache = web::Data::new(ListingCache::new());

    // Start the API server
    info!(addr = &config.listen_address[..], "starting API server");
    let max_body_size = config.max_body_size;
    let api_server = HttpServer::new(move || {
        App::new()
            // Middleware for Prometheus
            .wrap_fn(|request, srv| srv.call(request).map(increment_response_metrics))
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(settings.clone()))
            .app_data(listing_cache.clone())
            // enable logger
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            // limit size of the payload (global configuration)
            .app_data(web::JsonConfig::default().limit(max_body_size))
            .configure(api::posts::configure::<SqliteStore>)
            .service(web::scope("/admin").configure(api::admin::configure::<SqliteStore>))
            .default_service(web::route().to(api::posts::not_found))
    })
    .bind(config.listen_address.clone())?
    .run();

    // Start the metrics server
    info!(addr = &config.metrics_address[..], "starting metrics server");
    let metrics_server = HttpServer::new(|| {
        App::new().service(
            web::scope("/metrics")
                .service(web::resource("/").route(web::get().to(metrics::endpoint::gather)))
                .service(web::resource("").route(web::get().to(metrics::endpoint::gather))),
        )
    })
    .bind(config.metrics_address.clone())?
    .run();

    futures::try_join!(api_server, metrics_server)?;
    Ok(())
}

/// If response is OK, increment the metrics for HTTP statuses.
fn increment_response_metrics<E, B>(
    response: Result<ServiceResponse<B>, E>,
) -> Result<ServiceResponse<B>, E> {
    match response {
        Ok(response) => {
            metrics::HTTP_RESPONSES
                .with_label_values(&[response.status().as_str()])
                .inc();
            Ok(response)
        }
        other => other,
    }
}
