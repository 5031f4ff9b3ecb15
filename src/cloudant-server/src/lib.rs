//! cloudant-server - an in-memory emulator of the Cloudant/CouchDB HTTP API
//!
//! Covers the surface used by the `cloudant` client: cluster info, databases,
//! documents with revisions, JSON indexes and `_find` queries.
//!
//! # Embedded Usage
//!
//! ```rust,no_run
//! use cloudant_server::{config::ServerConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
//!     run(listener, ServerConfig::default())?.await
//! }
//! ```

pub use cloudant_core;

pub mod api;
pub mod config;
pub mod selector;
pub mod store;

use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::config::ServerConfig;

/// Start serving on an already bound listener
///
/// The returned server must be awaited (or spawned) to make progress.
pub fn run(listener: TcpListener, config: ServerConfig) -> std::io::Result<Server> {
    let app_state = web::Data::new(api::AppState::new(config));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .configure(api::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    Ok(server)
}
