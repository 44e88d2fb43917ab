use crate::config::AppConfig;
use crate::db::{init_db, seed_db, Database};
use crate::router::{respond, App};
use astra::{Request, Server};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod db;
mod domain;
mod errors;
mod map;
mod responses;
mod router;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "listings_map=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 1️⃣ Load configuration
    let config = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Configuration failed: {e}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Create the database handle and apply the schema
    let db = Database::new(config.db_path.clone());
    if let Err(e) = init_db(&db, &config.schema_path) {
        error!("❌ Database initialization failed: {e}");
        std::process::exit(1);
    }

    if let Some(seed) = &config.seed_path {
        if let Err(e) = seed_db(&db, seed) {
            error!("❌ Seeding demo listings failed: {e}");
            std::process::exit(1);
        }
    }

    // 3️⃣ Start the server
    let addr = config.bind_addr;
    info!("Starting server at http://{addr}");

    let server = Server::bind(&addr).max_workers(config.max_workers);
    let app = App { db, config };

    // 4️⃣ Serve requests, passing the app handle into the closure
    let result = server.serve(move |req: Request, _info| {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let resp = respond(req, &app);
        info!(%method, %path, status = resp.status().as_u16(), "request");
        resp
    });

    if let Err(e) = result {
        error!("Server ended with error: {e}");
    }

    info!("Server shut down cleanly.");
}
