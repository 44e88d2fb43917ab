use crate::config::AppConfig;
use crate::db::connection::{init_db, seed_db, Database};
use crate::router::{respond, App};
use astra::{Body, Response};
use http::{Method, Request};
use rusqlite::params;
use std::io::Read;
use std::path::Path;

/// A fresh app on a temp database with the production schema.
/// Keep the `TempDir` alive for as long as the app is used.
pub fn test_app(seed: bool) -> (tempfile::TempDir, App) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("test.sqlite3");
    let db = Database::new(db_path.clone());

    init_db(&db, Path::new("sql/schema.sql"))
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    if seed {
        seed_db(&db, Path::new("sql/seed.sql"))
            .unwrap_or_else(|e| panic!("Seeding failed: {e}"));
    }

    let config = AppConfig {
        db_path,
        ..AppConfig::default()
    };
    (dir, App { db, config })
}

pub fn get(app: &App, uri: &str) -> Response {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    respond(req, app)
}

pub fn body_string(resp: &mut Response) -> String {
    let mut body_bytes = Vec::new();
    resp.body_mut()
        .reader()
        .read_to_end(&mut body_bytes)
        .unwrap();
    String::from_utf8(body_bytes).unwrap()
}

pub fn location(resp: &Response) -> &str {
    resp.headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Publishes a rental listing after the page under test was rendered.
pub fn publish_listing(app: &App, id: i64, lat: &str, lng: &str, listed_at: &str) {
    app.db
        .with_conn(|conn| {
            conn.execute(
                "INSERT INTO listings (id, title, listing_kind, price, city, latitude, longitude, listed_at)
                 VALUES (?1, ?2, 'rent', 60000, 'Dammam', ?3, ?4, ?5)",
                params![id, format!("Listing {id}"), lat, lng, listed_at],
            )?;
            Ok(())
        })
        .expect("Failed to publish listing");
}
