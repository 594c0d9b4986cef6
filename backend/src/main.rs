use actix_cors::Cors;
use actix_files::Files;
use actix_web::{web, App, HttpServer};
use backend::config::Config;
use backend::services::forms::{self, UPLOADS_PREFIX};
use backend::state::AppState;
use backend::db;
use env_logger::Env;
use log::info;
use std::fs;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    // Uploaded files land here; created up front so the first submission
    // and the static mount both find it.
    fs::create_dir_all(&config.uploads_dir)?;

    let conn = db::open(&config.database_path).map_err(io::Error::other)?;
    let state = web::Data::new(AppState::new(conn, config.uploads_dir.clone()));

    info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            // The form is served from another origin; keep the API open
            // to browsers the way the original deployment was.
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .service(Files::new(UPLOADS_PREFIX, state.uploads_dir.clone()))
            .service(forms::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
