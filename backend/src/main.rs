mod auth;
mod certificates;
mod config;
mod eligibility;
mod errors;
mod services;
mod shell;
mod state;
mod store;

use crate::config::Config;
use crate::state::AppState;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use std::io;
use std::thread;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let host = config.host.clone();
    let port = config.port;
    let url = config.public_url();
    let open_browser = config.open_browser;

    let state = AppState::from_config(config).map_err(|e| {
        error!("could not start the portal: {}", e);
        io::Error::other(e.to_string())
    })?;

    if open_browser {
        let login_url = format!("{}/login", url);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&login_url);
        });
    }

    info!("Server running at {}", url);

    let data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(data.clone())
            .configure(services::configure)
            .default_service(web::route().to(shell::serve))
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
