use std::str::FromStr;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use care_booking::{
    config::Config,
    db,
    email::Mailer,
    payments::{DisabledGateway, PaymentGateway, StripeGateway},
    routes,
    state::AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    db::ensure_sqlite_dir(&config.database_url)?;

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    db::run_migrations(&pool).await?;
    db::seed_admin(&pool, &config).await?;

    let payments: Arc<dyn PaymentGateway> = match &config.stripe_secret_key {
        Some(key) => Arc::new(StripeGateway::new(key.clone())),
        None => {
            log::warn!("STRIPE_SECRET_KEY not set. Pay-now bookings will be rejected.");
            Arc::new(DisabledGateway)
        }
    };

    let mailer = config.smtp.as_ref().map(Mailer::new);
    if mailer.is_none() {
        log::warn!("SMTP not configured. Invoice emails are disabled.");
    }

    let state = AppState {
        db: pool.clone(),
        payments,
        mailer,
    };

    let address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting care-booking on http://{address}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}
