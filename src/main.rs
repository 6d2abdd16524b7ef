use axum::{Extension, Router};
use std::sync::Arc;

use drink_mixer_bot::bot::Bot;
use drink_mixer_bot::cocktail_client::CocktailDbClient;
use drink_mixer_bot::config::{AppConfig, DeliveryMode};
use drink_mixer_bot::conversation::ConversationEngine;
use drink_mixer_bot::error::BotError;
use drink_mixer_bot::services::{PgUsageStore, SessionStore};
use drink_mixer_bot::telegram_client::TelegramClient;
use drink_mixer_bot::{db, handlers, middleware, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run().await {
        tracing::error!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BotError> {
    let config = AppConfig::from_env()?;

    let db_pool = db::create_pool(&config.database_url).await?;

    if config.cocktail_api_key.is_some() {
        tracing::info!("🍸 Using TheCocktailDB premium API");
    } else {
        tracing::warn!("COCKTAIL_DB_API_KEY not found. Using the public demo API.");
    }
    let catalog = Arc::new(CocktailDbClient::new(
        config.cocktail_api_key.clone(),
        config.catalog_timeout,
    )?);

    let sessions = Arc::new(SessionStore::new(Arc::new(PgUsageStore::new(db_pool.clone()))));
    match config.session_idle_ttl {
        Some(ttl) => {
            sessions.clone().spawn_sweeper(ttl);
            tracing::info!("Sessions expire after {}s idle", ttl.as_secs());
        }
        None => tracing::warn!("Session expiry disabled; sessions live for the whole process"),
    }

    let engine = Arc::new(ConversationEngine::new(catalog, sessions));
    let telegram = Arc::new(TelegramClient::new(&config.telegram_token)?);
    let bot = Arc::new(Bot::new(engine, telegram));

    match config.delivery {
        DeliveryMode::Polling => {
            tokio::select! {
                result = bot.run_polling() => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
            }
        }
        DeliveryMode::Webhook { public_url, port } => {
            let hook_url = format!("{}/webhook/{}", public_url, config.telegram_token);
            bot.telegram().set_webhook(&hook_url).await?;
            tracing::info!("✅ Webhook registered at {}/webhook/<token>", public_url);

            let shared_state = Arc::new(AppState {
                db_pool,
                bot,
                webhook_token: config.telegram_token.clone(),
            });

            let app = Router::new()
                .merge(handlers::webhook::webhook_routes())
                .merge(handlers::status::status_routes())
                .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
                .layer(Extension(shared_state));

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
            tracing::info!("listening on {}", listener.local_addr()?);
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    tokio::signal::ctrl_c().await.ok();
                    tracing::info!("Shutting down");
                })
                .await?;
        }
    }

    Ok(())
}

// Structured logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "info,drink_mixer_bot=debug,sqlx=warn,reqwest=warn,hyper=info".to_string()
        } else {
            "info,drink_mixer_bot=info,sqlx=warn,reqwest=warn,hyper=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("🍹 Drink Mixer bot starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log level: {}", log_level);

    Ok(())
}
