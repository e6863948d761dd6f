use std::io;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};
use secrecy::ExposeSecret;

use bi_dashboard::accounts::{self, blocking::BlockingAccounts};
use bi_dashboard::auth::{rate_limit::RateLimiter, token::TokenSigner};
use bi_dashboard::config::{self, AppSettings, Settings};
use bi_dashboard::store::{AccountStore, PgStore, SharedStore};
use bi_dashboard::{bridge, db, handlers, seed};

fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    let path = config::config_path();
    let settings = config::load(&path)
        .map_err(|e| io::Error::other(format!("Failed to load {}: {e}", path.display())))?;

    let level = if settings.app.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("Loaded configuration from {}", path.display());

    match std::env::args().nth(1).as_deref() {
        Some("seed") => run_seed(&settings),
        Some(other) => Err(io::Error::other(format!("Unknown command '{other}'"))),
        None => actix_web::rt::System::new().block_on(serve(settings)),
    }
}

/// Session encryption key: config, then `SESSION_KEY`, then random.
fn session_key(app: &AppSettings) -> Key {
    let configured = app
        .session_key
        .as_ref()
        .map(|k| k.expose_secret().to_string())
        .or_else(|| std::env::var("SESSION_KEY").ok());

    match configured {
        Some(val) => match Key::try_from(val.as_bytes()) {
            Ok(key) => {
                log::info!("Using configured session key");
                key
            }
            Err(_) => {
                log::warn!("Session key too short ({} bytes, need 64+), generating random key", val.len());
                Key::generate()
            }
        },
        None => {
            log::warn!("No session key set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    }
}

fn token_signer(app: &AppSettings) -> TokenSigner {
    match &app.token_secret {
        Some(secret) => TokenSigner::new(secret.expose_secret()),
        None => {
            log::warn!("No app.token_secret set, tokens will not survive a restart");
            TokenSigner::random()
        }
    }
}

fn run_seed(settings: &Settings) -> io::Result<()> {
    bridge::run_blocking(async {
        let pool = db::init_pool(&settings.database);
        let migrated = db::run_migrations(&pool).await;
        pool.close().await;
        migrated
    })
    .map_err(io::Error::other)?
    .map_err(io::Error::other)?;

    let accounts = BlockingAccounts::new(&settings.database, token_signer(&settings.app));
    let summary = seed::run(&accounts);
    if !summary.admin_authenticated {
        return Err(io::Error::other("seeded admin could not log in"));
    }
    Ok(())
}

async fn serve(settings: Settings) -> io::Result<()> {
    let pool = db::init_pool(&settings.database);
    if let Err(e) = db::run_migrations(&pool).await {
        log::error!("Migrations failed, continuing without them: {e}");
    }

    let store: SharedStore = Arc::new(PgStore::new(pool));
    match accounts::ensure_default_company(store.as_ref(), &settings.empresa.name).await {
        Ok(Some(company)) => log::info!("Seeded default company '{}'", company.name),
        Ok(None) => {}
        Err(e) => log::warn!("Could not seed default company: {e}"),
    }

    let secret_key = session_key(&settings.app);
    let store: web::Data<dyn AccountStore> = web::Data::from(store);
    let signer = web::Data::new(token_signer(&settings.app));
    let limiter = web::Data::new(RateLimiter::new());
    let branding = web::Data::new(settings.empresa.clone());

    let host = settings.app.host.clone();
    let port = settings.app.port;
    log::info!("Starting server at http://{host}:{port}");

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(store.clone())
            .app_data(signer.clone())
            .app_data(limiter.clone())
            .app_data(branding.clone())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
