use api_rest::{router, AppState};
use api_shared::HealthService;
use mutu_core::config::{
    password_iterations_from_env_value, session_cookie_from_env_value,
    session_secret_from_env_value, store_backend_from_env_value,
};
use mutu_core::constants::DEFAULT_REST_ADDR;
use mutu_core::{CoreConfig, Services, StoreBackend};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates logged at `info` unless `RUST_LOG` says otherwise.
const LOG_DIRECTIVES: [&str; 4] = ["mutu=info", "mutu_run=info", "mutu_core=info", "api_rest=info"];

fn env_filter() -> anyhow::Result<tracing_subscriber::EnvFilter> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in LOG_DIRECTIVES {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Main entry point for the Mutu server
///
/// Reads configuration once, opens the record stores and serves the REST API with
/// OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `MUTU_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MUTU_DATA_DIR`: Directory for record files; records stay in memory when unset
/// - `MUTU_PASSWORD_ITERATIONS`: PBKDF2 iterations for new password hashes (default: 100000)
/// - `MUTU_SESSION_COOKIE`: Name of the session cookie (default: "mutu_session")
/// - `MUTU_SESSION_SECRET`: Key for signing session tokens, at least 32 bytes; a random key is
///   used when unset, so sessions end when the server restarts
///
/// # Errors
/// Returns an error if the configuration is invalid, the data directory cannot be opened or
/// the address cannot be bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("MUTU_REST_ADDR").unwrap_or_else(|_| DEFAULT_REST_ADDR.into());
    let backend = store_backend_from_env_value(std::env::var("MUTU_DATA_DIR").ok());
    let iterations =
        password_iterations_from_env_value(std::env::var("MUTU_PASSWORD_ITERATIONS").ok())?;
    let cookie = session_cookie_from_env_value(std::env::var("MUTU_SESSION_COOKIE").ok());
    let secret = session_secret_from_env_value(std::env::var("MUTU_SESSION_SECRET").ok())?;

    match &backend {
        StoreBackend::Memory => {
            tracing::warn!("MUTU_DATA_DIR not set; records are kept in memory only")
        }
        StoreBackend::Files(dir) => tracing::info!("++ Records stored under {}", dir.display()),
    }

    let mut cfg = CoreConfig::new(backend, iterations, cookie)?;
    match secret {
        Some(secret) => cfg = cfg.with_session_secret(secret),
        None => tracing::warn!("MUTU_SESSION_SECRET not set; sessions will not survive a restart"),
    }
    let services = Services::open(&cfg)?;
    let app = router(AppState::new(cfg, services));

    tracing::info!("++ Starting Mutu REST on {}", rest_addr);
    tracing::info!("{}", HealthService::check_health().message);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("-- Shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_directives_parse_and_cover_the_server() {
        for directive in LOG_DIRECTIVES {
            assert!(
                directive.parse::<tracing_subscriber::filter::Directive>().is_ok(),
                "bad directive {directive}"
            );
        }
        assert!(LOG_DIRECTIVES.contains(&"mutu_run=info"));
    }
}
