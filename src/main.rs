//! nox-billing server binary.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;

use nox_billing::adapters::auth::{SupabaseConfig, SupabaseSessionValidator};
use nox_billing::adapters::clock::SystemClock;
use nox_billing::adapters::http::{create_app, HttpSettings, SubscriptionAppState};
use nox_billing::adapters::postgres::{run_migrations, PostgresPaymentLedger, PostgresProfileStore};
use nox_billing::adapters::razorpay::{RazorpayConfig, RazorpayGateway};
use nox_billing::config::AppConfig;
use nox_billing::domain::subscription::{PaymentSignatureVerifier, PlanCatalog};
use nox_billing::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;

    telemetry::init_tracing(&config.server);
    tracing::info!(
        environment = ?config.server.environment,
        razorpay_live = config.payment.is_live_mode(),
        "Starting nox-billing"
    );

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Database pool created");

    if config.database.run_migrations {
        run_migrations(&pool).await.context("failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let catalog = PlanCatalog::load(config.plans.catalog_path()).context("failed to load plan catalog")?;
    tracing::info!(plans = catalog.plans().len(), "Plan catalog loaded");

    let currency = config.payment.currency_code()?;
    let gateway = RazorpayGateway::new(RazorpayConfig::from(&config.payment));
    let verifier = PaymentSignatureVerifier::new(config.payment.razorpay_key_secret.clone());
    let validator = SupabaseSessionValidator::new(SupabaseConfig::from(&config.auth));

    let state = SubscriptionAppState {
        gateway: Arc::new(gateway),
        profiles: Arc::new(PostgresProfileStore::new(pool.clone())),
        ledger: Arc::new(PostgresPaymentLedger::new(pool)),
        verifier: Arc::new(verifier),
        catalog: Arc::new(catalog),
        currency,
        clock: Arc::new(SystemClock),
    };

    let app = create_app(state, Arc::new(validator), &HttpSettings::from(&config.server));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
