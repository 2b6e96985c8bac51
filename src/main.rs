//! gym-pass service binary.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use gym_pass::adapters::auth::{OidcConfig, OidcSessionValidator};
use gym_pass::adapters::email::{ResendConfig, ResendNotifier};
use gym_pass::adapters::geocoding::{GeocodingConfig as GeocoderSettings, HttpGeocoder};
use gym_pass::adapters::http::{build_router, AppState, RouterOptions};
use gym_pass::adapters::postgres::{
    PostgresGymRepository, PostgresPassRepository, PostgresSubscriptionLedger,
    PostgresUserRepository, PostgresWebhookEventRepository,
};
use gym_pass::adapters::stripe::{StripeBillingClient, StripeConfig, TierPriceIds};
use gym_pass::application::handlers::{
    BillingEventProcessor, BillingWebhookHandler, IssuePassHandler, NearestGymsService,
    NotificationDispatcher, ResolveIdentityHandler,
};
use gym_pass::config::AppConfig;
use gym_pass::domain::billing::StripeWebhookVerifier;
use gym_pass::ports::{
    BillingClient, Geocoder, GymRepository, PassRepository, SessionValidator, SubscriptionLedger,
    UserRepository, WebhookEventRepository, WelcomeNotifier,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(config: &AppConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    // JSON for log shipping in production, text locally
    let production = config.is_production();
    let json_layer = production.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!production).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    let db = &config.database;
    let pool = PgPoolOptions::new()
        .min_connections(db.min_connections)
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout())
        .idle_timeout(db.idle_timeout())
        .max_lifetime(db.max_lifetime())
        .connect(&db.url)
        .await?;

    if db.run_migrations {
        info!("Running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    Ok(pool)
}

fn billing_client(config: &AppConfig) -> Result<StripeBillingClient, BoxError> {
    let payment = &config.payment;
    let prices = TierPriceIds {
        standard: payment.standard_price_id.clone(),
        premium: payment.premium_price_id.clone(),
        elite: payment.elite_price_id.clone(),
    };

    let mut stripe = StripeConfig::new(payment.secret_key.clone(), prices)
        .with_timeout(payment.request_timeout());
    if let Some(url) = &payment.api_base_url {
        stripe = stripe.with_base_url(url.clone());
    }
    Ok(StripeBillingClient::new(stripe)?)
}

fn notifier(config: &AppConfig) -> Result<ResendNotifier, BoxError> {
    let email = &config.email;
    let mut resend = ResendConfig::new(
        email.api_key.clone(),
        email.from_header(),
        email.welcome_template_id.clone(),
    )
    .with_timeout(email.request_timeout());
    if let Some(url) = &email.api_base_url {
        resend = resend.with_base_url(url.clone());
    }
    Ok(ResendNotifier::new(resend)?)
}

fn geocoder(config: &AppConfig) -> Result<HttpGeocoder, BoxError> {
    let geo = &config.geocoding;
    let mut settings = GeocoderSettings::new(geo.api_key.clone())
        .with_region(geo.region.clone())
        .with_timeout(geo.request_timeout());
    if let Some(url) = &geo.api_base_url {
        settings = settings.with_base_url(url.clone());
    }
    Ok(HttpGeocoder::new(settings)?)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let pool = connect(&config).await?;

    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let ledger: Arc<dyn SubscriptionLedger> =
        Arc::new(PostgresSubscriptionLedger::new(pool.clone()));
    let gyms: Arc<dyn GymRepository> = Arc::new(PostgresGymRepository::new(pool.clone()));
    let passes: Arc<dyn PassRepository> = Arc::new(PostgresPassRepository::new(pool.clone()));
    let events: Arc<dyn WebhookEventRepository> =
        Arc::new(PostgresWebhookEventRepository::new(pool));

    let billing: Arc<dyn BillingClient> = Arc::new(billing_client(&config)?);
    let welcome: Arc<dyn WelcomeNotifier> = Arc::new(notifier(&config)?);
    let geocoder: Arc<dyn Geocoder> = Arc::new(geocoder(&config)?);
    let sessions: Arc<dyn SessionValidator> = Arc::new(OidcSessionValidator::new(
        OidcConfig::new(config.auth.issuer_url.clone(), config.auth.audience.clone())
            .with_cache_ttl(config.auth.jwks_cache_ttl()),
    )?);

    let identity = Arc::new(ResolveIdentityHandler::new(users.clone()));
    let issue_pass = Arc::new(IssuePassHandler::new(
        identity,
        ledger.clone(),
        gyms.clone(),
        passes,
        billing.clone(),
    ));

    let processor = Arc::new(BillingEventProcessor::new(
        users,
        ledger,
        billing,
        geocoder,
        Arc::new(NearestGymsService::new(gyms)),
        Arc::new(NotificationDispatcher::new(welcome)),
        events,
    ));
    let verifier = StripeWebhookVerifier::new(config.payment.webhook_secret.clone())
        .with_tolerance(config.payment.webhook_tolerance_secs);
    let webhooks = Arc::new(BillingWebhookHandler::new(verifier, processor));

    let state = AppState {
        issue_pass,
        webhooks,
        sessions,
    };
    let options = RouterOptions {
        request_timeout: config.server.request_timeout(),
        cors_origins: config.server.cors_origins_list(),
    };
    let app = build_router(state, &options);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        environment = ?config.server.environment,
        live_payments = config.payment.is_live_mode(),
        "gym-pass listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gym-pass stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
