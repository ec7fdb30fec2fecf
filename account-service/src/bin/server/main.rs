use std::sync::Arc;

use account_service::bootstrap::seed_accounts;
use account_service::config::Config;
use account_service::domain::user::ports::UserRepository;
use account_service::domain::user::service::AccountSettings;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::mail::ResendMailer;
use account_service::outbound::repositories::InMemoryUserRepository;
use account_service::outbound::repositories::PostgresUserRepository;
use auth::Authenticator;
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const MEMORY_DATABASE_URL: &str = "memory";

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        allowed_email_suffix = %config.registration.allowed_email_suffix,
        email_enabled = config.email.resend_api_key.is_some(),
        seed_accounts = config.bootstrap.accounts.len(),
        "Configuration loaded"
    );

    if config.database.url == MEMORY_DATABASE_URL {
        tracing::warn!(database = "memory", "Using in-memory user store, data is not persisted");
        run(Arc::new(InMemoryUserRepository::new()), config).await
    } else {
        let pg_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database.url)
            .await?;
        tracing::info!(
            max_connections = 5,
            database = "postgresql",
            "Database connection pool created"
        );

        sqlx::migrate!("./migrations").run(&pg_pool).await?;
        tracing::info!(database = "postgresql", "Database migrations completed");

        run(Arc::new(PostgresUserRepository::new(pg_pool)), config).await
    }
}

async fn run<UR: UserRepository>(user_repository: Arc<UR>, config: Config) -> anyhow::Result<()> {
    let password_hasher = PasswordHasher::with_params(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;
    let authenticator = Arc::new(Authenticator::with_hasher(
        config.jwt.secret.as_bytes(),
        password_hasher,
    ));
    let mailer = Arc::new(ResendMailer::new(&config.email));

    let user_service = Arc::new(UserService::new(
        user_repository,
        mailer,
        Arc::clone(&authenticator),
        AccountSettings::from(&config),
    ));

    let seeded = seed_accounts(user_service.as_ref(), &config.bootstrap.accounts).await?;
    tracing::info!(created = seeded, "Seed accounts checked");

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");

    Ok(())
}
