use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::info;

use phonemart_auth_types::bearer::BearerAuth;
use phonemart_core::config::Config;
use phonemart_core::tracing::init_tracing;
use phonemart_marketplace::config::MarketplaceConfig;
use phonemart_marketplace::infra::mail::Mailer;
use phonemart_marketplace::infra::outbound_client;
use phonemart_marketplace::infra::media::MediaClient;
use phonemart_marketplace::infra::notify::NotificationHub;
use phonemart_marketplace::router::build_router;
use phonemart_marketplace::state::AppState;
use phonemart_marketplace_migration::Migrator;

#[tokio::main]
async fn main() {
    init_tracing("info,phonemart_marketplace=debug,tower_http=info");

    let config = MarketplaceConfig::from_env().expect("invalid marketplace configuration");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to run migrations");
        info!("migrations applied");
    }

    let http = outbound_client(config.outbound_timeout()).expect("failed to build http client");
    let state = AppState {
        db,
        hub: NotificationHub::new(config.notification_buffer),
        mailer: Mailer::new(http.clone(), config.mail_api_url, config.mail_from),
        media: MediaClient::new(http, config.media_api_url),
    };

    let bearer = config.jwt_secret.map(BearerAuth::new);
    if bearer.is_none() {
        info!("JWT_SECRET not set, trusting gateway identity headers");
    }

    let router = build_router(state, bearer);
    let http_addr = format!("0.0.0.0:{}", config.marketplace_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .expect("failed to bind");

    info!("marketplace service listening on {http_addr}");
    axum::serve(listener, router).await.expect("server error");
}
