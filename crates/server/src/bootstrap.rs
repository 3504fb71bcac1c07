use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use blossom_chat::events::EventDispatcher;
use blossom_chat::outbound::{MessageSink, NoopMessageSink};
use blossom_chat::transport::{ChatTransport, NoopChatTransport, PollingRunner, ReconnectPolicy};
use blossom_core::config::{AppConfig, ConfigError, LoadOptions};
use blossom_core::{
    EngineSettings, FlowEngine, NoopPaymentGateway, PaymentGateway, SessionStore, UserId,
};
use blossom_db::{connect_with_settings, migrations, DbPool, SqlCatalogStore, SqlOrderStore};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub dispatcher: Arc<EventDispatcher>,
    pub runner: PollingRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = Arc::new(SqlCatalogStore::new(db_pool.clone()));
    let orders = Arc::new(SqlOrderStore::new(db_pool.clone()));

    // A real provider binding would arrive with the transport layer; the
    // configured-token case still exercises the invoice path end to end.
    let payment: Option<Arc<dyn PaymentGateway>> = config
        .payment
        .provider_token
        .as_ref()
        .map(|_| Arc::new(NoopPaymentGateway) as Arc<dyn PaymentGateway>);

    let admins: HashSet<UserId> = config.chat.admin_ids.iter().copied().map(UserId).collect();
    let engine = Arc::new(FlowEngine::new(
        catalog,
        orders,
        payment,
        EngineSettings { admins, checkout_url: config.payment.checkout_url.clone() },
    ));

    let sessions = Arc::new(SessionStore::new());
    let sink: Arc<dyn MessageSink> = Arc::new(NoopMessageSink);
    let dispatcher = Arc::new(EventDispatcher::new(engine, sessions, sink));

    let transport: Arc<dyn ChatTransport> = Arc::new(NoopChatTransport);
    let runner = PollingRunner::new(transport, dispatcher.clone(), ReconnectPolicy::default());

    Ok(Application { config, db_pool, dispatcher, runner })
}
