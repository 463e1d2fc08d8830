//! Record gateway server.

use aws_config::BehaviorVersion;
use clap::Parser;
use record_gateway::{
    config::Config,
    http::{self, AppState},
    identity::cognito::CognitoProvider,
    store::dynamodb::DynamoDbStore,
};
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "record_gateway=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Config::parse();
    init_tracing(config.log_json);
    config.validate()?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(endpoint) = &config.dynamodb_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let client = aws_sdk_dynamodb::Client::new(&loader.load().await);
    let store = DynamoDbStore::new(client, &config.table_name, &config.key_attribute);
    let identity = CognitoProvider::new(
        &config.identity_client_id,
        &config.identity_pool_id,
        config.identity_timeout(),
    )?;

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    tracing::info!(
        address = %config.bind_address,
        table = %config.table_name,
        key_attribute = %config.key_attribute,
        "record gateway listening"
    );
    let state = AppState::new(Arc::new(store), Arc::new(identity), config);
    axum::serve(listener, http::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
