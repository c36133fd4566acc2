use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use travelplanner::config::{AppConfig, GatewayBackend};
use travelplanner::db::{init_pool, run_migrations};
use travelplanner::error::AppError;
use travelplanner::gateway::{hasura::HasuraGateway, sqlite::SqliteGateway, Gateway};
use travelplanner::places::PlacesClient;
use travelplanner::routes::create_router;
use travelplanner::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;

    let gateway: Arc<dyn Gateway> = match &config.backend {
        GatewayBackend::Sqlite => {
            let db = init_pool(&config.database_url).await?;
            run_migrations(&db).await?;
            info!("using sqlite store at {}", config.database_url);
            Arc::new(SqliteGateway::new(db))
        }
        GatewayBackend::Hasura {
            endpoint,
            admin_secret,
        } => {
            if admin_secret.is_none() {
                warn!("HASURA_ADMIN_SECRET is not set; requests go out unauthenticated");
            }
            info!("using hasura endpoint {endpoint}");
            Arc::new(HasuraGateway::new(
                endpoint.clone(),
                admin_secret.clone(),
                config.gateway_timeout,
            )?)
        }
    };

    let places = match &config.google_maps_api_key {
        Some(key) => Some(PlacesClient::new(key.clone(), config.gateway_timeout)?),
        None => {
            info!("GOOGLE_MAPS_API_KEY not set; place lookups disabled");
            None
        }
    };

    let state = AppState::new(config.clone(), gateway, places);
    let app = create_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,travelplanner=debug,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
