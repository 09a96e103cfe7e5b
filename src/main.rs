use rusty_library_lending::{
    api::{AppState, create_router},
    application::library::Library,
    config::AppConfig,
    seed,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Library lending service starting");

    let mut library = Library::default();

    if config.seed_demo_data {
        let report = seed::seed_library(&mut library).expect("Sample data is invalid");
        tracing::info!(
            "Seeded {} books and {} members ({} issued, {} returned, {} rejected)",
            report.books_registered,
            report.members_registered,
            report.issued,
            report.returned,
            report.rejected.len()
        );
        seed::log_summary(&library);
    }

    let app = create_router(Arc::new(AppState::new(library)));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
