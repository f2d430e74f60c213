use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verse_memo::{app, config::Settings, content, db, state::AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verse_memo=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load();
    tracing::info!("Using database {}", settings.database_path.display());

    let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");

    // Content problems are logged; the server still starts with what is stored
    match db::try_lock(&pool) {
        Ok(conn) => match content::import_file(&conn, &settings.content_path) {
            Ok(result) => tracing::info!(
                "Content import: {} new chapters, {} already present",
                result.inserted,
                result.skipped
            ),
            Err(e) => tracing::error!("Content import failed: {}", e),
        },
        Err(e) => tracing::error!("Skipping content import: {}", e),
    }

    let bind_addr = settings.bind_addr();
    let router = app::build_router(AppState::new(pool, settings));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

    tracing::info!("Server running on http://{}", bind_addr);

    axum::serve(listener, router)
        .await
        .expect("Server failed to start");
}
