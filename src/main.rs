use axum::{
    Router,
    routing::{get, patch},
    middleware::from_fn,
};

use http::{Method, header};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::{
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
    cors::CorsLayer,
};

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academics::config::Config;
use academics::handlers;
use academics::middleware_layer;
use academics::repositories::enrollment as enrollment_repo;
use academics::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config).await?;
    tracing::info!("✅ AppState initialized");

    let ui_origin: header::HeaderValue = config.ui_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_origin([ui_origin])
        .allow_methods([Method::GET, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            "x-user-id".parse().unwrap(),
            "x-user-role".parse().unwrap(),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(86400));

    let admin_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(100)
            .burst_size(500)
            .use_headers()
            .finish()
            .unwrap(),
    );

    let admin_routes = Router::new()
        .route("/api/academics/overview", get(handlers::academics::overview))
        .route("/api/academics/batches", get(handlers::academics::list_batches))
        .route(
            "/api/academics/batches/{id}/current-subject",
            patch(handlers::academics::advance_subject),
        )
        .route(
            "/api/academics/progress/bulk-done",
            patch(handlers::academics::bulk_done),
        )
        .route(
            "/api/academics/students/{batch_id}",
            get(handlers::academics::batch_students),
        )
        .route(
            "/api/academics/courses/{course_id}/start-subject",
            patch(handlers::academics::set_start_subject),
        )
        .route(
            "/api/academics/batches/{batch_id}/courses",
            patch(handlers::academics::set_batch_courses),
        )
        .layer(tower_governor::GovernorLayer::new(admin_governor_conf))
        .route_layer(from_fn(middleware_layer::auth::require_admin))
        .route_layer(from_fn(middleware_layer::auth::require_auth))
        .with_state(state.clone());

    let student_routes = Router::new()
        .route("/api/student/next-step", get(handlers::student::next_step))
        .route("/api/batch/sessions", get(handlers::student::list_sessions))
        .route(
            "/api/progress/{id}",
            patch(handlers::student::set_progress_status),
        )
        .route_layer(from_fn(middleware_layer::auth::require_auth))
        .with_state(state.clone());

    let app = Router::new()
        .merge(admin_routes)
        .merge(student_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors);

    let sweep_state = state.clone();
    let sweep_interval = Duration::from_secs(config.expiry_sweep_secs);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sweep_interval).await;
            tracing::info!("🧹 Running scheduled enrollment expiry sweep...");
            match enrollment_repo::expire_lapsed(&sweep_state.db, chrono::Utc::now()).await {
                Ok(expired) => {
                    tracing::info!("✅ Expiry sweep completed: {} enrollments expired", expired);
                }
                Err(e) => {
                    tracing::error!("❌ Expiry sweep failed: {}", e);
                }
            }
        }
    });

    let addr = config.bind_addr;
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("✅ Background expiry sweep started (every {}s)", config.expiry_sweep_secs);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
