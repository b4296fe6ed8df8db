use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use taskflow_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::auth::require_bearer_auth,
    routes,
    services::scheduler,
    AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    // Handle kept alive for the lifetime of the server.
    let _scheduler = scheduler::start(app_state.clone()).await?;

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route(
            "/api/job-alerts",
            get(routes::job_alerts::list_alerts).post(routes::job_alerts::create_alert),
        )
        .route("/api/job-alerts/stats", get(routes::job_alerts::alert_stats))
        .route(
            "/api/job-alerts/:id",
            get(routes::job_alerts::get_alert)
                .patch(routes::job_alerts::update_alert)
                .delete(routes::job_alerts::delete_alert),
        )
        .route("/api/job-offers", get(routes::job_offers::list_offers))
        .route("/api/job-offers/stats", get(routes::job_offers::offer_stats))
        .route(
            "/api/job-offers/process-all",
            post(routes::job_offers::process_all),
        )
        .route(
            "/api/job-offers/process/:alert_id",
            post(routes::job_offers::process_alert),
        )
        .route(
            "/api/job-offers/:id",
            get(routes::job_offers::get_offer).delete(routes::job_offers::delete_offer),
        )
        .route(
            "/api/job-offers/:id/status",
            patch(routes::job_offers::update_offer_status),
        )
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/api/tasks/stats", get(routes::tasks::task_stats))
        .route(
            "/api/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route(
            "/api/applications",
            get(routes::applications::list_applications)
                .post(routes::applications::create_application),
        )
        .route(
            "/api/applications/stats",
            get(routes::applications::application_stats),
        )
        .route(
            "/api/applications/:id",
            get(routes::applications::get_application)
                .patch(routes::applications::update_application)
                .delete(routes::applications::delete_application),
        )
        .layer(axum_middleware::from_fn(require_bearer_auth));

    let app = base_routes
        .merge(api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
