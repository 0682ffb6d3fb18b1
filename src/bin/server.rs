use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use rake_optimizer::error::OptimizeError;
use rake_optimizer::loader::optimize_loading;
use rake_optimizer::selector::choose_best_rake;
use rake_optimizer::types::{Assignment, LoadPlan, Product, RakeTemplate, SolveStatus};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    products: Vec<Product>,
    template: RakeTemplate,
    #[serde(default = "default_true")]
    allow_unassigned: bool,
    #[serde(default = "default_time_limit")]
    max_time_sec: f64,
}

#[derive(Deserialize, Serialize)]
struct ChooseRakeRequest {
    products: Vec<Product>,
    templates: Vec<RakeTemplate>,
    #[serde(default = "default_true")]
    allow_unassigned: bool,
}

fn default_true() -> bool {
    true
}

fn default_time_limit() -> f64 {
    10.0
}

#[derive(Serialize)]
struct PlanSummary {
    total_tonnage: f64,
    total_rakes: usize,
    total_wagons: usize,
    total_slots: usize,
    utilization_pct: f64,
    template_id: Option<String>,
}

#[derive(Serialize)]
struct PlanResponse {
    solver_status: SolveStatus,
    objective_value: f64,
    summary: PlanSummary,
    assignments: Vec<Assignment>,
    unassigned_products: Vec<String>,
}

fn plan_response(plan: LoadPlan, template_id: Option<String>) -> PlanResponse {
    PlanResponse {
        solver_status: plan.status,
        objective_value: plan.total_loaded_t,
        summary: PlanSummary {
            total_tonnage: plan.total_loaded_t,
            total_rakes: 1,
            total_wagons: plan.wagon_count(),
            total_slots: plan.slot_count(),
            utilization_pct: plan.utilization_pct,
            template_id,
        },
        assignments: plan.assignments,
        unassigned_products: plan.unassigned_products,
    }
}

fn error_response(err: OptimizeError) -> (StatusCode, String) {
    let status = match err {
        OptimizeError::InvalidTemplate(_) => StatusCode::BAD_REQUEST,
        OptimizeError::InfeasibleAssignment(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, err.to_string())
}

async fn optimize(
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<PlanResponse>, (StatusCode, String)> {
    tracing::info!(
        products = req.products.len(),
        template = %req.template.id,
        allow_unassigned = req.allow_unassigned,
        "POST /optimize"
    );

    let plan = optimize_loading(
        &req.products,
        &req.template,
        req.allow_unassigned,
        req.max_time_sec,
    )
    .map_err(error_response)?;

    Ok(Json(plan_response(plan, None)))
}

async fn choose_rake(
    Json(req): Json<ChooseRakeRequest>,
) -> Result<Json<PlanResponse>, (StatusCode, String)> {
    tracing::info!(
        products = req.products.len(),
        candidates = req.templates.len(),
        allow_unassigned = req.allow_unassigned,
        "POST /choose-rake"
    );

    let (plan, template) = choose_best_rake(&req.products, &req.templates, req.allow_unassigned)
        .map_err(error_response)?;

    Ok(Json(plan_response(plan, Some(template.id))))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .route("/choose-rake", post(choose_rake))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
