// Router assembly. Layer order is load-bearing: request id is outermost so
// every envelope can be correlated, recovery sits outside the auth layers so
// a panic during auth still renders, and the tenant layer runs inside auth so
// a tenant id never appears without verified claims.
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::database::repos::enterprises::EnterpriseRepo;
use crate::database::repos::phyto_analyses::AnalysisRepo;
use crate::database::repos::species::SpeciesRepo;
use crate::database::repos::specimens::SpecimenRepo;
use crate::database::repos::users::UserRepo;
use crate::handlers::{health, protected, public};
use crate::middleware::{auth, recover, request_id, tenant};
use crate::services::analysis_service::AnalysisService;

/// Per-request deadline wrapping the whole handler chain
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared service components, built once at startup. Everything here is a
/// cheap handle over the same pool, so cloning the state per request clones
/// handles, not connections.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: TokenService,
    pub users: UserRepo,
    pub species: SpeciesRepo,
    pub analyses: AnalysisRepo,
    pub specimens: SpecimenRepo,
    pub enterprises: EnterpriseRepo,
    pub analysis_service: AnalysisService,
}

impl AppState {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self {
            users: UserRepo::new(pool.clone()),
            species: SpeciesRepo::new(pool.clone()),
            analyses: AnalysisRepo::new(pool.clone()),
            specimens: SpecimenRepo::new(pool.clone()),
            enterprises: EnterpriseRepo::new(pool.clone()),
            analysis_service: AnalysisService::new(pool.clone()),
            pool,
            tokens,
        }
    }
}

pub fn router(state: AppState) -> Router {
    // Bearer required, no tenant binding
    let authenticated = Router::new().route("/auth/me", get(protected::auth::me));

    // Bearer required plus a nonempty tenant in the verified claims
    let tenant_bound = Router::new()
        .route(
            "/users",
            post(protected::users::create).get(protected::users::list),
        )
        .route(
            "/phyto-analyses",
            post(protected::phyto_analyses::create).get(protected::phyto_analyses::list),
        )
        .route(
            "/phyto-analyses/:id",
            get(protected::phyto_analyses::get)
                .put(protected::phyto_analyses::update)
                .delete(protected::phyto_analyses::delete),
        )
        .route(
            "/phyto-analyses/:id/specimens",
            get(protected::phyto_analyses::specimens),
        )
        .route(
            "/phyto-analyses/project/:project_id",
            get(protected::phyto_analyses::list_by_project_path),
        )
        .route(
            "/phyto-analyses/enterprise/:enterprise_id",
            get(protected::phyto_analyses::list_by_enterprise),
        )
        .route("/specimens", post(protected::specimens::create))
        .route(
            "/specimens/:id",
            get(protected::specimens::get)
                .put(protected::specimens::update)
                .delete(protected::specimens::delete),
        )
        .route("/species", get(protected::species::list))
        .route(
            "/enterprises",
            post(protected::enterprises::create).get(protected::enterprises::list),
        )
        .route(
            "/enterprises/:id",
            get(protected::enterprises::get)
                .put(protected::enterprises::update)
                .delete(protected::enterprises::delete),
        )
        .layer(middleware::from_fn(tenant::tenant_middleware));

    let api = Router::new()
        .route("/auth/login", post(public::auth::login))
        .merge(
            authenticated
                .merge(tenant_bound)
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::auth_middleware,
                )),
        );

    Router::new()
        .nest("/api/v1", api)
        .route("/healthz", get(health::healthz))
        .layer(middleware::from_fn(recover::recover_middleware))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
