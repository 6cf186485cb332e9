use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, routing::post, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::auth::Authenticator;
use crate::config::{AppConfig, Environment};
use crate::database::store::DocumentStore;
use crate::handlers::{data, public};
use crate::services::{AreaService, DepartmentService, EmployeeService, ManagerService};

/// Shared handler state. Services are built per request around the store handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub auth: Authenticator,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, auth: Authenticator) -> Self {
        Self { store, auth }
    }

    pub fn managers(&self) -> ManagerService {
        ManagerService::new(self.store.clone())
    }

    pub fn areas(&self) -> AreaService {
        AreaService::new(self.store.clone())
    }

    pub fn departments(&self) -> DepartmentService {
        DepartmentService::new(self.store.clone())
    }

    pub fn employees(&self) -> EmployeeService {
        EmployeeService::new(self.store.clone())
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login", post(public::auth::login_post))
        // Entities
        .merge(employee_routes())
        .merge(department_routes())
        .merge(manager_routes())
        .merge(area_routes())
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes));

    let router = if config.security.enable_cors {
        router.layer(cors_layer(config))
    } else {
        router
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/employee", get(data::employee::list).post(data::employee::create))
        .route("/employee/search/:query", get(data::employee::search))
        .route(
            "/employee/:key",
            get(data::employee::show)
                .put(data::employee::update)
                .patch(data::employee::replace)
                .delete(data::employee::delete),
        )
}

fn department_routes() -> Router<AppState> {
    Router::new()
        .route("/department", get(data::department::list).post(data::department::create))
        .route("/department/search/:query", get(data::department::search))
        .route(
            "/department/:key",
            get(data::department::show)
                .put(data::department::update)
                .patch(data::department::replace)
                .delete(data::department::delete),
        )
}

fn manager_routes() -> Router<AppState> {
    Router::new()
        .route("/manager", get(data::manager::list).post(data::manager::create))
        .route("/manager/search/:query", get(data::manager::search))
        .route(
            "/manager/:key",
            get(data::manager::show)
                .put(data::manager::update)
                .patch(data::manager::replace)
                .delete(data::manager::delete),
        )
}

fn area_routes() -> Router<AppState> {
    Router::new()
        .route("/area", get(data::area::list).post(data::area::create))
        .route("/area/search/:query", get(data::area::search))
        .route(
            "/area/:key",
            get(data::area::show)
                .put(data::area::update)
                .patch(data::area::replace)
                .delete(data::area::delete),
        )
}

/// Permissive in development, the configured origin list elsewhere.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    match config.environment {
        Environment::Development => CorsLayer::permissive(),
        _ => {
            let origins: Vec<HeaderValue> = config
                .security
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}
