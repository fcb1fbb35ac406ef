//! Router construction for the engine REST server.

use std::sync::Arc;

use axum::{
    middleware as axum_mw,
    routing::{get, options, post, put},
    Extension, Router,
};
use flowline_core::memory::MemoryEngine;
use flowline_core::services::{
    AuthorizationService, CaseService, FilterService, HistoryService, IdentityService,
    IncidentService, ManagementService, RuntimeService, TaskService, VariableInstanceService,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers;

/// Every service trait the handlers call, bundled as one clonable extension.
#[derive(Clone)]
pub struct EngineServices {
    pub tasks: Arc<dyn TaskService>,
    pub runtime: Arc<dyn RuntimeService>,
    pub cases: Arc<dyn CaseService>,
    pub management: Arc<dyn ManagementService>,
    pub incidents: Arc<dyn IncidentService>,
    pub variables: Arc<dyn VariableInstanceService>,
    pub history: Arc<dyn HistoryService>,
    pub identity: Arc<dyn IdentityService>,
    pub authorizations: Arc<dyn AuthorizationService>,
    pub filters: Arc<dyn FilterService>,
}

impl EngineServices {
    /// All services backed by the same in-memory engine.
    pub fn from_engine(engine: Arc<MemoryEngine>) -> Self {
        Self {
            tasks: engine.clone(),
            runtime: engine.clone(),
            cases: engine.clone(),
            management: engine.clone(),
            incidents: engine.clone(),
            variables: engine.clone(),
            history: engine.clone(),
            identity: engine.clone(),
            authorizations: engine.clone(),
            filters: engine,
        }
    }
}

/// Build the full axum router with all routes and middleware.
pub fn build_router(services: EngineServices) -> Router {
    Router::new()
        // Task
        .route("/task", get(handlers::task::query_get).post(handlers::task::query_post))
        .route("/task", options(handlers::task::options))
        .route(
            "/task/count",
            get(handlers::task::count_get).post(handlers::task::count_post),
        )
        .route("/task/create", post(handlers::task::create))
        .route(
            "/task/:id",
            get(handlers::task::get)
                .put(handlers::task::update)
                .delete(handlers::task::delete),
        )
        .route("/task/:id/claim", post(handlers::task::claim))
        .route("/task/:id/unclaim", post(handlers::task::unclaim))
        .route("/task/:id/assignee", post(handlers::task::set_assignee))
        .route("/task/:id/complete", post(handlers::task::complete))
        .route("/task/:id/resolve", post(handlers::task::resolve))
        .route("/task/:id/delegate", post(handlers::task::delegate))
        .route("/task/:id/variables", get(handlers::task::variables))
        .route(
            "/task/:id/variables/:name",
            get(handlers::task::get_variable)
                .put(handlers::task::put_variable)
                .delete(handlers::task::delete_variable),
        )
        // Process instance
        .route(
            "/process-instance",
            get(handlers::process_instance::query_get).post(handlers::process_instance::query_post),
        )
        .route(
            "/process-instance/count",
            get(handlers::process_instance::count_get).post(handlers::process_instance::count_post),
        )
        .route(
            "/process-instance/:id",
            get(handlers::process_instance::get).delete(handlers::process_instance::delete),
        )
        .route(
            "/process-instance/:id/suspended",
            put(handlers::process_instance::set_suspended),
        )
        .route(
            "/process-instance/:id/variables",
            get(handlers::process_instance::variables),
        )
        .route(
            "/process-instance/:id/variables/:name",
            get(handlers::process_instance::get_variable)
                .put(handlers::process_instance::put_variable)
                .delete(handlers::process_instance::delete_variable),
        )
        // Message correlation
        .route("/message", post(handlers::message::correlate))
        // Case execution
        .route(
            "/case-execution",
            get(handlers::case_execution::query_get).post(handlers::case_execution::query_post),
        )
        .route(
            "/case-execution/count",
            get(handlers::case_execution::count_get).post(handlers::case_execution::count_post),
        )
        .route("/case-execution/:id", get(handlers::case_execution::get))
        // Job
        .route("/job", get(handlers::job::query_get).post(handlers::job::query_post))
        .route(
            "/job/count",
            get(handlers::job::count_get).post(handlers::job::count_post),
        )
        .route("/job/:id", get(handlers::job::get).delete(handlers::job::delete))
        .route("/job/:id/retries", put(handlers::job::set_retries))
        .route("/job/:id/execute", post(handlers::job::execute))
        .route("/job/:id/suspended", put(handlers::job::set_suspended))
        // Job definition
        .route(
            "/job-definition",
            get(handlers::job_definition::query_get).post(handlers::job_definition::query_post),
        )
        .route(
            "/job-definition/count",
            get(handlers::job_definition::count_get).post(handlers::job_definition::count_post),
        )
        .route("/job-definition/:id", get(handlers::job_definition::get))
        .route(
            "/job-definition/:id/suspended",
            put(handlers::job_definition::set_suspended),
        )
        .route(
            "/job-definition/:id/retries",
            put(handlers::job_definition::set_retries),
        )
        // Incident
        .route(
            "/incident",
            get(handlers::incident::query_get).post(handlers::incident::query_post),
        )
        .route(
            "/incident/count",
            get(handlers::incident::count_get).post(handlers::incident::count_post),
        )
        .route(
            "/incident/:id",
            get(handlers::incident::get).delete(handlers::incident::resolve),
        )
        // Variable instance
        .route(
            "/variable-instance",
            get(handlers::variable_instance::query_get)
                .post(handlers::variable_instance::query_post),
        )
        .route(
            "/variable-instance/count",
            get(handlers::variable_instance::count_get)
                .post(handlers::variable_instance::count_post),
        )
        // History
        .route(
            "/history/process-instance",
            get(handlers::history::process_instance_query_get)
                .post(handlers::history::process_instance_query_post),
        )
        .route(
            "/history/process-instance/count",
            get(handlers::history::process_instance_count_get)
                .post(handlers::history::process_instance_count_post),
        )
        .route(
            "/history/process-instance/:id",
            get(handlers::history::process_instance_get)
                .delete(handlers::history::process_instance_delete),
        )
        .route(
            "/history/variable-instance",
            get(handlers::history::variable_query_get)
                .post(handlers::history::variable_query_post),
        )
        .route(
            "/history/variable-instance/count",
            get(handlers::history::variable_count_get)
                .post(handlers::history::variable_count_post),
        )
        // Identity
        .route("/user", get(handlers::identity::user_query_get))
        .route("/user", options(handlers::identity::user_options))
        .route("/user/count", get(handlers::identity::user_count_get))
        .route("/user/create", post(handlers::identity::user_create))
        .route(
            "/user/:id",
            get(handlers::identity::user_get).delete(handlers::identity::user_delete),
        )
        .route("/user/:id/profile", get(handlers::identity::user_get))
        .route("/group", get(handlers::identity::group_query_get))
        .route("/group/count", get(handlers::identity::group_count_get))
        .route("/group/:id", get(handlers::identity::group_get))
        // Filter
        .route("/filter", get(handlers::filter::list))
        .route("/filter", options(handlers::filter::options))
        .route("/filter/count", get(handlers::filter::count))
        .route("/filter/create", post(handlers::filter::create))
        .route(
            "/filter/:id",
            get(handlers::filter::get)
                .put(handlers::filter::update)
                .delete(handlers::filter::delete),
        )
        .route("/filter/:id", options(handlers::filter::resource_options))
        .route(
            "/filter/:id/list",
            get(handlers::filter::execute_list_get).post(handlers::filter::execute_list_post),
        )
        .route(
            "/filter/:id/singleResult",
            get(handlers::filter::execute_single_get).post(handlers::filter::execute_single_post),
        )
        .route(
            "/filter/:id/count",
            get(handlers::filter::execute_count_get).post(handlers::filter::execute_count_post),
        )
        .layer(axum_mw::from_fn(auth::principal))
        .layer(Extension(services))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Router used by main and the HTTP tests: in-memory engine behind the
/// full middleware stack.
pub fn router_with_engine(engine: Arc<MemoryEngine>) -> Router {
    build_router(EngineServices::from_engine(engine))
}
