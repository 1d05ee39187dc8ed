//! # Routes
//!
//! The static route table and the router built from it.
//! Every route is defined exactly once here. Guards are enforced by the
//! extractors each handler takes; `Guard` records which one applies.

use crate::handlers;
use crate::state::AppState;
use axum::{
    handler::Handler,
    http::Method,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::debug;

/// Guard applied before a handler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Open to everyone
    Public,
    /// A credential is optional; a presented one must be valid
    OptionalIdentity,
    /// Valid bearer credential required
    Identity,
    /// Valid bearer credential of a user with the admin role
    Admin,
}

impl Guard {
    /// True when a request without a credential is rejected
    pub fn requires_credential(&self) -> bool {
        matches!(self, Guard::Identity | Guard::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    fn filter(&self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Patch => MethodFilter::PATCH,
            Verb::Delete => MethodFilter::DELETE,
        }
    }
}

/// One (method, path, guard, handler) binding
pub struct Route {
    pub verb: Verb,
    pub path: &'static str,
    pub guard: Guard,
    handler: MethodRouter<AppState>,
}

impl Route {
    fn new<H, T>(verb: Verb, path: &'static str, guard: Guard, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            verb,
            path,
            guard,
            handler: on(verb.filter(), handler),
        }
    }
}

/// The complete HTTP surface
pub fn route_table() -> Vec<Route> {
    use Guard::*;
    use Verb::*;

    vec![
        Route::new(Get, "/", Public, handlers::welcome),
        Route::new(Get, "/health", Public, handlers::health),
        // Users
        Route::new(Put, "/user/{email}", OptionalIdentity, handlers::upsert_user),
        Route::new(Get, "/user", Identity, handlers::list_users),
        Route::new(Get, "/user/{email}", Public, handlers::get_user),
        Route::new(Patch, "/user/{email}", Public, handlers::patch_user),
        Route::new(Put, "/user/admin/{email}", Admin, handlers::promote_admin),
        Route::new(Get, "/admin/{email}", Identity, handlers::check_admin),
        // Products
        Route::new(Get, "/product", Public, handlers::list_products),
        Route::new(Get, "/product/{id}", Public, handlers::get_product),
        Route::new(Post, "/product", Admin, handlers::create_product),
        Route::new(Patch, "/product/{id}", Admin, handlers::update_product),
        Route::new(Delete, "/product/{id}", Admin, handlers::delete_product),
        // Reviews
        Route::new(Post, "/review", Identity, handlers::create_review),
        Route::new(Get, "/review", Public, handlers::list_reviews),
        // Orders
        Route::new(Post, "/order", Identity, handlers::create_order),
        Route::new(Get, "/order", Identity, handlers::list_orders),
        Route::new(Get, "/order/{id}", Public, handlers::get_order),
        Route::new(Delete, "/order/{id}", Identity, handlers::delete_order),
        Route::new(Get, "/all-orders", Admin, handlers::list_all_orders),
        // Payments
        Route::new(
            Post,
            "/create-payment-intent",
            Identity,
            handlers::create_payment_intent,
        ),
    ]
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    route_table()
        .into_iter()
        .fold(Router::new(), |router, route| {
            debug!(method = %route.verb.method(), path = route.path, guard = ?route.guard, "Route");
            // Repeated paths merge their method routers.
            router.route(route.path, route.handler)
        })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
