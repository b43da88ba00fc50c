use axum::Router;

pub mod applications;
pub mod auth;
pub mod companies;
pub mod jobs;
pub mod me;
pub mod public;
pub mod system;

/// Routes with no pipeline stages (public browsing, registration, login).
pub fn public_router() -> Router {
    Router::new().merge(auth::router()).merge(public::router())
}

/// Routes behind the credential verifier. Tenant-scoped handlers run the
/// membership resolver (and, for writes, the role authorizer) themselves.
pub fn protected_router() -> Router {
    Router::new()
        .merge(me::router())
        .merge(companies::router())
        .merge(jobs::router())
        .merge(applications::router())
}
