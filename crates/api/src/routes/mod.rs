//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod assets;
pub mod health;
pub mod resources;

/// Creates the API router; mutating routes sit behind the access gate.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(resources::protected_routes())
        .merge(assets::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(resources::public_routes())
        .merge(protected_routes)
}

#[cfg(test)]
mod tests;
