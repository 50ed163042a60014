#[cfg(test)]
use crate::features::auth::AuthenticatedUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub const TEST_USER_ID: &str = "5f2b8c4e-1a3d-4e6f-9b0c-7d8e9f0a1b2c";

#[cfg(test)]
pub fn create_test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: TEST_USER_ID.to_string(),
        email: Some("tester@example.com".to_string()),
        role: "authenticated".to_string(),
    }
}

#[cfg(test)]
async fn inject_test_user_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_test_user());
    next.run(request).await
}

/// Wrap `router` so every request runs as [`create_test_user`].
#[cfg(test)]
pub fn with_test_user(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user_middleware))
}
