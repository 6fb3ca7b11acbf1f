use axum::{routing::get, Extension, Router};

use chapel_content::ContentKind;

pub mod admin;
pub mod auth;
pub mod content;
pub mod live_stream;
pub mod pages;
pub mod prayer;
pub mod superadmin;
pub mod system;

/// Every route the application serves: JSON API, page models and health.
pub fn router() -> Router {
    let mut api = Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/superadmin", superadmin::router())
        .nest("/prayer-requests", prayer::router())
        .nest("/live-stream", live_stream::router());

    for kind in ContentKind::ALL {
        api = api.nest(&format!("/{}", kind.path_segment()), content::router(kind));
    }

    Router::new()
        .route("/health", get(system::health))
        .route(
            "/notifications",
            get(content::list).layer(Extension(ContentKind::Notification)),
        )
        .nest("/api", api)
        .merge(pages::router())
}
