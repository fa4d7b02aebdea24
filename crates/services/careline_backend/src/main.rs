// File: crates/services/careline_backend/src/main.rs
use careline_backend::{app, AppState};
use careline_common::logging::{self, log_result};
use careline_config::load_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = Arc::new(load_config()?);
    let state = log_result(
        AppState::from_config(config.clone()).await,
        "Application state ready",
        "Failed to build application state",
    )?;

    let calendar_routes = if config.use_gcal {
        info!("Calendar routes enabled");
        Some(careline_gcal::routes_from_config(&config)?)
    } else {
        None
    };

    #[allow(unused_mut)] // mutated only with the openapi feature
    let mut router = app(state, calendar_routes);

    #[cfg(feature = "openapi")]
    {
        use careline_backend::doc::BackendApiDoc;
        use careline_gcal::doc::GcalApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        let mut openapi_doc = BackendApiDoc::openapi();
        if config.use_gcal {
            openapi_doc.merge(GcalApiDoc::openapi());
        }
        info!("Adding Swagger UI at /api/docs");
        router = router.merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server at http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
