use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use gym_finder::config::{BackendKind, Settings};
use gym_finder::core::{
    GymFinder, LocationResolver, PlacesSearch, SearchBackend, SearchOptions, StoreSearch,
};
use gym_finder::routes::{self, auth::TokenVerifier, AppState};
use gym_finder::services::{
    CatalogCache, GymDirectory, MapboxClient, PlacesClient, PostgresDirectory, SessionStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration; errors are reported once logging is up
    let settings = Settings::load();
    let logging = settings
        .as_ref()
        .map(|s| s.logging.clone())
        .unwrap_or_default();

    // Initialize logging (LOG_LEVEL / LOG_FORMAT override the config file)
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(logging.level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(logging.format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Gym Finder service...");

    let settings = settings.map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");

    // Initialize the gym directory
    let directory: Arc<dyn GymDirectory> = Arc::new(
        PostgresDirectory::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| startup_error("Failed to connect to PostgreSQL", e))?,
    );

    info!(
        "Gym directory initialized (max: {} connections)",
        settings.database.max_connections.unwrap_or(10)
    );

    // Pick the search backend
    let (resolver, backend): (LocationResolver, Arc<dyn SearchBackend>) = match settings.search.backend {
        BackendKind::Store => (
            LocationResolver::text_only(),
            Arc::new(StoreSearch::new(directory.clone())) as Arc<dyn SearchBackend>,
        ),
        BackendKind::Places => {
            let api_key = settings.places.api_key.clone().ok_or_else(|| {
                startup_error("Places backend selected", "places.api_key is not set")
            })?;
            let places = Arc::new(
                PlacesClient::new(
                    settings.places.endpoint.clone(),
                    api_key,
                    Duration::from_secs(settings.places.timeout_secs),
                )
                .map_err(|e| startup_error("Failed to create places client", e))?,
            );
            (
                LocationResolver::new(places.clone()),
                Arc::new(PlacesSearch::new(places, settings.search.placeholder_image.clone()))
                    as Arc<dyn SearchBackend>,
            )
        }
    };

    info!("Search backend: {}", backend.name());

    let defaults = SearchOptions {
        radius_m: settings.search.default_radius,
        keyword: settings.search.default_keyword.clone(),
    };

    let mut finder = GymFinder::new(resolver, backend, directory).with_defaults(defaults);

    match settings.mapbox.access_token.clone() {
        Some(token) => {
            let mapbox = MapboxClient::new(
                settings.mapbox.endpoint.clone(),
                token,
                Duration::from_secs(settings.mapbox.timeout_secs),
            )
            .map_err(|e| startup_error("Failed to create directions client", e))?;
            finder = finder.with_router(Arc::new(mapbox));
            info!("Directions enabled");
        }
        None => warn!("No Mapbox token configured, directions are disabled"),
    }

    let sessions = SessionStore::new(
        settings.session.capacity,
        settings.session.ttl_secs,
        settings.search.default_location.clone(),
    );

    info!(
        "Session store initialized (capacity: {}, idle TTL: {}s)",
        settings.session.capacity, settings.session.ttl_secs
    );

    // Build application state
    let app_state = AppState {
        finder: Arc::new(finder),
        sessions: Arc::new(sessions),
        catalog: Arc::new(CatalogCache::new(settings.catalog.ttl_secs)),
        auth: Arc::new(TokenVerifier::new(&settings.auth.jwt_secret, &settings.auth.audience)),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
