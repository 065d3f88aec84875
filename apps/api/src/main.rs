use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use availability_cell::AvailabilityService;
use booking_cell::{
    AppointmentEventPublisher, BookingService, InMemoryAppointmentRepository,
    RemoteAvailabilityClient,
};
use notification_cell::{
    NotificationListener, NotificationLogStore, NotificationService, SimulatedSender,
};
use shared_config::AppConfig;
use shared_messaging::{EventBus, InMemoryEventBus, RedisEventBus};

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting mediapp API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Pick the event transport: Redis when configured, in-process otherwise.
    let bus: Arc<dyn EventBus> = match config.redis_url.as_deref() {
        Some(url) => match RedisEventBus::new(url).await {
            Ok(bus) => {
                info!("Using Redis event bus");
                Arc::new(bus)
            }
            Err(e) => {
                error!("Failed to connect to Redis, falling back to in-memory bus: {}", e);
                Arc::new(InMemoryEventBus::new())
            }
        },
        None => {
            info!("REDIS_URL not set, using in-memory event bus");
            Arc::new(InMemoryEventBus::new())
        }
    };

    // Wire the cells
    let availability_service = Arc::new(AvailabilityService::new());

    let booking_service = Arc::new(BookingService::new(
        Arc::new(InMemoryAppointmentRepository::new()),
        Arc::new(RemoteAvailabilityClient::new(&config)),
        Arc::new(AppointmentEventPublisher::new(Arc::clone(&bus), &config)),
    ));

    let notification_service = Arc::new(NotificationService::new(
        Arc::new(NotificationLogStore::new()),
        Arc::new(SimulatedSender),
    ));

    // Consume appointment events in the background
    let listener = Arc::new(NotificationListener::new(
        Arc::clone(&bus),
        Arc::clone(&notification_service),
        &config,
    ));
    let listener_task = Arc::clone(&listener);
    tokio::spawn(async move { listener_task.start().await });

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(availability_service, booking_service, notification_service)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.bind_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .await
        .unwrap();
}
