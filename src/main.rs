use tracing_subscriber::EnvFilter;

use server_timing::ServerTimingConfig;

mod handlers;
mod server;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = server::create_router(ServerTimingConfig::default());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to port 3000, is it already in use?");

    tracing::info!("server listening on http://localhost:3000");
    tracing::info!("try `curl -i http://localhost:3000/api/report`");

    axum::serve(listener, app)
        .await
        .expect("Server exited with error");
}
