// Standalone mock API binary for pointing the CLI at a local server

use std::net::SocketAddr;
use tracing::{Level, info};

// Include the shared mock API module
include!("../../tests/common/mock_api_app.rs");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let app = create_app(AppState::default());

    // Parse port from args or use default
    let port: u16 = std::env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Mock API listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
