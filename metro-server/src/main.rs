use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use metro_server::fare::FareTable;
use metro_server::loader;
use metro_server::network::NetworkGraph;
use metro_server::sim::{BroadcastHub, SimConfig, SimulationEngine};
use metro_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("metro_server=debug,info")),
        )
        .init();

    let data_dir: PathBuf = std::env::var("METRO_DATA_DIR")
        .unwrap_or_else(|_| "data".to_string())
        .into();

    // Load the network once; everything downstream reads it immutably.
    let loaded = loader::load_dir(&data_dir).expect("Failed to load network data");
    let graph = NetworkGraph::build(loaded.stations, loaded.connections)
        .expect("Network data is malformed");
    let fares = FareTable::build(&graph, &loaded.fares).expect("Fare data is malformed");
    info!(
        stations = graph.station_count(),
        connections = graph.connection_count(),
        fares = fares.len(),
        "network loaded"
    );

    // Simulation engine with its event hub, ticking in the background.
    let engine = Arc::new(SimulationEngine::new(
        SimConfig::default(),
        BroadcastHub::default(),
    ));
    tokio::spawn(Arc::clone(&engine).run());

    let state = AppState::new(graph, fares, engine);
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 5000));
    info!(%addr, "metro server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
