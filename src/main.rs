use std::sync::Arc;

mod api;
mod config;
mod engine;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Engine initialization failure is fatal; nothing to retry.
    logger::log_data_init();
    let engine = Arc::new(engine::Engine::open(&cfg.data)?);
    let zones = engine.warm()?;
    logger::log_data_ready(zones);

    let listener = server::create_listener(addr)?;
    let state = Arc::new(config::AppState::new(cfg, engine));

    logger::log_server_start(&addr, &state.config);

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local.run_until(server::run(listener, state)).await
}
