// Logging helpers
// Plain stdout/stderr logging for server lifecycle and access lines

use std::net::SocketAddr;

use chrono::Local;

use crate::config::Config;

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Taxi analytics server started");
    println!("Listening on: http://{addr}");
    println!("Trip data: {}", config.data.trips_path);
    println!("Zone lookup: {}", config.data.zones_path);
    println!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("======================================\n");
}

pub fn log_data_init() {
    println!("[Data] Initializing data cache...");
}

pub fn log_data_ready(zones: usize) {
    println!("[Data] Zone lookup cached ({zones} zones)");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    println!("[{}] {method} {path} - {status}", timestamp());
}
