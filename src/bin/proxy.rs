//! CLI entry point: binds a listener, wires up the blacklist/cache/request
//! handler/scheduler, and drives the accept loop.

use std::io;
use std::net::TcpListener;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use hearth::config::Cli;
use hearth::proxy::{Blacklist, Cache, RequestHandler, Scheduler};
use signal_hook::consts::{SIGINT, SIGTERM};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.log_level))
        .init();

    let blacklist = match &cli.blacklist {
        Some(path) => match Blacklist::from_file(path) {
            Ok(bl) => bl,
            Err(e) => {
                tracing::error!(path, error = %e, "failed to load blacklist file");
                return ExitCode::FAILURE;
            }
        },
        None => Blacklist::empty(),
    };

    let cache = match Cache::new(&cli.cache_dir, cli.max_age) {
        Ok(cache) => cache,
        Err(e) => {
            tracing::error!(dir = cli.cache_dir.as_str(), error = %e, "failed to open cache directory");
            return ExitCode::FAILURE;
        }
    };

    if cli.clear_cache {
        if let Err(e) = cache.clear() {
            tracing::warn!(error = %e, "failed to clear cache");
        }
    }

    let identity = format!("proxy-{}", cli.port);
    let handler = Arc::new(RequestHandler::new(identity, blacklist, cache));

    let scheduler = Scheduler::new(Arc::clone(&handler), cli.workers);
    if let (Some(host), Some(port)) = (&cli.proxy_server, cli.proxy_port) {
        scheduler.set_proxy(host.clone(), port);
    }

    let listener = match TcpListener::bind(("0.0.0.0", cli.port)) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(port = cli.port, error = %e, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = listener.set_nonblocking(true) {
        tracing::error!(error = %e, "failed to set listener non-blocking");
        return ExitCode::FAILURE;
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&shutdown)) {
            tracing::error!(signal, error = %e, "failed to register signal handler");
            return ExitCode::FAILURE;
        }
    }

    tracing::info!(port = cli.port, workers = cli.workers, "proxy listening");

    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                scheduler.schedule_request(stream, addr.to_string());
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
            }
        }
    }

    tracing::info!("shutdown signal received, closing accept loop");
    scheduler.wait();
    ExitCode::SUCCESS
}
