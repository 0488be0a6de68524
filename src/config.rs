//! CLI surface for the proxy binary.

use clap::Parser;

/// Multi-threaded HTTP caching proxy.
#[derive(Debug, Parser)]
#[command(name = "proxy", about = "Multi-threaded HTTP caching proxy")]
pub struct Cli {
    /// Port to listen for client connections on.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Upstream proxy hostname to chain through.
    #[arg(long, requires = "proxy_port")]
    pub proxy_server: Option<String>,

    /// Upstream proxy port. Requires `--proxy-server`.
    #[arg(long, requires = "proxy_server")]
    pub proxy_port: Option<u16>,

    /// Clear any on-disk cache entries before serving traffic.
    #[arg(long)]
    pub clear_cache: bool,

    /// Default freshness window, in seconds, for cached responses.
    #[arg(long, default_value_t = 300)]
    pub max_age: u64,

    /// Directory backing the on-disk cache.
    #[arg(long, default_value = ".proxy-cache")]
    pub cache_dir: String,

    /// Path to a blacklist file (one anchored regex per line). Omit to
    /// allow every server.
    #[arg(long)]
    pub blacklist: Option<String>,

    /// Number of worker threads servicing client connections.
    #[arg(long, default_value_t = crate::proxy::scheduler::DEFAULT_WORKERS)]
    pub workers: usize,

    /// Tracing log level (`error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn proxy_server_requires_proxy_port() {
        let result = Cli::try_parse_from(["proxy", "--proxy-server", "example.com"]);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_are_sane() {
        let cli = Cli::try_parse_from(["proxy"]).unwrap();
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.workers, crate::proxy::scheduler::DEFAULT_WORKERS);
        assert_eq!(cli.max_age, 300);
    }
}
