use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use proxy_sweep::{
    default_output_dir,
    proxy::{
        scanner::{DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, MAX_CONCURRENCY},
        summary, CheckerConfig, NetworkProber, ProxyParser, ProxyType, RunSummary, ScanConfig,
        Scanner,
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Check a proxy list for HTTP, HTTPS, SOCKS4 and SOCKS5 support
#[derive(Parser)]
#[command(name = "proxy-sweep")]
#[command(about = "Check a proxy list for HTTP, HTTPS, SOCKS4 and SOCKS5 support")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize and de-duplicate a proxy list without checking it
    Parse {
        /// Input file containing proxies (HOST:PORT per line)
        input: PathBuf,
        /// Output file for the normalized list
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check every proxy against all four protocols
    Check {
        /// Input file containing proxies (HOST:PORT per line)
        input: PathBuf,
        /// Directory for result files [default: <input dir>/results]
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Number of concurrent workers
        #[arg(
            short = 'n',
            long,
            default_value_t = DEFAULT_CONCURRENCY as u64,
            value_parser = clap::value_parser!(u64).range(1..=MAX_CONCURRENCY as u64)
        )]
        threads: u64,
        /// Endpoints admitted per batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// URL fetched through each proxy for the HTTP check
        #[arg(long, default_value = proxy_sweep::proxy::checker::DEFAULT_HTTP_URL)]
        http_url: String,
        /// URL fetched through each proxy for the HTTPS check
        #[arg(long, default_value = proxy_sweep::proxy::checker::DEFAULT_HTTPS_URL)]
        https_url: String,
        /// Destination host requested through SOCKS proxies
        #[arg(long, default_value = proxy_sweep::proxy::checker::DEFAULT_SOCKS_HOST)]
        socks_host: String,
        /// Destination port requested through SOCKS proxies
        #[arg(long, default_value_t = proxy_sweep::proxy::checker::DEFAULT_SOCKS_PORT)]
        socks_port: u16,
        /// HTTP/HTTPS request timeout in seconds
        #[arg(long, default_value = "7")]
        http_timeout: f64,
        /// SOCKS connect/read timeout in seconds
        #[arg(long, default_value = "4")]
        socket_timeout: f64,
        /// Retries after an HTTP/HTTPS transport error
        #[arg(long, default_value = "1")]
        retries: u32,
        /// Base backoff before a retry in milliseconds (doubles per retry)
        #[arg(long, default_value = "250")]
        backoff_ms: u64,
        /// Do not print the live progress line
        #[arg(short, long)]
        quiet: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn seconds(value: f64, name: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid {name}: {value}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { input, output } => {
            let list = ProxyParser::parse_file(&input)
                .with_context(|| format!("failed to read {:?}", input))?;

            println!(
                "Parsed {} unique proxies from {:?} (duplicates removed: {}, skipped: {})",
                list.len(),
                input,
                list.duplicates_removed,
                list.skipped
            );

            if let Some(output_path) = output {
                ProxyParser::save_to_file(&list.proxies, &output_path)?;
                println!("Saved parsed proxies to {:?}", output_path);
            } else {
                for proxy in &list.proxies {
                    println!("{}", proxy);
                }
            }
        }
        Commands::Check {
            input,
            output_dir,
            threads,
            batch_size,
            http_url,
            https_url,
            socks_host,
            socks_port,
            http_timeout,
            socket_timeout,
            retries,
            backoff_ms,
            quiet,
        } => {
            let list = ProxyParser::parse_file(&input)
                .with_context(|| format!("failed to read {:?}", input))?;
            println!(
                "Loaded {} unique proxies (duplicates removed: {})",
                list.len(),
                list.duplicates_removed
            );
            let out_dir = output_dir.unwrap_or_else(|| default_output_dir(&input));
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {:?}", out_dir))?;

            let checker_config = CheckerConfig::new()
                .with_http_url(http_url)
                .with_https_url(https_url)
                .with_socks_target(socks_host, socks_port)
                .with_http_timeout(seconds(http_timeout, "--http-timeout")?)
                .with_socket_timeout(seconds(socket_timeout, "--socket-timeout")?)
                .with_retries(retries)
                .with_backoff(Duration::from_millis(backoff_ms));
            let prober = Arc::new(NetworkProber::new(checker_config)?);

            let scan_config = ScanConfig::new()
                .with_concurrency(threads as usize)
                .with_batch_size(batch_size)
                .with_progress(!quiet);
            let scanner = Scanner::new(scan_config, prober);

            println!(
                "Checking with {} workers, batch size {}",
                scanner.config().effective_concurrency(),
                scanner.config().batch_size
            );
            println!();

            let cancel = CancellationToken::new();
            let cancel_ctrlc = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel_ctrlc.cancel();
                }
            });

            let report = scanner.run(&list.proxies, &out_dir, cancel).await;
            println!();

            if report.interrupted {
                eprintln!("Interrupted by user. Partial results saved in {:?}", out_dir);
                return Ok(());
            }

            let run = RunSummary::new(&list, report.stats.clone(), report.elapsed);
            if let Err(e) = summary::write_summary(&out_dir, &run).await {
                warn!(error = %e, "failed to write run summary");
            }

            println!("Scan complete!");
            println!(
                "Total checked: {}   Time: {:.2}s   Avg speed: {:.1} p/s",
                report.stats.done,
                report.elapsed.as_secs_f64(),
                run.average_speed()
            );
            for protocol in ProxyType::ALL {
                println!(
                    "{:<6} {}",
                    format!("{}:", protocol),
                    report.results.get(protocol).len()
                );
            }
            println!("Files saved in: {:?}", out_dir);
        }
    }

    Ok(())
}
