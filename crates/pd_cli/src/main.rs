use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use pd_core::{ArticleCache, PayoutRate};
use pd_payout::{transition, Command as PayoutCommand, PayoutEvent, PayoutState};
use pd_sources::{
    AcquisitionGuard, Connectivity, DirectFetch, HttpProbe, SourceChain, SourceConfig, StaticProbe,
};
use pd_storage::{MemoryCache, SqliteCache};

#[derive(Parser)]
#[command(name = "pd", about = "Aggregated news viewing and author payouts")]
struct Cli {
    /// SQLite cache path; omit for a purely in-memory cache
    #[arg(long, env = "PD_DB_PATH", global = true)]
    db: Option<PathBuf>,

    /// Treat the network as unavailable (skips probe and write-backs)
    #[arg(long, global = true)]
    offline: bool,

    /// Base URL of the trusted intermediary endpoint
    #[arg(
        long,
        env = "PD_MEDIATED_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    mediated_url: String,

    /// Base URL of the upstream content provider
    #[arg(
        long,
        env = "PD_PROVIDER_URL",
        default_value = "https://newsapi.org/v2",
        global = true
    )]
    provider_url: String,

    /// Provider API key (server-side only)
    #[arg(long, env = "PD_API_KEY", default_value = "", global = true)]
    api_key: String,

    /// Target for the connectivity probe
    #[arg(
        long,
        env = "PD_PROBE_URL",
        default_value = "https://newsapi.org",
        global = true
    )]
    probe_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the acquisition chain and print the resulting collection
    Fetch,
    /// Compute payouts over the cached article collection
    Payouts {
        #[arg(long)]
        news_rate: Option<f64>,
        #[arg(long)]
        blog_rate: Option<f64>,
    },
    /// Show or update the persisted rate table (repricing existing payouts)
    Rates {
        #[arg(long)]
        news_rate: Option<f64>,
        #[arg(long)]
        blog_rate: Option<f64>,
    },
    /// Serve the dashboard API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let cache = open_cache(cli.db.as_deref()).await?;
    let config = SourceConfig {
        mediated_base: cli.mediated_url.clone(),
        provider_base: cli.provider_url.clone(),
        api_key: cli.api_key.clone(),
        probe_target: cli.probe_url.clone(),
        ..Default::default()
    };
    let probe: Arc<dyn Connectivity> = if cli.offline {
        Arc::new(StaticProbe(false))
    } else {
        Arc::new(HttpProbe::new(config.probe_target.clone()))
    };

    match cli.command {
        Commands::Fetch => fetch(cache, &config, probe).await,
        Commands::Payouts {
            news_rate,
            blog_rate,
        } => payouts(cache, news_rate, blog_rate).await,
        Commands::Rates {
            news_rate,
            blog_rate,
        } => rates(cache, news_rate, blog_rate).await,
        Commands::Serve { addr } => serve(cache, &config, &addr).await,
    }
}

async fn open_cache(path: Option<&Path>) -> Result<Arc<dyn ArticleCache>> {
    match path {
        Some(path) => {
            let cache = SqliteCache::open(path).await?;
            info!("🏦 sqlite cache at {}", path.display());
            Ok(Arc::new(cache))
        }
        None => {
            info!("🏦 in-memory cache (pass --db for persistence)");
            Ok(Arc::new(MemoryCache::new()))
        }
    }
}

async fn fetch(
    cache: Arc<dyn ArticleCache>,
    config: &SourceConfig,
    probe: Arc<dyn Connectivity>,
) -> Result<()> {
    let chain = SourceChain::with_defaults(config, cache, probe)?;
    let guard = AcquisitionGuard::new();

    // The guard is always free here; it matters for re-entrant callers.
    let articles = match chain.acquire_guarded(&guard).await {
        Some(articles) => articles,
        None => Vec::new(),
    };

    info!("🗞️ acquired {} articles", articles.len());
    for article in &articles {
        println!(
            "{}  [{}]  {} by {}",
            article.published_at, article.kind, article.title, article.author
        );
    }
    Ok(())
}

/// Merges CLI overrides over the persisted rate table.
async fn resolve_rates(
    cache: &Arc<dyn ArticleCache>,
    news_rate: Option<f64>,
    blog_rate: Option<f64>,
) -> Result<PayoutRate> {
    let persisted = cache.get_rates().await?.unwrap_or_default();
    let rates = PayoutRate {
        news_rate: news_rate.unwrap_or(persisted.news_rate),
        blog_rate: blog_rate.unwrap_or(persisted.blog_rate),
    };
    if rates.news_rate < 0.0 || rates.blog_rate < 0.0 {
        anyhow::bail!("rates must be non-negative");
    }
    Ok(rates)
}

async fn run_commands(cache: &Arc<dyn ArticleCache>, commands: Vec<PayoutCommand>) -> Result<()> {
    for command in commands {
        match command {
            PayoutCommand::PersistPayouts(payouts) => cache.save_payouts(&payouts).await?,
            PayoutCommand::PersistRates(rates) => cache.save_rates(&rates).await?,
        }
    }
    Ok(())
}

fn print_payouts(state: &PayoutState) {
    for payout in state.payouts() {
        println!(
            "{:<30} {:>4} articles {:>12.2}",
            payout.author, payout.article_count, payout.total_payout
        );
    }
}

async fn payouts(
    cache: Arc<dyn ArticleCache>,
    news_rate: Option<f64>,
    blog_rate: Option<f64>,
) -> Result<()> {
    let rates = resolve_rates(&cache, news_rate, blog_rate).await?;
    let articles = cache.get_articles().await?;
    if articles.is_empty() {
        anyhow::bail!("no cached articles; run `pd fetch` first");
    }

    let (state, commands) = transition(
        PayoutState::Empty,
        PayoutEvent::ArticlesLoaded { articles, rates },
    );
    run_commands(&cache, commands).await?;
    print_payouts(&state);
    Ok(())
}

async fn rates(
    cache: Arc<dyn ArticleCache>,
    news_rate: Option<f64>,
    blog_rate: Option<f64>,
) -> Result<()> {
    if news_rate.is_none() && blog_rate.is_none() {
        let rates = cache.get_rates().await?.unwrap_or_default();
        println!("newsRate: {}", rates.news_rate);
        println!("blogRate: {}", rates.blog_rate);
        return Ok(());
    }

    let rates = resolve_rates(&cache, news_rate, blog_rate).await?;
    let previous = cache.get_payouts().await?;
    let state = if previous.is_empty() {
        PayoutState::Empty
    } else {
        PayoutState::Calculated(previous)
    };

    let (state, commands) = transition(state, PayoutEvent::RatesChanged(rates));
    run_commands(&cache, commands).await?;
    info!("💰 rates updated; {} payout rows repriced", state.payouts().len());
    print_payouts(&state);
    Ok(())
}

async fn serve(cache: Arc<dyn ArticleCache>, config: &SourceConfig, addr: &str) -> Result<()> {
    let provider = DirectFetch::new(
        reqwest::Client::new(),
        &config.provider_base,
        config.api_key.clone(),
    )?;
    let app = pd_web::create_app(pd_web::AppState { cache, provider });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 serving dashboard API on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
