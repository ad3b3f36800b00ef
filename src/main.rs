use clap::Parser; // for cli
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use yoga_gateway::build_router;
use yoga_gateway::cache::PricingCache;
use yoga_gateway::checkout::PaymentButtonHost;
use yoga_gateway::clients::{HttpBookingApi, SupabaseClient};
use yoga_gateway::config::Args;
use yoga_gateway::mail::{Mailer, SmtpMailer};
use yoga_gateway::rate_limit::{RateLimitConfig, RateLimiter};
use yoga_gateway::state::{AppState, SiteSettings};
use yoga_gateway::upstream::{Upstream, UpstreamSet, health_checker};
use yoga_gateway::worker::{QueuedMail, mail_worker};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("yoga_gateway=info,tower_http=info")),
        )
        .init();

    // parse cli arguments
    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "gateway failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    args.validate()?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.request_timeout))
        .build()?;

    let hosted_url = args.hosted_url()?;
    if args.hosted_url.is_none() {
        tracing::warn!(url = %hosted_url, "SUPABASE_URL not set, using local backend");
    }
    let smtp = args.smtp_settings();
    if smtp.is_none() {
        tracing::warn!("SMTP not configured, contact notifications will fail");
    }

    let upstreams = Arc::new(UpstreamSet::new(vec![
        Upstream::new("booking api", format!("{}/health", args.api_url.trim_end_matches('/'))),
        Upstream::new("hosted backend", hosted_url.join("auth/v1/health")?.to_string()),
    ]));

    let (mail_tx, mail_rx) = mpsc::channel::<QueuedMail>(100);

    // creating shared state
    let state = Arc::new(AppState {
        api: Arc::new(HttpBookingApi::new(client.clone(), &args.api_url)),
        hosted: Arc::new(SupabaseClient::new(
            client.clone(),
            hosted_url,
            args.hosted_anon_key.as_deref().unwrap_or_default(),
        )),
        rate_limiter: RateLimiter::new(RateLimitConfig::site_defaults()),
        pricing_cache: PricingCache::new(Duration::from_secs(args.cache_ttl)),
        checkout: PaymentButtonHost::new(&args.checkout_script_url),
        upstreams: upstreams.clone(),
        mail_tx,
        site: SiteSettings {
            support_mailbox: args.support_mailbox(),
            password_reset_redirect: args.password_reset_redirect(),
            meet_link: args.meet_link.clone(),
            zoom_link: args.zoom_link.clone(),
        },
    });

    // spawn the background workers
    let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(smtp)?);
    tokio::spawn(mail_worker(mail_rx, mailer));
    tokio::spawn(health_checker(
        upstreams,
        client,
        Duration::from_secs(args.health_interval),
    ));

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, api = %args.api_url, "gateway listening");
    tracing::info!(cache_ttl = args.cache_ttl, strict = args.strict, "pricing cache and config loaded");

    axum::serve(listener, app).await?;
    Ok(())
}
