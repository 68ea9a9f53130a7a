//! Wiring & DI. Entry point: parse CLI, load config, bootstrap adapters, run the pipeline once.
//! No business logic here; authentication is delegated to AuthService.

use chrono::Utc;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tg_digest::adapters::ai::{AnthropicAdapter, MockAiAdapter};
use tg_digest::adapters::image::{HttpImageDownloader, ReplicateAdapter};
use tg_digest::adapters::telegram::{session, GrammersAuthAdapter, GrammersChannelGateway};
use tg_digest::adapters::tools::ImageMagickConverter;
use tg_digest::adapters::ui::{LogDelivery, TuiPrompter};
use tg_digest::domain::{DateRange, ImageModel, PipelineOutcome};
use tg_digest::ports::{AuthPort, DeliveryPort, MessageSourcePort, TextGeneratorPort};
use tg_digest::shared::config::{AppConfig, Settings};
use tg_digest::usecases::auth_service::mask;
use tg_digest::usecases::{
    AuthService, DigestComposer, DigestPipeline, ImagePromptComposer, ImageService,
    PipelineSettings, RateLimiter, TextClient,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Weekly digest of a Telegram channel, illustrated and sent to Saved Messages.
#[derive(Parser, Debug)]
#[command(name = "tg-digest", version, about)]
struct Cli {
    /// First day of the reporting period (YYYY-MM-DD). Requires --end-date.
    #[arg(long)]
    start_date: Option<String>,

    /// Last day of the reporting period (YYYY-MM-DD). Requires --start-date.
    #[arg(long)]
    end_date: Option<String>,

    /// Image model: flux, flux-lora or redpanda. Overrides DIGEST_IMAGE_MODEL.
    #[arg(long)]
    model: Option<ImageModel>,

    /// Use the canned text provider and log the digest instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv::dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found, using process environment"),
    }

    let cli = Cli::parse();

    // --- Config: everything is validated before any network activity ---
    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;
    let mut settings = cfg
        .validate(cli.dry_run)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if let Some(model) = cli.model {
        settings.image_model = model;
    }
    let range = DateRange::resolve(
        cli.start_date.as_deref(),
        cli.end_date.as_deref(),
        Utc::now(),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!(
        channel = %settings.channel_username,
        range = %range,
        model = %settings.image_model,
        dry_run = cli.dry_run,
        "starting digest run"
    );
    info!(
        claude_key = %mask(&settings.claude_api_key),
        replicate_token = %mask(&settings.replicate_api_token),
        claude_model = %settings.claude_model,
        "provider credentials"
    );

    // --- Telegram client (cloned for auth and gateway; same session) ---
    let session_path = session::session_file(&settings.work_dir, &settings.session_path);
    let tg_client = create_telegram_client(&settings, &session_path).await?;

    let auth_adapter: Arc<dyn AuthPort> = Arc::new(GrammersAuthAdapter::new(tg_client.clone()));
    let auth_service = AuthService::new(
        auth_adapter,
        Arc::new(TuiPrompter::new()),
        settings.phone_number.clone(),
        settings.api_hash.clone(),
    );
    auth_service
        .ensure_authorized()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let gateway = Arc::new(GrammersChannelGateway::new(tg_client));
    let source: Arc<dyn MessageSourcePort> = gateway.clone();
    let delivery: Arc<dyn DeliveryPort> = if cli.dry_run {
        warn!("dry run: the digest will be logged, not sent");
        Arc::new(LogDelivery)
    } else {
        gateway as Arc<dyn DeliveryPort>
    };

    // --- Text provider, shared rate limiter ---
    let generator: Arc<dyn TextGeneratorPort> = if cli.dry_run {
        info!("dry run: using mock text provider");
        Arc::new(MockAiAdapter::new())
    } else {
        Arc::new(AnthropicAdapter::new(
            settings.claude_api_url.clone(),
            settings.claude_api_key.clone(),
            settings.claude_model.clone(),
        ))
    };
    let limiter = Arc::new(RateLimiter::new(settings.requests_per_minute));
    info!(
        requests_per_minute = settings.requests_per_minute,
        interval_ms = limiter.interval().as_millis() as u64,
        "text provider rate limit"
    );
    let text = Arc::new(TextClient::new(generator, limiter));

    // --- Image generation ---
    tokio::fs::create_dir_all(&settings.work_dir)
        .await
        .map_err(|e| anyhow::anyhow!("create work dir: {}", e))?;
    let images = ImageService::new(
        Arc::new(ReplicateAdapter::new(
            settings.replicate_api_token.clone(),
            settings.image_poll_attempts,
        )),
        Arc::new(HttpImageDownloader::new()),
        Arc::new(ImageMagickConverter::new(Some(&settings.convert_bin))),
        &settings.work_dir,
    );

    let pipeline = DigestPipeline::new(
        source,
        DigestComposer::new(Arc::clone(&text), settings.digest_style.clone()),
        ImagePromptComposer::new(text),
        images,
        delivery,
        PipelineSettings {
            channel: settings.channel_username.clone(),
            image_model: settings.image_model,
        },
    );

    match pipeline
        .run(&range)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?
    {
        PipelineOutcome::Delivered { with_image } => {
            info!(with_image, "digest delivered to Saved Messages");
            Ok(())
        }
        PipelineOutcome::NoMessages => {
            anyhow::bail!("no messages in {} for @{}", range, settings.channel_username)
        }
        PipelineOutcome::DigestFailed => {
            anyhow::bail!("digest generation failed, nothing was sent")
        }
    }
}

/// Create grammers Client with persistent session storage.
/// Loads the session at `session_path` if present; otherwise it is created and saved after login.
async fn create_telegram_client(
    settings: &Settings,
    session_path: &Path,
) -> anyhow::Result<grammers_client::Client> {
    let session = session::open_file_session(session_path)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(path = %session_path.display(), "telegram session");

    let pool = grammers_client::SenderPool::new(Arc::new(session), settings.api_id);
    let handle = pool.handle.clone();
    tokio::spawn(async move {
        pool.runner.run().await;
    });
    Ok(grammers_client::Client::new(handle))
}
