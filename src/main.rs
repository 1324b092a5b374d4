use std::io::Read;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unified_tts::domain::tts::text::char_len;
use unified_tts::infrastructure::config::{AppConfig, LogFormat};
use unified_tts::TextToSpeech;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    init_logging(&config);

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let mut tts = TextToSpeech::new(config.tts)?;
    tracing::info!(
        provider = %tts.provider(),
        text_length = char_len(&text),
        max_chunk_size = tts.max_chunk_size().get(),
        "Starting unified-tts"
    );

    tts.synthesize(&text).await?;

    let path = tts.save(None).await?;
    println!("{}", path.display());

    Ok(())
}

fn init_logging(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "unified_tts=debug".into());

    // stdout carries the saved path
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
