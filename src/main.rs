use hairstylist::{
    logger, AppConfig, BatchOrchestrator, CaptureSession, GeminiImageClient, StillFrameDevice,
    Studio,
};
use std::env;
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "usage: hairstylist <image-path> [prompt] [count] [out-dir]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    logger::init_with_config(logger::LoggerConfig::from_env())?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut args = env::args().skip(1);
    let image_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };
    let prompt = args.next();
    let count = match args.next() {
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|e| format!("invalid count '{}': {}", raw, e))?,
        ),
        None => None,
    };
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "generated".to_string()));

    let config = AppConfig::from_env();
    let credentials = config.gemini.credentials();
    logger::log_config_info(&config, credentials.as_ref());

    let client = GeminiImageClient::with_credentials(config.gemini.clone(), credentials);
    let orchestrator = BatchOrchestrator::new(client).with_config(config.batch.clone());

    let mut studio = Studio::new();

    let mut device = StillFrameDevice::new(&image_path);
    let frame = {
        let mut session = CaptureSession::start(&mut device)?;
        session.acquire_frame()?
    };
    studio.capture(frame);

    if let Some(prompt) = prompt {
        studio.set_prompt(prompt);
    }
    if let Some(count) = count {
        studio.set_variations(count);
    }

    log::info!(
        "🎨 Requesting {} styles for \"{}\"",
        studio.variations(),
        studio.prompt()
    );
    studio.generate(&orchestrator).await;

    if let Some(message) = studio.error() {
        log::error!("❌ {}", message);
    }

    if !studio.results().is_empty() {
        fs::create_dir_all(&out_dir)?;
        for (index, image) in studio.results().iter().enumerate() {
            let filename = out_dir.join(format!("variation_{}.{}", index + 1, image.extension()));
            fs::write(&filename, image.data())?;
            log::info!("💾 Saved {}", filename.display());
        }
    }

    for failure in studio.failures() {
        if let Err(e) = &failure.result {
            log::warn!("Variation {} failed: {}", failure.index + 1, e);
        }
    }

    if studio.results().is_empty() {
        std::process::exit(1);
    }
    Ok(())
}
