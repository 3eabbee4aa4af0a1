use clap::{Parser, Subcommand};
use photo_upload::imaging::{ImageBackend, Quality, RustBackend, encode_for_upload};
use photo_upload::{
    HttpUploadClient, PipelineController, PipelineSettings, acquire, config, logging, output,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "photo-upload")]
#[command(about = "Compress a photo and upload it to an object store")]
#[command(long_about = "\
Compress a photo and upload it to an object store

The photo is decoded, re-encoded as JPEG at the capture quality, then
encoded again at the upload quality and PUT to <endpoint>/<key>, where
the key is <key_prefix>/<random id>/<file name>.jpg.

Every state change is printed as it happens:

  001 ready      harbor.jpg 1200x800
  002 uploading  harbor.jpg 1200x800
  003 uploading  harbor.jpg 1200x800
  004 ready      harbor.jpg 1200x800
  Uploaded: https://store.example.com/photos/images/6f1c.../harbor.jpg

Run 'photo-upload gen-config' to generate a documented config file.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "photo-upload.toml", global = true)]
    config: PathBuf,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a photo and upload it
    Upload {
        /// Photo to upload
        file: PathBuf,
        /// Override upload.endpoint from the config
        #[arg(long)]
        endpoint: Option<String>,
        /// Print a JSON summary instead of the transition listing
        #[arg(long)]
        json: bool,
    },
    /// Compress a photo to a JPEG file without uploading
    Compress {
        /// Photo to compress
        file: PathBuf,
        /// Where to write the JPEG
        #[arg(short, long)]
        output: PathBuf,
        /// JPEG quality 1-100 (default: compression.capture_quality)
        #[arg(short, long)]
        quality: Option<u32>,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Command::Upload {
            file,
            endpoint,
            json,
        } => {
            let config = load_config(&cli.config, endpoint)?;
            let ok = run_upload(&config, &file, json).await?;
            if !ok {
                std::process::exit(1);
            }
        }
        Command::Compress {
            file,
            output: out,
            quality,
        } => {
            let config = load_config(&cli.config, None)?;
            let quality = quality
                .map(Quality::new)
                .unwrap_or_else(|| config.compression.capture());
            run_compress(&file, &out, quality)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and layer command-line overrides on top.
fn load_config(
    path: &Path,
    endpoint: Option<String>,
) -> Result<config::UploaderConfig, config::ConfigError> {
    let mut overlays: Vec<toml::Value> = config::load_raw_config(path)?.into_iter().collect();
    if let Some(endpoint) = endpoint {
        let mut upload = toml::map::Map::new();
        upload.insert("endpoint".into(), toml::Value::String(endpoint));
        let mut root = toml::map::Map::new();
        root.insert("upload".into(), toml::Value::Table(upload));
        overlays.push(toml::Value::Table(root));
    }
    config::resolve_config(overlays)
}

/// Acquire, upload, and print transitions. Returns whether the upload succeeded.
async fn run_upload(
    config: &config::UploaderConfig,
    file: &Path,
    json: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    let backend: Arc<dyn ImageBackend> = Arc::new(RustBackend::new());
    let client = Arc::new(HttpUploadClient::new(&config.upload)?);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for (i, state) in rx.into_iter().enumerate() {
            if !json {
                output::print_transition(i + 1, &state);
            }
        }
    });

    let controller = PipelineController::new(
        client,
        Arc::clone(&backend),
        PipelineSettings::from_config(config),
        Some(tx),
    );

    let Some(event) = acquire::selection(acquire::from_path(
        backend.as_ref(),
        file,
        config.compression.capture(),
    )) else {
        return Err(format!("could not read {}", file.display()).into());
    };
    controller.handle(event);
    controller.handle(photo_upload::Event::UploadRequested);
    let settlement = controller.wait_idle().await;
    let state = controller.state();

    // Dropping the controller closes the transition channel and ends the printer.
    drop(controller);
    printer.join().map_err(|_| "output thread panicked")?;

    if json {
        let summary = output::RunSummary::new(&state, settlement.as_ref());
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", output::format_settlement(settlement.as_ref()));
    }
    Ok(matches!(
        settlement,
        Some(photo_upload::Settlement::Uploaded { .. })
    ))
}

/// Compress `file` at `quality` and write the JPEG to `out`.
fn run_compress(file: &Path, out: &Path, quality: Quality) -> Result<(), Box<dyn std::error::Error>> {
    let backend = RustBackend::new();
    let before = std::fs::metadata(file)?.len() as usize;
    let image = acquire::from_path(&backend, file, quality)?;
    let bytes = encode_for_upload(&backend, &image, quality)?;
    std::fs::write(out, &bytes)?;
    output::print_compression(&image, quality, before, bytes.len());
    Ok(())
}
