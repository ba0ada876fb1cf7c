use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgshift::codec::NativeCodec;
use imgshift::convert::convert;
use imgshift::models::{
    ConversionRequest, Dithering, GifOptions, OutputFormat, PngOptions,
};
use imgshift::services::{export_filename, ConversionController, JobState};

#[derive(Parser)]
#[command(name = "imgshift")]
#[command(about = "Convert images between JPEG, PNG, WebP and GIF")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single image
    Convert {
        /// Source image file
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: OutputFormat,

        /// Output file path (defaults to the input name with the new extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JPEG/WebP quality, 0-100
        #[arg(short, long, default_value_t = 82)]
        quality: u8,

        /// Palette size for GIF and reduced PNG
        #[arg(long, default_value_t = 256)]
        colors: u32,

        /// Dithering mode for palette output
        #[arg(long, value_enum, default_value_t = Dithering::FloydSteinberg)]
        dither: Dithering,

        /// Composite transparency over the background color instead of
        /// keeping it
        #[arg(long)]
        flatten: bool,

        /// Background color used when flattening (hex)
        #[arg(long, default_value = "#ffffff")]
        background: String,

        /// Write Adam7-interlaced PNG output
        #[arg(long)]
        interlaced: bool,

        /// GIF loop count: 0 or negative loops forever
        #[arg(long, default_value_t = 0)]
        r#loop: i32,

        /// Quantize PNG output down to --colors entries
        #[arg(long)]
        reduce_colors: bool,
    },
    /// Convert many images concurrently
    Batch {
        /// Source image files
        inputs: Vec<PathBuf>,

        /// Output format for every file
        #[arg(short, long, value_enum)]
        format: OutputFormat,

        /// Directory for converted files
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// JPEG/WebP quality, 0-100
        #[arg(short, long, default_value_t = 82)]
        quality: u8,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgshift=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            input,
            format,
            output,
            quality,
            colors,
            dither,
            flatten,
            background,
            interlaced,
            r#loop,
            reduce_colors,
        } => {
            let request = build_request(
                format,
                quality,
                colors,
                dither,
                flatten,
                background,
                interlaced,
                r#loop,
                reduce_colors,
            );
            run_convert_command(&input, output.as_deref(), &request)
        }
        Commands::Batch { inputs, format, out_dir, quality } => {
            run_batch_command(inputs, format, &out_dir, quality).await
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_request(
    format: OutputFormat,
    quality: u8,
    colors: u32,
    dither: Dithering,
    flatten: bool,
    background: String,
    interlaced: bool,
    loop_count: i32,
    reduce_colors: bool,
) -> ConversionRequest {
    match format {
        OutputFormat::Jpeg => ConversionRequest::Jpeg { quality },
        OutputFormat::Webp => ConversionRequest::Webp { quality },
        OutputFormat::Gif => ConversionRequest::Gif(GifOptions {
            color_count: colors,
            dithering: dither,
            preserve_alpha: !flatten,
            background_color: background,
            loop_count,
        }),
        OutputFormat::Png => ConversionRequest::Png(PngOptions {
            color_count: colors,
            reduce_colors,
            preserve_alpha: !flatten,
            background_color: background,
            interlaced,
        }),
    }
}

fn run_convert_command(
    input: &Path,
    output: Option<&Path>,
    request: &ConversionRequest,
) -> anyhow::Result<()> {
    let source = std::fs::read(input)?;
    let codec = NativeCodec::new();
    let result = convert(&codec, &source, request)?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            PathBuf::from(export_filename(&name, result.format))
        }
    };

    std::fs::write(&output, &result.bytes)?;
    println!(
        "Wrote {} ({}x{}, {} bytes)",
        output.display(),
        result.width,
        result.height,
        result.bytes.len()
    );
    Ok(())
}

async fn run_batch_command(
    inputs: Vec<PathBuf>,
    format: OutputFormat,
    out_dir: &Path,
    quality: u8,
) -> anyhow::Result<()> {
    if inputs.is_empty() {
        anyhow::bail!("no input files given");
    }
    std::fs::create_dir_all(out_dir)?;

    let controller = ConversionController::new(Arc::new(NativeCodec::new()));
    let request = match format {
        OutputFormat::Jpeg => ConversionRequest::Jpeg { quality },
        OutputFormat::Webp => ConversionRequest::Webp { quality },
        other => ConversionRequest::for_format(other),
    };

    let mut jobs = Vec::new();
    for path in &inputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        match std::fs::read(path) {
            Ok(bytes) => {
                let id = controller.add_item(name, bytes, request.clone()).await;
                if let Some(task) = controller.request_conversion(id).await {
                    jobs.push((path.clone(), id, task));
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable file");
            }
        }
    }

    let mut failures = 0usize;
    for (path, id, task) in jobs {
        let _ = task.await;
        match controller.item_state(id).await {
            Some(JobState::Done(_)) => {}
            Some(JobState::Failed(message)) => {
                eprintln!("{}: {message}", path.display());
                failures += 1;
            }
            other => {
                eprintln!("{}: no result ({other:?})", path.display());
                failures += 1;
            }
        }
    }

    for (filename, bytes) in controller.completed_exports().await {
        let target = out_dir.join(&filename);
        std::fs::write(&target, bytes.as_slice())?;
        println!("Wrote {}", target.display());
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} conversions failed", inputs.len());
    }
    Ok(())
}
