use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "digiprotector", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watermark an image and write it as a PNG.
    Apply(ApplyArgs),
    /// Print the resolved watermark style as JSON.
    Style(StyleArgs),
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long, default_value = digiprotector::DEFAULT_EXPORT_FILENAME)]
    out: PathBuf,

    /// Font file; falls back to $DIGIPROTECTOR_FONT, then well-known system fonts.
    #[arg(long)]
    font: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Style JSON; flags below override its fields.
    #[arg(long = "style")]
    style_path: Option<PathBuf>,

    /// Watermark text.
    #[arg(long)]
    text: Option<String>,

    /// Font size in pixels.
    #[arg(long)]
    font_size: Option<u32>,

    /// Opacity between 0 and 1.
    #[arg(long)]
    opacity: Option<f32>,

    /// Text color as #rrggbb.
    #[arg(long)]
    color: Option<digiprotector::Rgb8>,

    /// center, top-left, top-right, bottom-left or bottom-right.
    #[arg(long)]
    position: Option<digiprotector::Position>,
}

impl StyleArgs {
    fn resolve(&self) -> anyhow::Result<digiprotector::WatermarkStyle> {
        let mut style = match &self.style_path {
            Some(p) => digiprotector::WatermarkStyle::from_json_file(p)
                .with_context(|| format!("load style '{}'", p.display()))?,
            None => digiprotector::WatermarkStyle::default(),
        };
        if let Some(text) = &self.text {
            style.text = text.clone();
        }
        if let Some(font_size) = self.font_size {
            style.font_size = font_size;
        }
        if let Some(opacity) = self.opacity {
            style.opacity = opacity;
        }
        if let Some(color) = self.color {
            style.color = color;
        }
        if let Some(position) = self.position {
            style.position = position;
        }
        Ok(style)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Style(args) => cmd_style(args),
    }
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let style = args.style.resolve()?;

    let source = digiprotector::SourceImage::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?;

    let font = digiprotector::resolve_font(args.font.as_deref()).context("resolve font")?;
    let font_path = font.path.clone();
    let text = digiprotector::ParleyRasterizer::new(font)
        .with_context(|| format!("load font '{}'", font_path.display()))?;

    let mut compositor = digiprotector::Compositor::new(text);
    let output = compositor
        .render(Some(&source), &style)?
        .context("compositor produced no output")?;

    write_output(&output, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_output(output: &digiprotector::OutputImage, out: &Path) -> anyhow::Result<()> {
    output
        .save_png(out)
        .with_context(|| format!("write png '{}'", out.display()))
}

fn cmd_style(args: StyleArgs) -> anyhow::Result<()> {
    let style = args.resolve()?;
    println!("{}", style.to_json_pretty()?);
    Ok(())
}
