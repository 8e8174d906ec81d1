use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "odsynth", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header, channels and capture metadata of an EXR file.
    Inspect(InspectArgs),
    /// Convert EXR color channels to an 8-bit PNG.
    Tonemap(TonemapArgs),
    /// Synthesize a stereo panorama from a scene file.
    Synth(SynthArgs),
    /// Compare a synthesized panorama against ground truth.
    Metrics(MetricsArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input EXR.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Keep attributes with unknown types instead of rejecting the file.
    #[arg(long, default_value_t = false)]
    keep_unknown: bool,
}

#[derive(Parser, Debug)]
struct TonemapArgs {
    /// Input EXR.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Channel name prefix, e.g. `Image.left.`.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Write linear values without the display transfer curve.
    #[arg(long, default_value_t = false)]
    linear: bool,

    /// Compress highlights above 0.75 before the transfer curve.
    #[arg(long, default_value_t = false)]
    compress_highlights: bool,
}

#[derive(Parser, Debug)]
struct SynthArgs {
    /// Scene JSON listing nodes and the synthesis request.
    #[arg(long)]
    scene: PathBuf,

    /// Output PNG path (stacked stereo, left eye on top).
    #[arg(long)]
    out: PathBuf,

    /// Optional RVL depth output.
    #[arg(long)]
    depth_out: Option<PathBuf>,

    /// Near plane for the RVL depth output.
    #[arg(long, default_value_t = 0.1)]
    near: f32,

    /// Override the eye position from the scene, as `x,y,z`.
    #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
    eye: Option<odsynth::Vec3>,

    /// Compositor backend. Detected from the thread count when omitted.
    #[arg(long, value_enum)]
    backend: Option<BackendChoice>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct MetricsArgs {
    /// Synthesized stacked panorama PNG.
    #[arg(long)]
    synth: PathBuf,

    /// Ground truth PNG of the same size.
    #[arg(long)]
    truth: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    AtomicMin,
    Ordered,
}

/// One node of a scene file. Relative paths resolve against the scene file's directory.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum SceneNode {
    /// Single-view EXR; position from the entry or the file's metadata.
    Exr {
        exr: PathBuf,
        #[serde(default)]
        position: Option<odsynth::Vec3>,
        #[serde(default)]
        channels: Option<odsynth::NodeChannels>,
    },
    /// Multi-view EXR; one node per view, positions from the file's metadata.
    MultiView { multi_view: PathBuf },
    /// Color image plus raw little-endian `f32` depth.
    Raw {
        color: PathBuf,
        depth: PathBuf,
        position: odsynth::Vec3,
    },
}

#[derive(Debug, serde::Deserialize)]
struct SceneFile {
    nodes: Vec<SceneNode>,
    #[serde(default)]
    request: odsynth::SynthesisRequest,
    #[serde(default)]
    tonemap: Option<odsynth::ToneMapOptions>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Tonemap(args) => cmd_tonemap(args),
        Command::Synth(args) => cmd_synth(args),
        Command::Metrics(args) => cmd_metrics(args),
    }
}

fn parse_vec3(s: &str) -> Result<odsynth::Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("'{s}': {e}"))?;
    match parts[..] {
        [x, y, z] => Ok(odsynth::Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z but got {} values", parts.len())),
    }
}

fn read(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn decode(path: &Path, opts: &odsynth::DecodeOptions) -> anyhow::Result<odsynth::MultiChannelImage> {
    let bytes = read(path)?;
    odsynth::decode_container_with(&bytes, opts)
        .with_context(|| format!("decode '{}'", path.display()))
}

fn write_png(path: &Path, img: &image::RgbaImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let opts = odsynth::DecodeOptions {
        keep_unknown_attributes: args.keep_unknown,
    };
    let image = decode(&args.in_path, &opts)?;
    let window = image.data_window();
    println!(
        "{}x{} data window ({}, {})..({}, {})",
        image.width(),
        image.height(),
        window.min.x,
        window.min.y,
        window.max.x,
        window.max.y
    );
    for channel in image.channels() {
        println!(
            "  channel {:<24} {:?}",
            channel.desc.name, channel.desc.pixel_type
        );
    }
    for (name, value) in image.attributes() {
        println!("  attribute {name:<22} {}", value.type_name());
    }
    if let Some(views) = image.multi_view() {
        println!("  views: {}", views.join(", "));
    }
    if let Some(meta) = odsynth::CaptureMetadata::from_image(&image)? {
        println!("{}", serde_json::to_string_pretty(&meta)?);
    }
    Ok(())
}

fn cmd_tonemap(args: TonemapArgs) -> anyhow::Result<()> {
    let image = decode(&args.in_path, &odsynth::DecodeOptions::default())?;
    let opts = odsynth::ToneMapOptions {
        gamma_correct: !args.linear,
        highlight: args
            .compress_highlights
            .then(odsynth::tonemap::compose::HighlightCompression::default),
    };
    let mut quad = odsynth::ChannelQuad::prefixed(&args.prefix);
    if image.channel(quad.alpha.as_deref().unwrap_or_default()).is_none() {
        quad.alpha = None;
    }
    let rgba = odsynth::compose_rgba(&image, &quad, &opts)?;
    let img = image::RgbaImage::from_raw(image.width(), image.height(), rgba)
        .context("composed buffer does not match image size")?;
    write_png(&args.out, &img)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn load_collection(scene_path: &Path, scene: &SceneFile) -> anyhow::Result<odsynth::PanoramaCollection> {
    let root = scene_path.parent().unwrap_or_else(|| Path::new("."));
    let tonemap = scene.tonemap.unwrap_or_default();
    let mut builder = odsynth::CollectionBuilder::new();

    for (i, node) in scene.nodes.iter().enumerate() {
        match node {
            SceneNode::Exr {
                exr,
                position,
                channels,
            } => {
                let bytes = read(&root.join(exr))?;
                let source = odsynth::ContainerSource {
                    bytes: &bytes,
                    position: *position,
                };
                builder
                    .decode_nodes(
                        std::slice::from_ref(&source),
                        &channels.clone().unwrap_or_default(),
                        &tonemap,
                    )
                    .with_context(|| format!("scene node {i}: '{}'", exr.display()))?;
            }
            SceneNode::MultiView { multi_view } => {
                let image = decode(&root.join(multi_view), &odsynth::DecodeOptions::default())?;
                let meta = odsynth::CaptureMetadata::from_image(&image)?
                    .with_context(|| format!("'{}' has no capture metadata", multi_view.display()))?;
                builder
                    .add_multi_view(&image, &meta, &tonemap)
                    .with_context(|| format!("scene node {i}: '{}'", multi_view.display()))?;
            }
            SceneNode::Raw {
                color,
                depth,
                position,
            } => {
                let input = odsynth::NodeInput::from_png_and_depth(
                    &read(&root.join(color))?,
                    &read(&root.join(depth))?,
                    *position,
                )
                .with_context(|| format!("scene node {i}: '{}'", color.display()))?;
                builder.push(input);
            }
        }
    }
    Ok(builder.build()?)
}

fn cmd_synth(args: SynthArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.scene)
        .with_context(|| format!("read scene '{}'", args.scene.display()))?;
    let scene: SceneFile = serde_json::from_str(&text)
        .with_context(|| format!("parse scene '{}'", args.scene.display()))?;
    let collection = load_collection(&args.scene, &scene)?;

    let mut request = scene.request.clone();
    if let Some(eye) = args.eye {
        request.eye_position = eye;
    }

    let synthesizer = odsynth::Synthesizer::new(odsynth::SynthesisOpts {
        threads: args.threads,
        backend: args.backend.map(|b| match b {
            BackendChoice::AtomicMin => odsynth::BackendKind::AtomicMin,
            BackendChoice::Ordered => odsynth::BackendKind::Ordered,
        }),
    })?;
    let panorama = synthesizer.synthesize(&collection, &request)?;

    write_png(&args.out, &panorama.to_rgba_image()?)?;
    eprintln!("wrote {}", args.out.display());

    if let Some(path) = &args.depth_out {
        let dims = panorama.dims();
        let rvl = odsynth::RvlDepthImage::from_depths(
            dims.width,
            dims.height,
            args.near,
            request.z_max as f32,
            panorama.depth(),
        )?;
        std::fs::write(path, rvl.to_bytes())
            .with_context(|| format!("write depth '{}'", path.display()))?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn load_png(path: &Path) -> anyhow::Result<image::RgbaImage> {
    Ok(image::load_from_memory(&read(path)?)
        .with_context(|| format!("decode '{}'", path.display()))?
        .to_rgba8())
}

fn cmd_metrics(args: MetricsArgs) -> anyhow::Result<()> {
    let synth = load_png(&args.synth)?;
    let (width, height) = synth.dimensions();
    if height % 2 != 0 {
        anyhow::bail!("'{}' is not a stacked stereo panorama", args.synth.display());
    }
    let dims = odsynth::Dims::new(width, height / 2)?;
    let holes = odsynth::hole_area(synth.as_raw(), dims)?;
    println!("hole pixels:      {:.3}%", 100.0 * holes.pixel_fraction);
    println!(
        "hole sphere area: {:.3}% (left {:.3}%, right {:.3}%)",
        100.0 * holes.mean_sphere_fraction(),
        100.0 * holes.sphere_fraction[0],
        100.0 * holes.sphere_fraction[1]
    );

    if let Some(truth_path) = &args.truth {
        let truth = load_png(truth_path)?;
        if truth.dimensions() != synth.dimensions() {
            anyhow::bail!("truth and synthesized images differ in size");
        }
        println!("psnr:             {:.2} dB", odsynth::psnr(truth.as_raw(), synth.as_raw())?);
        println!(
            "psnr (no holes):  {:.2} dB",
            odsynth::psnr_masked(truth.as_raw(), synth.as_raw())?
        );
    }
    Ok(())
}
