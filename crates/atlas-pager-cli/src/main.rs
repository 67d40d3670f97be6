use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use atlas_pager_core::config::SortOrder;
use atlas_pager_core::{
    Atlas, InputImage, LayoutItem, PackStats, PackerConfig, manifest_name, pack_images,
    pack_layout_items, page_image_names, to_json_array, to_xml_page,
};
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use image::{DynamicImage, ImageReader};
use serde::Deserialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "atlas-pager",
    about = "Page images into fixed-size texture atlases",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images into atlas pages (PNG + XML manifest per page)
    Pack(PackArgs),
    /// Layout-only export (no PNGs): compute placements and write manifests
    Layout(PackArgs),
    /// Simple timing bench (lays out once, prints time + occupancy)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Page base name (files will be name0.png/name0.xml, name1.png/...)
    #[arg(short, long, default_value = "Atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides layout options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Layout
    /// Page width and height in pixels
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    page_size: u32,
    /// Horizontal padding added on each side of every image
    #[arg(long, default_value_t = 4, help_heading = "Layout")]
    pad_x: u32,
    /// Vertical padding added on each side of every image
    #[arg(long, default_value_t = 4, help_heading = "Layout")]
    pad_y: u32,
    /// Sort order: area_desc|max_side_desc|height_desc|width_desc|none
    #[arg(long, default_value = "area_desc", help_heading = "Layout")]
    sort_order: String,
    /// Probe existing pages in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,
    /// Draw red outlines (debug)
    #[arg(long, default_value_t = false, help_heading = "Image Processing")]
    outlines: bool,

    // Export
    /// Also write a combined JSON description (name.json)
    #[arg(long, default_value_t = false, help_heading = "Export")]
    json: bool,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input directory
    input: PathBuf,
    /// Page width and height in pixels
    #[arg(long, default_value_t = 1024)]
    page_size: u32,
    /// Padding on each side (both axes)
    #[arg(long, default_value_t = 4)]
    pad: u32,
    /// Sort order: area_desc|max_side_desc|height_desc|width_desc|none
    #[arg(long, default_value = "area_desc")]
    sort_order: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args, cli.progress && !cli.quiet),
        Commands::Bench(b) => run_bench(b),
    }
}

fn build_config(cli: &PackArgs) -> anyhow::Result<PackerConfig> {
    let cfg = PackerConfig {
        page_width: cli.page_size,
        page_height: cli.page_size,
        pad_x: cli.pad_x,
        pad_y: cli.pad_y,
        sort_order: parse_sort_order(&cli.sort_order)?,
        outlines: cli.outlines,
        parallel: cli.parallel,
    };
    // Config file sets layout options en bloc, on top of the CLI values
    let cfg = if let Some(path) = &cli.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse {}", path.display()))?;
        y.into_packer_config(cfg)?
    } else {
        cfg
    };
    if cfg.parallel && !cfg!(feature = "parallel") {
        warn!("--parallel has no effect: built without the `parallel` feature");
    }
    Ok(cfg)
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude, Some(&cli.out_dir))?;
    let inputs = load_images_with_progress(&paths, show_progress)?;
    info!(count = inputs.len(), "loaded input images");

    let start = Instant::now();
    let out = pack_images(inputs, cfg)?;
    info!(pages = out.pages.len(), time = %fmt_dur(start.elapsed()), "packed");

    let names = page_image_names(&cli.name, out.pages.len());
    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        for (p, png_name) in out.pages.iter().zip(&names) {
            let png_path = cli.out_dir.join(png_name);
            p.rgba
                .save(&png_path)
                .with_context(|| format!("write {}", png_path.display()))?;
            info!(?png_path, id = p.page.id, "wrote page");
        }
        write_manifests(cli, &out.atlas, &names)?;
    }

    finish_stats(cli, &out.stats())
}

fn run_layout(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if cli.print_config {
        return print_config(&cfg, &cli.print_config_format);
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude, Some(&cli.out_dir))?;
    let items = read_dimensions(&paths, show_progress)?;
    info!(count = items.len(), "read image dimensions");

    let atlas = pack_layout_items(items, cfg)?;
    let names = page_image_names(&cli.name, atlas.pages.len());
    if !cli.dry_run {
        fs::create_dir_all(&cli.out_dir)
            .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
        write_manifests(cli, &atlas, &names)?;
    }

    finish_stats(cli, &atlas.stats())
}

fn write_manifests(cli: &PackArgs, atlas: &Atlas, names: &[String]) -> anyhow::Result<()> {
    for (page, png_name) in atlas.pages.iter().zip(names) {
        let xml_path = cli.out_dir.join(manifest_name(png_name));
        fs::write(&xml_path, to_xml_page(page, png_name))
            .with_context(|| format!("write {}", xml_path.display()))?;
        info!(?xml_path, frames = page.frames.len(), "wrote manifest");
    }
    if cli.json {
        let json_path = cli.out_dir.join(format!("{}.json", cli.name));
        let json = serde_json::to_string_pretty(&to_json_array(atlas, names))?;
        fs::write(&json_path, json).with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, pages = atlas.pages.len(), "atlas written");
    }
    Ok(())
}

fn finish_stats(cli: &PackArgs, stats: &PackStats) -> anyhow::Result<()> {
    info!(
        pages = stats.num_pages,
        used_area = stats.used_frame_area,
        total_area = stats.total_page_area,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
    if let Some(stats_path) = &cli.export_stats {
        if cli.dry_run {
            println!("{}", stats.summary());
        } else {
            fs::write(stats_path, serde_json::to_string_pretty(stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        }
    }
    Ok(())
}

fn print_config(cfg: &PackerConfig, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let cfg = bench_config(b)?;
    let paths = gather_paths(&b.input, &[], &[], None)?;
    let items = read_dimensions(&paths, false)?;
    let start = Instant::now();
    let atlas = pack_layout_items(items, cfg)?;
    let dur = start.elapsed();
    let stats = atlas.stats();
    println!(
        "pages={} occupancy={:.2}% time={}",
        stats.num_pages,
        stats.occupancy * 100.0,
        fmt_dur(dur)
    );
    Ok(())
}

fn bench_config(b: &BenchArgs) -> anyhow::Result<PackerConfig> {
    Ok(PackerConfig::builder()
        .with_page_size(b.page_size)
        .with_padding(b.pad, b.pad)
        .sort_order(parse_sort_order(&b.sort_order)?)
        .build())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut b = GlobSetBuilder::new();
    for pat in patterns {
        b.add(Glob::new(pat).with_context(|| format!("invalid glob {pat}"))?);
    }
    Ok(Some(b.build()?))
}

/// Collects image files under `path`, skipping everything inside `skip_dir`.
///
/// `skip_dir` is the output directory, so pages written by an earlier run are not
/// packed again when it sits under the input tree.
fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
    skip_dir: Option<&Path>,
) -> anyhow::Result<Vec<PathBuf>> {
    let inc_set = build_globset(include)?;
    let exc_set = build_globset(exclude)?;
    // a missing out_dir cannot hold stale pages
    let skip = skip_dir.and_then(|d| fs::canonicalize(d).ok());
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        // Sorted traversal keeps equal-area ties stable between runs
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !(e.depth() > 0 && e.file_type().is_dir() && is_within(e.path(), skip.as_deref()))
            })
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    info!(root = ?path, found = list.len(), "scanned for textures");
    Ok(list)
}

fn is_within(p: &Path, dir: Option<&Path>) -> bool {
    match (dir, fs::canonicalize(p)) {
        (Some(dir), Ok(p)) => p.starts_with(dir),
        _ => false,
    }
}

fn should_skip(p: &Path, include: Option<&GlobSet>, exclude: Option<&GlobSet>) -> bool {
    if let Some(inc) = include {
        if !inc.is_match(p) {
            return true;
        }
    }
    if let Some(exc) = exclude {
        if exc.is_match(p) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    match p.extension().and_then(|s| s.to_str()) {
        Some(ext) => matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"),
        None => false,
    }
}

fn image_key(p: &Path) -> String {
    p.to_string_lossy().replace('\\', "/")
}

fn progress_bar(len: usize, verb: &str, show: bool) -> Option<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show {
        return None;
    }
    let b = ProgressBar::new(len as u64);
    let template = format!("{{spinner:.green}} {verb} {{pos}}/{{len}} [{{elapsed_precise}}] {{wide_msg}}");
    if let Ok(style) = ProgressStyle::with_template(&template) {
        b.set_style(style);
    }
    Some(b)
}

fn load_images_with_progress(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<InputImage>> {
    let bar = progress_bar(paths.len(), "loading", progress);
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        if let Some(b) = &bar {
            b.set_message(p.file_name().and_then(|s| s.to_str()).unwrap_or("").to_string());
        }
        match load_image(p) {
            Ok(img) => list.push(InputImage {
                key: image_key(p),
                image: img,
            }),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

/// Reads only image headers; nothing is decoded.
fn read_dimensions(paths: &[PathBuf], progress: bool) -> anyhow::Result<Vec<LayoutItem<String>>> {
    let bar = progress_bar(paths.len(), "probing", progress);
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let dims = ImageReader::open(p)
            .and_then(|r| r.with_guessed_format())
            .map_err(anyhow::Error::from)
            .and_then(|r| r.into_dimensions().map_err(anyhow::Error::from));
        match dims {
            Ok((w, h)) => list.push(LayoutItem::new(image_key(p), w, h)),
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<DynamicImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    page_size: Option<u32>,
    pad_x: Option<u32>,
    pad_y: Option<u32>,
    sort_order: Option<String>,
    outlines: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.page_size {
            cfg.page_width = v;
            cfg.page_height = v;
        }
        if let Some(v) = self.pad_x {
            cfg.pad_x = v;
        }
        if let Some(v) = self.pad_y {
            cfg.pad_y = v;
        }
        if let Some(v) = self.sort_order {
            cfg.sort_order = parse_sort_order(&v)?;
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

fn parse_sort_order(s: &str) -> anyhow::Result<SortOrder> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown sort order: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overrides_cli_values() {
        let y: YamlConfig =
            serde_yaml::from_str("page_size: 512\npad_x: 1\nsort_order: none\n").unwrap();
        let cfg = y.into_packer_config(PackerConfig::default()).unwrap();
        assert_eq!((cfg.page_width, cfg.page_height), (512, 512));
        assert_eq!((cfg.pad_x, cfg.pad_y), (1, 4));
        assert_eq!(cfg.sort_order, SortOrder::None);
    }

    #[test]
    fn yaml_rejects_unknown_sort_order() {
        let y: YamlConfig = serde_yaml::from_str("sort_order: sideways\n").unwrap();
        assert!(y.into_packer_config(PackerConfig::default()).is_err());
    }

    #[test]
    fn only_png_and_jpeg_are_images() {
        assert!(is_image(Path::new("a/b.PNG")));
        assert!(is_image(Path::new("c.jpeg")));
        assert!(!is_image(Path::new("d.xml")));
        assert!(!is_image(Path::new("noext")));
    }

    #[test]
    fn bench_honours_sort_order() {
        let cli = Cli::try_parse_from(["atlas-pager", "bench", "in", "--sort-order", "none"]).unwrap();
        let Commands::Bench(b) = cli.command else {
            panic!("expected bench subcommand");
        };
        assert_eq!(bench_config(&b).unwrap().sort_order, SortOrder::None);

        let cli = Cli::try_parse_from(["atlas-pager", "bench", "in", "--sort-order", "diagonal"]).unwrap();
        let Commands::Bench(b) = cli.command else {
            panic!("expected bench subcommand");
        };
        assert!(bench_config(&b).is_err());
    }

    #[test]
    fn out_dir_is_not_rescanned() {
        let root = std::env::temp_dir().join(format!("atlas-pager-scan-{}", std::process::id()));
        let out = root.join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(root.join("a.png"), b"").unwrap();
        fs::write(out.join("Atlas0.png"), b"").unwrap();

        let found = gather_paths(&root, &[], &[], Some(&out)).unwrap();
        let all = gather_paths(&root, &[], &[], None).unwrap();
        fs::remove_dir_all(&root).unwrap();

        assert_eq!(found, vec![root.join("a.png")]);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn exclude_glob_skips_match() {
        let exc = build_globset(&["**/skip/**".to_string()]).unwrap();
        assert!(should_skip(Path::new("root/skip/a.png"), None, exc.as_ref()));
        assert!(!should_skip(Path::new("root/keep/a.png"), None, exc.as_ref()));
    }
}
