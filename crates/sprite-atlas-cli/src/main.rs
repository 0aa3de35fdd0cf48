use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::OnceLock;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use sprite_atlas_core::{
    ExtractConfig, NoProgress, PackConfig, ProgressEvent, ProgressObserver, extract_atlases,
    generate_atlases, plan_atlases,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "sprite-atlas",
    about = "Pack frame folders into sprite atlases and extract atlases back into frames",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// YAML config file with optional `pack:` and `extract:` sections (overrides CLI values)
    #[arg(long, global = true, help_heading = "Config")]
    config: Option<PathBuf>,
    /// Print the merged configuration and exit
    #[arg(long, default_value_t = false, global = true, help_heading = "Config")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], global = true, help_heading = "Config")]
    print_config_format: String,
    /// Show progress bars (disable with --progress=false or --quiet)
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
    /// Pack every leaf folder of frames into <name>.png + <name>.xml
    Pack(PackArgs),
    /// Extract frames from every <base>.png + <base>.xml pair under a directory
    Extract(ExtractArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Input root containing frame folders
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output root (mirrors the input tree)
    #[arg(short, long, default_value = "atlases", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Exclude patterns (glob) on frame file names
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Do not copy <folder>.txt next to the atlas
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    no_sidecar: bool,

    /// Pixels between frames
    #[arg(long, default_value_t = 10, help_heading = "Layout")]
    gap: u32,
    /// Canvas growth per overflow (percent)
    #[arg(long, default_value_t = 10, help_heading = "Layout")]
    growth_percent: u32,
    /// Maximum placement passes per folder
    #[arg(long, default_value_t = 64, help_heading = "Layout")]
    max_attempts: u32,
    /// Maximum canvas side
    #[arg(long, default_value_t = 16384, help_heading = "Layout")]
    max_canvas_size: u32,

    /// Comment written at the top of each XML file (empty to omit)
    #[arg(long, help_heading = "Export")]
    header_comment: Option<String>,
    /// Export the batch report (JSON) to this file
    #[arg(long, help_heading = "Export")]
    report: Option<PathBuf>,
    /// Dry run: pack and report but do not write atlases
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct ExtractArgs {
    /// Directory scanned recursively for atlas/metadata pairs
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output root (default: <input>/frames)
    #[arg(short, long, help_heading = "Input/Output")]
    out_dir: Option<PathBuf>,
    /// Directory names (glob) never scanned; replaces the defaults when given
    #[arg(long, help_heading = "Input/Output")]
    skip_dir: Vec<String>,
    /// Do not write the <width>x<height>.txt marker
    #[arg(long, default_value_t = false, help_heading = "Export")]
    no_size_marker: bool,
    /// Worker threads (default: available parallelism)
    #[arg(long, help_heading = "Performance")]
    workers: Option<usize>,
    /// Export the batch report (JSON) to this file
    #[arg(long, help_heading = "Export")]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let yaml = match &cli.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_yaml::from_str::<YamlConfig>(&file)
                .with_context(|| format!("parse config {}", path.display()))?
        }
        None => YamlConfig::default(),
    };
    let show_progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Pack(args) => {
            let cfg = yaml
                .pack
                .unwrap_or_default()
                .into_pack_config(pack_config_from_args(args));
            if cli.print_config {
                print_config(&cfg, &cli.print_config_format)?;
                return Ok(ExitCode::SUCCESS);
            }
            run_pack(args, &cfg, show_progress)
        }
        Commands::Extract(args) => {
            let cfg = yaml
                .extract
                .unwrap_or_default()
                .into_extract_config(extract_config_from_args(args));
            if cli.print_config {
                print_config(&cfg, &cli.print_config_format)?;
                return Ok(ExitCode::SUCCESS);
            }
            run_extract(args, &cfg, show_progress)
        }
    }
}

fn pack_config_from_args(args: &PackArgs) -> PackConfig {
    let mut builder = PackConfig::builder()
        .gap(args.gap)
        .growth_percent(args.growth_percent)
        .max_attempts(args.max_attempts)
        .max_canvas_size(args.max_canvas_size)
        .exclude(args.exclude.clone())
        .copy_sidecar(!args.no_sidecar);
    if let Some(comment) = &args.header_comment {
        builder = builder.header_comment((!comment.is_empty()).then(|| comment.clone()));
    }
    builder.build()
}

fn extract_config_from_args(args: &ExtractArgs) -> ExtractConfig {
    let mut builder = ExtractConfig::builder()
        .workers(args.workers)
        .write_size_marker(!args.no_size_marker);
    if !args.skip_dir.is_empty() {
        builder = builder.skip_dirs(args.skip_dir.clone());
    }
    builder.build()
}

fn print_config<T: Serialize>(cfg: &T, format: &str) -> anyhow::Result<()> {
    match format {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(())
}

fn write_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("write {}", path.display()))?;
    info!(?path, "report exported");
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_pack(args: &PackArgs, cfg: &PackConfig, show_progress: bool) -> anyhow::Result<ExitCode> {
    let bars = show_progress.then(PackBars::new);
    let observer: &dyn ProgressObserver = match &bars {
        Some(b) => b,
        None => &NoProgress,
    };
    let result = if args.dry_run {
        plan_atlases(&args.input, cfg, observer)
    } else {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
        generate_atlases(&args.input, &args.out_dir, cfg, observer)
    };
    let report = result.with_context(|| format!("pack {}", args.input.display()))?;
    if let Some(b) = &bars {
        b.bar.finish_and_clear();
    }

    for s in &report.packed {
        info!(folder = %s.folder.display(), "{}", s.stats.summary());
    }
    println!("{}", report.summary());
    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    Ok(exit_code(report.is_success()))
}

fn run_extract(
    args: &ExtractArgs,
    cfg: &ExtractConfig,
    show_progress: bool,
) -> anyhow::Result<ExitCode> {
    let bars = show_progress.then(ExtractBars::new);
    let observer: &dyn ProgressObserver = match &bars {
        Some(b) => b,
        None => &NoProgress,
    };
    let report = extract_atlases(&args.input, args.out_dir.as_deref(), cfg, observer)
        .with_context(|| format!("extract {}", args.input.display()))?;
    if let Some(b) = &bars {
        b.finish();
    }

    println!("{}", report.summary());
    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }
    Ok(exit_code(report.is_success()))
}

fn bar_style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Folder-level bar for `pack`.
struct PackBars {
    bar: ProgressBar,
}

impl PackBars {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(bar_style(
            "{spinner:.green} packing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        ));
        Self { bar }
    }
}

impl ProgressObserver for PackBars {
    fn on_event(&self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::FoldersDiscovered { count } => self.bar.set_length(count as u64),
            ProgressEvent::FolderPacked { folder, .. } | ProgressEvent::FolderFailed { folder, .. } => {
                self.bar.set_message(folder.display().to_string());
                self.bar.inc(1);
            }
            _ => {}
        }
    }
}

/// Overall bar plus one bar per atlas for `extract`.
struct ExtractBars {
    multi: MultiProgress,
    overall: ProgressBar,
    tasks: OnceLock<Vec<ProgressBar>>,
}

impl ExtractBars {
    fn new() -> Self {
        let multi = MultiProgress::new();
        let overall = multi.add(ProgressBar::new(0));
        overall.set_style(bar_style(
            "overall {bar:30.cyan/blue} {pos}/{len} frames [{elapsed_precise}]",
        ));
        Self {
            multi,
            overall,
            tasks: OnceLock::new(),
        }
    }

    fn finish(&self) {
        if let Some(tasks) = self.tasks.get() {
            for bar in tasks {
                bar.finish_and_clear();
            }
        }
        self.overall.finish_and_clear();
    }
}

impl ProgressObserver for ExtractBars {
    fn on_event(&self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::TasksDiscovered {
                tasks,
                total_frames,
            } => {
                self.overall.set_length(total_frames as u64);
                let style = bar_style("{msg:>24} {bar:30.green} {pos}/{len}");
                let bars = tasks
                    .iter()
                    .map(|t| {
                        let bar = self.multi.add(ProgressBar::new(t.frame_count() as u64));
                        bar.set_style(style.clone());
                        bar.set_message(t.base.clone());
                        bar
                    })
                    .collect();
                let _ = self.tasks.set(bars);
            }
            ProgressEvent::FrameExtracted { task, .. } => {
                if let Some(bar) = self.tasks.get().and_then(|b| b.get(task)) {
                    bar.inc(1);
                }
                self.overall.inc(1);
            }
            ProgressEvent::TaskFinished { task, .. } | ProgressEvent::TaskFailed { task, .. } => {
                if let Some(bar) = self.tasks.get().and_then(|b| b.get(task)) {
                    bar.finish();
                }
            }
            _ => {}
        }
    }
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

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    pack: Option<YamlPack>,
    extract: Option<YamlExtract>,
}

#[derive(Debug, Deserialize, Default)]
struct YamlPack {
    gap: Option<u32>,
    growth_percent: Option<u32>,
    max_attempts: Option<u32>,
    max_canvas_size: Option<u32>,
    image_extensions: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    header_comment: Option<String>,
    copy_sidecar: Option<bool>,
}

impl YamlPack {
    fn into_pack_config(self, mut cfg: PackConfig) -> PackConfig {
        if let Some(v) = self.gap {
            cfg.gap = v;
        }
        if let Some(v) = self.growth_percent {
            cfg.growth_percent = v;
        }
        if let Some(v) = self.max_attempts {
            cfg.max_attempts = v;
        }
        if let Some(v) = self.max_canvas_size {
            cfg.max_canvas_size = v;
        }
        if let Some(v) = self.image_extensions {
            cfg.image_extensions = v;
        }
        if let Some(v) = self.exclude {
            cfg.exclude = v;
        }
        if let Some(v) = self.header_comment {
            cfg.header_comment = (!v.is_empty()).then_some(v);
        }
        if let Some(v) = self.copy_sidecar {
            cfg.copy_sidecar = v;
        }
        cfg
    }
}

#[derive(Debug, Deserialize, Default)]
struct YamlExtract {
    skip_dirs: Option<Vec<String>>,
    workers: Option<usize>,
    write_size_marker: Option<bool>,
}

impl YamlExtract {
    fn into_extract_config(self, mut cfg: ExtractConfig) -> ExtractConfig {
        if let Some(v) = self.skip_dirs {
            cfg.skip_dirs = v;
        }
        if let Some(v) = self.workers {
            cfg.workers = Some(v);
        }
        if let Some(v) = self.write_size_marker {
            cfg.write_size_marker = v;
        }
        cfg
    }
}
