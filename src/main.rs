use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

mod app;
mod config;
mod domain;
mod infra;
mod platform;
mod ui;
mod usecase;

use crate::app::{App, LaunchContext};
use crate::config::{default_log_dir, default_webview_data_dir, AppConfig, SourceKind};
use crate::domain::dates::parse_day;
use crate::domain::entities::filter::{ChannelFilter, Period};
use crate::infra::import::csv::export_orders_csv;
use crate::infra::import::spreadsheet::SpreadsheetSource;
use crate::infra::sqlite::repo::SqliteSource;
use crate::ui::terminal::{render_ads, render_consolidated, render_sales};
use crate::usecase::ports::source::SalesSource;
use crate::usecase::services::dashboard::DashboardService;
use crate::usecase::services::import_service::ImportService;
use crate::usecase::services::report::{ads_view, consolidated_view, sales_view, Selection};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sales dashboard over marketplace, reseller and ads exports", long_about = None)]
struct Cli {
    /// Config file (defaults to the per-user config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, global = true)]
    source: Option<SourceKind>,
    /// Folder holding the exported spreadsheets
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// SQLite database used by the sqlite source
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Skip the campaign export
    #[arg(long, global = true)]
    no_ads: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the desktop dashboard
    Gui,
    /// Print a dashboard view as terminal tables
    Report(ReportArgs),
    /// Mirror the spreadsheets of a folder into the sqlite database
    Import(ImportArgs),
    /// Write the unified order table as CSV
    Export(ExportArgs),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ReportView {
    Sales,
    Ads,
    Consolidated,
}

#[derive(Args, Debug)]
struct ReportArgs {
    #[arg(long, value_enum, default_value_t = ReportView::Sales)]
    view: ReportView,
    /// custom, today, yesterday, last7, last30 or month
    #[arg(long, default_value = "custom", value_parser = parse_period)]
    period: Period,
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,
    /// "Todos" or a channel name
    #[arg(long, value_parser = parse_channel)]
    channel: Option<ChannelFilter>,
    /// Reference day for relative periods (defaults to the local date)
    #[arg(long, value_parser = parse_date_arg)]
    today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    out: PathBuf,
}

fn parse_period(text: &str) -> Result<Period, String> {
    Period::from_key(text).ok_or_else(|| {
        format!("unknown period '{text}' (custom, today, yesterday, last7, last30, month)")
    })
}

fn parse_date_arg(text: &str) -> Result<NaiveDate, String> {
    parse_day(text).ok_or_else(|| format!("invalid date '{text}' (use YYYY-MM-DD or DD/MM/YYYY)"))
}

fn parse_channel(text: &str) -> Result<ChannelFilter, String> {
    ChannelFilter::from_label(text).ok_or_else(|| format!("unknown channel '{text}'"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            for cause in err.chain().skip(1) {
                eprintln!("  caused by: {cause}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => {
            let log_file = default_log_dir().ok().map(|dir| dir.join("salesdash.log"));
            init_tracing(log_file.as_deref())?;
            launch_gui(config)
        }
        Command::Report(args) => {
            init_tracing(None)?;
            print_report(&config, &args)
        }
        Command::Import(args) => {
            init_tracing(None)?;
            let dir = args.dir.unwrap_or_else(|| config.data_dir());
            let service = ImportService::new(config.db_path()?);
            let imported = service.import_directory(&dir)?;
            for result in &imported {
                info!(dataset_id = result.dataset_id.0, name = %result.name, "dataset replaced");
            }
            for meta in service.datasets()? {
                println!(
                    "{} #{}: {} linhas de {} ({})",
                    meta.name, meta.id.0, meta.row_count, meta.source_path, meta.imported_at
                );
            }
            Ok(())
        }
        Command::Export(args) => {
            init_tracing(None)?;
            let dataset = build_service(&config)?.dataset()?;
            let written = export_orders_csv(&args.out, &dataset.orders)?;
            println!("{written} pedidos exportados para {}", args.out.display());
            Ok(())
        }
    }
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(kind) = cli.source {
        config.source.kind = kind;
    }
    if let Some(dir) = &cli.data_dir {
        config.source.data_dir = Some(dir.clone());
    }
    if let Some(db) = &cli.db {
        config.source.db_path = Some(db.clone());
    }
    if cli.no_ads {
        config.ads.enabled = false;
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log dir: {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file: {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

pub(crate) fn build_source(config: &AppConfig) -> Result<Arc<dyn SalesSource>> {
    Ok(match config.source.kind {
        SourceKind::Spreadsheets => Arc::new(SpreadsheetSource::new(config.data_dir())),
        SourceKind::Sqlite => Arc::new(SqliteSource::new(config.db_path()?)),
    })
}

pub(crate) fn build_service(config: &AppConfig) -> Result<DashboardService> {
    Ok(DashboardService::new(
        build_source(config)?,
        config.pipeline.clone(),
        config.ads.enabled,
        config.cache_ttl(),
    ))
}

fn print_report(config: &AppConfig, args: &ReportArgs) -> Result<()> {
    let service = build_service(config)?;
    let dataset = service.dataset()?;
    for warning in &dataset.warnings {
        eprintln!("aviso: {warning}");
    }

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let selection = Selection {
        period: args.period,
        channel: args.channel.unwrap_or_default(),
        custom_from: args.from,
        custom_to: args.to,
    };

    let rendered = match args.view {
        ReportView::Sales => render_sales(&sales_view(&dataset, selection, today)),
        ReportView::Ads | ReportView::Consolidated if !dataset.has_ads() => {
            bail!("no campaign export loaded; ads views are unavailable")
        }
        ReportView::Ads => render_ads(&ads_view(dataset.campaigns.as_deref().unwrap_or_default())),
        ReportView::Consolidated => {
            render_consolidated(&consolidated_view(&dataset, selection, today))
        }
    };
    println!("{}", service.describe_source());
    print!("{rendered}");
    Ok(())
}

fn launch_gui(config: AppConfig) -> Result<()> {
    let service = Arc::new(build_service(&config)?);
    let webview_data_dir = default_webview_data_dir()?;
    info!(source = %service.describe_source(), "launching dashboard");

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(
                    dioxus::desktop::WindowBuilder::new().with_title("Dashboard de Vendas"),
                )
                .with_data_directory(webview_data_dir),
        )
        .with_context(LaunchContext { config, service })
        .launch(App);
    Ok(())
}

#[cfg(test)]
mod tests;
