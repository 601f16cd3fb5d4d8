use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use stacked_waterfalls::storage;
use stacked_waterfalls::viz::util::format_value;
use stacked_waterfalls::WaterfallTable;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "waterfall",
    version,
    about = "Render stacked waterfall charts from a JSON description"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw every chart of the description on one figure (.svg or .png).
    Render(RenderArgs),
    /// Print or export the prepared table (totals, running sums, bottoms).
    Table(TableArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// JSON figure description.
    input: PathBuf,
    /// Output image (.svg or .png).
    #[arg(short, long)]
    out: PathBuf,
    /// Width of the image (default: from the description, else 800).
    #[arg(long)]
    width: Option<u32>,
    /// Height of the image (default: from the description, else 500).
    #[arg(long)]
    height: Option<u32>,
    /// Figure title (overrides the description).
    #[arg(long)]
    title: Option<String>,
}

#[derive(Args, Debug)]
struct TableArgs {
    /// JSON figure description.
    input: PathBuf,
    /// Which chart of the description (0-based).
    #[arg(long, default_value_t = 0)]
    chart: usize,
    /// Save the table to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Table(args) => cmd_table(args),
    }
}

fn cmd_render(args: RenderArgs) -> Result<()> {
    let mut spec = storage::load_figure_spec(&args.input)?;
    if args.title.is_some() {
        spec.title = args.title.clone();
    }
    let figure = spec
        .to_figure(args.width, args.height)
        .with_context(|| format!("laying out {}", args.input.display()))?;
    figure.save(&args.out)?;
    let last = figure.layouts().last().map(|l| l.last_x()).unwrap_or_default();
    eprintln!(
        "Wrote {} waterfall(s) to {} (last group at x = {})",
        figure.layouts().len(),
        args.out.display(),
        format_value(last, "en")
    );
    Ok(())
}

fn cmd_table(args: TableArgs) -> Result<()> {
    let spec = storage::load_figure_spec(&args.input)?;
    let chart_spec = spec.charts.get(args.chart).with_context(|| {
        format!(
            "chart {} not found, the description has {}",
            args.chart,
            spec.charts.len()
        )
    })?;
    let chart = chart_spec.chart();
    let table = chart.table()?;
    let labels = chart_spec.labels.as_deref();

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        match fmt.as_str() {
            "csv" => storage::save_csv(&table, labels, path)?,
            "json" => storage::save_json(&table, path)?,
            other => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!("Saved {} rows to {}", table.n_groups(), path.display());
        return Ok(());
    }

    match args.format {
        Some(OutFormat::Csv) => storage::write_csv(&table, labels, std::io::stdout().lock())?,
        Some(OutFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&table.rows())?)
        }
        None => print_table(&table, &chart_spec.options.locale),
    }
    Ok(())
}

fn print_table(table: &WaterfallTable, locale: &str) {
    let mut header: Vec<String> = vec!["group".into()];
    header.extend(table.level_names());
    header.extend(["Total", "CumulativeTotal", "Bottom"].map(String::from));

    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|r| {
            let mut cells = vec![r.group.to_string()];
            cells.extend(r.levels.iter().map(|v| format_value(*v, locale)));
            cells.extend([r.total, r.cumulative_total, r.bottom].map(|v| format_value(v, locale)));
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|c| {
            rows.iter()
                .map(|r| r[c].chars().count())
                .chain(std::iter::once(header[c].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{c:>width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(&header));
    for r in &rows {
        println!("{}", line(r));
    }
}
