//! biogps_dataset command-line interface

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::Parser;
use log::{info, LevelFilter};

use biogps_dataset::cli::{Cli, Commands, OutputFormat};
use biogps_dataset::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Check {
            dir,
            experiment,
            platform,
        }) => run_check(&dir, &experiment, platform.as_deref()),
        Some(Commands::Parse {
            dir,
            platform,
            samples,
            output,
            samples_out,
        }) => run_parse(&dir, &platform, &samples, &output, &samples_out),
        Some(Commands::Factors {
            samples,
            group,
            collapse,
            naming,
            output,
        }) => run_factors(&samples, group.as_deref(), collapse, naming.as_deref(), output.as_deref()),
        Some(Commands::Levels { samples, output }) => run_levels(&samples, output.as_deref(), &settings),
        Some(Commands::Chart {
            table,
            samples,
            reporter,
            gene,
            annotation,
            group,
            collapse,
            naming,
            guides,
            format,
            output,
        }) => {
            let query = FactorQuery {
                group,
                collapse,
                naming,
            };
            run_chart(
                &table,
                &samples,
                &reporter,
                gene.as_deref(),
                annotation.as_deref(),
                &query,
                guides,
                format,
                output.as_deref(),
                &settings,
            )
        }
        Some(Commands::Export {
            table,
            samples,
            reporter,
            gene,
            annotation,
            naming,
            output,
        }) => run_export(
            &table,
            &samples,
            &reporter,
            gene.as_deref(),
            annotation.as_deref(),
            naming.as_deref(),
            output.as_deref(),
        ),
        Some(Commands::Correlate {
            matrix,
            reporter,
            min_corr,
            annotation,
            format,
            output,
            threads,
        }) => run_correlate(
            &matrix,
            &reporter,
            min_corr,
            annotation.as_deref(),
            format,
            output.as_deref(),
            threads,
            &settings,
        ),
        None => {
            print_no_args();
            return;
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_no_args() {
    println!("biogps_dataset v{}", VERSION);
    println!("Run `biogps_dataset -h` for usage or `biogps_dataset --help` for detailed information.");
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// File when a path is given, stdout otherwise
fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => {
            info!("Writing to: {}", p);
            Box::new(BufWriter::new(File::create(p)?))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn write_json<T: serde::Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let mut out = open_output(path)?;
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Reporters named directly, or those of `gene` present in the table
fn select_reporters(
    table: &ExpressionTable,
    reporters: &[String],
    gene: Option<&str>,
    annotation_path: Option<&str>,
) -> Result<Vec<String>> {
    let mut selected = reporters.to_vec();

    if let Some(gene) = gene {
        let path = annotation_path.ok_or_else(|| DatasetError::InvalidInput {
            reason: "--gene needs --annotation".to_string(),
        })?;
        let annotation = AnnotationTable::from_path(path)?;
        let for_gene = annotation
            .reporters_for_gene(gene)?
            .ok_or_else(|| DatasetError::NotFound {
                what: format!("gene {} in annotation", gene),
            })?;
        let before = for_gene.len();
        selected.extend(for_gene.into_iter().filter(|r| table.reporter_index(r).is_some()));
        info!("Gene {}: {} of {} reporters in dataset", gene, selected.len() - reporters.len(), before);
    }

    if selected.is_empty() {
        return Err(DatasetError::NotFound {
            what: "reporters to report on".to_string(),
        });
    }
    Ok(selected)
}

fn load_aligned(table_path: &str, samples_path: &str) -> Result<(ExpressionTable, Vec<SampleMetadata>)> {
    info!("Loading table from: {}", table_path);
    let table = read_matrix(table_path)?;
    info!("  {} reporters, {} samples", table.n_reporters(), table.n_samples());

    let samples = read_sample_metadata(samples_path)?;
    if samples.len() != table.n_samples() {
        return Err(DatasetError::DimensionMismatch {
            expected: format!("{} sample records (one per column)", table.n_samples()),
            got: format!("{} sample records", samples.len()),
        });
    }
    Ok((table, samples))
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn run_check(dir: &str, experiment: &str, platform: Option<&str>) -> Result<()> {
    let check = check_experiment(dir, experiment, platform)?;
    write_json(None, &check)?;
    info!("--- check experiment over ---");
    Ok(())
}

fn run_parse(dir: &str, platform: &str, samples_path: &str, output: &str, samples_out: &str) -> Result<()> {
    let files = load_data_files(Path::new(dir).join(platform))?;

    info!("Loading sample metadata from: {}", samples_path);
    let samples = read_sample_metadata(samples_path)?;
    info!("  {} sample records", samples.len());

    let aligned = parse_experiment(&files, &samples, platform)?;
    info!(
        "Aligned {} reporters x {} samples",
        aligned.table.n_reporters(),
        aligned.table.n_samples()
    );

    info!("Writing aligned table to: {}", output);
    write_matrix(BufWriter::new(File::create(output)?), &aligned.table)?;
    info!("Writing aligned samples to: {}", samples_out);
    write_sample_metadata(samples_out, &aligned.samples)?;

    info!("Done!");
    Ok(())
}

fn run_factors(
    samples_path: &str,
    group: Option<&str>,
    collapse: bool,
    naming: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let samples = read_sample_metadata(samples_path)?;
    let query = FactorQuery {
        group: group.map(str::to_string),
        collapse,
        naming: naming.map(str::to_string),
    };
    let assignments = build_factor_assignments(&samples, &query)?;
    write_json(output, &assignments)
}

fn run_levels(samples_path: &str, output: Option<&str>, settings: &Settings) -> Result<()> {
    let samples = read_sample_metadata(samples_path)?;
    let catalog = factor_levels(&samples, &settings.popular_factors)?;
    write_json(output, &catalog)
}

#[allow(clippy::too_many_arguments)]
fn run_chart(
    table_path: &str,
    samples_path: &str,
    reporters: &[String],
    gene: Option<&str>,
    annotation_path: Option<&str>,
    query: &FactorQuery,
    with_guides: bool,
    format: OutputFormat,
    output: Option<&str>,
    settings: &Settings,
) -> Result<()> {
    let (table, samples) = load_aligned(table_path, samples_path)?;
    let reporters = select_reporters(&table, reporters, gene, annotation_path)?;

    let assignments = build_factor_assignments(&samples, query)?;
    let faceted = aggregate_reporters(&table, &reporters, &assignments)?;

    let mut out = open_output(output)?;
    match format {
        OutputFormat::Json => {
            let guides: Option<BTreeMap<String, ChartGuides>> = with_guides.then(|| {
                faceted
                    .iter()
                    .map(|(r, series)| (r.clone(), chart_guides(series, settings)))
                    .collect()
            });
            write_series_json(&mut out, &faceted, guides.as_ref())?;
            writeln!(out)?;
        }
        OutputFormat::Csv => {
            if with_guides {
                log::warn!("--guides is ignored for CSV output");
            }
            match faceted.values().next() {
                Some(series) if faceted.len() == 1 => write_series_csv(&mut out, series)?,
                _ => write_faceted_csv(&mut out, &faceted)?,
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn run_export(
    table_path: &str,
    samples_path: &str,
    reporters: &[String],
    gene: Option<&str>,
    annotation_path: Option<&str>,
    naming: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let (table, samples) = load_aligned(table_path, samples_path)?;
    let reporters = select_reporters(&table, reporters, gene, annotation_path)?;
    let names = sample_names(&samples, naming)?;

    let mut out = open_output(output)?;
    write_sample_table(&mut out, &table, &names, &reporters)?;
    out.flush()?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_correlate(
    matrix_path: &str,
    reporter: &str,
    min_corr: Option<f64>,
    annotation_path: Option<&str>,
    format: OutputFormat,
    output: Option<&str>,
    threads: usize,
    settings: &Settings,
) -> Result<()> {
    // Configure thread pool
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    info!("Loading matrix from: {}", matrix_path);
    let matrix = read_matrix(matrix_path)?;
    info!("  {} reporters, {} samples", matrix.n_reporters(), matrix.n_samples());
    correlation_usable(matrix.n_samples(), settings)?;

    let annotation = match annotation_path {
        Some(p) => AnnotationTable::from_path(p)?,
        None => AnnotationTable::new(),
    };
    let min_corr = min_corr.unwrap_or(settings.default_min_correlation);

    info!("Correlating {} (threshold {})...", reporter, min_corr);
    let results = correlate_table(reporter, &matrix, min_corr, &annotation)?;
    info!("  {} reporters above threshold", results.len());

    let mut out = open_output(output)?;
    match format {
        OutputFormat::Json => {
            write_correlation_json(&mut out, &results)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_correlation_csv(&mut out, &results)?,
    }
    out.flush()?;
    Ok(())
}
