//! Command-line interface for biogps_dataset

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "biogps_dataset")]
#[command(version)]
#[command(about = "Expression dataset parsing, factor grouping, charts and correlation for BioGPS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (JSON)
    #[arg(long, global = true, value_name = "FILE",
        long_help = "Settings file (JSON).\n\
            Keys: bar_colors, max_samples_for_correlation, popular_factors,\n\
            default_min_correlation. Absent keys keep their defaults.")]
    pub config: Option<String>,
}

/// Output encoding for series and correlation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check an experiment directory before parsing
    #[command(
        long_about = "Check an experiment directory before parsing\n\n\
            Reads <DIR>/experiment for the platform accessions, then checks the\n\
            header of every processed_* file under <DIR>/<PLATFORM>/.",
        after_long_help = "\
Examples:
  biogps_dataset check -d E-GEOD-15568 -e E-GEOD-15568
  biogps_dataset check -d E-GEOD-26688 -e E-GEOD-26688 -p A-AFFY-44"
    )]
    Check {
        /// Experiment directory
        #[arg(short, long)]
        dir: String,

        /// Experiment accession
        #[arg(short, long)]
        experiment: String,

        /// Platform accession (required when the experiment has several)
        #[arg(short, long)]
        platform: Option<String>,
    },

    /// Parse processed files and align them with sample metadata
    #[command(
        long_about = "Parse processed files and align them with sample metadata\n\n\
            Loads <DIR>/<PLATFORM>/processed_*, detects the file layout, merges\n\
            per-sample files and orders the sample records to match the sorted\n\
            data columns.",
        after_long_help = "\
Examples:
  biogps_dataset parse -d E-GEOD-15568 -p A-AFFY-44 -s samples.json \\
    -o data.tsv --samples-out aligned_samples.json"
    )]
    Parse {
        /// Experiment directory
        #[arg(short, long)]
        dir: String,

        /// Platform accession
        #[arg(short, long)]
        platform: String,

        /// Sample metadata JSON
        #[arg(short, long,
            long_help = "Sample metadata JSON.\n\
                A list of single-key mappings: raw sample id -> {factorvalue, comment,\n\
                order_idx, color_idx, ...}.")]
        samples: String,

        /// Aligned table output (TSV)
        #[arg(short, long, default_value = "data.tsv")]
        output: String,

        /// Aligned sample metadata output (JSON)
        #[arg(long, default_value = "aligned_samples.json")]
        samples_out: String,
    },

    /// Print display order, colour and name of every sample
    Factors {
        /// Aligned sample metadata JSON
        #[arg(short, long)]
        samples: String,

        /// Factor grouping samples into colours
        #[arg(short, long)]
        group: Option<String>,

        /// Merge replicates of a group into one point
        #[arg(long)]
        collapse: bool,

        /// Factor naming each sample
        #[arg(short, long)]
        naming: Option<String>,

        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print factors that distinguish samples, with their levels
    Levels {
        /// Aligned sample metadata JSON
        #[arg(short, long)]
        samples: String,

        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Aggregate chart series for reporters
    #[command(
        long_about = "Aggregate chart series for reporters\n\n\
            Pairs each reporter's values with the factor assignments, merges\n\
            replicates when collapsing, and emits one series per reporter.",
        after_long_help = "\
Examples:
  biogps_dataset chart -t data.tsv -s aligned_samples.json -r 1007_s_at -g tissue --collapse
  biogps_dataset chart -t data.tsv -s aligned_samples.json --gene 780 -a annotation.tsv \\
    --format csv --guides"
    )]
    Chart {
        /// Aligned table (TSV)
        #[arg(short, long)]
        table: String,

        /// Aligned sample metadata JSON
        #[arg(short, long)]
        samples: String,

        /// Reporter id (repeatable)
        #[arg(short, long)]
        reporter: Vec<String>,

        /// Gene id, expanded to its reporters through --annotation
        #[arg(long)]
        gene: Option<String>,

        /// Annotation table (TSV: reporter, gene_id, symbol[, taxid])
        #[arg(short, long)]
        annotation: Option<String>,

        /// Factor grouping samples into colours
        #[arg(short, long)]
        group: Option<String>,

        /// Merge replicates of a group into one point
        #[arg(long)]
        collapse: bool,

        /// Factor naming each sample
        #[arg(short, long)]
        naming: Option<String>,

        /// Include axis range, median lines and colours (JSON only)
        #[arg(long)]
        guides: bool,

        /// Output format [default: json]
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Export a sample x reporter CSV table
    Export {
        /// Aligned table (TSV)
        #[arg(short, long)]
        table: String,

        /// Aligned sample metadata JSON
        #[arg(short, long)]
        samples: String,

        /// Reporter id (repeatable)
        #[arg(short, long)]
        reporter: Vec<String>,

        /// Gene id, expanded to its reporters through --annotation
        #[arg(long)]
        gene: Option<String>,

        /// Annotation table (TSV: reporter, gene_id, symbol[, taxid])
        #[arg(short, long)]
        annotation: Option<String>,

        /// Factor naming each sample
        #[arg(short, long)]
        naming: Option<String>,

        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Reporters correlating with a reporter across samples
    #[command(
        long_about = "Reporters correlating with a reporter across samples\n\n\
            Computes the Pearson correlation of the reporter's row against every\n\
            row of the matrix and keeps those strictly above the threshold,\n\
            best first.",
        after_long_help = "\
Examples:
  biogps_dataset correlate -m matrix.tsv -r 1007_s_at --min-corr 0.8 -a annotation.tsv"
    )]
    Correlate {
        /// Reporter matrix (TSV)
        #[arg(short, long)]
        matrix: String,

        /// Query reporter id
        #[arg(short, long)]
        reporter: String,

        /// Minimum correlation [default: from settings, 0.9]
        #[arg(long)]
        min_corr: Option<f64>,

        /// Annotation table (TSV: reporter, gene_id, symbol[, taxid])
        #[arg(short, long)]
        annotation: Option<String>,

        /// Output format [default: json]
        #[arg(short, long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<String>,

        /// Number of threads (0 = auto) [default: 0]
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,
    },
}
