//! BQuant command-line interface.
//!
//! Runs zone analysis over OHLCV CSV files or bundled sample datasets.

use anyhow::{Context, Result, bail};
use bquant::application::indicators::{IndicatorRegistry, IndicatorSpec};
use bquant::application::pipeline::{analyze_zones, run_from_toml};
use bquant::application::zones::{DetectionRule, SwingStrategyKind};
use bquant::config::Config;
use bquant::domain::market::Timeframe;
use bquant::domain::zones::ZoneAnalysisResult;
use bquant::infrastructure::loaders::{LoadOptions, load_csv};
use bquant::infrastructure::persistence::export_features_csv;
use bquant::infrastructure::samples;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "BQuant zone analysis toolkit", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run zone analysis on a CSV file or a sample dataset
    Analyze {
        /// Input OHLCV CSV file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Bundled sample dataset name (see `bquant samples`)
        #[arg(long)]
        sample: Option<String>,

        /// Symbol label for loaded CSV data
        #[arg(short, long)]
        symbol: Option<String>,

        /// Timeframe of the input data (1m, 5m, 15m, 1h, 4h, 1d)
        #[arg(short, long)]
        timeframe: Option<String>,

        /// TOML run config; overrides the individual flags below
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Column whose sign defines zones
        #[arg(long, default_value = "macd_hist")]
        detect_column: String,

        /// Minimum zone duration in bars
        #[arg(long)]
        min_duration: Option<usize>,

        /// Significance level for the hypothesis suite
        #[arg(long)]
        alpha: Option<f64>,

        /// Swing strategy (zigzag, find_peaks, pivot_points)
        #[arg(long, default_value = "zigzag")]
        swing: String,

        /// Cluster zones into K shape groups
        #[arg(long)]
        clustering: Option<usize>,

        /// Fit the zone-return regression
        #[arg(long)]
        regression: bool,

        /// Output JSON file for the result
        #[arg(short, long, default_value = "zone_analysis.json")]
        output: PathBuf,

        /// Optional CSV export of per-zone features
        #[arg(long)]
        features_csv: Option<PathBuf>,
    },
    /// List bundled sample datasets
    Samples,
    /// List available indicators
    Indicators,
    /// Run data-quality checks on a CSV file
    Validate {
        /// Input OHLCV CSV file
        input: PathBuf,

        /// Timeframe of the input data
        #[arg(short, long, default_value = "1h")]
        timeframe: String,

        /// Fail on any issue instead of reporting
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let app_config = Config::from_env()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            input,
            sample,
            symbol,
            timeframe,
            config,
            detect_column,
            min_duration,
            alpha,
            swing,
            clustering,
            regression,
            output,
            features_csv,
        } => {
            let series = load_series(&app_config, input, sample, symbol, timeframe)?;
            info!("Analyzing {} ({} bars)", series.symbol, series.len());

            let result = match config {
                Some(path) => run_from_toml(series, &path)?,
                None => {
                    let mut builder = analyze_zones(series)
                        .with_indicator(IndicatorSpec::macd(
                            app_config.macd_fast_period,
                            app_config.macd_slow_period,
                            app_config.macd_signal_period,
                        ))
                        .detect_zones(DetectionRule::sign_of(detect_column))
                        .with_swing_strategy(parse_swing(&swing)?)
                        .min_duration(min_duration.unwrap_or(app_config.min_zone_duration))
                        .with_hypothesis_tests(alpha.unwrap_or(app_config.hypothesis_alpha))
                        .with_bootstrap(app_config.bootstrap_iterations, app_config.random_seed);

                    if let Some(k) = clustering {
                        builder = builder.with_clustering(k);
                    }
                    if regression {
                        builder = builder.with_regression();
                    }
                    builder.build()?
                }
            };

            result.save_json(&output)?;
            if let Some(path) = features_csv {
                export_features_csv(&result, &path)?;
            }
            print_summary(&result);
        }
        Commands::Samples => {
            println!("\n  Bundled sample datasets:\n");
            for s in samples::list() {
                println!("    {:<18} [{}] {}", s.name, s.kind, s.description);
            }
            println!();
        }
        Commands::Indicators => {
            let registry = IndicatorRegistry::with_defaults();
            println!("\n  Available indicators:\n");
            for entry in registry.list() {
                println!(
                    "    {:<10} [{}] {} (default: {})",
                    entry.name, entry.source, entry.description, entry.default_spec
                );
            }
            println!();
        }
        Commands::Validate {
            input,
            timeframe,
            strict,
        } => {
            let tf = Timeframe::from_str(&timeframe)?;
            let mut options = LoadOptions::new(
                input
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_uppercase())
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                tf,
            );
            options.strict = strict;

            let (series, report) = load_csv(&input, &options)?;
            println!("\n  Data quality report for {}:", input.display());
            println!("    Bars checked: {}", report.checked);
            println!("    Bars dropped: {}", report.dropped);
            println!("    Gaps:         {}", report.gaps);
            for issue in report.issues.iter().take(10) {
                println!("    - {}", issue);
            }
            println!("    Kept {} bars for {}\n", series.len(), series.symbol);
        }
    }

    Ok(())
}

fn load_series(
    app_config: &Config,
    input: Option<PathBuf>,
    sample: Option<String>,
    symbol: Option<String>,
    timeframe: Option<String>,
) -> Result<bquant::domain::market::OhlcvSeries> {
    match (input, sample) {
        (Some(path), None) => {
            let tf = match timeframe {
                Some(s) => Timeframe::from_str(&s)?,
                None => app_config.default_timeframe,
            };
            let options = LoadOptions::new(
                symbol.unwrap_or_else(|| app_config.default_symbol.clone()),
                tf,
            );
            let (series, _) = load_csv(&path, &options)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            Ok(series)
        }
        (None, Some(name)) => Ok(samples::load(&name)?),
        (Some(_), Some(_)) => bail!("Pass either --input or --sample, not both"),
        (None, None) => bail!("An input is required: --input <csv> or --sample <name>"),
    }
}

fn parse_swing(name: &str) -> Result<SwingStrategyKind> {
    match name.to_lowercase().as_str() {
        "zigzag" => Ok(SwingStrategyKind::ZigZag { reversal_pct: 0.02 }),
        "find_peaks" => Ok(SwingStrategyKind::FindPeaks {
            min_distance: 3,
            min_prominence_pct: 0.01,
        }),
        "pivot_points" => Ok(SwingStrategyKind::PivotPoints { left: 3, right: 3 }),
        _ => bail!(
            "Unknown swing strategy: {}. Must be zigzag, find_peaks or pivot_points",
            name
        ),
    }
}

fn print_summary(result: &ZoneAnalysisResult) {
    let m = &result.metadata;
    let s = &result.statistics;

    println!("\n══════════════════════════════════════════════════════");
    println!("  ZONE ANALYSIS — {} {}", m.symbol, m.timeframe);
    println!("══════════════════════════════════════════════════════");
    println!("  Bars: {}   Detection: {}", m.bar_count, m.detection);
    println!("  Indicators: {}", m.indicators.join(", "));
    println!(
        "\n  Zones: {} total  ({} bull / {} bear)",
        s.total_zones, s.bull.count, s.bear.count
    );
    println!(
        "    Bull: mean duration {:.1} bars, mean return {:+.4}%, win rate {:.0}%",
        s.bull.mean_duration,
        s.bull.mean_return * 100.0,
        s.bull.win_rate * 100.0
    );
    println!(
        "    Bear: mean duration {:.1} bars, mean return {:+.4}%, win rate {:.0}%",
        s.bear.mean_duration,
        s.bear.mean_return * 100.0,
        s.bear.win_rate * 100.0
    );

    if let Some(p) = result.sequence.continuation_prob {
        println!("  Continuation probability: {:.2}", p);
    }

    if let Some(h) = &result.hypothesis {
        println!("\n  Hypothesis suite (alpha={}):", h.alpha);
        for r in &h.results {
            let marker = if r.significant { "*" } else { " " };
            match (r.statistic, r.adjusted_p) {
                (Some(stat), Some(p)) => println!(
                    "   {} {:<32} stat={:+.3}  p_adj={:.4}",
                    marker, r.name, stat, p
                ),
                _ => println!("     {:<32} {}", r.name, r.conclusion),
            }
        }
        for ci in &h.bootstrap {
            println!(
                "     {:<32} mean={:+.5} [{:+.5}, {:+.5}]",
                ci.label, ci.mean, ci.lower, ci.upper
            );
        }
    }

    if let Some(c) = &result.clustering {
        println!("\n  Clusters (k={}): sizes {:?}", c.k, c.cluster_sizes);
    }

    if let Some(r) = &result.regression {
        println!(
            "\n  Regression over {} zones: R^2 = {:.4}",
            r.n_samples, r.r_squared
        );
        for (name, coef) in &r.coefficients {
            println!("    {:<18} {:+.6}", name, coef);
        }
    }

    println!("══════════════════════════════════════════════════════\n");
}
