//! Zone chart viewer: runs an analysis in a background thread and renders
//! candles, the detection indicator and shaded zones.

use anyhow::Result;
use bquant::application::indicators::{IndicatorRegistry, IndicatorSpec};
use bquant::application::pipeline::analyze_zones;
use bquant::config::Config;
use bquant::domain::market::{OhlcvSeries, Timeframe};
use bquant::infrastructure::loaders::{LoadOptions, load_csv};
use bquant::infrastructure::samples;
use bquant::interfaces::chart_model::{ChartModel, build_chart_model};
use bquant::interfaces::viewer::ViewerApp;
use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "BQuant zone chart viewer", long_about = None)]
struct Args {
    /// Input OHLCV CSV file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Sample dataset to analyze when no input is given
    #[arg(long, default_value = "synthetic_cycle")]
    sample: String,

    /// Symbol label for loaded CSV data
    #[arg(short, long)]
    symbol: Option<String>,

    /// Timeframe of the input data
    #[arg(short, long)]
    timeframe: Option<String>,
}

fn run_analysis(args: &Args, config: &Config) -> Result<ChartModel> {
    let series: OhlcvSeries = match &args.input {
        Some(path) => {
            let tf = match &args.timeframe {
                Some(s) => Timeframe::from_str(s)?,
                None => config.default_timeframe,
            };
            let options = LoadOptions::new(
                args.symbol
                    .clone()
                    .unwrap_or_else(|| config.default_symbol.clone()),
                tf,
            );
            load_csv(path, &options)?.0
        }
        None => samples::load(&args.sample)?,
    };

    let macd = IndicatorSpec::macd(
        config.macd_fast_period,
        config.macd_slow_period,
        config.macd_signal_period,
    );

    let result = analyze_zones(series.clone())
        .with_indicator(macd.clone())
        .min_duration(config.min_zone_duration)
        .build()?;

    // Re-attach the indicator columns for the chart traces
    let mut enriched = series;
    let registry = IndicatorRegistry::with_defaults();
    let output = registry.create(&macd)?.compute(&enriched)?;
    for (name, values) in output.columns {
        enriched.insert_column(name, values)?;
    }

    info!("Viewer analysis done: {} zones", result.zones.len());
    Ok(build_chart_model(&enriched, &result, &["macd_hist", "macd_signal"]))
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

    let config = Config::from_env()?;
    let args = Args::parse();

    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let outcome = run_analysis(&args, &config).map_err(|e| e.to_string());
        let _ = tx.send(outcome);
    });

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("BQuant Zone Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "BQuant Zone Viewer",
        native_options,
        Box::new(|_cc| Ok(Box::new(ViewerApp::new(rx)))),
    )
    .map_err(|e| anyhow::anyhow!("Eframe error: {}", e))?;

    Ok(())
}
