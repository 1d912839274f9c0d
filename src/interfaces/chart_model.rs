use crate::domain::market::OhlcvSeries;
use crate::domain::zones::{ZoneAnalysisResult, ZoneKind};
use serde::{Deserialize, Serialize};

/// One candle on the time axis (unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandlePoint {
    pub t: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// A named indicator line; NaN warm-up values are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorTrace {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

/// A shaded vertical span covering one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSpan {
    pub start_t: f64,
    pub end_t: f64,
    pub kind: ZoneKind,
    pub id: String,
}

/// Everything a frontend needs to draw the analysis: candles, indicator
/// traces and zone spans. Serializable so non-egui frontends can consume
/// it as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartModel {
    pub symbol: String,
    pub candles: Vec<CandlePoint>,
    pub traces: Vec<IndicatorTrace>,
    pub spans: Vec<ZoneSpan>,
}

impl ChartModel {
    /// Spacing of the time axis in seconds (bar step), for candle widths.
    pub fn bar_step(&self) -> f64 {
        match self.candles.as_slice() {
            [a, b, ..] => (b.t - a.t).max(1.0),
            _ => 1.0,
        }
    }
}

/// Assembles the chart model for a finished analysis.
///
/// `trace_columns` picks the indicator columns to plot in the lower pane
/// (missing columns are silently skipped).
pub fn build_chart_model(
    series: &OhlcvSeries,
    result: &ZoneAnalysisResult,
    trace_columns: &[&str],
) -> ChartModel {
    let candles = series
        .bars
        .iter()
        .map(|b| CandlePoint {
            t: b.timestamp.timestamp() as f64,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
        })
        .collect();

    let traces = trace_columns
        .iter()
        .filter_map(|name| {
            series.column(name).map(|values| IndicatorTrace {
                name: name.to_string(),
                points: series
                    .bars
                    .iter()
                    .zip(values.iter())
                    .filter(|(_, v)| v.is_finite())
                    .map(|(b, v)| [b.timestamp.timestamp() as f64, *v])
                    .collect(),
            })
        })
        .collect();

    let spans = result
        .zones
        .iter()
        .map(|z| ZoneSpan {
            start_t: z.start_time.timestamp() as f64,
            end_t: z.end_time.timestamp() as f64,
            kind: z.kind,
            id: z.id.clone(),
        })
        .collect();

    ChartModel {
        symbol: series.symbol.clone(),
        candles,
        traces,
        spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indicators::IndicatorSpec;
    use crate::application::pipeline::analyze_zones;
    use crate::infrastructure::samples;

    #[test]
    fn test_model_covers_series_and_zones() {
        let series = samples::load("synthetic_cycle").unwrap();
        let result = analyze_zones(series.clone())
            .with_indicator(IndicatorSpec::macd(12, 26, 9))
            .build()
            .unwrap();

        // Rebuild the enriched series the same way the pipeline did
        let mut enriched = series;
        let registry = crate::application::indicators::IndicatorRegistry::with_defaults();
        let output = registry
            .create(&IndicatorSpec::macd(12, 26, 9))
            .unwrap()
            .compute(&enriched)
            .unwrap();
        for (name, values) in output.columns {
            enriched.insert_column(name, values).unwrap();
        }

        let model = build_chart_model(&enriched, &result, &["macd_hist", "missing"]);

        assert_eq!(model.candles.len(), enriched.len());
        assert_eq!(model.traces.len(), 1);
        assert_eq!(model.spans.len(), result.zones.len());
        assert!((model.bar_step() - 3600.0).abs() < 1e-9);
        // NaN warm-up is excluded from the trace
        assert!(model.traces[0].points.len() < enriched.len());
    }
}
