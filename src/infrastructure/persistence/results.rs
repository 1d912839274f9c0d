use crate::domain::errors::StoreError;
use crate::domain::zones::ZoneAnalysisResult;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;

impl ZoneAnalysisResult {
    /// Writes the full result as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), StoreError> {
        let file = File::create(path).map_err(|source| StoreError::Write {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            StoreError::Serialize {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        info!("Saved analysis result to {}", path.display());
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(|source| StoreError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::Deserialize {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

/// Exports one row per zone with its extracted features. Returns the
/// number of rows written. Optional metrics serialize as empty cells.
pub fn export_features_csv(
    result: &ZoneAnalysisResult,
    path: &Path,
) -> Result<usize, StoreError> {
    let serialize_err = |e: csv::Error| StoreError::Serialize {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut writer = csv::Writer::from_path(path).map_err(serialize_err)?;
    writer
        .write_record([
            "zone_id",
            "kind",
            "start_time",
            "end_time",
            "duration_bars",
            "price_return",
            "abs_return",
            "max_rally_pct",
            "max_drawdown_pct",
            "hist_amplitude",
            "hist_peak",
            "price_hist_corr",
            "swing_count",
            "avg_rally_pct",
            "avg_drop_pct",
            "largest_swing_pct",
            "divergence_count",
            "volatility_score",
            "volume_ratio",
        ])
        .map_err(serialize_err)?;

    let opt = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_default();

    let mut rows = 0usize;
    for zone in &result.zones {
        let Some(f) = &zone.features else { continue };
        writer
            .write_record([
                zone.id.clone(),
                zone.kind.to_string(),
                zone.start_time.to_rfc3339(),
                zone.end_time.to_rfc3339(),
                f.duration_bars.to_string(),
                f.price_return.to_string(),
                f.abs_return.to_string(),
                f.max_rally_pct.to_string(),
                f.max_drawdown_pct.to_string(),
                f.hist_amplitude.to_string(),
                f.hist_peak.to_string(),
                opt(f.price_hist_corr),
                f.swing_count.to_string(),
                opt(f.avg_rally_pct),
                opt(f.avg_drop_pct),
                opt(f.largest_swing_pct),
                f.divergence_count.to_string(),
                opt(f.volatility_score),
                opt(f.volume_ratio),
            ])
            .map_err(serialize_err)?;
        rows += 1;
    }

    writer.flush().map_err(|source| StoreError::Write {
        path: path.display().to_string(),
        source,
    })?;

    info!("Exported {} zone feature rows to {}", rows, path.display());
    Ok(rows)
}
