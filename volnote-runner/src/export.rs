//! Pricing artifacts: result JSON, diagnostics CSV, greeks CSV.

use std::path::{Path, PathBuf};

use volnote_core::domain::{GreekRow, PricingResult, RunDiagnostics};

use crate::data_loader::{write_csv, write_json, IoError};

pub const PRICING_RESULT_FILE: &str = "pricing_result.json";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.csv";
pub const GREEKS_FILE: &str = "greeks.csv";

/// Files written by `write_pricing_outputs`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub pricing_result: PathBuf,
    pub diagnostics: PathBuf,
    /// Only set when greeks were computed.
    pub greeks: Option<PathBuf>,
}

/// Write the pricing artifacts into `outdir`, creating it if needed.
pub fn write_pricing_outputs(
    outdir: &Path,
    result: &PricingResult,
    diagnostics: &RunDiagnostics,
    greeks: Option<&[GreekRow]>,
) -> Result<OutputPaths, IoError> {
    let pricing_result = outdir.join(PRICING_RESULT_FILE);
    write_json(&pricing_result, result)?;

    let diagnostics_path = outdir.join(DIAGNOSTICS_FILE);
    write_csv(
        &diagnostics_path,
        &["avg_exposure", "min_exposure", "max_exposure", "avg_sigma_hat"],
        &[vec![
            diagnostics.avg_exposure.to_string(),
            diagnostics.min_exposure.to_string(),
            diagnostics.max_exposure.to_string(),
            diagnostics.avg_sigma_hat.to_string(),
        ]],
    )?;

    let greeks = match greeks {
        Some(rows) => {
            let path = outdir.join(GREEKS_FILE);
            let body: Vec<Vec<String>> = rows
                .iter()
                .map(|g| vec![g.name.clone(), g.value.to_string()])
                .collect();
            write_csv(&path, &["name", "value"], &body)?;
            Some(path)
        }
        None => None,
    };

    Ok(OutputPaths {
        pricing_result,
        diagnostics: diagnostics_path,
        greeks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use volnote_core::domain::PriceConfig;

    fn result() -> PricingResult {
        PricingResult::new(
            0.0625,
            0.001,
            PriceConfig {
                paths: 10,
                effective_paths: 10,
                seed: 1,
                rho: 0.8,
                rate: 0.03,
                target_vol: 0.1,
                lookback_bd: 40,
                step_cap: 0.2,
                steps: 252,
                effective_steps: 252,
                t_years: 1.0,
            },
        )
    }

    fn diagnostics() -> RunDiagnostics {
        RunDiagnostics {
            avg_exposure: 0.5,
            min_exposure: 0.25,
            max_exposure: 1.0,
            avg_sigma_hat: 0.125,
            effective_paths: 10,
            effective_steps: 252,
        }
    }

    #[test]
    fn writes_result_and_diagnostics_without_greeks() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let paths = write_pricing_outputs(&out, &result(), &diagnostics(), None).unwrap();

        assert!(paths.pricing_result.exists());
        assert_eq!(paths.greeks, None);
        assert!(!out.join(GREEKS_FILE).exists());

        let csv = std::fs::read_to_string(&paths.diagnostics).unwrap();
        assert_eq!(
            csv,
            "avg_exposure,min_exposure,max_exposure,avg_sigma_hat\n0.5,0.25,1,0.125\n"
        );

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.pricing_result).unwrap()).unwrap();
        assert_eq!(json["premium_rate"], 0.0625);
        assert_eq!(json["premium_per_100"], 6.25);
    }

    #[test]
    fn writes_greeks_in_row_order() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![GreekRow::delta("AAA", 0.5), GreekRow::vega(0.25), GreekRow::rho(2.0)];
        let paths = write_pricing_outputs(dir.path(), &result(), &diagnostics(), Some(&rows)).unwrap();
        let csv = std::fs::read_to_string(paths.greeks.unwrap()).unwrap();
        assert_eq!(csv, "name,value\nDELTA_AAA,0.5\nVEGA,0.25\nRHO,2\n");
    }
}
