//! Export accepted samples and run reports to files.
//!
//! The CSV export is meant to be easy to consume in spreadsheets or
//! downstream scripts; the JSON export preserves the full per-cell report
//! structure for report tooling.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::model::INDICATOR_COUNT;
use crate::report::ScanOutput;

/// Write one row per accepted sample to a CSV file.
pub fn write_samples_csv(
    path: &Path,
    output: &ScanOutput,
    indicator_names: &[&str; INDICATOR_COUNT],
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::io(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "round,regime,group,sign,a,b,m,g,alpha,beta,d,n,gamma,gamma_squared,stable_size,improvement,{}",
        indicator_names.join(",")
    )
    .map_err(|e| AppError::io(format!("Failed to write export CSV header: {e}")))?;

    for sample in output.samples() {
        let cell = &sample.cell;
        let p = &sample.params;
        let signs: Vec<&str> = sample
            .indicators
            .iter()
            .map(|pattern| pattern.display_name())
            .collect();
        writeln!(
            file,
            "{},{},{},{},{:.10},{:.10},{:.10},{:.10},{:.10e},{:.10e},{:.10},{},{:.10e},{:.10e},{},{},{}",
            cell.round.display_name(),
            cell.regime.display_name(),
            cell.group.display_name(),
            cell.sign.display_name(),
            p.a,
            p.b,
            p.m,
            p.g,
            p.alpha,
            p.beta,
            p.d,
            p.n,
            p.gamma,
            p.gamma_squared,
            sample
                .stable_size
                .map(|s| s.to_string())
                .unwrap_or_default(),
            sample
                .improvement
                .map(|v| format!("{v:.6}"))
                .unwrap_or_default(),
            signs.join(","),
        )
        .map_err(|e| AppError::io(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write the full run report (per-cell outcomes included) as JSON.
pub fn write_run_json(path: &Path, output: &ScanOutput) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::io(format!(
            "Failed to create run JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, output)
        .map_err(|e| AppError::io(format!("Failed to serialize run JSON: {e}")))?;
    Ok(())
}
