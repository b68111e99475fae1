//! Load content without writing anything

use anyhow::{bail, Result};

use crate::content::LoadReport;
use crate::Site;

/// Load every document and print what went wrong
pub fn run(site: &Site) -> Result<()> {
    let registry = site.registry()?;
    let report = site.load(&registry)?;

    for line in report_lines(&report) {
        println!("{}", line);
    }

    if !report.is_clean() {
        bail!("{} document(s) failed to load", report.errors.len());
    }
    Ok(())
}

/// Human-readable summary of a load pass
pub fn report_lines(report: &LoadReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Loaded {} document(s), {} error(s), {} unmatched file(s)",
        report.collection.len(),
        report.errors.len(),
        report.stray_files.len()
    )];

    for error in &report.errors {
        lines.push(format!("  error: {}", error));
    }
    for stray in &report.stray_files {
        lines.push(format!("  warning: no document type matches {}", stray.display()));
    }
    lines
}
