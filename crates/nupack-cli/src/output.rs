//! Table rendering for command output.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use nupack_provider::{
    InstallReport, InstalledPackageRecord, OutcomeKind, PackageSource, SearchResults,
};

fn base_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(headers.iter().map(|h| Cell::new(h)));
    table
}

/// Render install outcomes.
pub fn install_table(report: &InstallReport) -> Table {
    let mut table = base_table(&["Package", "Version", "Status", "Source", ""]);
    for outcome in &report.outcomes {
        let status = match outcome.kind {
            OutcomeKind::Installed => "installed",
            OutcomeKind::AlreadyInstalled => "already present",
            OutcomeKind::Failed => "failed",
        };
        table.add_row([
            Cell::new(outcome.identity.name.as_str()),
            Cell::new(outcome.identity.version.to_string()),
            Cell::new(status),
            Cell::new(&outcome.source),
            Cell::new(if outcome.requested { "requested" } else { "dependency" }),
        ]);
    }
    table
}

/// Render search hits.
pub fn search_table(results: &SearchResults) -> Table {
    let mut table = base_table(&["Package", "Version", "Source", "Description"]);
    for hit in &results.hits {
        table.add_row([
            Cell::new(hit.identity.name.as_str()),
            Cell::new(hit.identity.version.to_string()),
            Cell::new(&hit.source),
            Cell::new(hit.description.as_deref().unwrap_or_default()),
        ]);
    }
    table
}

/// Render installed package records.
pub fn installed_table(records: &[InstalledPackageRecord]) -> Table {
    let mut table = base_table(&["Package", "Version", "Source", "Installed"]);
    for record in records {
        table.add_row([
            Cell::new(record.identity.name.as_str()),
            Cell::new(record.identity.version.to_string()),
            Cell::new(&record.source),
            Cell::new(record.installed_at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
    }
    table
}

/// Render the source registry.
pub fn sources_table(sources: &[PackageSource]) -> Table {
    let mut table = base_table(&["Name", "Location", "Protocol", "Enabled", "Trusted"]);
    for source in sources {
        table.add_row([
            Cell::new(&source.name),
            Cell::new(source.location.as_str()),
            Cell::new(source.protocol_version.to_string()),
            Cell::new(if source.enabled { "yes" } else { "no" }),
            Cell::new(if source.trusted { "yes" } else { "no" }),
        ]);
    }
    table
}
