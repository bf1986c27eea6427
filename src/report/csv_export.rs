use std::io::Write;

use super::Report;
use crate::timezone::display;

pub const HEADERS: [&str; 12] = [
    "Library Name",
    "Folder Name",
    "Last Modified",
    "Status",
    "Pending Hours",
    "Sharepoint Category",
    "Enriched Category",
    "FileCount",
    "WorkspaceID",
    "FPP count",
    "FWOP count",
    "Extraction Date",
];

const NOT_APPLICABLE: &str = "N/A";

/// Pending rows first (report order), then successful rows.
pub fn write_csv<W: Write>(writer: W, report: &Report) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADERS)?;

    for p in &report.pending {
        let modified = display(&p.last_modified);
        let hours = format!("{:.2}", p.pending_hours);
        let files = p.file_count.to_string();
        csv.write_record([
            p.library_name.as_str(),
            p.folder_name.as_str(),
            modified.as_str(),
            "Pending",
            hours.as_str(),
            p.source_category.as_str(),
            p.enriched_category.as_str(),
            files.as_str(),
            p.workspace_info.as_str(),
            NOT_APPLICABLE,
            NOT_APPLICABLE,
            NOT_APPLICABLE,
        ])?;
    }

    for s in &report.successful {
        let extracted = display(&s.extraction_date);
        let files = s.file_count.to_string();
        let fpp = s.final_planning_pkg_count.to_string();
        let fwop = s.final_wo_pkg_count.to_string();
        csv.write_record([
            s.library_name.as_str(),
            s.folder_name.as_str(),
            extracted.as_str(),
            "Extracted",
            NOT_APPLICABLE,
            NOT_APPLICABLE,
            NOT_APPLICABLE,
            files.as_str(),
            s.workspace_id.as_str(),
            fpp.as_str(),
            fwop.as_str(),
            extracted.as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
