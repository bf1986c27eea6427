use std::fmt::Write;

use super::Report;
use crate::classify::PendingCategory;
use crate::timezone::display;

const CELL: &str = "border:1px solid black;";

/// Color band of the average-pending row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Green,
    Yellow,
    Red,
}

impl Band {
    /// Green up to 24h, yellow up to 48h, red beyond.
    pub fn for_hours(hours: f64) -> Self {
        if hours <= 24.0 {
            Band::Green
        } else if hours <= 48.0 {
            Band::Yellow
        } else {
            Band::Red
        }
    }

    fn style(&self) -> &'static str {
        match self {
            Band::Green => "background-color:green;color:white;font-weight:normal;",
            Band::Yellow => "background-color:yellow;color:black;font-weight:bold;",
            Band::Red => "background-color:red;color:white;font-weight:normal;",
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn cell(value: impl std::fmt::Display) -> String {
    format!("<td style='{CELL}'>&nbsp;{}&nbsp;</td>", escape(&value.to_string()))
}

fn header_row(color: &str, titles: &[&str]) -> String {
    let mut row = format!("<tr style='background-color:{color};color:white;'>");
    for title in titles {
        row.push_str(&format!("<th style='{CELL}'>&nbsp;{title}&nbsp;</th>"));
    }
    row.push_str("</tr>");
    row
}

/// Render the e-mail style HTML summary.
pub fn render(report: &Report) -> String {
    let stats = &report.summary;
    let mut html = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(html, "<html><body>");
    let _ = writeln!(html, "<p style='font-size:16pt;'>Content Inventory Reconciliation Report</p>");
    let _ = writeln!(
        html,
        "<p style='font-size:8pt;color:grey;'>Report run time {}</p>",
        report.generated_at.format("%m-%d-%Y %H:%M:%S")
    );

    let _ = writeln!(html, "<table style='{CELL}border-collapse:collapse;'>");
    let _ = writeln!(
        html,
        "<tr><td style='background-color:green;color:white;padding:10px;text-align:center;' colspan='2'>\
         &nbsp;Successful transfers (last {} hours): {}&nbsp;</td></tr>",
        report.threshold_hours, stats.total_successful
    );
    let _ = writeln!(
        html,
        "<tr><td style='{CELL}font-weight:bold;'>&nbsp;Total Pending Transfers:&nbsp;</td>{}</tr>",
        cell(stats.total_pending)
    );
    for category in PendingCategory::TRACKED {
        let _ = writeln!(
            html,
            "<tr><td style='{CELL}padding-left:20px;'>&nbsp;{}:&nbsp;</td>{}</tr>",
            category.label(),
            cell(stats.count_for(category))
        );
    }
    let band = Band::for_hours(stats.average_pending_hours).style();
    let _ = writeln!(
        html,
        "<tr><td style='{CELL}font-weight:bold;{band}'>&nbsp;Average Pending Transfer:&nbsp;</td>\
         <td style='{CELL}{band}'>&nbsp;{:.2} hours&nbsp;</td></tr>",
        stats.average_pending_hours
    );
    let _ = writeln!(html, "</table><br>");

    let _ = writeln!(html, "<p style='font-weight:bold;'>Pending Transfers:</p>");
    let _ = writeln!(html, "<table style='{CELL}border-collapse:collapse;'>");
    let _ = writeln!(
        html,
        "{}",
        header_row(
            "red",
            &[
                "Library Name",
                "Folder Name",
                "Last Modified",
                "Pending (hours)",
                "Sharepoint Category",
                "Enriched Category",
                "FileCount",
                "WorkspaceID",
            ],
        )
    );
    for p in &report.pending {
        let _ = writeln!(
            html,
            "<tr>{}{}{}{}{}{}{}{}</tr>",
            cell(&p.library_name),
            cell(&p.folder_name),
            cell(display(&p.last_modified)),
            cell(format!("{:.2}", p.pending_hours)),
            cell(&p.source_category),
            cell(&p.enriched_category),
            cell(p.file_count),
            cell(&p.workspace_info),
        );
    }
    let _ = writeln!(html, "</table><br>");

    let _ = writeln!(html, "<p style='font-weight:bold;'>Successful Transfers:</p>");
    let _ = writeln!(html, "<table style='{CELL}border-collapse:collapse;'>");
    let _ = writeln!(
        html,
        "{}",
        header_row(
            "green",
            &[
                "Library Name",
                "Folder Name",
                "FileCount",
                "WorkspaceID",
                "Final Planning Pkg",
                "Final WO Pkg",
                "Extraction Date",
            ],
        )
    );
    for s in &report.successful {
        let _ = writeln!(
            html,
            "<tr>{}{}{}{}{}{}{}</tr>",
            cell(&s.library_name),
            cell(&s.folder_name),
            cell(s.file_count),
            cell(&s.workspace_id),
            cell(s.final_planning_pkg_count),
            cell(s.final_wo_pkg_count),
            cell(display(&s.extraction_date)),
        );
    }
    let _ = writeln!(html, "</table>");

    if !report.failed_containers.is_empty() || report.skipped_items > 0 {
        let _ = writeln!(
            html,
            "<p style='font-size:8pt;color:grey;'>Skipped items: {}. Containers with errors: {}</p>",
            report.skipped_items,
            escape(&report.failed_containers.join(", "))
        );
    }
    let _ = writeln!(
        html,
        "<p style='font-size:8pt;color:grey;'>Run {}</p>",
        report.run_id
    );
    let _ = writeln!(html, "</body></html>");
    html
}
