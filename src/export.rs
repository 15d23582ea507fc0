//! Text rendering and file export of the assembled views.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::ValueEnum;
use csv::WriterBuilder;
use log::info;

use crate::error::Result;
use crate::frequency::FrequencyView;
use crate::network::NetworkView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    fn delimiter(&self) -> u8 {
        match self {
            ExportFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

///Neutralizes cells a spreadsheet would evaluate as a formula by prefixing a single quote.
///Cells already starting with a quote are left alone.
/// # Example
/// ```
/// use cdp_reasons::export::csv_safe_cell;
/// assert_eq!(csv_safe_cell("=SUM(A1)".to_string()), "'=SUM(A1)");
/// assert_eq!(csv_safe_cell("bus".to_string()), "bus");
/// ```
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// `<out_dir>/<stem>_<YYYYMMDD>_<HHMMSS>_<kind>.<ext>`
pub fn timestamped_path(out_dir: &Path, stem: &str, kind: &str, format: ExportFormat) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    out_dir.join(format!("{stem}_{stamp}_{kind}.{}", format.extension()))
}

pub fn render_frequency_txt(view: &FrequencyView) -> String {
    let mut out = String::new();
    match view {
        FrequencyView::NoData => out.push_str("No data for this selection.\n"),
        FrequencyView::Overall { labels, counts } => {
            let width = label_width(labels, "word");
            let _ = writeln!(out, "{:<width$}  count", "word");
            for (label, count) in labels.iter().zip(counts) {
                let _ = writeln!(out, "{label:<width$}  {count}");
            }
        }
        FrequencyView::ByCategory {
            labels,
            increase,
            decrease,
            baseline_increase,
            baseline_decrease,
        } => {
            let width = label_width(labels, "word");
            let _ = writeln!(out, "{:<width$}  increase  decrease", "word");
            for ((label, inc), dec) in labels.iter().zip(increase).zip(decrease) {
                let _ = writeln!(out, "{label:<width$}  {inc:>8.3}  {dec:>8.3}");
            }
            let _ = writeln!(out, "baseline increase: {baseline_increase:.3}");
            let _ = writeln!(out, "baseline decrease: {baseline_decrease:.3}");
        }
    }
    out
}

pub fn render_network_txt(view: &NetworkView) -> String {
    let mut out = String::new();
    match view {
        NetworkView::NoData => out.push_str("No data for this selection.\n"),
        NetworkView::Graph { nodes, edges } => {
            let _ = writeln!(out, "Nodes ({}):", nodes.len());
            for node in nodes {
                let _ = writeln!(out, "  {:<20} ({:>6.3}, {:>6.3})", node.label, node.x, node.y);
            }
            let _ = writeln!(out, "Edges ({}):", edges.len());
            for edge in edges {
                let _ = writeln!(out, "  {} - {} [{}]", edge.source, edge.target, edge.weight);
            }
        }
    }
    out
}

fn label_width(labels: &[String], header: &str) -> usize {
    labels
        .iter()
        .map(|l| l.chars().count())
        .chain([header.len()])
        .max()
        .unwrap_or(0)
}

/// Writes the frequency view in `format` and returns the created file.
pub fn export_frequency(
    view: &FrequencyView,
    format: ExportFormat,
    out_dir: &Path,
    stem: &str,
) -> Result<PathBuf> {
    let path = timestamped_path(out_dir, stem, "frequency", format);
    match format {
        ExportFormat::Txt => fs::write(&path, render_frequency_txt(view))?,
        ExportFormat::Json => fs::write(&path, serde_json::to_string_pretty(view)?)?,
        ExportFormat::Csv | ExportFormat::Tsv => {
            let mut wtr = WriterBuilder::new()
                .delimiter(format.delimiter())
                .from_path(&path)?;
            match view {
                FrequencyView::NoData => wtr.write_record(["word", "count"])?,
                FrequencyView::Overall { labels, counts } => {
                    wtr.write_record(["word", "count"])?;
                    for (label, count) in labels.iter().zip(counts) {
                        wtr.write_record([csv_safe_cell(label.clone()), count.to_string()])?;
                    }
                }
                FrequencyView::ByCategory {
                    labels,
                    increase,
                    decrease,
                    baseline_increase,
                    baseline_decrease,
                } => {
                    wtr.write_record([
                        "word",
                        "increase",
                        "decrease",
                        "baseline_increase",
                        "baseline_decrease",
                    ])?;
                    for ((label, inc), dec) in labels.iter().zip(increase).zip(decrease) {
                        wtr.write_record([
                            csv_safe_cell(label.clone()),
                            inc.to_string(),
                            dec.to_string(),
                            baseline_increase.to_string(),
                            baseline_decrease.to_string(),
                        ])?;
                    }
                }
            }
            wtr.flush()?;
        }
    }
    info!("Exported frequency view to {}", path.display());
    Ok(path)
}

/// Writes the network view in `format`. CSV and TSV produce separate edge and
/// node tables; TXT and JSON produce one file.
pub fn export_network(
    view: &NetworkView,
    format: ExportFormat,
    out_dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let written = match format {
        ExportFormat::Txt => {
            let path = timestamped_path(out_dir, stem, "network", format);
            fs::write(&path, render_network_txt(view))?;
            vec![path]
        }
        ExportFormat::Json => {
            let path = timestamped_path(out_dir, stem, "network", format);
            fs::write(&path, serde_json::to_string_pretty(view)?)?;
            vec![path]
        }
        ExportFormat::Csv | ExportFormat::Tsv => {
            let edges_path = timestamped_path(out_dir, stem, "network_edges", format);
            let nodes_path = timestamped_path(out_dir, stem, "network_nodes", format);
            let mut edges_wtr = WriterBuilder::new()
                .delimiter(format.delimiter())
                .from_path(&edges_path)?;
            let mut nodes_wtr = WriterBuilder::new()
                .delimiter(format.delimiter())
                .from_path(&nodes_path)?;
            edges_wtr.write_record(["source", "target", "weight"])?;
            nodes_wtr.write_record(["label", "x", "y"])?;
            if let NetworkView::Graph { nodes, edges } = view {
                for edge in edges {
                    edges_wtr.write_record([
                        csv_safe_cell(edge.source.clone()),
                        csv_safe_cell(edge.target.clone()),
                        edge.weight.to_string(),
                    ])?;
                }
                for node in nodes {
                    nodes_wtr.write_record([
                        csv_safe_cell(node.label.clone()),
                        node.x.to_string(),
                        node.y.to_string(),
                    ])?;
                }
            }
            edges_wtr.flush()?;
            nodes_wtr.flush()?;
            vec![edges_path, nodes_path]
        }
    };
    for path in &written {
        info!("Exported network view to {}", path.display());
    }
    Ok(written)
}
