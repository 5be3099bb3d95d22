//! Console summaries printed at the end of the ora-etl binaries

use ora_common::db::CollectionStats;
use ora_common::format::format_count;
use std::fmt::Write;

use crate::indexes::IndexReport;
use crate::loader::EtlSummary;

const RULE: &str = "============================================================";

/// End-of-run summary: per-source counts, totals, speed, collection stats
pub fn render_etl_summary(summary: &EtlSummary, stats: Option<&CollectionStats>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "ETL SUMMARY:");
    for report in &summary.sources {
        let label = format!(
            "{} ({}):",
            capitalize(report.source.as_str()),
            report.source.display_name()
        );
        let mut line = format!("  {:<28} {} documents", label, format_count(report.inserted));
        if !report.file_found {
            line.push_str(" (file not found)");
        } else if report.rows_skipped > 0 || report.failed > 0 {
            line.push_str(&format!(
                " ({} skipped, {} failed)",
                format_count(report.rows_skipped),
                format_count(report.failed)
            ));
        }
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out, "  ---------------------------------");
    let _ = writeln!(
        out,
        "  {:<28} {} documents",
        "TOTAL:",
        format_count(summary.total_inserted())
    );
    let _ = writeln!(out, "  Time: {:.2}s", summary.elapsed.as_secs_f64());
    let _ = writeln!(out, "  Speed: {:.0} docs/sec", summary.docs_per_sec());

    if let Some(stats) = stats {
        let _ = writeln!(out);
        let _ = write!(out, "{}", render_collection_stats(stats));
    }

    out
}

/// Index creation outcome plus the indexes now present on the collection
pub fn render_index_report(
    report: &IndexReport,
    index_names: &[String],
    stats: Option<&CollectionStats>,
) -> String {
    let mut out = String::new();

    for name in &report.created {
        let _ = writeln!(out, "  ok    {}", name);
    }
    for (name, error) in &report.failed {
        let _ = writeln!(out, "  FAIL  {}: {}", name, error);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "All indexes ({}):", index_names.len());
    for name in index_names {
        let _ = writeln!(out, "  - {}", name);
    }

    if let Some(stats) = stats {
        let _ = writeln!(out);
        let _ = write!(out, "{}", render_collection_stats(stats));
    }

    out
}

pub fn render_collection_stats(stats: &CollectionStats) -> String {
    format!(
        "Collection Stats:\n  Documents: {}\n  Size: {:.2} MB\n",
        format_count(stats.count),
        stats.size_mb()
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceReport;
    use ora_common::SourceId;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report(source: SourceId, inserted: u64, file_found: bool) -> SourceReport {
        SourceReport {
            source,
            path: PathBuf::from(source.default_file()),
            file_found,
            rows_read: inserted,
            rows_skipped: 0,
            inserted,
            failed: 0,
            batches: 1,
            batches_failed: 0,
            elapsed: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_summary_lists_sources_and_total() {
        let summary = EtlSummary {
            sources: vec![
                report(SourceId::Source1, 541_909, true),
                report(SourceId::Source2, 1_000, true),
                report(SourceId::Source3, 0, false),
            ],
            elapsed: Duration::from_secs(2),
        };

        let text = render_etl_summary(&summary, None);
        assert!(text.contains("Source1 (Online Retail):"));
        assert!(text.contains("541,909 documents"));
        assert!(text.contains("(file not found)"));
        assert!(text.contains("542,909 documents"));
        assert!(text.contains("Speed: 271454 docs/sec") || text.contains("Speed: 271455 docs/sec"));
        assert!(!text.contains("Collection Stats"));
    }

    #[test]
    fn test_collection_stats_rendering() {
        let stats = CollectionStats {
            count: 543_702,
            size_bytes: 2.5 * 1024.0 * 1024.0,
        };
        let text = render_collection_stats(&stats);
        assert!(text.contains("Documents: 543,702"));
        assert!(text.contains("Size: 2.50 MB"));
    }

    #[test]
    fn test_index_report_lists_failures() {
        let report = IndexReport {
            created: vec!["idx_country".to_string()],
            failed: vec![("idx_description_text".to_string(), "boom".to_string())],
        };
        let names = vec!["_id_".to_string(), "idx_country".to_string()];

        let text = render_index_report(&report, &names, None);
        assert!(text.contains("ok    idx_country"));
        assert!(text.contains("FAIL  idx_description_text: boom"));
        assert!(text.contains("All indexes (2):"));
        assert!(text.contains("  - _id_"));
    }
}
