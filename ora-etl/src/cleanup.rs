//! Destructive reset of the records collection
//!
//! The loader never deduplicates: rerunning it appends a second copy of every
//! source. Dropping the collection is the supported way back to a clean
//! state before a full reload.

use ora_common::db::RecordStore;
use ora_common::format::format_count;
use ora_common::Result;
use std::io::{BufRead, Write};
use tracing::info;

/// What the operator chose
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Dropped { documents: u64 },
    Cancelled { documents: u64 },
}

/// `YES` in any letter case, surrounding whitespace ignored
pub fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("YES")
}

/// Show the document count, ask for confirmation and drop on `YES`
///
/// With `assume_yes` the prompt is skipped. End of input counts as a refusal.
pub async fn run_cleanup<R, W>(
    store: &dyn RecordStore,
    assume_yes: bool,
    input: &mut R,
    output: &mut W,
) -> Result<CleanupOutcome>
where
    R: BufRead,
    W: Write,
{
    let documents = store.count_documents(bson::Document::new()).await?;

    writeln!(output, "Collection: {}", store.namespace())?;
    writeln!(output, "Documents before: {}", format_count(documents))?;
    writeln!(output)?;
    writeln!(output, "Do you want to drop the entire collection?")?;
    writeln!(output, "  (This frees the space and is the fastest way to reset)")?;
    writeln!(output)?;

    let confirmed = if assume_yes {
        writeln!(output, "--yes given, skipping confirmation")?;
        true
    } else {
        write!(output, "Type YES to drop: ")?;
        output.flush()?;

        let mut answer = String::new();
        let read = input.read_line(&mut answer)?;
        read > 0 && is_confirmation(&answer)
    };

    if !confirmed {
        writeln!(output, "Cancelled")?;
        return Ok(CleanupOutcome::Cancelled { documents });
    }

    store.drop_collection().await?;
    info!(namespace = %store.namespace(), documents, "Collection dropped");

    writeln!(output, "Collection dropped - space freed!")?;
    writeln!(output)?;
    writeln!(output, "Now run:")?;
    writeln!(output, "  ora-etl")?;
    writeln!(output, "  ora-indexes")?;

    Ok(CleanupOutcome::Dropped { documents })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_confirmation() {
        assert!(is_confirmation("YES"));
        assert!(is_confirmation("yes\n"));
        assert!(is_confirmation("  Yes  "));
        assert!(!is_confirmation("y"));
        assert!(!is_confirmation("no"));
        assert!(!is_confirmation(""));
        assert!(!is_confirmation("YES please"));
    }
}
