use std::fmt::Write as _;

use crate::shots::{Shot, ShotList};

/// Default number of equal-width time buckets for statistics export.
pub const DEFAULT_BUCKETS: usize = 100;

/// Count shots per fixed-width time bucket over `[0, duration)`.
///
/// Forward-only scan: the current bucket pointer advances whenever a
/// shot's start exceeds the current bucket's end boundary and never moves
/// back, so shots are assumed to be in non-decreasing start order. A shot
/// starting past the last boundary lands in the final bucket.
pub fn bucket_counts(shots: &[Shot], duration: f64, buckets: usize) -> Vec<u32> {
    let mut counts = vec![0u32; buckets];
    if buckets == 0 || duration <= 0.0 {
        return counts;
    }

    let width = duration / buckets as f64;
    let mut current = 0usize;

    for shot in shots {
        while current + 1 < buckets && shot.start_pts > (current + 1) as f64 * width {
            current += 1;
        }
        counts[current] += 1;
    }

    counts
}

/// One row of the statistics table.
#[derive(Debug, Clone)]
pub struct BucketRow {
    pub label: String,
    pub counts: Vec<u32>,
}

impl BucketRow {
    pub fn for_list(list: &ShotList, duration: f64, buckets: usize) -> Self {
        Self {
            label: format!("{} ({}, {})", list.uri, list.model, list.source),
            counts: bucket_counts(&list.shots, duration, buckets),
        }
    }
}

/// Render bucket rows as a UTF-8 CSV document.
///
/// Header is `Filename,1,2,...,N`; each row carries a quoted label
/// followed by the per-bucket shot counts.
pub fn render_csv(rows: &[BucketRow], buckets: usize) -> String {
    let mut doc = String::from("Filename");
    for i in 1..=buckets {
        let _ = write!(doc, ",{}", i);
    }
    doc.push('\n');

    for row in rows {
        let _ = write!(doc, "\"{}\"", row.label.replace('"', "\"\""));
        for count in &row.counts {
            let _ = write!(doc, ",{}", count);
        }
        doc.push('\n');
    }

    doc
}
