use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;

use crate::detect::ShotSpan;

/// A single detected or edited shot interval.
///
/// `shot_id` is an opaque user-assigned label, kept only for display and
/// bookkeeping — it is neither numeric nor unique by contract. `start_pts`
/// and `end_pts` are presentation timestamps in seconds; `start_pts <
/// end_pts` is expected but not enforced, since a hand-edited overlay can
/// feed the model arbitrary values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub shot_id: String,
    pub start_pts: f64,
    pub end_pts: f64,
}

/// Where a shot list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Straight out of the detection service
    Original,
    /// Produced by reconciling an overlay that changed something
    Correction,
    /// A correction pass ran but every directive was `keep`
    OriginalUntouched,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provenance::Original => "original",
            Provenance::Correction => "correction",
            Provenance::OriginalUntouched => "original_untouched",
        };
        write!(f, "{}", name)
    }
}

/// One detection run: an ordered sequence of shots for a video URI.
///
/// Shots are intended to be contiguous and non-overlapping in ascending
/// time order. An original list is immutable once written; corrections are
/// new artifacts, never edits in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShotList {
    pub uri: String,
    pub model: String,
    pub source: Provenance,
    pub shots: Vec<Shot>,
}

impl ShotList {
    /// Build an original shot list from raw detection spans.
    ///
    /// Ids are assigned as `(index + 1) * 10`, leaving numeric gaps for
    /// manual insertion during correction.
    pub fn from_annotations(uri: &str, model: &str, spans: &[ShotSpan]) -> Self {
        let shots = spans
            .iter()
            .enumerate()
            .map(|(i, span)| Shot {
                shot_id: ((i + 1) * 10).to_string(),
                start_pts: span.start_offset,
                end_pts: span.end_offset,
            })
            .collect();

        Self {
            uri: uri.to_string(),
            model: model.to_string(),
            source: Provenance::Original,
            shots,
        }
    }

    /// Derive a new corrected artifact from this list.
    pub fn with_correction(&self, shots: Vec<Shot>, source: Provenance) -> Self {
        Self {
            uri: self.uri.clone(),
            model: self.model.clone(),
            source,
            shots,
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read shot list {}", path.display()))?;
        let list = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse shot list {}", path.display()))?;
        Ok(list)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string(self)?;
        fs::write(path, content)
            .await
            .with_context(|| format!("failed to write shot list {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_annotations_assigns_gapped_ids() {
        let spans = vec![
            ShotSpan {
                start_offset: 0.0,
                end_offset: 4.2,
            },
            ShotSpan {
                start_offset: 4.2,
                end_offset: 9.9,
            },
            ShotSpan {
                start_offset: 9.9,
                end_offset: 15.0,
            },
        ];

        let list = ShotList::from_annotations("gs://bucket/video.mp4", "builtin/stable", &spans);

        assert_eq!(list.source, Provenance::Original);
        let ids: Vec<&str> = list.shots.iter().map(|s| s.shot_id.as_str()).collect();
        assert_eq!(ids, ["10", "20", "30"]);
        assert_eq!(list.shots[1].start_pts, 4.2);
        assert_eq!(list.shots[1].end_pts, 9.9);
    }

    #[test]
    fn test_wire_format() {
        let list = ShotList {
            uri: "gs://bucket/video.mp4".to_string(),
            model: "builtin/stable".to_string(),
            source: Provenance::OriginalUntouched,
            shots: vec![Shot {
                shot_id: "10".to_string(),
                start_pts: 0.0,
                end_pts: 1.5,
            }],
        };

        let json = serde_json::to_string(&list).unwrap();
        assert!(json.contains("\"source\":\"original_untouched\""));
        assert!(json.contains("\"shot_id\":\"10\""));

        let back: ShotList = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source, Provenance::OriginalUntouched);
        assert_eq!(back.shots, list.shots);
    }

    #[test]
    fn test_save_load_round_trip() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("original_builtin-stable.json");

            let list = ShotList {
                uri: "gs://bucket/video.mp4".to_string(),
                model: "builtin/stable".to_string(),
                source: Provenance::Original,
                shots: vec![Shot {
                    shot_id: "10".to_string(),
                    start_pts: 0.0,
                    end_pts: 4.2,
                }],
            };

            list.save(&path).await.unwrap();
            let back = ShotList::load(&path).await.unwrap();
            assert_eq!(back.source, Provenance::Original);
            assert_eq!(back.shots, list.shots);
        });
    }
}
