use thiserror::Error;

use crate::shots::{Provenance, Shot};
use crate::timecode::{self, TimecodeError};

/// A fatal reconciliation failure. The caller discards any partial output;
/// there is no line-skipping recovery.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("line {line}: unknown action '{action}'")]
    UnknownAction { line: usize, action: String },

    #[error("line {line}: malformed '{action}' directive, expected '{expected}'")]
    Malformed {
        line: usize,
        action: &'static str,
        expected: &'static str,
    },

    #[error("line {line}: {source}")]
    BadTimecode {
        line: usize,
        #[source]
        source: TimecodeError,
    },

    #[error("line {line}: cannot mergeup to nothing")]
    MergeUpToNothing { line: usize },

    #[error("line {line}: cannot mergedown to nothing")]
    MergeDownToNothing { line: usize },

    #[error("line {line}: cannot split without a preceding shot")]
    SplitFromNothing { line: usize },

    #[error("line {line}: directives consume more shots than the original list holds")]
    OriginalExhausted { line: usize },
}

/// One line of user intent from the overlay document.
///
/// Every directive references at most one original shot — by cursor
/// position, never by id — plus literal data. `keep`, `mergeup`,
/// `mergedown` and `delete` ignore any trailing tokens, since the overlay
/// renders full lines and the human usually edits only the leading word.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Keep,
    Edit {
        shot_id: String,
        start_pts: f64,
        end_pts: f64,
    },
    Add {
        shot_id: String,
        start_pts: f64,
        end_pts: f64,
    },
    MergeUp,
    MergeDown,
    Delete,
    Split {
        shot_id: String,
        cut_pts: f64,
    },
}

impl Directive {
    /// Parse a single non-blank, non-comment overlay line.
    pub fn parse(text: &str, line: usize) -> Result<Self, ReconcileError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let action = tokens[0];

        match action {
            "keep" => Ok(Directive::Keep),
            "mergeup" => Ok(Directive::MergeUp),
            "mergedown" => Ok(Directive::MergeDown),
            "delete" => Ok(Directive::Delete),
            "edit" | "add" => {
                let (shot_id, start_pts, end_pts) = match tokens.as_slice() {
                    [_, shot_id, start, "->", end] => (
                        shot_id.to_string(),
                        decode_field(start, line)?,
                        decode_field(end, line)?,
                    ),
                    _ => {
                        return Err(ReconcileError::Malformed {
                            line,
                            action: if action == "edit" { "edit" } else { "add" },
                            expected: "[action] [shot_id] [in_timestamp] -> [out_timestamp]",
                        })
                    }
                };
                if action == "edit" {
                    Ok(Directive::Edit {
                        shot_id,
                        start_pts,
                        end_pts,
                    })
                } else {
                    Ok(Directive::Add {
                        shot_id,
                        start_pts,
                        end_pts,
                    })
                }
            }
            "split" => match tokens.as_slice() {
                [_, shot_id, cut] => Ok(Directive::Split {
                    shot_id: shot_id.to_string(),
                    cut_pts: decode_field(cut, line)?,
                }),
                _ => Err(ReconcileError::Malformed {
                    line,
                    action: "split",
                    expected: "split [new_shot_id] [cut_timestamp]",
                }),
            },
            other => Err(ReconcileError::UnknownAction {
                line,
                action: other.to_string(),
            }),
        }
    }
}

fn decode_field(text: &str, line: usize) -> Result<f64, ReconcileError> {
    timecode::decode(text).map_err(|source| ReconcileError::BadTimecode { line, source })
}

/// Deferred `mergedown` state.
///
/// The merged range's true end point is only known once the next original
/// shot's directive has been decided, so the absorbed shot is carried here
/// until the following line fires the emission.
#[derive(Debug, Clone, PartialEq)]
enum MergeState {
    Idle,
    AwaitingNext(Shot),
}

/// The outcome of a reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub shots: Vec<Shot>,
    pub provenance: Provenance,
}

/// Apply an overlay document to an original shot list.
///
/// Pure function of its inputs: directive lines bind to original shots by
/// a forward-only cursor, the output grows independently of the original's
/// length, and provenance is `Correction` as soon as any directive other
/// than `keep` fires. Blank lines and lines starting with `#` are ignored.
///
/// Contiguity is preserved across `keep`/`delete`/`split`/`mergeup`/
/// `mergedown`; `edit` and `add` are escape hatches that may introduce
/// gaps or overlaps, which is accepted behavior and not repaired here.
pub fn reconcile(original: &[Shot], document: &str) -> Result<Reconciled, ReconcileError> {
    let mut cursor = 0usize;
    let mut output: Vec<Shot> = Vec::new();
    let mut pending = MergeState::Idle;
    let mut touched = false;

    for (index, raw) in document.lines().enumerate() {
        let line = index + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        // A pending mergedown swallows this line's action entirely: the
        // line still consumes the cursor slot as the subject shot, but its
        // emission is the merged range with the absorbed shot's start.
        if let MergeState::AwaitingNext(absorbed) = &pending {
            let subject = original
                .get(cursor)
                .ok_or(ReconcileError::OriginalExhausted { line })?;
            output.push(Shot {
                shot_id: subject.shot_id.clone(),
                start_pts: absorbed.start_pts,
                end_pts: subject.end_pts,
            });
            cursor += 1;
            pending = MergeState::Idle;
            continue;
        }

        match Directive::parse(text, line)? {
            Directive::Keep => {
                let subject = original
                    .get(cursor)
                    .ok_or(ReconcileError::OriginalExhausted { line })?;
                output.push(subject.clone());
                cursor += 1;
            }
            Directive::Edit {
                shot_id,
                start_pts,
                end_pts,
            } => {
                touched = true;
                output.push(Shot {
                    shot_id,
                    start_pts,
                    end_pts,
                });
                cursor += 1;
            }
            Directive::Add {
                shot_id,
                start_pts,
                end_pts,
            } => {
                touched = true;
                // Inserts literal data without consuming an original shot
                output.push(Shot {
                    shot_id,
                    start_pts,
                    end_pts,
                });
            }
            Directive::MergeUp => {
                touched = true;
                let previous = output
                    .last_mut()
                    .ok_or(ReconcileError::MergeUpToNothing { line })?;
                let subject = original
                    .get(cursor)
                    .ok_or(ReconcileError::OriginalExhausted { line })?;
                previous.end_pts = subject.end_pts;
                cursor += 1;
            }
            Directive::MergeDown => {
                touched = true;
                if cursor + 1 >= original.len() {
                    return Err(ReconcileError::MergeDownToNothing { line });
                }
                pending = MergeState::AwaitingNext(original[cursor].clone());
                cursor += 1;
            }
            Directive::Delete => {
                touched = true;
                cursor += 1;
            }
            Directive::Split { shot_id, cut_pts } => {
                touched = true;
                let previous = output
                    .last_mut()
                    .ok_or(ReconcileError::SplitFromNothing { line })?;
                let former_end = previous.end_pts;
                previous.end_pts = cut_pts;
                output.push(Shot {
                    shot_id,
                    start_pts: cut_pts,
                    end_pts: former_end,
                });
            }
        }
    }

    let provenance = if touched {
        Provenance::Correction
    } else {
        Provenance::OriginalUntouched
    };

    Ok(Reconciled {
        shots: output,
        provenance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(id: &str, start: f64, end: f64) -> Shot {
        Shot {
            shot_id: id.to_string(),
            start_pts: start,
            end_pts: end,
        }
    }

    fn three_shots() -> Vec<Shot> {
        vec![
            shot("10", 0.0, 10.0),
            shot("20", 10.0, 20.0),
            shot("30", 20.0, 30.0),
        ]
    }

    #[test]
    fn test_keep_only_is_untouched() {
        let original = three_shots();
        let doc = "keep 10 0:00:00.00 -> 0:00:10.00\n\
                   keep 20 0:00:10.00 -> 0:00:20.00\n\
                   keep 30 0:00:20.00 -> 0:00:30.00\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(result.shots, original);
        assert_eq!(result.provenance, Provenance::OriginalUntouched);
    }

    #[test]
    fn test_comments_and_blanks_are_ignored() {
        let original = vec![shot("10", 0.0, 10.0)];
        let doc = "# header\n\n  \nkeep 10 0:00:00.00 -> 0:00:10.00\n# trailing\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(result.shots, original);
        assert_eq!(result.provenance, Provenance::OriginalUntouched);
    }

    #[test]
    fn test_mergeup_extends_previous_forward() {
        let original = three_shots();
        let doc = "keep\nmergeup\nkeep\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(
            result.shots,
            vec![shot("10", 0.0, 20.0), shot("30", 20.0, 30.0)]
        );
        assert_eq!(result.provenance, Provenance::Correction);
    }

    #[test]
    fn test_mergedown_pulls_next_start_back() {
        let original = three_shots();
        let doc = "keep\nmergedown\nkeep\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(
            result.shots,
            vec![shot("10", 0.0, 10.0), shot("30", 10.0, 30.0)]
        );
    }

    #[test]
    fn test_mergedown_swallows_following_action() {
        // The line after a mergedown is consumed as the merge subject;
        // its own action never runs, whatever it says.
        let original = three_shots();
        let doc = "mergedown\ndelete\nkeep\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(
            result.shots,
            vec![shot("20", 0.0, 20.0), shot("30", 20.0, 30.0)]
        );
    }

    #[test]
    fn test_split_recovers_merged_boundary() {
        let original = vec![shot("10", 0.0, 20.0)];
        let doc = "keep\nsplit X 0:00:10.00\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(
            result.shots,
            vec![shot("10", 0.0, 10.0), shot("X", 10.0, 20.0)]
        );
        assert_eq!(result.provenance, Provenance::Correction);
    }

    #[test]
    fn test_edit_replaces_with_literal_fields() {
        let original = three_shots();
        let doc = "keep\nedit 25 0:00:09.50 -> 0:00:21.00\nkeep\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(
            result.shots,
            vec![
                shot("10", 0.0, 10.0),
                shot("25", 9.5, 21.0),
                shot("30", 20.0, 30.0),
            ]
        );
    }

    #[test]
    fn test_add_does_not_consume_original() {
        let original = vec![shot("10", 0.0, 10.0), shot("20", 10.0, 20.0)];
        let doc = "keep\nadd 15 0:00:10.00 -> 0:00:12.00\nkeep\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(
            result.shots,
            vec![
                shot("10", 0.0, 10.0),
                shot("15", 10.0, 12.0),
                shot("20", 10.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_delete_drops_shot_and_marks_touched() {
        let original = three_shots();
        let doc = "keep\ndelete\nkeep\n";

        let result = reconcile(&original, doc).unwrap();
        assert_eq!(
            result.shots,
            vec![shot("10", 0.0, 10.0), shot("30", 20.0, 30.0)]
        );
        assert_eq!(result.provenance, Provenance::Correction);
    }

    #[test]
    fn test_mergeup_at_start_fails() {
        let original = three_shots();
        let err = reconcile(&original, "mergeup\n").unwrap_err();
        assert!(matches!(err, ReconcileError::MergeUpToNothing { line: 1 }));
    }

    #[test]
    fn test_mergedown_at_last_shot_fails() {
        let original = three_shots();
        let doc = "keep\nkeep\nmergedown\n";
        let err = reconcile(&original, doc).unwrap_err();
        assert!(matches!(err, ReconcileError::MergeDownToNothing { line: 3 }));
    }

    #[test]
    fn test_split_with_empty_output_fails() {
        let original = three_shots();
        let err = reconcile(&original, "split X 0:00:05.00\n").unwrap_err();
        assert!(matches!(err, ReconcileError::SplitFromNothing { line: 1 }));
    }

    #[test]
    fn test_unknown_action_fails() {
        let original = three_shots();
        let err = reconcile(&original, "kepe 10 0:00:00.00 -> 0:00:10.00\n").unwrap_err();
        match err {
            ReconcileError::UnknownAction { line, action } => {
                assert_eq!(line, 1);
                assert_eq!(action, "kepe");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_edit_fails() {
        let original = three_shots();
        // Missing the arrow separator
        let err = reconcile(&original, "edit 10 0:00:00.00 0:00:10.00\n").unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Malformed {
                line: 1,
                action: "edit",
                ..
            }
        ));
    }

    #[test]
    fn test_bad_timecode_in_add_fails() {
        let original = three_shots();
        let err = reconcile(&original, "add 15 1.5 -> 0:00:12.00\n").unwrap_err();
        assert!(matches!(err, ReconcileError::BadTimecode { line: 1, .. }));
    }

    #[test]
    fn test_keep_past_end_of_original_fails() {
        let original = vec![shot("10", 0.0, 10.0)];
        let doc = "keep\nkeep\n";
        let err = reconcile(&original, doc).unwrap_err();
        assert!(matches!(err, ReconcileError::OriginalExhausted { line: 2 }));
    }

    #[test]
    fn test_directives_can_shrink_to_nothing() {
        let original = three_shots();
        let doc = "delete\ndelete\ndelete\n";

        let result = reconcile(&original, doc).unwrap();
        assert!(result.shots.is_empty());
        assert_eq!(result.provenance, Provenance::Correction);
    }
}
