use std::fmt::Write as _;

use crate::shots::ShotList;
use crate::timecode;

/// Render a shot list as a human-editable overlay document.
///
/// Every shot renders as a `keep` line regardless of future intent; the
/// human expresses a different action by changing the leading token and/or
/// the rendered fields. The header documents the grammar and is ignored on
/// read-back, as are all `#` lines and blanks.
pub fn render(list: &ShotList) -> String {
    let mut doc = String::new();

    let _ = writeln!(
        doc,
        "# This is an OVERLAY file for '{}' ({})",
        list.uri, list.model
    );
    doc.push_str("# Use this file to edit the shot change detection data.\n\n");
    doc.push_str("# Format:\n");
    doc.push_str("# [action] [shot_id] [in_timestamp] -> [out_timestamp]\n\n");
    doc.push_str("# keep      - do not modify, keep this shot as-is\n");
    doc.push_str("# edit      - edit this shot's ID or in/out timestamp\n");
    doc.push_str("# add       - add a new shot, set your own ID and in/out timestamp\n");
    doc.push_str(
        "# mergeup   - delete this shot, set the previous shot's out point to this shot's out point\n",
    );
    doc.push_str(
        "# mergedown - delete this shot, set the next shot's in point to this shot's in point\n",
    );
    doc.push_str("# delete    - delete this shot, neighboring shots won't be modified\n");
    doc.push_str("# split     - split the previous shot in two at the given timestamp\n");
    doc.push('\n');

    for shot in &list.shots {
        let _ = writeln!(
            doc,
            "keep {} {} -> {}",
            shot.shot_id,
            timecode::encode(shot.start_pts),
            timecode::encode(shot.end_pts)
        );
    }

    doc
}
