use std::fmt::Write as _;

use crate::shots::ShotList;
use crate::timecode;

const ASS_HEADER: &str = r"[Script Info]
Title: Preview
ScriptType: v4.00+
WrapStyle: 0
ScaledBorderAndShadow: yes
YCbCr Matrix: TV.601
PlayResX: 853
PlayResY: 480

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: ShotA,Arial,28,&H00A9A9FF,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,3,2,0,8,10,10,10,1
Style: ShotB,Arial,28,&H00AAFFAE,&H000000FF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,3,2,0,8,10,10,10,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
";

/// Render a shot list as an ASS subtitle preview.
///
/// Shots alternate between two styles so adjacent cuts are visually
/// distinct; each shot shows its id and its in/out timecodes.
pub fn render(list: &ShotList) -> String {
    let mut doc = String::from(ASS_HEADER);

    for (i, shot) in list.shots.iter().enumerate() {
        let style = if i % 2 == 0 { "ShotA" } else { "ShotB" };
        let start = timecode::encode(shot.start_pts);
        let end = timecode::encode(shot.end_pts);
        let prefix = format!("Dialogue: 0,{},{},{},,0,0,0,,", start, end, style);

        let _ = writeln!(doc, "{}SHOT {}", prefix, shot.shot_id);
        let _ = writeln!(doc, "{}{} \u{25B6} {}", prefix, start, end);
    }

    doc
}
