use crate::models::{Playlist, SlotEntry, TrackSlot};

/// Title shown for a slot nothing could fill.
pub const NO_MATCH_TITLE: &str = "⚠️ No match found";

/// Text rendering of a finished playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistExport {
    /// Sum of all filled slots' durations; unfilled slots contribute 0.
    pub total_secs: u32,
    /// One line per slot, in class order.
    pub lines: Vec<String>,
}

/// Render a playlist into its total duration and per-slot display lines.
/// Pure: same playlist, same output.
pub fn render(playlist: &Playlist) -> PlaylistExport {
    let total_secs = playlist.iter().map(|e| e.slot.duration_secs()).sum();
    let lines = playlist.iter().map(render_line).collect();
    PlaylistExport { total_secs, lines }
}

fn render_line(entry: &SlotEntry) -> String {
    match &entry.slot {
        TrackSlot::Picked(track) | TrackSlot::Fallback(track) => format!(
            "{} - {}: {} — {} ({})",
            track.release,
            entry.category,
            track.title,
            track.artist,
            format_duration(track.duration_secs)
        ),
        TrackSlot::NoMatch => format!("- - {}: {NO_MATCH_TITLE} — - (-)", entry.category),
    }
}

/// Format seconds as "M:SS".
pub fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// The copy/paste block handed to instructors: header plus one line per slot.
pub fn export_text(playlist: &Playlist) -> String {
    let export = render(playlist);
    let mut text = format!(
        "Pump Playlist - Total Time: {}\n",
        format_duration(export.total_secs)
    );
    for line in &export.lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}
