use anyhow::Result;
use clap::Parser;

mod catalog;
mod models;
mod playlist;


use crate::catalog::Catalog;
use crate::models::{Playlist, ReleaseKey, SlotCategory, TrackRecord, TrackSlot};
use crate::playlist::{
    export_text, format_duration, render, Constraints, PlaylistState, SlotAssigner, NO_MATCH_TITLE,
};

/// One declarative emoji table for tag display; everything else about tag
/// styling belongs to richer frontends.
const TAG_EMOJIS: &[(&str, &str)] = &[
    ("Halloween", "🎃"),
    ("Women of Pop", "👩‍🎤"),
    ("Break-Up Songs", "💔"),
    ("Beast Mode", "💪"),
    ("Positive Vibes", "✨"),
    ("Sing-Along", "🎤"),
    ("Emo", "🎸"),
    ("P!nk", "💗"),
    ("New Year's Eve", "🥳"),
    ("Valentine's Day", "💘"),
    ("Summer", "☀️"),
    ("Spicy", "🌶️"),
    ("Hard", "💀"),
    ("Easy to Learn", "😅"),
    ("Short (<4:30)", "⏱️"),
    ("Long (>6 min)", "⌛"),
];

fn tag_emoji(tag: &str) -> &'static str {
    TAG_EMOJIS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, emoji)| *emoji)
        .unwrap_or("")
}

#[derive(Parser)]
#[command(name = "pump-playlist")]
#[command(about = "Pump class playlist builder")]
#[command(version)]
struct Args {
    /// Path to the catalog JSON file (array of raw track rows)
    #[arg(short = 'c', long = "catalog", default_value = "catalog.json")]
    catalog_file: String,

    /// Path to a saved constraints preset (JSON); flags below override it
    #[arg(long = "preset")]
    preset_file: Option<String>,

    /// Earliest release owned, e.g. 89 or United
    #[arg(long = "earliest-release")]
    earliest_release: Option<String>,

    /// Use only the 10 most recent releases
    #[arg(long = "recent-only")]
    recent_only: bool,

    /// Exclude the single newest release
    #[arg(long = "exclude-newest")]
    exclude_newest: bool,

    /// Theme tag to filter by (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Difficulty/length tag to filter by (repeatable)
    #[arg(long = "difficulty")]
    difficulty: Vec<String>,

    /// Genre to filter by (repeatable)
    #[arg(long = "genre")]
    genres: Vec<String>,

    /// Manually pick a slot, e.g. --pick "3:Monster Mash" (repeatable)
    #[arg(long = "pick", value_name = "POSITION:TITLE")]
    picks: Vec<String>,

    /// Re-roll these slot positions (1-10) after the build (repeatable)
    #[arg(long = "reroll")]
    reroll: Vec<usize>,

    /// Clear these slot positions back to empty (repeatable)
    #[arg(long = "clear")]
    clear: Vec<usize>,

    /// Search the catalog by title or artist and exit
    #[arg(long = "search", value_name = "TERM")]
    search: Option<String>,

    /// List available theme tags and exit
    #[arg(long = "list-tags")]
    list_tags: bool,

    /// List available genres and exit
    #[arg(long = "list-genres")]
    list_genres: bool,

    /// Quiet mode - print only the copy/paste export block
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if !std::path::Path::new(&args.catalog_file).exists() {
        eprintln!("Error: Catalog file '{}' not found.", args.catalog_file);
        eprintln!("Please ensure the file exists or specify a different file with --catalog.");
        return Err(anyhow::anyhow!("Catalog file '{}' not found", args.catalog_file));
    }

    let catalog = Catalog::load_json(&args.catalog_file)?;
    if catalog.is_empty() {
        return Err(anyhow::anyhow!(
            "Catalog '{}' contains no usable tracks - nothing to build from",
            args.catalog_file
        ));
    }
    if !args.quiet {
        println!(
            "Loaded {} tracks across releases {} to {}.",
            catalog.len(),
            catalog.releases().first().map(String::as_str).unwrap_or("-"),
            catalog.releases().last().map(String::as_str).unwrap_or("-")
        );
        if catalog.skipped_rows() > 0 {
            println!("Skipped {} rows with unknown track numbers.", catalog.skipped_rows());
        }
    }

    if args.list_tags {
        println!("Available theme tags:");
        for tag in catalog.all_tags() {
            println!("  {} {}", tag_emoji(&tag), tag);
        }
        return Ok(());
    }
    if args.list_genres {
        println!("Available genres:");
        for genre in catalog.all_genres() {
            println!("  {genre}");
        }
        return Ok(());
    }
    if let Some(term) = &args.search {
        let matches = catalog.search(term);
        println!("{} track(s) matching '{term}':", matches.len());
        for track in matches {
            println!(
                "  [{}] {} by {} ({})",
                track.release, track.title, track.artist, track.category
            );
        }
        return Ok(());
    }

    let constraints = build_constraints(&args, &catalog)?;
    if !args.quiet && constraints.min_release_key.value() > 0.0 {
        println!("Earliest release key: {}", constraints.min_release_key.value());
    }

    let assigner = SlotAssigner::new(&catalog, constraints);
    if !args.quiet && assigner.constraints().has_theme_filters() {
        let c = assigner.constraints();
        println!(
            "Theme filters: tags {:?} | difficulty {:?} | genres {:?}",
            c.theme_tags, c.instructor_tags, c.genres
        );
    }
    let mut rng = rand::thread_rng();
    let mut state = PlaylistState::new();
    state.set(assigner.assign(&mut rng));

    // Manual overrides: look the title up in the slot's eligible pool.
    for pick in &args.picks {
        match parse_pick(pick, &assigner) {
            Ok((index, track)) => {
                if let Err(e) = state.replace_slot(index, track) {
                    eprintln!("✗ Could not set slot from '{pick}': {e}");
                }
            }
            Err(message) => eprintln!("✗ {message}"),
        }
    }

    // Point re-rolls requested on the command line, fallback slots from the
    // release pool and themed slots from the themed pool.
    let themed_pool = assigner.themed_pool();
    let release_pool = assigner.release_pool();
    for position in &args.reroll {
        let Some(index) = position.checked_sub(1).filter(|i| *i < Playlist::LEN) else {
            eprintln!("✗ Slot {position} is out of range (1-10), skipping re-roll");
            continue;
        };
        let pool = if state.playlist().entry(index).is_some_and(|e| e.slot.is_fallback()) {
            &release_pool
        } else {
            &themed_pool
        };
        match state.reroll(index, pool, &mut rng) {
            Ok(()) => {
                if !args.quiet {
                    println!("↻ Re-rolled slot {position}");
                }
            }
            Err(e) => eprintln!("✗ Could not re-roll slot {position}: {e}"),
        }
    }

    for position in &args.clear {
        let Some(index) = position.checked_sub(1).filter(|i| *i < Playlist::LEN) else {
            eprintln!("✗ Slot {position} is out of range (1-10), skipping clear");
            continue;
        };
        if state.playlist().entry(index).is_some_and(|e| e.slot.is_no_match()) {
            continue;
        }
        // In range by construction, so this cannot fail.
        let _ = state.clear_slot(index);
    }

    let playlist = state.playlist();

    if !args.quiet {
        print_playlist(playlist);
    }

    print!("{}", export_text(playlist));
    Ok(())
}

/// Parse a "POSITION:TITLE" manual pick and resolve the title within the
/// slot's eligible pool (case-insensitive exact title match).
fn parse_pick(spec: &str, assigner: &SlotAssigner<'_>) -> Result<(usize, TrackRecord), String> {
    let Some((position, title)) = spec.split_once(':') else {
        return Err(format!("Pick '{spec}' is not in POSITION:TITLE form"));
    };
    let position: usize = position
        .trim()
        .parse()
        .map_err(|_| format!("Pick '{spec}' has an invalid position"))?;
    let Some(index) = position.checked_sub(1).filter(|i| *i < Playlist::LEN) else {
        return Err(format!("Pick position {position} is out of range (1-10)"));
    };

    let category = SlotCategory::ALL[index];
    let title = title.trim();
    let wanted = title.to_lowercase();
    let track = assigner
        .release_pool()
        .into_iter()
        .find(|t| t.category == category && t.title.to_lowercase() == wanted)
        .ok_or_else(|| {
            format!("No eligible {} track titled '{title}'", category.body_part())
        })?;
    Ok((index, track.clone()))
}

/// Merge the optional preset file with command-line overrides.
fn build_constraints(args: &Args, catalog: &Catalog) -> Result<Constraints> {
    let mut constraints = match &args.preset_file {
        Some(path) => Constraints::load_from_file(path)?,
        None => Constraints::default(),
    };

    if let Some(release) = &args.earliest_release {
        // Prefer the key as it appears in the catalog so typos are caught.
        constraints.min_release_key = match catalog.release_key_of(release) {
            Some(key) => key,
            None => {
                eprintln!("Warning: release '{release}' not in catalog, parsing it directly.");
                ReleaseKey::parse(release)
            }
        };
    }
    if args.recent_only {
        constraints.recent_only = true;
    }
    if args.exclude_newest {
        constraints.exclude_newest = true;
    }
    if !args.tags.is_empty() {
        constraints.theme_tags = args.tags.clone();
    }
    if !args.difficulty.is_empty() {
        constraints.instructor_tags = args.difficulty.clone();
    }
    if !args.genres.is_empty() {
        constraints.genres = args.genres.clone();
    }

    Ok(constraints)
}

fn print_playlist(playlist: &Playlist) {
    let export = render(playlist);
    println!("\n🕒 Total Duration: {}", format_duration(export.total_secs));

    let fallbacks = playlist.fallback_categories();
    if !fallbacks.is_empty() {
        let names: Vec<&str> = fallbacks.iter().map(|c| c.body_part()).collect();
        println!(
            "⚠️ No themed track found for: {}. A random track of that category was slotted in.",
            names.join(", ")
        );
    }

    for entry in playlist.iter() {
        match &entry.slot {
            TrackSlot::Picked(track) | TrackSlot::Fallback(track) => {
                let marker = if entry.slot.is_fallback() { " (fallback)" } else { "" };
                println!(
                    "  {} - {} — {}{}",
                    entry.category, track.title, track.artist, marker
                );
                let tags_display = if track.tags.is_empty() {
                    String::new()
                } else {
                    let pills: Vec<String> = track
                        .tags
                        .iter()
                        .map(|tag| format!("{} {}", tag_emoji(tag), tag).trim().to_string())
                        .collect();
                    format!(" | {}", pills.join(", "))
                };
                println!(
                    "      Release: {} | Duration: {} | Genre: {}{}",
                    track.release,
                    format_duration(track.duration_secs),
                    track.genre,
                    tags_display
                );
            }
            TrackSlot::NoMatch => {
                println!("  {} - {}", entry.category, NO_MATCH_TITLE);
            }
        }
    }
    println!();
}
