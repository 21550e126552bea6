//! Terminal rendering of itinerary snapshots

use colored::Colorize;

use crate::domain::{OptimizeResult, Place, PlacesData};
use crate::planner::{Notice, NoticeLevel};
use crate::roles;

fn describe(place: &Place) -> String {
    let mut line = place.name.clone();
    if let Some(kind) = &place.kind {
        line.push_str(&format!(" ({})", kind));
    }
    if let Some(address) = &place.address {
        line.push_str(&format!(" - {}", address).dimmed().to_string());
    }
    line
}

fn badges(data: &PlacesData, place: &Place) -> String {
    let mut out = String::new();
    if roles::is_start(data, place) {
        out.push_str(&format!(" {}", "[start]".bright_green()));
    }
    if roles::is_end(data, place) {
        out.push_str(&format!(" {}", "[end]".bright_red()));
    }
    out
}

/// Numbered place list plus the route the map would draw
pub fn itinerary(data: &PlacesData) -> String {
    let mut out = String::new();
    if data.is_empty() {
        out.push_str(&format!("{}\n", "No places yet. Chat or /find to add some.".dimmed()));
        return out;
    }

    out.push_str(&format!("{}\n", "Places:".bright_cyan()));
    for (i, place) in data.places.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}{}\n", i + 1, describe(place), badges(data, place)));
    }

    if let Some(start) = &data.start {
        out.push_str(&format!("  {:>10} {}\n", "start:".bright_green(), start.name));
    }
    if let Some(end) = &data.end {
        out.push_str(&format!("  {:>10} {}\n", "end:".bright_red(), end.name));
    }

    let route: Vec<&str> = data.route_view().iter().map(|p| p.name.as_str()).collect();
    out.push_str(&format!("  {:>10} {}\n", "route:".dimmed(), route.join(" -> ")));
    if !roles::return_to_start_allowed(data) {
        out.push_str(&format!("  {}\n", "(distinct end point: return to start unavailable)".dimmed()));
    }
    out
}

/// Optimized route with its statistics
pub fn result(result: &OptimizeResult) -> String {
    let mut out = format!("{}\n", "Optimized route:".bright_cyan());
    for (i, place) in result.display_places().iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}\n", i + 1, place.name));
    }
    if let Some(stats) = &result.stats {
        out.push_str(&format!(
            "  distance {}  duration {}  stops {}\n",
            stats.distance_label().bright_white(),
            stats.duration_label().bright_white(),
            stats.stops.map(|n| n.to_string()).unwrap_or_else(|| "N/A".to_string())
        ));
    }
    out.push_str(&format!(
        "  {} to use this order, {} to dismiss\n",
        "/apply".yellow(),
        "/discard".yellow()
    ));
    out
}

pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("{} {}", "✓".bright_green(), notice.message),
        NoticeLevel::Error => format!("{} {}", "✗".red(), notice.message.red()),
    }
}
