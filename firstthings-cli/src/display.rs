//! Terminal rendering
//!
//! Turns view projections into colored text. Colors for quadrants and list
//! items come from the user's hex values, painted as truecolor.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use colored::*;
use std::fmt::Display;

use firstthings_core::date::format_date_human;
use firstthings_core::list::parse_hex_color;
use firstthings_core::{
    Badge, ListGroup, ListItem, ListKind, ListRegistry, Quadrant, QuadrantGroup, Settings, Task,
    ViewKind, badges,
};

/// Display mode for task lists
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DisplayMode {
    /// Minimal one-line format
    Compact,
    /// Notes and timestamps under each task
    Detailed,
    /// One line with badges
    Default,
}

/// Everything a task line needs besides the task itself
pub struct RenderContext<'a> {
    pub view: ViewKind,
    pub mode: DisplayMode,
    pub categories: &'a ListRegistry,
    pub projects: &'a ListRegistry,
    pub today: NaiveDate,
    pub use_color: bool,
}

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Paint `text` with a `#RRGGBB` color; invalid colors leave it plain
pub fn paint(text: &str, hex: &str, use_color: bool) -> String {
    match parse_hex_color(hex) {
        Ok((r, g, b)) if use_color => text.truecolor(r, g, b).to_string(),
        _ => text.to_string(),
    }
}

/// First eight characters of an id, enough to type back in
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Timestamps as "Mar 15, 2024, 09:30 AM"
pub fn format_timestamp<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%b %d, %Y, %I:%M %p").to_string()
}

pub fn format_badge(badge: &Badge<'_>, today: NaiveDate, use_color: bool) -> String {
    match badge {
        Badge::Due { date, overdue } => {
            let text = format!("({})", format_date_human(*date, today));
            match (use_color, *overdue) {
                (false, _) => text,
                (true, true) => text.red().bold().to_string(),
                (true, false) if *date <= today.succ_opt().unwrap_or(today) => {
                    text.yellow().to_string()
                }
                (true, false) => text,
            }
        }
        Badge::Urgent => colorize("!urgent", use_color, |s| s.red().to_string()),
        Badge::Important => colorize("*important", use_color, |s| s.yellow().to_string()),
        Badge::List { kind, item } => {
            let sigil = match kind {
                ListKind::Category => '@',
                ListKind::Project => '+',
            };
            paint(&format!("{}{}", sigil, item.name), &item.color, use_color)
        }
        Badge::Recurring => colorize("~recurring", use_color, |s| s.cyan().to_string()),
    }
}

fn colorize(text: &str, use_color: bool, style: impl Fn(&str) -> String) -> String {
    if use_color {
        style(text)
    } else {
        text.to_string()
    }
}

/// Format a task for display
pub fn format_task(task: &Task, ctx: &RenderContext<'_>) -> String {
    let checkbox = if task.completed { "[✓]" } else { "[ ]" };

    let title = if ctx.use_color && task.completed {
        task.title.dimmed().strikethrough().to_string()
    } else {
        task.title.clone()
    };

    let id = if ctx.use_color {
        format!("[{}]", short_id(&task.id)).cyan().to_string()
    } else {
        format!("[{}]", short_id(&task.id))
    };

    if ctx.mode == DisplayMode::Compact {
        return format!("{} {} {}", checkbox, id, title);
    }

    let tags: Vec<String> = badges(task, ctx.view, ctx.categories, ctx.projects, ctx.today)
        .iter()
        .map(|b| format_badge(b, ctx.today, ctx.use_color))
        .collect();

    let mut line = format!("{} {} {}", checkbox, id, title);
    if !tags.is_empty() {
        line.push(' ');
        line.push_str(&tags.join(" "));
    }

    if ctx.mode == DisplayMode::Detailed {
        let mut parts = vec![line];
        for note in task.notes.lines() {
            parts.push(format!("    {}", note));
        }
        parts.push(format!(
            "    Created: {}",
            format_timestamp(&task.created_at.with_timezone(&Local))
        ));
        parts.push(format!(
            "    Modified: {}",
            format_timestamp(&task.modified_at.with_timezone(&Local))
        ));
        if let Some(done) = task.completed_at {
            parts.push(format!(
                "    Completed: {}",
                format_timestamp(&done.with_timezone(&Local))
            ));
        }
        return parts.join("\n");
    }

    line
}

pub fn format_quadrant_header(
    quadrant: Quadrant,
    settings: &Settings,
    count: usize,
    use_color: bool,
) -> String {
    let style = settings.style(quadrant);
    let title = format!("{} {} ({})", quadrant, style.label, quadrant.describe());
    let title = paint(&title, &style.color, use_color);
    let title = if use_color { title.bold().to_string() } else { title };
    format!("{} [{}]", title, count)
}

pub fn format_list_header(group: &ListGroup<'_>, use_color: bool) -> String {
    let name = match group.color() {
        Some(color) => paint(group.name(), color, use_color),
        None => group.name().to_string(),
    };
    let name = if use_color { name.bold().to_string() } else { name };
    format!("{} [{}]", name, group.tasks.len())
}

/// Render the four quadrants, empty ones included
pub fn render_quadrants(
    groups: &[QuadrantGroup<'_>],
    settings: &Settings,
    ctx: &RenderContext<'_>,
) -> String {
    let mut out = Vec::new();
    for group in groups {
        out.push(format_quadrant_header(
            group.quadrant,
            settings,
            group.tasks.len(),
            ctx.use_color,
        ));
        if group.tasks.is_empty() {
            out.push("  (empty)".to_string());
        }
        for task in &group.tasks {
            out.push(indent(&format_task(task, ctx)));
        }
        out.push(String::new());
    }
    out.join("\n")
}

pub fn render_list_groups(groups: &[ListGroup<'_>], ctx: &RenderContext<'_>) -> String {
    let mut out = Vec::new();
    for group in groups {
        out.push(format_list_header(group, ctx.use_color));
        for task in &group.tasks {
            out.push(indent(&format_task(task, ctx)));
        }
        out.push(String::new());
    }
    out.join("\n")
}

fn indent(block: &str) -> String {
    block
        .lines()
        .map(|l| format!("  {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One row of `category list` / `project list`
pub fn format_list_item(item: &ListItem, task_count: usize, use_color: bool) -> String {
    let swatch = paint("■", &item.color, use_color);
    let mut line = format!(
        "{} {} [{}] {} ({} tasks)",
        swatch,
        item.name,
        short_id(&item.id),
        item.color,
        task_count
    );

    match (item.start_date, item.end_date) {
        (None, None) => {}
        (start, end) => {
            let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "…".into());
            line.push_str(&format!(" {} → {}", fmt(start), fmt(end)));
        }
    }

    line
}

pub fn format_settings(settings: &Settings, use_color: bool) -> String {
    let mut out: Vec<String> = Quadrant::ALL
        .iter()
        .map(|&q| {
            let style = settings.style(q);
            format!(
                "{}: {} {}",
                q,
                paint(&style.label, &style.color, use_color),
                style.color
            )
        })
        .collect();
    out.push(format!("Theme: {}", settings.theme));
    out.join("\n")
}

/// Format a summary line for task list
pub fn format_summary(total: usize, completed: usize, overdue: usize, use_color: bool) -> String {
    let mut parts = vec![format!("{} total", total)];

    parts.push(colorize(&format!("{} done", completed), use_color, |s| {
        s.green().to_string()
    }));

    if overdue > 0 {
        parts.push(colorize(&format!("{} overdue", overdue), use_color, |s| {
            s.red().to_string()
        }));
    }

    format!("[{}]", parts.join(" | "))
}
