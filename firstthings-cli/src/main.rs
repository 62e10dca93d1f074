use std::fs;
use std::io::{self, Write};

use chrono::Local;
use clap::Parser;
use tracing::warn;

use firstthings_core::date::today;
use firstthings_core::{
    ListItem, ListKind, Quadrant, QuadrantStyle, Session, TaskDraft, Theme, ViewKind, by_category,
    by_project, by_quadrant, random_color,
};

use crate::cli::{Cli, Commands, ListAction, ListFields, SettingsAction, ThemeArg, ViewArg};
use crate::config::Config;
use crate::display::{
    DisplayMode, RenderContext, format_list_item, format_settings, format_summary,
    render_list_groups, render_quadrants, short_id, supports_color,
};
use crate::error::{CliError, Result};
use crate::storage::JsonFileStorage;

mod cli;
mod config;
mod display;
mod error;
mod logging;
mod resolve;
mod storage;

type AppSession = Session<JsonFileStorage>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = Config::load()?;
    logging::init(&cfg.log_level);

    match run(cli, &cfg) {
        // A stale id is something to tell the user about, not a crash
        Err(e) if e.is_not_found() => {
            warn!(error = %e, "stale reference");
            eprintln!("Warning: {}", e);
            Ok(())
        }
        other => other,
    }
}

fn run(cli: Cli, cfg: &Config) -> Result<()> {
    let mut storage = JsonFileStorage::new(cfg.data_path());

    // Commands that must not go through a loaded session
    match cli.command {
        Commands::Config => return print_config(cfg),
        Commands::Recover { force } => {
            if !storage.backup_exists() {
                return Err(CliError::storage("No backup file found"));
            }

            if !force && !confirm("Restore data from backup? Current data will be replaced.")? {
                println!("Cancelled.");
                return Ok(());
            }

            let recovered = storage.recover()?;
            recovered.save_to(&mut storage)?;
            println!(
                "Recovered {} tasks from backup into {}.",
                recovered.len(),
                storage.path().display()
            );
            return Ok(());
        }
        _ => {}
    }

    let mut session = Session::open(storage);

    match cli.command {
        Commands::Add {
            title,
            urgent,
            important,
            quadrant,
            notes,
            category,
            project,
            due,
            recurring,
        } => {
            let store = session.store();
            let mut draft = TaskDraft::new(title.join(" "))
                .with_flags(urgent, important)
                .with_recurring(recurring)
                .with_category(resolve::reference(store, ListKind::Category, category.as_deref(), "")?)
                .with_project(resolve::reference(store, ListKind::Project, project.as_deref(), "")?)
                .with_due_date(resolve::date(due.as_deref(), None)?);
            if let Some(q) = quadrant {
                draft = draft.with_quadrant(Quadrant::try_from(q)?);
            }
            if let Some(notes) = notes {
                draft = draft.with_notes(notes);
            }

            let task = session.create_task(draft)?;
            let label = &session.store().settings().style(task.quadrant()).label;
            println!(
                "Task added to {} {}: {} [{}]",
                task.quadrant(),
                label,
                task.title,
                short_id(&task.id)
            );
        }

        Commands::Edit {
            id,
            title,
            notes,
            urgent,
            important,
            category,
            project,
            due,
            recurring,
        } => {
            let nothing_given = title.is_none()
                && notes.is_none()
                && urgent.is_none()
                && important.is_none()
                && category.is_none()
                && project.is_none()
                && due.is_none()
                && recurring.is_none();
            if nothing_given {
                return Err(CliError::validation(
                    "edit",
                    "At least one field to change must be provided",
                ));
            }

            let store = session.store();
            let id = resolve::task_id(store, &id)?;
            let current = store.task_or_err(&id)?;

            let mut draft = TaskDraft::from_task(current);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(notes) = notes {
                draft.notes = notes;
            }
            draft.urgent = urgent.unwrap_or(draft.urgent);
            draft.important = important.unwrap_or(draft.important);
            draft.recurring = recurring.unwrap_or(draft.recurring);
            draft.category =
                resolve::reference(store, ListKind::Category, category.as_deref(), &current.category)?;
            draft.project =
                resolve::reference(store, ListKind::Project, project.as_deref(), &current.project)?;
            draft.due_date = resolve::date(due.as_deref(), current.due_date)?;

            let task = session.update_task(&id, draft)?;
            println!("Updated task [{}]: {}", short_id(&task.id), task.title);
        }

        Commands::Done { id } => {
            let id = resolve::task_id(session.store(), &id)?;
            let task = session.toggle_complete(&id)?;
            let status = if task.completed { "done" } else { "open" };
            println!("Marked task [{}] as {}: {}", short_id(&task.id), status, task.title);
        }

        Commands::Remove { id, force } => {
            let id = resolve::task_id(session.store(), &id)?;
            let title = session.store().task_or_err(&id)?.title.clone();

            if !force && !confirm(&format!("Remove '{}'?", title))? {
                println!("Cancelled.");
                return Ok(());
            }

            match session.delete_task(&id)? {
                Some(task) => println!("Removed: {}", task.title),
                None => println!("Task was already removed."),
            }
        }

        Commands::Move { id, quadrant } => {
            let quadrant = Quadrant::try_from(quadrant)?;
            let id = resolve::task_id(session.store(), &id)?;
            let task = session.move_task(&id, quadrant)?;
            let label = &session.store().settings().style(quadrant).label;
            println!("Moved '{}' to {} {}", task.title, quadrant, label);
        }

        Commands::Show {
            view,
            compact,
            detailed,
            no_color,
        } => show(&session, cfg, view, compact, detailed, no_color),

        Commands::Category { action } => list_command(&mut session, cfg, ListKind::Category, action)?,
        Commands::Project { action } => list_command(&mut session, cfg, ListKind::Project, action)?,

        Commands::Settings { action } => settings_command(&mut session, cfg, action)?,

        Commands::Export { path } => {
            let path = path.unwrap_or_else(|| {
                format!("firstthingsfirst-export-{}.json", Local::now().format("%Y-%m-%d"))
            });
            let json = session.export_json()?;
            fs::write(&path, json).map_err(|e| CliError::io(format!("writing {}", path), e))?;
            println!("Exported {} tasks to {}", session.store().len(), path);
        }

        Commands::Import { path, force } => {
            let json = fs::read_to_string(&path)
                .map_err(|e| CliError::io(format!("reading {}", path), e))?;

            if !force && !confirm("Replace all current data with the imported file?")? {
                println!("Cancelled.");
                return Ok(());
            }

            let summary = session.import_json(&json)?;
            println!(
                "Imported {} tasks, {} categories, {} projects{}.",
                summary.tasks,
                summary.categories,
                summary.projects,
                if summary.settings_replaced { " and settings" } else { "" }
            );
        }

        Commands::Clear { force } => {
            if !force && !confirm("Delete ALL tasks, categories, projects and settings?")? {
                println!("Cancelled.");
                return Ok(());
            }

            session.clear_all()?;
            println!("All data cleared.");
        }

        Commands::Config | Commands::Recover { .. } => {}
    }

    Ok(())
}

fn use_color(cfg: &Config, no_color: bool) -> bool {
    cfg.color && !no_color && supports_color()
}

fn show(session: &AppSession, cfg: &Config, view: ViewArg, compact: bool, detailed: bool, no_color: bool) {
    let store = session.store();
    if store.is_empty() {
        println!("No tasks yet. Add one with `ftf add`.");
        return;
    }

    let mode = if compact {
        DisplayMode::Compact
    } else if detailed {
        DisplayMode::Detailed
    } else {
        DisplayMode::Default
    };

    let view = match view {
        ViewArg::Quadrant => ViewKind::Quadrant,
        ViewArg::Category => ViewKind::Category,
        ViewArg::Project => ViewKind::Project,
    };

    let today = today();
    let ctx = RenderContext {
        view,
        mode,
        categories: store.categories(),
        projects: store.projects(),
        today,
        use_color: use_color(cfg, no_color),
    };

    let body = match view {
        ViewKind::Quadrant => render_quadrants(&by_quadrant(store.tasks()), store.settings(), &ctx),
        ViewKind::Category => render_list_groups(&by_category(store.tasks(), store.categories()), &ctx),
        ViewKind::Project => render_list_groups(&by_project(store.tasks(), store.projects()), &ctx),
    };
    println!("{}", body);

    println!(
        "{}",
        format_summary(
            store.len(),
            store.count_completed(),
            store.count_overdue(today),
            ctx.use_color
        )
    );
}

fn plural(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Category => "categories",
        ListKind::Project => "projects",
    }
}

/// Apply color/date arguments on top of an item
fn apply_fields(mut item: ListItem, fields: ListFields) -> Result<ListItem> {
    if let Some(color) = fields.color {
        item.color = color;
    }
    item.start_date = resolve::date(fields.start.as_deref(), item.start_date)?;
    item.end_date = resolve::date(fields.end.as_deref(), item.end_date)?;
    Ok(item)
}

fn list_command(session: &mut AppSession, cfg: &Config, kind: ListKind, action: ListAction) -> Result<()> {
    match action {
        ListAction::Add { name, fields } => {
            // Items created without --color get a random one
            let item = apply_fields(ListItem::create(name.join(" "), random_color()), fields)?;
            let item = session.create_list_item(kind, item)?;
            println!("{} added: {} [{}]", kind, item.name, short_id(&item.id));
        }

        ListAction::Edit { item, name, fields } => {
            let mut item = resolve::list_item(session.store(), kind, &item)?;
            if let Some(name) = name {
                item.name = name;
            }
            let item = session.update_list_item(kind, apply_fields(item, fields)?)?;
            println!("{} updated: {}", kind, item.name);
        }

        ListAction::Remove { item, force } => {
            let item = resolve::list_item(session.store(), kind, &item)?;
            let used_by = resolve::usage_count(session.store(), kind, &item.id);

            let prompt = format!(
                "Remove {} '{}'? It will be cleared from {} task(s).",
                kind.as_str(),
                item.name,
                used_by
            );
            if !force && !confirm(&prompt)? {
                println!("Cancelled.");
                return Ok(());
            }

            match session.delete_list_item(kind, &item.id)? {
                Some((removed, cleared)) => {
                    println!("Removed {} '{}' (cleared from {} tasks)", kind.as_str(), removed.name, cleared)
                }
                None => println!("{} was already removed.", kind),
            }
        }

        ListAction::Move { item, before } => {
            let moved = resolve::list_item(session.store(), kind, &item)?;
            let target = resolve::list_item(session.store(), kind, &before)?;

            if session.reorder_list_items(kind, &moved.id, &target.id)? {
                println!("Moved '{}' before '{}'", moved.name, target.name);
            } else {
                println!("Nothing to move.");
            }
        }

        ListAction::List { no_color } => {
            let store = session.store();
            let registry = store.registry(kind);
            if registry.is_empty() {
                println!("No {} yet.", plural(kind));
                return Ok(());
            }

            let use_color = use_color(cfg, no_color);
            for item in registry {
                let count = resolve::usage_count(store, kind, &item.id);
                println!("{}", format_list_item(item, count, use_color));
            }
        }
    }

    Ok(())
}

fn settings_command(session: &mut AppSession, cfg: &Config, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show { no_color } => {
            println!("{}", format_settings(session.store().settings(), use_color(cfg, no_color)));
        }

        SettingsAction::Set {
            quadrant,
            label,
            color,
        } => {
            if label.is_none() && color.is_none() {
                return Err(CliError::validation(
                    "settings",
                    "At least one of --label or --color must be provided",
                ));
            }

            let quadrant = Quadrant::try_from(quadrant)?;
            let current = session.store().settings().style(quadrant);
            let style = QuadrantStyle::new(
                color.unwrap_or_else(|| current.color.clone()),
                label.unwrap_or_else(|| current.label.clone()),
            );
            session.set_quadrant_style(quadrant, style)?;
            println!("Updated {}", quadrant);
        }

        SettingsAction::Reset { force } => {
            if !force && !confirm("Restore default quadrant labels and colors?")? {
                println!("Cancelled.");
                return Ok(());
            }
            session.reset_settings()?;
            println!("Settings reset.");
        }

        SettingsAction::Theme { theme } => {
            let theme = match theme {
                ThemeArg::Toggle => session.toggle_theme()?,
                ThemeArg::Dark => {
                    session.set_theme(Theme::Dark)?;
                    Theme::Dark
                }
                ThemeArg::Light => {
                    session.set_theme(Theme::Light)?;
                    Theme::Light
                }
            };
            println!("Theme: {}", theme);
        }
    }

    Ok(())
}

fn print_config(cfg: &Config) -> Result<()> {
    println!("Config file: {}", Config::path()?.display());
    println!("Data file:   {}", cfg.data_path().display());
    println!("Log level:   {} (override with {})", cfg.log_level, logging::LOG_ENV);
    println!("Color:       {}", cfg.color);
    Ok(())
}

/// Ask user for confirmation
fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
