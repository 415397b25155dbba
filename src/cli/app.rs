use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use chrono::{Days, Local, Utc};
use log::info;
use shell_words::split;
use tempfile::Builder;

use crate::{
    next_occurrence, parse_day, parse_tags, parse_when, project, week_of, AgendaError, Commands,
    Config, Note, NoteDraft, NoteStore, Reminder, RepeatArg, Result,
};

/// CLI application handler - processes CLI commands and interfaces with the
/// note store and the calendar projection.
pub struct App {
    /// The note store backend
    store: NoteStore,

    /// Application configuration
    config: Config,
}

impl App {
    /// Create a new CLI application with the given store and config
    pub fn new(store: NoteStore, config: Config) -> Self {
        Self { store, config }
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Create {
                title,
                content,
                edit,
                tags,
                file,
                todos,
                remind,
                repeat,
            } => self.create_note(title, content, file, tags, edit, todos, remind, repeat),

            Commands::View { id, json } => self.handle_view(&id, json),

            Commands::List {
                tag,
                search,
                limit,
                json,
                archived,
            } => self.handle_list(tag, search, limit, json, archived),

            Commands::Search { query, limit, json } => self.handle_search(&query, limit, json),

            Commands::Edit {
                id,
                title,
                content,
                edit,
                file,
                add_tags,
                remove_tags,
                remind,
                repeat,
                clear_reminder,
            } => self.handle_edit(
                id,
                title,
                content,
                edit,
                file,
                add_tags,
                remove_tags,
                remind,
                repeat,
                clear_reminder,
            ),

            Commands::Delete { id, force } => self.handle_delete(id, force),

            Commands::Todo {
                id,
                add,
                toggle,
                remove,
            } => self.handle_todo(id, add, toggle, remove),

            Commands::Archive { id } => self.handle_archive(&id, true),

            Commands::Unarchive { id } => self.handle_archive(&id, false),

            Commands::Tags { rename, delete } => self.handle_tags(rename, delete),

            Commands::Calendar { date, json } => self.handle_calendar(date, json),

            Commands::Remind { id } => self.handle_remind(&id),

            Commands::Import { file } => self.handle_import(&file),

            Commands::Export { output } => self.handle_export(output),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn create_note(
        &mut self,
        title: String,
        content: Option<String>,
        file: Option<PathBuf>,
        tags: Option<String>,
        open_editor: bool,
        todos: Vec<String>,
        remind: Option<String>,
        repeat: Option<RepeatArg>,
    ) -> Result<()> {
        let parsed_tags = parse_tags(tags);

        // Get content based on the provided options
        let note_content = match (content, file) {
            (Some(c), _) => c,
            (_, Some(file_path)) => {
                if !file_path.exists() {
                    return Err(AgendaError::FileNotFound {
                        file_path: file_path.display().to_string(),
                    });
                }
                read_to_string(file_path)?
            }
            (None, None) => {
                if open_editor {
                    self.open_editor_for_content(&title)?
                } else {
                    String::new()
                }
            }
        };

        let reminder = build_reminder(remind, repeat)?;

        let note = self.store.add(NoteDraft {
            title,
            content: note_content,
            tags: parsed_tags,
            todos,
            reminder,
        });
        let id = note.id.clone();
        let reminder = note.reminder.clone();

        println!("Note created with ID: {}", id);
        if let Some(reminder) = reminder {
            match next_occurrence(&reminder, Utc::now()) {
                Some(when) => println!("Reminder fires next at {}", when.format("%Y-%m-%d %H:%M")),
                None => println!("Reminder date is in the past; it will not fire."),
            }
        }
        Ok(())
    }

    fn handle_view(&self, id: &str, json: bool) -> Result<()> {
        let note = self.store.get(id).ok_or_else(|| AgendaError::NoteNotFound {
            id: id.to_string(),
        })?;

        if json {
            println!("{}", serde_json::to_string_pretty(note)?);
        } else {
            self.display_notes_text(&[note], true)?;
        }
        Ok(())
    }

    fn handle_list(
        &self,
        tag: Option<String>,
        search: Option<String>,
        limit: usize,
        json: bool,
        archived: bool,
    ) -> Result<()> {
        let mut notes: Vec<&Note> = match (tag, search) {
            // Fuzzy search narrowed to the tagged notes, so a term
            // matches the same notes with or without the tag filter
            (Some(tag), Some(term)) => self.store.search_with_tag(&tag, &term),

            (Some(tag), None) => self.store.notes_with_tag(&tag),

            (None, Some(term)) => self.store.search(&term),

            // No filters: the default view, newest first
            (None, None) => {
                if archived {
                    self.store.notes().iter().collect()
                } else {
                    self.store.active()
                }
            }
        };

        if limit > 0 && notes.len() > limit {
            notes.truncate(limit);
        }

        if json {
            self.display_notes_json(&notes, false)?;
        } else {
            self.display_notes_text(&notes, false)?;
        }
        Ok(())
    }

    fn handle_search(&self, query: &str, limit: usize, json: bool) -> Result<()> {
        let mut results = self.store.search(query);

        let truncated = limit > 0 && results.len() > limit;
        if truncated {
            results.truncate(limit);
        }

        if results.is_empty() {
            println!("No notes found matching query: \"{}\"", query);
            return Ok(());
        }

        if json {
            self.display_notes_json(&results, false)?;
        } else {
            self.display_notes_text(&results, false)?;
        }

        if truncated {
            println!(
                "\nShowing the first {} matching notes. Use --limit to show more.",
                results.len()
            );
        } else {
            println!("\nFound {} matching notes.", results.len());
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_edit(
        &mut self,
        id: String,
        title: Option<String>,
        content: Option<String>,
        open_editor: bool,
        file: Option<PathBuf>,
        add_tags: Option<String>,
        remove_tags: Option<String>,
        remind: Option<String>,
        repeat: Option<RepeatArg>,
        clear_reminder: bool,
    ) -> Result<()> {
        // Check for conflicting options
        if content.is_some() && file.is_some() {
            return Err(AgendaError::ApplicationError {
                message: "Cannot specify both --content and --file options".to_string(),
            });
        }
        if content.is_some() && open_editor {
            return Err(AgendaError::ApplicationError {
                message: "Cannot specify both --content and --edit options".to_string(),
            });
        }
        if file.is_some() && open_editor {
            return Err(AgendaError::ApplicationError {
                message: "Cannot specify both --file and --edit options".to_string(),
            });
        }
        if clear_reminder && (remind.is_some() || repeat.is_some()) {
            return Err(AgendaError::ApplicationError {
                message: "Cannot combine --clear-reminder with --remind/--repeat".to_string(),
            });
        }

        let mut note = self
            .store
            .get(&id)
            .cloned()
            .ok_or(AgendaError::NoteNotFound { id })?;

        if let Some(new_title) = title {
            note.title = new_title;
        }

        if let Some(new_content) = content {
            note.content = new_content;
        } else if let Some(file_path) = file {
            if !file_path.exists() {
                return Err(AgendaError::FileNotFound {
                    file_path: file_path.display().to_string(),
                });
            }
            note.content = read_to_string(file_path)?;
        } else if open_editor {
            note.content = self.open_editor_with_content(&note.title, &note.content)?;
        }

        if let Some(tags_to_add) = add_tags {
            for tag in parse_tags(Some(tags_to_add)) {
                if !note.tags.contains(&tag) {
                    note.tags.push(tag);
                }
            }
        }

        if let Some(tags_to_remove) = remove_tags {
            let remove = parse_tags(Some(tags_to_remove));
            note.tags.retain(|tag| !remove.contains(tag));
        }

        if clear_reminder {
            note.reminder = None;
        } else if remind.is_some() {
            note.reminder = build_reminder(remind, repeat)?;
        } else if let Some(repeat) = repeat {
            // Recurrence change alone keeps the existing anchor
            match &mut note.reminder {
                Some(reminder) => reminder.repeat = Some(repeat.into()),
                None => {
                    return Err(AgendaError::ApplicationError {
                        message: "--repeat needs an existing reminder or --remind".to_string(),
                    })
                }
            }
        }

        let id = note.id.clone();
        self.store.update(note);
        println!("Note {} updated successfully", id);
        Ok(())
    }

    fn handle_delete(&mut self, id: String, force: bool) -> Result<()> {
        let note = match self.store.get(&id) {
            Some(note) => note.clone(),
            None => return Err(AgendaError::NoteNotFound { id }),
        };

        // Show note details and prompt for confirmation (unless forced)
        if !force {
            println!("You are about to delete the following note:");
            println!("ID:      {}", note.id);
            println!("Title:   {}", note.title);
            println!("Tags:    {}", note.tags.join(", "));
            println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M:%S"));

            if !note.content.is_empty() {
                let preview = note.content.lines().take(2).collect::<Vec<_>>().join("\n");
                println!("\nContent preview:");
                println!(
                    "{}{}",
                    preview,
                    if note.content.lines().count() > 2 {
                        "..."
                    } else {
                        ""
                    }
                );
            }

            println!("\nThis action cannot be undone!");
            print!("Are you sure you want to delete this note? [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        self.store.delete(&id);
        println!(
            "Note '{}' ({}) has been permanently deleted.",
            note.title, note.id
        );
        Ok(())
    }

    fn handle_todo(
        &mut self,
        id: String,
        add: Option<String>,
        toggle: Option<String>,
        remove: Option<String>,
    ) -> Result<()> {
        match (add, toggle, remove) {
            (Some(text), None, None) => match self.store.add_todo(&id, text) {
                Some(todo) => {
                    println!("Added todo {} ({})", todo.id, todo.text);
                    Ok(())
                }
                None => Err(AgendaError::NoteNotFound { id }),
            },

            (None, Some(todo_id), None) => {
                if !self.store.toggle_todo(&id, &todo_id) {
                    return Err(AgendaError::ApplicationError {
                        message: format!("No todo {} on note {}", todo_id, id),
                    });
                }
                let done = self
                    .store
                    .get(&id)
                    .and_then(|n| n.todos.iter().find(|t| t.id == todo_id))
                    .map(|t| t.completed)
                    .unwrap_or(false);
                println!(
                    "Todo {} is now {}",
                    todo_id,
                    if done { "completed" } else { "open" }
                );
                Ok(())
            }

            (None, None, Some(todo_id)) => {
                if !self.store.remove_todo(&id, &todo_id) {
                    return Err(AgendaError::ApplicationError {
                        message: format!("No todo {} on note {}", todo_id, id),
                    });
                }
                println!("Removed todo {}", todo_id);
                Ok(())
            }

            _ => Err(AgendaError::ApplicationError {
                message: "Specify exactly one of --add, --toggle or --remove".to_string(),
            }),
        }
    }

    fn handle_archive(&mut self, id: &str, archive: bool) -> Result<()> {
        let changed = if archive {
            self.store.archive(id)
        } else {
            self.store.unarchive(id)
        };

        if !changed {
            return Err(AgendaError::NoteNotFound {
                id: id.to_string(),
            });
        }

        println!(
            "Note {} {}.",
            id,
            if archive { "archived" } else { "unarchived" }
        );
        Ok(())
    }

    fn handle_tags(&mut self, rename: Option<Vec<String>>, delete: Option<String>) -> Result<()> {
        if let Some(pair) = rename {
            // clap guarantees exactly two values
            let (old, new) = (&pair[0], &pair[1]);
            let touched = self.store.rename_tag(old, new);
            println!("Renamed #{} to #{} on {} notes.", old, new, touched);
            return Ok(());
        }

        if let Some(tag) = delete {
            let touched = self.store.remove_tag(&tag);
            println!("Removed #{} from {} notes.", tag, touched);
            return Ok(());
        }

        let tags = self.store.all_tags();
        if tags.is_empty() {
            println!("No tags yet. Tags are collected from your notes.");
            return Ok(());
        }

        for tag in tags {
            let count = self
                .store
                .notes()
                .iter()
                .filter(|n| n.tags.contains(&tag))
                .count();
            println!("{} ({})", console::style(format!("#{}", tag)).cyan(), count);
        }
        Ok(())
    }

    fn handle_calendar(&self, date: Option<String>, json: bool) -> Result<()> {
        let day = match date {
            Some(input) => parse_day(&input)?,
            None => Local::now().date_naive(),
        };

        let (start, end) = week_of(day);
        let days = project(self.store.notes(), start, end);

        if json {
            println!("{}", serde_json::to_string_pretty(&days)?);
            return Ok(());
        }

        println!(
            "Week of {} - {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let today = Local::now().date_naive();
        for offset in 0..7 {
            let day = start + Days::new(offset);
            let header = day.format("%a %Y-%m-%d").to_string();
            if day == today {
                println!("\n{}", console::style(header).red().bold());
            } else {
                println!("\n{}", console::style(header).bold());
            }

            match days.get(&day) {
                Some(notes) => {
                    for note in notes {
                        println!(
                            "  {} {}",
                            note.created_at.format("%H:%M"),
                            console::style(&note.title).bold()
                        );
                    }
                }
                None => println!("  -"),
            }
        }
        Ok(())
    }

    fn handle_remind(&self, id: &str) -> Result<()> {
        let note = self.store.get(id).ok_or_else(|| AgendaError::NoteNotFound {
            id: id.to_string(),
        })?;

        let Some(reminder) = &note.reminder else {
            println!("Note '{}' has no reminder.", note.title);
            return Ok(());
        };

        match next_occurrence(reminder, Utc::now()) {
            Some(when) => {
                let schedule = match reminder.repeat {
                    Some(repeat) => repeat.label().to_lowercase(),
                    None => "one-time".to_string(),
                };
                println!(
                    "Next reminder for '{}': {} ({})",
                    note.title,
                    when.format("%Y-%m-%d %H:%M"),
                    schedule
                );
            }
            None => println!("The reminder for '{}' has already passed.", note.title),
        }
        Ok(())
    }

    fn handle_import(&mut self, file: &Path) -> Result<()> {
        let summary = self.store.import_from(file)?;
        println!(
            "Imported {} notes from {}",
            summary.total,
            summary.source.display()
        );
        if summary.remapped > 0 {
            println!(
                "{} notes were given fresh IDs to avoid collisions.",
                summary.remapped
            );
        }
        Ok(())
    }

    fn handle_export(&self, output: Option<PathBuf>) -> Result<()> {
        let path = output.unwrap_or_else(|| {
            PathBuf::from(format!(
                "agenda-notes-{}.json",
                Local::now().format("%Y-%m-%d")
            ))
        });

        self.store.export_to(&path)?;
        println!(
            "Exported {} notes to {}",
            self.store.notes().len(),
            path.display()
        );
        Ok(())
    }

    /// Display notes in JSON format
    fn display_notes_json(&self, notes: &[&Note], detailed: bool) -> Result<()> {
        if detailed {
            println!("{}", serde_json::to_string_pretty(notes)?);
        } else {
            // Simplified notes with just the identifying fields
            let simplified: Vec<serde_json::Value> = notes
                .iter()
                .map(|note| {
                    serde_json::json!({
                        "id": note.id,
                        "title": note.title,
                        "createdAt": note.created_at,
                        "tags": note.tags,
                        "isArchived": note.is_archived,
                    })
                })
                .collect();

            println!("{}", serde_json::to_string_pretty(&simplified)?);
        }
        Ok(())
    }

    /// Display notes in text format
    fn display_notes_text(&self, notes: &[&Note], detailed: bool) -> Result<()> {
        if notes.is_empty() {
            println!("No notes found matching the criteria.");
            return Ok(());
        }

        // Use terminal width for formatting if available
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(term_width.min(50)));
            }

            let created_at = note.created_at.format("%Y-%m-%d %H:%M");
            println!("ID: {} | Created: {}", note.id, created_at);
            println!("Title: {}", console::style(&note.title).bold());

            if note.is_archived {
                println!("{}", console::style("[ARCHIVED]").dim());
            }

            if !note.tags.is_empty() {
                let tags = note
                    .tags
                    .iter()
                    .map(|tag| format!("#{}", tag))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("Tags: {}", console::style(tags).cyan());
            }

            if let Some(reminder) = &note.reminder {
                let schedule = match reminder.repeat {
                    Some(repeat) => format!(", {}", repeat.label().to_lowercase()),
                    None => String::new(),
                };
                println!(
                    "Reminder: {}{}",
                    reminder.date.format("%Y-%m-%d %H:%M"),
                    schedule
                );
            }

            if !note.todos.is_empty() {
                let done = note.todos.iter().filter(|t| t.completed).count();
                println!("Todos: {}/{} completed", done, note.todos.len());
                if detailed {
                    for todo in &note.todos {
                        let mark = if todo.completed { "x" } else { " " };
                        println!("  [{}] {} ({})", mark, todo.text, todo.id);
                    }
                }
            }

            if detailed {
                if !note.content.is_empty() {
                    println!("\n{}", note.content);
                }
            } else {
                let preview = get_content_preview(&note.content, 100);
                if !preview.is_empty() {
                    println!("\n{}", preview);
                }
            }
        }

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    fn open_editor_for_content(&self, title: &str) -> Result<String> {
        // Create a temporary file with .md extension
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        let editor_cmd = self.config.get_editor_command();

        self.write_editor_template(&temp_path, title)?;

        info!("Opening editor to write note content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(content))
    }

    fn write_editor_template(&self, path: &Path, title: &str) -> Result<()> {
        let mut file = OpenOptions::new().write(true).open(path)?;

        writeln!(file, "# {}", title)?;
        writeln!(file)?;
        writeln!(file, "<!-- ")?;
        writeln!(
            file,
            "Write your note content below. This note supports Markdown format."
        )?;
        writeln!(
            file,
            "Lines that start with <!-- and end with --> are comments and will be ignored."
        )?;
        writeln!(file, "Save and exit the editor when you're done.")?;
        writeln!(file, "-->")?;
        writeln!(file)?;

        Ok(())
    }

    // Helper function to open editor with existing content
    fn open_editor_with_content(&self, title: &str, existing_content: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(".md").tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        {
            let mut file = OpenOptions::new().write(true).open(&temp_path)?;
            writeln!(file, "# {}", title)?;
            writeln!(file, "<!-- Edit your note below this line -->")?;
            writeln!(file, "\n{}", existing_content)?;
        }

        let editor_cmd = self.config.get_editor_command();
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(process_editor_content(content))
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let path_str = file_path.to_string_lossy();

        // Handle shell-like command parsing
        let args = split(editor_cmd).map_err(|e| AgendaError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        if args.is_empty() {
            return Err(AgendaError::EditorError {
                message: "Empty editor command".to_string(),
            });
        }

        // First word is the program name, rest are arguments
        let mut command = Command::new(&args[0]);
        if args.len() > 1 {
            command.args(&args[1..]);
        }
        command.arg(path_str.as_ref());

        let status = command.status()?;
        if !status.success() {
            return Err(AgendaError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }
}

/// Builds the reminder from the CLI arguments, if any.
fn build_reminder(remind: Option<String>, repeat: Option<RepeatArg>) -> Result<Option<Reminder>> {
    match (remind, repeat) {
        (Some(when), repeat) => Ok(Some(Reminder {
            date: parse_when(&when)?,
            repeat: repeat.map(Into::into),
        })),
        (None, Some(_)) => Err(AgendaError::ApplicationError {
            message: "--repeat requires --remind".to_string(),
        }),
        (None, None) => Ok(None),
    }
}

fn process_editor_content(content: String) -> String {
    // Remove HTML comments from content
    content
        .lines()
        .filter(|line| !line.trim_start().starts_with("<!--") && !line.trim_end().ends_with("-->"))
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Generate a content preview for displaying brief notes. Truncation
/// counts characters, not bytes, so multi-byte content never splits.
fn get_content_preview(content: &str, max_len: usize) -> String {
    let first_line = content
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("");

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_preview_takes_the_first_non_empty_line() {
        assert_eq!(get_content_preview("\n\nfirst real line\nmore", 100), "first real line");
        assert_eq!(get_content_preview("", 100), "");
    }

    #[test]
    fn content_preview_truncates_on_character_boundaries() {
        // Long enough in bytes to overrun the limit mid-character if
        // truncation were byte-based
        let line = "€".repeat(40);
        assert_eq!(get_content_preview(&line, 100), line);

        let long = "ağaçlık".repeat(30);
        let preview = get_content_preview(&long, 100);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
        assert!(long.starts_with(preview.trim_end_matches("...")));
    }
}
