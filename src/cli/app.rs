//! CLI module for the ticklist application
//!
//! This module handles the command-line interface for interacting with the
//! timer and to-do repositories. It is the host "UI": it renders the view
//! sequences the repositories return and owns no timer state of its own.

use log::info;

use crate::{
    format_duration, parse_duration, Commands, FileStore, Result, SystemClock, TimerRepository,
    TimerView, TodoCommands, TodoRecord, TodoRepository,
};

/// CLI application handler - processes commands and interfaces with the
/// repositories
pub struct App {
    /// Timer collection backend
    timers: TimerRepository<FileStore, SystemClock>,

    /// To-do collection backend
    todos: TodoRepository<FileStore>,
}

impl App {
    /// Create a new CLI application over the given repositories
    pub fn new(
        timers: TimerRepository<FileStore, SystemClock>,
        todos: TodoRepository<FileStore>,
    ) -> Self {
        Self { timers, todos }
    }

    /// Run the CLI application with the given command
    pub fn run(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Create => {
                let views = self.timers.create()?;
                // The focus-flagged entry is the one we just created
                if let Some(view) = views.iter().find(|view| view.request_focus) {
                    println!("Created timer '{}' with ID: {}", view.name, view.id);
                }
                self.display_timers(&views)?;
            }

            Commands::List { json } => {
                let views = self.timers.list()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&views)?);
                } else {
                    self.display_timers(&views)?;
                }
            }

            Commands::Start { id } => {
                let views = self.timers.start(&id)?;
                self.display_timers(&views)?;
            }

            Commands::Pause { id } => {
                let views = self.timers.pause(&id)?;
                self.display_timers(&views)?;
            }

            Commands::Reset { id } => {
                let views = self.timers.reset(&id)?;
                self.display_timers(&views)?;
            }

            Commands::Rename { id, name } => {
                let views = self.timers.update_name(&id, &name)?;
                self.display_timers(&views)?;
            }

            Commands::Notes { id, text } => {
                let views = self.timers.update_notes(&id, &text)?;
                self.display_timers(&views)?;
            }

            Commands::Toggle { id } => {
                let views = self.timers.toggle_expanded(&id)?;
                self.display_timers(&views)?;
            }

            Commands::SetTime { id, time } => {
                let seconds = parse_duration(&time)?;
                let views = self.timers.update_duration(&id, seconds)?;
                self.display_timers(&views)?;
            }

            Commands::Swap { index_a, index_b } => {
                let views = self.timers.swap(index_a, index_b)?;
                self.display_timers(&views)?;
            }

            Commands::Delete { id } => {
                let views = self.timers.delete(&id)?;
                info!("Timer {} deleted", id);
                self.display_timers(&views)?;
            }

            Commands::Total => {
                self.timers.list()?;
                println!(
                    "Total: {}",
                    console::style(format_duration(self.timers.total_seconds())).bold()
                );
            }

            Commands::Todo { command } => self.run_todo(command)?,
        }

        Ok(())
    }

    fn run_todo(&mut self, command: TodoCommands) -> Result<()> {
        match command {
            TodoCommands::Add { content } => {
                let records = self.todos.create(content.as_deref())?;
                if let Some(record) = records.last() {
                    println!("Added to-do item with ID: {}", record.id);
                }
                self.display_todos(&records);
            }

            TodoCommands::List { json } => {
                let records = self.todos.list()?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    self.display_todos(&records);
                }
            }

            TodoCommands::Edit { id, content } => {
                let records = self.todos.update_content(&id, &content)?;
                self.display_todos(&records);
            }

            TodoCommands::Reorder { ids } => {
                let records = self.todos.reorder(&ids)?;
                self.display_todos(&records);
            }

            TodoCommands::Done { id } => {
                let records = self.todos.delete(&id)?;
                self.display_todos(&records);
            }
        }

        Ok(())
    }

    /// Render the timer table: position, id, running marker, time, name,
    /// and the notes of any expanded entry.
    fn display_timers(&self, views: &[TimerView]) -> Result<()> {
        if views.is_empty() {
            println!("No timers. Create one with 'ticklist create'.");
            return Ok(());
        }

        let term_width = terminal_size::terminal_size()
            .map(|(width, _)| width.0 as usize)
            .unwrap_or(80);

        for (position, view) in views.iter().enumerate() {
            let marker = if view.is_running { "▶" } else { " " };
            let time = format_duration(view.effective_seconds);
            let time = if view.is_running {
                console::style(time).green()
            } else {
                console::style(time).dim()
            };

            println!(
                "{:>3}  {}  {} {}  {}",
                position,
                view.id,
                marker,
                time,
                console::style(&view.name).bold()
            );

            if view.is_expanded && !view.notes.is_empty() {
                // Width-aware truncation; notes can contain multibyte text
                let max_width = term_width.saturating_sub(7);
                for line in view.notes.lines() {
                    let line = console::truncate_str(line, max_width, "...");
                    println!("       {}", console::style(line).italic());
                }
            }
        }

        println!(
            "Total: {}",
            console::style(format_duration(self.timers.total_seconds())).bold()
        );
        Ok(())
    }

    fn display_todos(&self, records: &[TodoRecord]) {
        if records.is_empty() {
            println!("No to-do items.");
            return;
        }

        for (position, record) in records.iter().enumerate() {
            println!("{:>3}  {}  {}", position, record.id, record.content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use tempfile::TempDir;

    fn test_app(dir: &TempDir) -> App {
        let config = Config::with_data_dir(dir.path().to_path_buf());
        let timers = TimerRepository::new(
            FileStore::new(config.data_dir.clone()).unwrap(),
            SystemClock,
            &config,
        );
        let todos = TodoRepository::new(FileStore::new(config.data_dir.clone()).unwrap(), &config);
        App::new(timers, todos)
    }

    #[test]
    fn test_display_handles_long_multibyte_notes() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        let id = app.timers.create().unwrap()[0].id.clone();
        app.timers.update_notes(&id, &"あ".repeat(100)).unwrap();
        let views = app.timers.toggle_expanded(&id).unwrap();

        // Wider than any terminal; must truncate on a character boundary
        app.display_timers(&views).unwrap();
    }

    #[test]
    fn test_display_handles_multiline_ascii_notes() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        let id = app.timers.create().unwrap()[0].id.clone();
        let notes = format!("short line\n{}", "x".repeat(300));
        app.timers.update_notes(&id, &notes).unwrap();
        let views = app.timers.toggle_expanded(&id).unwrap();

        app.display_timers(&views).unwrap();
    }
}
