//! Command definitions, execution and text rendering.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::SecondsFormat;
use clap::{Subcommand, ValueEnum};
use serde_json::json;

use projscope_core::{
    Classification, ErrorKind, FileRecord, ProjectConfig, ProjectError, ProjectResult,
};
use projscope_inventory::{InventoryReconciler, JsonFileStore, ReconcileReport, TrackedFileStore};
use projscope_scan::ProjectFiles;

const RULE_WIDTH: usize = 50;
const WIDE_RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List all files in the project
    ListFiles {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List all files with modification times and record new or changed files
    ListFilesTime {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List all Java files in the project
    ListJava {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List files with the given extension
    ListExt {
        /// Extension, with or without the leading dot
        extension: String,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List files in a specific directory
    ListDir {
        /// Directory path relative to project root
        directory: String,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Search for files by name pattern
    SearchFiles {
        /// Search pattern (use * for any characters, ? for one character)
        pattern: String,

        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Read the content of a file
    ReadFile {
        /// File path relative to project root
        file_path: String,
    },

    /// Write content to a file (creates or overwrites)
    WriteFile {
        /// File path relative to project root
        file_path: String,

        /// Content to write
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        content: Vec<String>,
    },

    /// Get information about a file
    FileInfo {
        /// File path relative to project root
        file_path: String,
    },

    /// Show the project root directory
    ProjectRoot,

    /// Switch the project root to another directory
    SwitchRoot {
        /// Directory to use as the new root (relative paths resolve against the current root)
        path: PathBuf,
    },

    /// Reset the project root to its default
    ResetRoot,

    /// Show the tracked-file inventory
    Tracked {
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Start an interactive shell (the default)
    Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Command {
    /// What the command was doing, for error messages.
    pub fn action(&self) -> &'static str {
        match self {
            Command::ListFiles { .. } | Command::ListFilesTime { .. } => "listing files",
            Command::ListJava { .. } => "listing Java files",
            Command::ListExt { .. } => "listing files by extension",
            Command::ListDir { .. } => "listing directory",
            Command::SearchFiles { .. } => "searching files",
            Command::ReadFile { .. } => "reading file",
            Command::WriteFile { .. } => "writing file",
            Command::FileInfo { .. } => "getting file info",
            Command::ProjectRoot => "showing project root",
            Command::SwitchRoot { .. } => "switching project root",
            Command::ResetRoot => "resetting project root",
            Command::Tracked { .. } => "reading tracked files",
            Command::Shell => "starting shell",
        }
    }
}

/// A project plus the location of its tracked-file inventory.
pub struct Session {
    project: ProjectFiles,
    store_path: PathBuf,
}

impl Session {
    /// Open a session from startup configuration.
    pub fn open(config: &ProjectConfig) -> ProjectResult<Self> {
        Ok(Self {
            project: ProjectFiles::from_config(config)?,
            store_path: config.store_location(),
        })
    }

    /// The active project root.
    pub fn root(&self) -> PathBuf {
        self.project.root()
    }

    /// Run a command and render its output.
    pub fn execute(&self, command: Command) -> ProjectResult<String> {
        match command {
            Command::ListFiles { format } => {
                let files = self.project.list_all()?;
                Ok(render_paths(&files, format, "files", "No files found."))
            }
            Command::ListFilesTime { format } => self.list_files_time(format),
            Command::ListJava { format } => {
                let files = self.project.list_by_extension("java")?;
                Ok(render_paths(&files, format, "Java files", "No Java files found."))
            }
            Command::ListExt { extension, format } => {
                let files = self.project.list_by_extension(&extension)?;
                let empty = format!("No files found with extension: {extension}");
                Ok(render_paths(&files, format, "files", &empty))
            }
            Command::ListDir { directory, format } => {
                let files = self.project.list_dir(&directory)?;
                let label = format!("files in '{directory}'");
                let empty = format!("No files found in directory: {directory}");
                Ok(render_paths(&files, format, &label, &empty))
            }
            Command::SearchFiles { pattern, format } => {
                let files = self.project.search(&pattern)?;
                let label = format!("files matching '{pattern}'");
                let empty = format!("No files found matching pattern: {pattern}");
                Ok(render_paths(&files, format, &label, &empty))
            }
            Command::ReadFile { file_path } => {
                let content = self.project.read_file(&file_path)?;
                let rule = "─".repeat(RULE_WIDTH);
                Ok(format!("File: {file_path}\n{rule}\n{content}\n{rule}\n"))
            }
            Command::WriteFile { file_path, content } => {
                self.project.write_file(&file_path, &content.join(" "))?;
                Ok(format!("{file_path} successfully updated\n"))
            }
            Command::FileInfo { file_path } => {
                let info = self.project.file_info(&file_path)?;
                Ok(format!(
                    "File: {}\nSize: {} ({} bytes)\nReadable: {}\nWritable: {}\n",
                    info.relative_path,
                    format_size(info.size),
                    info.size,
                    info.readable,
                    info.writable
                ))
            }
            Command::ProjectRoot => {
                let root = self.project.root();
                let mut out = format!("Project root: {}\n", root.display());
                if root != self.project.default_root() {
                    let _ = writeln!(out, "Default root: {}", self.project.default_root().display());
                }
                Ok(out)
            }
            Command::SwitchRoot { path } => {
                let root = self.project.switch_root(&path)?;
                Ok(format!("Project root switched to: {}\n", root.display()))
            }
            Command::ResetRoot => {
                let root = self.project.reset_root();
                Ok(format!("Project root reset to: {}\n", root.display()))
            }
            Command::Tracked { format } => self.tracked(format),
            Command::Shell => Ok("Already in the shell.\n".to_string()),
        }
    }

    /// One store serves every root of the session, keyed by relative path.
    fn open_store(&self) -> ProjectResult<JsonFileStore> {
        let location = self.store_path.display().to_string();
        JsonFileStore::open(&self.store_path).map_err(|e| ProjectError::persistence(location, e))
    }

    fn list_files_time(&self, format: OutputFormat) -> ProjectResult<String> {
        let files = self.project.list_with_time()?;
        let reconciler = InventoryReconciler::new(self.open_store()?);
        let report = reconciler.reconcile(&files);

        match format {
            OutputFormat::Json => {
                let changes: Vec<_> = report.classified().collect();
                let failures: Vec<_> = report
                    .failures()
                    .map(|(path, error)| json!({ "path": path, "error": error.to_string() }))
                    .collect();
                Ok(to_json(&json!({
                    "files": files,
                    "changes": changes,
                    "summary": report.summary(),
                    "failures": failures,
                })))
            }
            OutputFormat::Text => {
                if files.is_empty() {
                    return Ok("No files found.\n".to_string());
                }
                let mut out = String::new();
                let _ = writeln!(out, "Found {} files:", files.len());
                let _ = writeln!(out, "{}", "─".repeat(WIDE_RULE_WIDTH));
                for file in &files {
                    let _ = writeln!(out, "  {:<50} | {}", file.relative_path, format_modified(file));
                }
                render_changes(&mut out, &report);
                Ok(out)
            }
        }
    }

    fn tracked(&self, format: OutputFormat) -> ProjectResult<String> {
        let store = self.open_store()?;
        let location = self.store_path.display().to_string();
        let entries = store
            .entries()
            .map_err(|e| ProjectError::persistence(location, e))?;

        match format {
            OutputFormat::Json => Ok(to_json(&entries)),
            OutputFormat::Text => {
                if entries.is_empty() {
                    return Ok("No tracked files.\n".to_string());
                }
                let mut out = String::new();
                let _ = writeln!(out, "Tracking {} files:", entries.len());
                let _ = writeln!(out, "{}", "─".repeat(WIDE_RULE_WIDTH));
                for entry in &entries {
                    let _ = writeln!(
                        out,
                        "  {:<50} | modified {} | tracked {}",
                        entry.file_path,
                        entry.last_modified_time.to_rfc3339_opts(SecondsFormat::Millis, true),
                        entry.tracked_at.to_rfc3339_opts(SecondsFormat::Millis, true)
                    );
                }
                Ok(out)
            }
        }
    }
}

/// Render an error with a hint specific to its kind.
pub fn render_error(action: &str, error: &ProjectError) -> String {
    let hint = match error.kind() {
        ErrorKind::NotFound => Some("Check the path relative to the project root (see `project-root`)."),
        ErrorKind::NotADirectory => Some("Expected a directory."),
        ErrorKind::NotAFile => Some("Expected a regular file."),
        ErrorKind::Containment => Some("Paths must stay inside the project root."),
        ErrorKind::InvalidPattern => {
            Some("Use * for any run of characters and ? for exactly one character.")
        }
        ErrorKind::Persistence => Some("The tracked-file inventory could not be read or updated."),
        ErrorKind::Io | ErrorKind::InvalidConfig => None,
    };
    match hint {
        Some(hint) => format!("Error {action}: {error}\n  {hint}"),
        None => format!("Error {action}: {error}"),
    }
}

fn render_paths(files: &[String], format: OutputFormat, label: &str, empty: &str) -> String {
    match format {
        OutputFormat::Json => to_json(&files),
        OutputFormat::Text => {
            if files.is_empty() {
                return format!("{empty}\n");
            }
            let mut out = String::new();
            let _ = writeln!(out, "Found {} {label}:", files.len());
            let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
            for file in files {
                let _ = writeln!(out, "  {file}");
            }
            out
        }
    }
}

fn render_changes(out: &mut String, report: &ReconcileReport) {
    for item in report.classified() {
        if item.classification != Classification::Unchanged {
            let _ = writeln!(out, "{}: {}", item.classification, item.path);
        }
    }
    for (path, error) in report.failures() {
        let _ = writeln!(out, "FAILED: {path} ({error})");
    }
    let summary = report.summary();
    if summary.changed() > 0 || summary.failed > 0 {
        let _ = writeln!(
            out,
            "{} new, {} updated, {} unchanged, {} failed",
            summary.new, summary.updated, summary.unchanged, summary.failed
        );
    }
}

fn format_modified(record: &FileRecord) -> String {
    if record.modified_unknown() {
        "unknown".to_string()
    } else {
        record
            .modified_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => format!("{json}\n"),
        Err(e) => format!("{{\"error\": \"{e}\"}}\n"),
    }
}
