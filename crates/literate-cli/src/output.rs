//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use literate_domain::{MergeSummary, NarrativeObject, ObjectCollection};
use literate_scheduler::{CollectionSnapshot, RequestState, SchedulerEvent};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a collection.
    pub fn format_objects(&self, objects: &ObjectCollection) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(objects)?),
            OutputFormat::Table => Ok(self.format_objects_table(objects)),
            OutputFormat::Quiet => Ok(objects.names().join("\n")),
        }
    }

    /// Format a full snapshot, including request state and counters.
    pub fn format_snapshot(&self, snapshot: &CollectionSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(snapshot)?),
            _ => Ok(format!(
                "{}\n{}",
                self.format_objects(&snapshot.objects)?,
                self.status(&snapshot.request)
            )),
        }
    }

    fn format_objects_table(&self, objects: &ObjectCollection) -> String {
        if objects.is_empty() {
            return self.colorize("No objects yet.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Name", "Description", "Relationships"]);

        for (index, object) in objects.iter().enumerate() {
            builder.push_record([
                (index + 1).to_string(),
                object.name().to_string(),
                object.description.clone(),
                relationships_cell(object),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// One-line description of a merge.
    pub fn format_summary(&self, summary: &MergeSummary) -> String {
        if summary.is_noop() {
            return "no changes".to_string();
        }

        let mut parts = Vec::new();
        if !summary.added.is_empty() {
            parts.push(self.colorize(&format!("+ {}", summary.added.join(", ")), "green"));
        }
        if !summary.updated.is_empty() {
            parts.push(self.colorize(&format!("~ {}", summary.updated.join(", ")), "cyan"));
        }
        if !summary.removed.is_empty() {
            parts.push(self.colorize(&format!("- {}", summary.removed.join(", ")), "red"));
        }
        if !summary.retained.is_empty() {
            parts.push(self.colorize(
                &format!("? {} (kept)", summary.retained.join(", ")),
                "magenta",
            ));
        }
        parts.join("  ")
    }

    /// Status line for a scheduler event, if it is worth showing.
    pub fn format_event(&self, event: &SchedulerEvent) -> Option<String> {
        match event {
            SchedulerEvent::RequestIssued { .. } | SchedulerEvent::DuplicateSkipped => None,
            SchedulerEvent::Applied { summary, .. } => {
                Some(self.success(&format!("Updated: {}", self.format_summary(summary))))
            }
            SchedulerEvent::Corrected {
                target, summary, ..
            } => {
                if summary.is_noop() {
                    Some(self.warning(&format!("No correction found for '{}'", target)))
                } else {
                    Some(self.success(&format!(
                        "Corrected '{}': {}",
                        target,
                        self.format_summary(summary)
                    )))
                }
            }
            SchedulerEvent::Error { kind, message, .. } => Some(self.error(&format!(
                "Extraction failed ({}): {}. Use :retry to try again.",
                kind, message
            ))),
        }
    }

    /// Short status for the request pipeline.
    pub fn status(&self, request: &RequestState) -> String {
        let label = request.label();
        match label {
            "extracting" => self.colorize(label, "blue"),
            "waiting" => self.colorize(label, "yellow"),
            "error" => self.colorize(label, "red"),
            _ => self.colorize(label, "green"),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn relationships_cell(object: &NarrativeObject) -> String {
    object
        .relationships
        .iter()
        .map(|r| format!("{} ({})", r.target, r.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use literate_domain::{reconcile, ExtractedObject, ExtractionResult};

    fn collection() -> ObjectCollection {
        let result = ExtractionResult::new(vec![
            ExtractedObject::new("Alice", "A curious girl").with_relationship("Bob", "friend"),
            ExtractedObject::new("Bob", "The baker"),
        ]);
        reconcile(&ObjectCollection::new(), &result, 1_000).collection
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_objects(&collection()).unwrap();
        assert!(output.contains("Name"));
        assert!(output.contains("A curious girl"));
        assert!(output.contains("Bob (friend)"));
    }

    #[test]
    fn test_json_format_keeps_display_order() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_objects(&collection()).unwrap();
        let alice = output.find("Alice").unwrap();
        let baker = output.find("The baker").unwrap();
        assert!(alice < baker);
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_objects(&collection()).unwrap();
        assert_eq!(output, "Alice\nBob");
    }

    #[test]
    fn test_empty_collection() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_objects(&ObjectCollection::new()).unwrap();
        assert!(output.contains("No objects yet"));
    }

    #[test]
    fn test_summary_line() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let summary = MergeSummary {
            added: vec!["Charlie".into()],
            removed: vec!["Dora".into()],
            ..Default::default()
        };
        assert_eq!(formatter.format_summary(&summary), "+ Charlie  - Dora");
        assert_eq!(formatter.format_summary(&MergeSummary::default()), "no changes");
    }

    #[test]
    fn test_quiet_events_are_hidden() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter
            .format_event(&SchedulerEvent::RequestIssued { sequence: 1 })
            .is_none());
        assert!(formatter.format_event(&SchedulerEvent::DuplicateSkipped).is_none());
    }

    #[test]
    fn test_error_event_mentions_retry() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let line = formatter
            .format_event(&SchedulerEvent::Error {
                kind: literate_domain::ErrorKind::Transport,
                message: "connection refused".into(),
                sequence: 3,
            })
            .unwrap();
        assert!(line.starts_with("✗"));
        assert!(line.contains("transport"));
        assert!(line.contains(":retry"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.status(&RequestState::default()), "idle");
    }
}
