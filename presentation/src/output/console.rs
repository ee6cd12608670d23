//! Console output formatter for story segments and snapshots

use colored::Colorize;
use weaver_domain::{ImageRef, StorySegment, StorySnapshot, StoryStatus};

/// Formats story state for console display
pub struct StoryFormatter;

impl StoryFormatter {
    /// One segment: heading, narrative, illustration note
    pub fn format_segment(segment: &StorySegment) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header(&format!(
            "Chapter {}",
            segment.position()
        )));
        output.push('\n');
        output.push_str(segment.text().trim());
        output.push_str("\n\n");
        output.push_str(&format!(
            "{}\n",
            format!("[{}]", Self::image_label(segment.image())).dimmed()
        ));
        output
    }

    /// Numbered choice list
    pub fn format_choices(choices: &[String]) -> String {
        let mut output = format!("\n{}\n", "What happens next?".cyan().bold());
        for (i, choice) in choices.iter().enumerate() {
            output.push_str(&format!("  {} {}\n", format!("{}.", i + 1).yellow().bold(), choice));
        }
        output
    }

    /// Latest segment followed by its choices, as shown after each turn
    pub fn format_turn(snapshot: &StorySnapshot) -> String {
        let mut output = String::new();
        if let Some(segment) = snapshot.latest_segment() {
            output.push_str(&Self::format_segment(segment));
        }
        if !snapshot.choices.is_empty() {
            output.push_str(&Self::format_choices(&snapshot.choices));
        }
        output
    }

    /// The whole story so far
    pub fn format_story(snapshot: &StorySnapshot) -> String {
        if snapshot.history.is_empty() {
            return format!("{}\n", "No story yet.".dimmed());
        }

        let mut output = String::new();
        output.push_str(&Self::header("Your Story"));
        output.push('\n');
        for segment in &snapshot.history {
            output.push_str(&Self::format_segment(segment));
        }
        if !snapshot.choices.is_empty() {
            output.push_str(&Self::format_choices(&snapshot.choices));
        }
        if let Some(error) = &snapshot.error {
            output.push('\n');
            output.push_str(&Self::format_error(error));
        }
        output.push_str(&Self::footer());
        output
    }

    pub fn format_error(message: &str) -> String {
        format!("{} {}\n", "Error:".red().bold(), message)
    }

    /// What the reader can do now, given the current state
    pub fn status_hint(snapshot: &StorySnapshot) -> &'static str {
        match snapshot.status {
            StoryStatus::Idle => "Describe an opening scene, or type /ideas for inspiration.",
            StoryStatus::TurnInFlight => "The story is being written...",
            StoryStatus::AwaitingChoice => "Pick 1-3, or type what happens next.",
            StoryStatus::Errored if snapshot.started => "Type /new to begin a new story.",
            StoryStatus::Errored => "Try another opening scene.",
        }
    }

    /// Format as JSON
    pub fn format_json(snapshot: &StorySnapshot) -> String {
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    /// Short description of an illustration reference
    pub fn image_label(image: &ImageRef) -> String {
        match image.data_mime_type() {
            Some(mime) => {
                let encoded = image
                    .as_str()
                    .split_once(',')
                    .map(|(_, data)| data.len())
                    .unwrap_or(0);
                let kib = (encoded * 3 / 4).div_ceil(1024);
                format!("illustration: {}, {} KiB", mime, kib)
            }
            None => format!("illustration: {}", image),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("── {} ──", title).yellow().bold())
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
