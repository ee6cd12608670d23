//! REPL input parsing and routing

use weaver_domain::{CHOICE_COUNT, StoryPrompt, StorySnapshot, StoryStatus};

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Quit,
    Help,
    /// List the built-in opening suggestions
    Ideas,
    /// Start from suggestion `n` (1-based)
    Idea(usize),
    /// Start over (`/reset` or `/new`)
    Reset,
    /// Re-render the whole story
    History,
    /// Pick offered choice `n` (1-based)
    Pick(usize),
    /// Free text: an opening scene or a custom next turn
    Text(String),
    /// A slash command that did not parse
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }

        if let Some(rest) = line.strip_prefix('/') {
            let mut words = rest.split_whitespace();
            let name = words.next().unwrap_or_default();
            let arg = words.next();
            return match (name, arg) {
                ("quit" | "exit" | "q", None) => ReplCommand::Quit,
                ("help" | "h" | "?", None) => ReplCommand::Help,
                ("ideas", None) => ReplCommand::Ideas,
                ("idea", Some(n)) => match n.parse() {
                    Ok(n) if (1..=StoryPrompt::suggestions().len()).contains(&n) => {
                        ReplCommand::Idea(n)
                    }
                    _ => ReplCommand::Invalid(format!(
                        "/idea takes a number from 1 to {}",
                        StoryPrompt::suggestions().len()
                    )),
                },
                ("reset" | "new", None) => ReplCommand::Reset,
                ("history", None) => ReplCommand::History,
                _ => ReplCommand::Invalid(format!("Unknown command: {}", line)),
            };
        }

        match line.parse::<usize>() {
            Ok(n) if (1..=CHOICE_COUNT).contains(&n) => ReplCommand::Pick(n),
            _ => ReplCommand::Text(line.to_string()),
        }
    }
}

/// What the REPL should do with a command in the current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    Nothing,
    Exit,
    ShowHelp,
    ShowIdeas,
    ShowHistory,
    Reset,
    Start(String),
    Choose(String),
    /// Tell the reader something without changing state
    Notice(String),
}

impl ReplAction {
    /// Decide the action for `command` given the current snapshot.
    ///
    /// Text is an opening scene while no story is running and the next turn
    /// while a choice is awaited. After a failed choice only `/new` moves on.
    pub fn route(command: ReplCommand, snapshot: &StorySnapshot) -> Self {
        let can_start = match snapshot.status {
            StoryStatus::Idle => true,
            StoryStatus::Errored => !snapshot.started,
            StoryStatus::TurnInFlight | StoryStatus::AwaitingChoice => false,
        };

        match command {
            ReplCommand::Empty => ReplAction::Nothing,
            ReplCommand::Quit => ReplAction::Exit,
            ReplCommand::Help => ReplAction::ShowHelp,
            ReplCommand::Ideas => ReplAction::ShowIdeas,
            ReplCommand::History => ReplAction::ShowHistory,
            ReplCommand::Reset => ReplAction::Reset,
            ReplCommand::Invalid(message) => ReplAction::Notice(message),
            ReplCommand::Idea(n) if can_start => StoryPrompt::suggestions()
                .get(n - 1)
                .map(|idea| ReplAction::Start(idea.to_string()))
                .unwrap_or(ReplAction::Nothing),
            ReplCommand::Idea(_) => {
                ReplAction::Notice("A story is already running. Type /new to start over.".into())
            }
            ReplCommand::Pick(n) if snapshot.status == StoryStatus::AwaitingChoice => snapshot
                .choices
                .get(n - 1)
                .map(|choice| ReplAction::Choose(choice.clone()))
                .unwrap_or(ReplAction::Nothing),
            ReplCommand::Pick(n) => Self::route(ReplCommand::Text(n.to_string()), snapshot),
            ReplCommand::Text(text) if snapshot.status == StoryStatus::AwaitingChoice => {
                ReplAction::Choose(text)
            }
            ReplCommand::Text(text) if can_start => ReplAction::Start(text),
            ReplCommand::Text(_) => {
                ReplAction::Notice("This story cannot continue. Type /new to begin a new story.".into())
            }
        }
    }
}
