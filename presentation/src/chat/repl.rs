//! REPL (Read-Eval-Print Loop) for interactive stories

use super::command::{ReplAction, ReplCommand};
use crate::ReplConfig;
use crate::StoryFormatter;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use weaver_application::{StoryOrchestrator, TurnError};
use weaver_domain::{StoryPrompt, StoryStatus};

const HISTORY_CAPACITY: usize = 1000;

/// Interactive story REPL
pub struct StoryRepl {
    orchestrator: Arc<StoryOrchestrator>,
    config: ReplConfig,
}

impl StoryRepl {
    pub fn new(orchestrator: Arc<StoryOrchestrator>) -> Self {
        Self {
            orchestrator,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the interactive REPL, optionally starting with `opening`
    pub async fn run(&self, opening: Option<String>) -> std::io::Result<()> {
        let mut editor = self.editor();

        self.print_welcome();

        if let Some(opening) = opening {
            self.dispatch(ReplAction::Start(opening)).await;
        }

        loop {
            let prompt = self.prompt();
            match editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => {
                    let snapshot = self.orchestrator.snapshot();
                    let action = ReplAction::route(ReplCommand::parse(&line), &snapshot);
                    if !self.dispatch(action).await {
                        break;
                    }
                }
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    return Err(err);
                }
            }
        }

        Ok(())
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = self.config.history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Could not open REPL history: {}", e);
                editor
            }
        }
    }

    fn prompt(&self) -> DefaultPrompt {
        let label = match self.orchestrator.snapshot().status {
            StoryStatus::AwaitingChoice => "choice",
            StoryStatus::Errored => "story (error)",
            StoryStatus::Idle | StoryStatus::TurnInFlight => "scene",
        };
        DefaultPrompt::new(
            DefaultPromptSegment::Basic(label.to_string()),
            DefaultPromptSegment::Empty,
        )
    }

    /// Carry out one action. Returns false when the REPL should exit.
    async fn dispatch(&self, action: ReplAction) -> bool {
        match action {
            ReplAction::Nothing => {}
            ReplAction::Exit => {
                println!("Bye!");
                return false;
            }
            ReplAction::ShowHelp => Self::print_help(),
            ReplAction::ShowIdeas => Self::print_ideas(),
            ReplAction::ShowHistory => {
                print!("{}", StoryFormatter::format_story(&self.orchestrator.snapshot()));
            }
            ReplAction::Reset => {
                self.orchestrator.reset();
                Self::print_cleared();
            }
            ReplAction::Notice(message) => println!("{}", message.yellow()),
            ReplAction::Start(opening) => {
                let turn = self.orchestrator.start(&opening);
                let result = run_turn(&self.orchestrator, turn, ctrl_c()).await;
                self.report(result);
            }
            ReplAction::Choose(choice) => {
                println!("{} {}", ">".magenta().bold(), choice.italic());
                let turn = self.orchestrator.choose(&choice);
                let result = run_turn(&self.orchestrator, turn, ctrl_c()).await;
                self.report(result);
            }
        }
        true
    }

    fn report<T>(&self, result: Result<T, TurnError>) {
        let snapshot = self.orchestrator.snapshot();
        match result {
            Ok(_) => print!("{}", StoryFormatter::format_turn(&snapshot)),
            Err(TurnError::Abandoned) => {
                println!("^C");
                Self::print_cleared();
            }
            Err(TurnError::Rejected(e)) => println!("{}", e.to_string().yellow()),
            Err(e) => {
                let message = snapshot.error.clone().unwrap_or_else(|| e.to_string());
                print!("{}", StoryFormatter::format_error(&message));
                println!("{}", StoryFormatter::status_hint(&snapshot).dimmed());
            }
        }
        println!();
    }

    fn print_cleared() {
        println!("{}", "Story cleared. Describe a new opening scene.".dimmed());
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│                Story Weaver                 │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Craft your own adventure, one choice at a time.");
        println!();
        println!("{}", StoryFormatter::status_hint(&self.orchestrator.snapshot()));
        println!("Type /help for commands.");
        println!();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  <text>           - Opening scene, or your own next move");
        println!("  1, 2, 3          - Pick one of the offered choices");
        println!("  /ideas           - Show opening scene ideas");
        println!("  /idea <n>        - Start from idea n");
        println!("  /history         - Show the story so far");
        println!("  /new, /reset     - Start over");
        println!("  Ctrl-C           - Start over while a turn is loading");
        println!("  /help, /h, /?    - Show this help");
        println!("  /quit, /exit, /q - Exit");
        println!();
    }

    fn print_ideas() {
        println!();
        println!("{}", "Opening scene ideas:".cyan().bold());
        for (i, idea) in StoryPrompt::suggestions().iter().enumerate() {
            println!("  {} {}", format!("{}.", i + 1).yellow().bold(), idea);
        }
        println!();
    }
}

/// Await a turn, resetting the story if `interrupt` fires first.
///
/// After an interrupt the turn is still driven to completion so it can
/// observe the reset and report `TurnError::Abandoned`.
pub(crate) async fn run_turn<T, F, I>(
    orchestrator: &StoryOrchestrator,
    turn: F,
    interrupt: I,
) -> Result<T, TurnError>
where
    F: Future<Output = Result<T, TurnError>>,
    I: Future<Output = ()>,
{
    tokio::pin!(turn);
    tokio::select! {
        biased;
        result = &mut turn => return result,
        () = interrupt => {}
    }

    info!("Turn interrupted, resetting story");
    orchestrator.reset();
    turn.await
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
