//! Scripted provider doubles shared by the use-case tests.

use crate::ports::story_gateway::{
    GatewayError, IllustrationGateway, NarrativeGateway, NarrativeSession, SessionBrief,
};
use crate::ports::story_observer::{StoryEvent, StoryObserver};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use weaver_domain::ImageRef;

type Script = Arc<Mutex<VecDeque<Result<String, GatewayError>>>>;

/// A well-formed story reply
pub(crate) fn reply(story: &str, choices: [&str; 3]) -> Result<String, GatewayError> {
    Ok(serde_json::json!({ "story": story, "choices": choices }).to_string())
}

/// Narrator session that pops replies from a shared script
pub(crate) struct ScriptedSession {
    script: Script,
    received: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSession {
    pub(crate) fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(replies.into())),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl NarrativeSession for ScriptedSession {
    async fn advance(&mut self, text: &str) -> Result<String, GatewayError> {
        self.received.lock().unwrap().push(text.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Other("script exhausted".to_string())))
    }
}

/// Narrator gateway whose sessions all read from one script
pub(crate) struct ScriptedNarrator {
    script: Script,
    received: Arc<Mutex<Vec<String>>>,
    briefs: Mutex<Vec<SessionBrief>>,
    sessions_created: AtomicUsize,
    create_error: Mutex<Option<GatewayError>>,
}

impl ScriptedNarrator {
    pub(crate) fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(replies.into())),
            received: Arc::new(Mutex::new(Vec::new())),
            briefs: Mutex::new(Vec::new()),
            sessions_created: AtomicUsize::new(0),
            create_error: Mutex::new(None),
        }
    }

    /// Fail the next `create_session` call
    pub(crate) fn fail_next_create(&self, error: GatewayError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }

    /// Every message sent into any session, in order
    pub(crate) fn received(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }

    pub(crate) fn briefs(&self) -> Vec<SessionBrief> {
        self.briefs.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrativeGateway for ScriptedNarrator {
    async fn create_session(
        &self,
        brief: &SessionBrief,
    ) -> Result<Box<dyn NarrativeSession>, GatewayError> {
        if let Some(error) = self.create_error.lock().unwrap().take() {
            return Err(error);
        }
        self.sessions_created.fetch_add(1, Ordering::SeqCst);
        self.briefs.lock().unwrap().push(brief.clone());
        Ok(Box::new(ScriptedSession {
            script: Arc::clone(&self.script),
            received: Arc::clone(&self.received),
        }))
    }
}

/// Illustrator that answers `img1`, `img2`, ... unless told to fail
pub(crate) struct ScriptedIllustrator {
    failures: Mutex<VecDeque<Option<GatewayError>>>,
    always_fail: Option<GatewayError>,
    prompts: Mutex<Vec<String>>,
    rendered: AtomicUsize,
}

impl ScriptedIllustrator {
    pub(crate) fn new() -> Self {
        Self {
            failures: Mutex::new(VecDeque::new()),
            always_fail: None,
            prompts: Mutex::new(Vec::new()),
            rendered: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(error: GatewayError) -> Self {
        Self {
            always_fail: Some(error),
            ..Self::new()
        }
    }

    /// Per-call plan: `None` succeeds, `Some(error)` fails. Calls past the
    /// end of the plan succeed.
    pub(crate) fn with_plan(plan: Vec<Option<GatewayError>>) -> Self {
        Self {
            failures: Mutex::new(plan.into()),
            ..Self::new()
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl IllustrationGateway for ScriptedIllustrator {
    async fn render_image(&self, prompt: &str) -> Result<ImageRef, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(error) = &self.always_fail {
            return Err(error.clone());
        }
        if let Some(Some(error)) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let n = self.rendered.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ImageRef::new(format!("img{}", n)))
    }
}

/// Narrator whose replies wait until the test releases them
pub(crate) struct GatedNarrator {
    pub(crate) entered: Arc<Notify>,
    pub(crate) release: Arc<Notify>,
    reply: Result<String, GatewayError>,
}

impl GatedNarrator {
    pub(crate) fn new(reply: Result<String, GatewayError>) -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            reply,
        }
    }
}

struct GatedSession {
    entered: Arc<Notify>,
    release: Arc<Notify>,
    reply: Result<String, GatewayError>,
}

#[async_trait]
impl NarrativeSession for GatedSession {
    async fn advance(&mut self, _text: &str) -> Result<String, GatewayError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.reply.clone()
    }
}

#[async_trait]
impl NarrativeGateway for GatedNarrator {
    async fn create_session(
        &self,
        _brief: &SessionBrief,
    ) -> Result<Box<dyn NarrativeSession>, GatewayError> {
        Ok(Box::new(GatedSession {
            entered: Arc::clone(&self.entered),
            release: Arc::clone(&self.release),
            reply: self.reply.clone(),
        }))
    }
}

/// Observer that keeps every event
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<StoryEvent>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<StoryEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StoryObserver for RecordingObserver {
    fn on_event(&self, event: &StoryEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
