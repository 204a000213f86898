use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use url::Url;

use crate::backend_readiness::Readiness;

/// Identifies one scheduled readiness retry. Cancelled on teardown so a timer
/// that fires after quit is dropped before it reaches the main thread.
#[derive(Debug, Clone)]
pub(crate) struct RetryToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl RetryToken {
    fn new(id: u64) -> Self {
        Self {
            id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl PartialEq for RetryToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WindowCommand {
    Create { width: f64, height: f64 },
    Load(Url),
    Show,
    Hide,
    ScheduleRetry {
        delay: Duration,
        token: RetryToken,
        probe: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WindowPhase {
    Unopened,
    ShowingSplash,
    ShowingContent,
    Hidden,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CloseDecision {
    HideInstead,
    AllowClose,
}

#[derive(Debug, Clone)]
pub(crate) struct LifecycleSettings {
    pub(crate) splash_url: Url,
    pub(crate) content_url: Url,
    pub(crate) poll_interval: Duration,
    pub(crate) probe_retries: u32,
    pub(crate) width: f64,
    pub(crate) height: f64,
}

#[derive(Debug)]
pub(crate) struct WindowSession {
    visible: bool,
    first_load_done: bool,
    current_url: Option<Url>,
}

impl WindowSession {
    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }
}

#[derive(Debug)]
pub(crate) struct WindowLifecycleController {
    settings: LifecycleSettings,
    session: Option<WindowSession>,
    pending_retry: Option<RetryToken>,
    next_retry_id: u64,
    probe_retries_left: u32,
    terminated: bool,
}

impl WindowLifecycleController {
    pub(crate) fn new(settings: LifecycleSettings) -> Self {
        let probe_retries_left = settings.probe_retries;
        Self {
            settings,
            session: None,
            pending_retry: None,
            next_retry_id: 1,
            probe_retries_left,
            terminated: false,
        }
    }

    pub(crate) fn phase(&self) -> WindowPhase {
        if self.terminated {
            return WindowPhase::Terminated;
        }
        match &self.session {
            None => WindowPhase::Unopened,
            Some(session) if !session.visible => WindowPhase::Hidden,
            Some(session) if session.current_url.as_ref() == Some(&self.settings.content_url) => {
                WindowPhase::ShowingContent
            }
            Some(_) => WindowPhase::ShowingSplash,
        }
    }

    pub(crate) fn session(&self) -> Option<&WindowSession> {
        self.session.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn pending_retry(&self) -> Option<&RetryToken> {
        self.pending_retry.as_ref()
    }

    pub(crate) fn is_terminated(&self) -> bool {
        self.terminated
    }

    fn schedule_retry(&mut self) -> WindowCommand {
        let token = RetryToken::new(self.next_retry_id);
        self.next_retry_id += 1;
        self.pending_retry = Some(token.clone());
        WindowCommand::ScheduleRetry {
            delay: self.settings.poll_interval,
            token,
            probe: self.probe_retries_left > 0,
        }
    }

    /// Creates the window once per run and starts the load sequence.
    /// Repeated calls are no-ops.
    pub(crate) fn open(&mut self) -> Vec<WindowCommand> {
        if self.terminated || self.session.is_some() {
            return Vec::new();
        }

        self.session = Some(WindowSession {
            visible: true,
            first_load_done: false,
            current_url: None,
        });
        let mut commands = vec![WindowCommand::Create {
            width: self.settings.width,
            height: self.settings.height,
        }];
        commands.extend(self.load_content());
        commands
    }

    /// First call shows the splash and schedules one retry; every later call
    /// commits to the backend endpoint.
    fn load_content(&mut self) -> Vec<WindowCommand> {
        let first_load_done = match self.session.as_ref() {
            Some(session) => session.first_load_done,
            None => return Vec::new(),
        };

        if !first_load_done {
            let retry = self.schedule_retry();
            let splash_url = self.settings.splash_url.clone();
            if let Some(session) = self.session.as_mut() {
                session.current_url = Some(splash_url.clone());
                session.first_load_done = true;
            }
            return vec![WindowCommand::Load(splash_url), retry];
        }

        let content_url = self.settings.content_url.clone();
        if let Some(session) = self.session.as_mut() {
            session.current_url = Some(content_url.clone());
        }
        vec![WindowCommand::Load(content_url)]
    }

    pub(crate) fn on_retry_elapsed(&mut self, token_id: u64, readiness: Readiness) -> Vec<WindowCommand> {
        if self.terminated || self.session.is_none() {
            return Vec::new();
        }
        match &self.pending_retry {
            Some(pending) if pending.id() == token_id && !pending.is_cancelled() => {}
            _ => return Vec::new(),
        }
        self.pending_retry = None;

        if readiness == Readiness::Unreachable && self.probe_retries_left > 0 {
            self.probe_retries_left -= 1;
            return vec![self.schedule_retry()];
        }
        self.load_content()
    }

    pub(crate) fn on_close_requested(&mut self) -> (CloseDecision, Vec<WindowCommand>) {
        if self.terminated || self.session.is_none() {
            return (CloseDecision::AllowClose, Vec::new());
        }
        (CloseDecision::HideInstead, self.hide())
    }

    fn hide(&mut self) -> Vec<WindowCommand> {
        match self.session.as_mut() {
            Some(session) if !self.terminated && session.visible => {
                session.visible = false;
                vec![WindowCommand::Hide]
            }
            _ => Vec::new(),
        }
    }

    /// Un-hides the existing window; never reloads or reopens.
    pub(crate) fn on_activate(&mut self) -> Vec<WindowCommand> {
        if self.terminated {
            return Vec::new();
        }
        match self.session.as_mut() {
            Some(session) => {
                session.visible = true;
                vec![WindowCommand::Show]
            }
            None => Vec::new(),
        }
    }

    /// Returns `false` if a quit already happened.
    pub(crate) fn begin_quit(&mut self) -> bool {
        if self.terminated {
            return false;
        }
        self.terminated = true;
        if let Some(pending) = self.pending_retry.take() {
            pending.cancel();
        }
        self.session = None;
        true
    }
}
