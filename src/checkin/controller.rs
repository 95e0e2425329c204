use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

use super::backend::CheckinBackend;
use super::reducer::{reduce, Action, Effect, ScanOutcome};
use super::session::ScanSession;
use crate::config::Config;
use crate::dashboard::events_on;
use crate::error::{Result, TicketdeskError};
use crate::reader::{CodeReader, DecodeSink, ReaderGuard};

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Drives one check-in screen: runs [`reduce`] and performs the effects it
/// asks for against the backend, the code reader and the clock.
///
/// The controller owns the reader exclusively. Create it with
/// [`CheckinController::new`], spawn [`CheckinController::run`], and operate
/// it through the returned [`CheckinHandle`]. When every handle is dropped the
/// loop ends and the reader is released.
pub struct CheckinController<B, R> {
    backend: Arc<B>,
    reader: R,
    guard: Option<ReaderGuard>,
    session: ScanSession,
    actions: mpsc::WeakUnboundedSender<Action>,
    inbox: mpsc::UnboundedReceiver<Action>,
    state: watch::Sender<ScanSession>,
    request_timeout: Duration,
    feedback_interval: Duration,
    restart_delay: Duration,
    today: fn() -> NaiveDate,
}

impl<B, R> CheckinController<B, R>
where
    B: CheckinBackend + 'static,
    R: CodeReader,
{
    pub fn new(backend: Arc<B>, reader: R, config: &Config) -> (Self, CheckinHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let (state, state_rx) = watch::channel(ScanSession::default());
        let controller = Self {
            backend,
            reader,
            guard: None,
            session: ScanSession::default(),
            actions: tx.downgrade(),
            inbox,
            state,
            request_timeout: config.request_timeout,
            feedback_interval: config.feedback_interval,
            restart_delay: config.restart_delay,
            today: local_today,
        };
        let handle = CheckinHandle {
            tx,
            state: state_rx,
        };
        (controller, handle)
    }

    /// Override the source of "today" used to filter events.
    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Process actions until every [`CheckinHandle`] is gone.
    #[instrument(skip(self))]
    pub async fn run(mut self) {
        while let Some(action) = self.inbox.recv().await {
            self.dispatch(action).await;
        }
        debug!("all handles dropped, tearing down check-in session");
        drop(self.guard.take());
    }

    async fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            for effect in reduce(&mut self.session, action) {
                if let Some(follow_up) = self.perform(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
        self.state.send_replace(self.session.clone());
    }

    /// Perform one effect. Reader effects run inline; requests and timers are
    /// spawned and report back through the inbox.
    async fn perform(&mut self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::FetchTodayEvents => {
                let backend = Arc::clone(&self.backend);
                let today = (self.today)();
                let work = async move {
                    let events = backend.list_events().await?;
                    Ok::<_, TicketdeskError>(events_on(&events, today))
                };
                self.spawn(self.request_timeout, work, move |result| match result {
                    Ok(events) => {
                        info!(count = events.len(), %today, "loaded today's events");
                        Action::EventsLoaded(events)
                    }
                    Err(e) => Action::EventsFailed(e.to_string()),
                });
                None
            }

            Effect::FetchDetail { event_id } => {
                let backend = Arc::clone(&self.backend);
                let id = event_id.clone();
                let work = async move { backend.event_detail(&id).await };
                self.spawn(self.request_timeout, work, move |result| match result {
                    Ok(event) => Action::DetailLoaded(event),
                    Err(e) => Action::DetailFailed {
                        event_id,
                        reason: e.to_string(),
                    },
                });
                None
            }

            Effect::OpenReader { epoch } => {
                // Release any previous session before acquiring the device again.
                self.guard = None;
                let sink = DecodeSink::new(self.actions.clone());
                match self.reader.open(sink).await {
                    Ok(control) => {
                        info!(epoch, "code reader opened");
                        self.guard = Some(ReaderGuard::new(control));
                        Some(Action::ReaderOpened { epoch })
                    }
                    Err(e) => Some(Action::ReaderDenied {
                        epoch,
                        reason: e.to_string(),
                    }),
                }
            }

            Effect::PauseReader => {
                if let Some(guard) = self.guard.as_mut() {
                    guard.pause();
                }
                None
            }

            Effect::ResumeReader => {
                if let Some(guard) = self.guard.as_mut() {
                    guard.resume();
                }
                None
            }

            Effect::CloseReader => {
                if self.guard.take().is_some() {
                    info!("code reader stopped");
                }
                None
            }

            Effect::Validate {
                epoch,
                code,
                event_id,
            } => {
                debug!(epoch, %event_id, "validating ticket");
                let backend = Arc::clone(&self.backend);
                let work = async move { backend.validate_ticket(&code, &event_id).await };
                self.spawn(self.request_timeout, work, move |result| {
                    Action::ValidationFinished {
                        epoch,
                        outcome: ScanOutcome::from_result(result),
                    }
                });
                None
            }

            Effect::EndFeedbackLater { epoch } => {
                self.schedule(self.feedback_interval, Action::FeedbackElapsed { epoch });
                None
            }

            Effect::RestartLater { epoch } => {
                self.schedule(self.restart_delay, Action::RestartElapsed { epoch });
                None
            }
        }
    }

    /// Run `work` with a bounded timeout and feed its mapped result back in.
    fn spawn<T, F, M>(&self, limit: Duration, work: F, into_action: M)
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
        M: FnOnce(Result<T>) -> Action + Send + 'static,
    {
        let Some(tx) = self.actions.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            let result = match timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => Err(TicketdeskError::Timeout(limit)),
            };
            if let Err(e) = &result {
                warn!(error = %e, "check-in request failed");
            }
            // The session may be gone; its late results are simply dropped.
            let _ = tx.send(into_action(result));
        });
    }

    fn schedule(&self, after: Duration, action: Action) {
        let Some(tx) = self.actions.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            sleep(after).await;
            let _ = tx.send(action);
        });
    }
}

/// Cloneable command side of a running [`CheckinController`].
#[derive(Clone)]
pub struct CheckinHandle {
    tx: mpsc::UnboundedSender<Action>,
    state: watch::Receiver<ScanSession>,
}

impl CheckinHandle {
    /// Fetch all events and keep today's. Selects the first one if nothing is selected.
    pub fn load_today_events(&self) -> Result<()> {
        self.send(Action::LoadTodayEvents)
    }

    /// Bind the scanner to another of today's events.
    pub fn select_event(&self, event_id: &str) -> Result<()> {
        if !self.state.borrow().is_today(event_id) {
            return Err(TicketdeskError::UnknownEvent(event_id.to_string()));
        }
        self.send(Action::SelectEvent(event_id.to_string()))
    }

    /// Open the reader and begin scanning.
    ///
    /// Without a selected event the reader is not opened and the session's
    /// `last_error` explains why. The `NoEventSelected` return is judged from
    /// the last published snapshot, which may lag a selection still queued in
    /// the controller; `last_error` on later snapshots is authoritative.
    pub fn start(&self) -> Result<()> {
        let has_event = self.state.borrow().selected_event.is_some();
        self.send(Action::Start)?;
        if has_event {
            Ok(())
        } else {
            Err(TicketdeskError::NoEventSelected)
        }
    }

    /// Release the reader and return to idle. Safe to call at any time.
    pub fn stop(&self) -> Result<()> {
        self.send(Action::Stop)
    }

    /// The latest published session state.
    pub fn snapshot(&self) -> ScanSession {
        self.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ScanSession> {
        self.state.clone()
    }

    fn send(&self, action: Action) -> Result<()> {
        self.tx
            .send(action)
            .map_err(|_| TicketdeskError::SessionClosed)
    }
}
