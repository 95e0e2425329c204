//! The check-in state machine.
//!
//! [`reduce`] applies one [`Action`] to a [`ScanSession`] and returns the
//! [`Effect`]s the driver must perform. It does no I/O, so every transition
//! can be tested without a reader, a backend or a clock.

use tracing::{debug, warn};

use super::session::{Phase, ScanSession};
use super::{CAMERA_DENIED_MESSAGE, EVENTS_LOAD_ERROR, GENERIC_SCAN_ERROR, NO_EVENT_MESSAGE};
use crate::error::TicketdeskError;
use crate::model::{EventSummary, ScanResponse};

/// Inputs to the state machine: operator commands, reader callbacks and
/// completions of work started by earlier effects.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadTodayEvents,
    /// Today's events, already filtered to the local date.
    EventsLoaded(Vec<EventSummary>),
    EventsFailed(String),
    SelectEvent(String),
    DetailLoaded(EventSummary),
    DetailFailed {
        event_id: String,
        reason: String,
    },
    Start,
    ReaderOpened {
        epoch: u64,
    },
    ReaderDenied {
        epoch: u64,
        reason: String,
    },
    Stop,
    Decoded(String),
    DecodeFailed(String),
    ValidationFinished {
        epoch: u64,
        outcome: ScanOutcome,
    },
    FeedbackElapsed {
        epoch: u64,
    },
    RestartElapsed {
        epoch: u64,
    },
}

/// Work the driver performs on behalf of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchTodayEvents,
    FetchDetail { event_id: String },
    OpenReader { epoch: u64 },
    PauseReader,
    ResumeReader,
    CloseReader,
    Validate {
        epoch: u64,
        code: String,
        event_id: String,
    },
    /// Deliver `FeedbackElapsed` after the feedback interval.
    EndFeedbackLater { epoch: u64 },
    /// Deliver `RestartElapsed` after the restart delay.
    RestartLater { epoch: u64 },
}

/// What came back from a validation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Responded(ScanResponse),
    Failed {
        server_message: Option<String>,
        transport_message: Option<String>,
    },
}

impl ScanOutcome {
    pub fn from_result(result: crate::Result<ScanResponse>) -> Self {
        match result {
            Ok(response) => ScanOutcome::Responded(response),
            Err(err) => ScanOutcome::failed(&err),
        }
    }

    pub fn failed(err: &TicketdeskError) -> Self {
        ScanOutcome::Failed {
            server_message: err.server_message().map(str::to_string),
            transport_message: err.transport_message(),
        }
    }
}

pub fn reduce(session: &mut ScanSession, action: Action) -> Vec<Effect> {
    match action {
        Action::LoadTodayEvents => vec![Effect::FetchTodayEvents],

        Action::EventsLoaded(events) => {
            session.today_events = events;
            let relisted = session.selected_event_id().and_then(|id| {
                session.today_events.iter().find(|e| e.id == id).cloned()
            });
            session.selected_event = relisted.or_else(|| session.today_events.first().cloned());
            match session.selected_event_id() {
                Some(id) => vec![Effect::FetchDetail {
                    event_id: id.to_string(),
                }],
                None => vec![],
            }
        }

        Action::EventsFailed(reason) => {
            warn!(%reason, "failed to load today's events");
            session.last_error = Some(EVENTS_LOAD_ERROR.to_string());
            vec![]
        }

        Action::SelectEvent(event_id) => select_event(session, event_id),

        Action::DetailLoaded(event) => {
            if let Some(listed) = session.today_events.iter_mut().find(|e| e.id == event.id) {
                *listed = event.clone();
            }
            if session.selected_event_id() == Some(event.id.as_str()) {
                session.selected_event = Some(event);
            }
            vec![]
        }

        Action::DetailFailed { event_id, reason } => {
            warn!(%event_id, %reason, "failed to refresh event details, keeping stale stats");
            vec![]
        }

        Action::Start => start(session),

        Action::ReaderOpened { epoch } => {
            if epoch != session.epoch || session.phase != Phase::Idle {
                debug!(epoch, current = session.epoch, "releasing reader opened for a stale session");
                return vec![Effect::CloseReader];
            }
            session.phase = Phase::Scanning;
            session.clear_feedback();
            vec![]
        }

        Action::ReaderDenied { epoch, reason } => {
            if epoch == session.epoch {
                warn!(%reason, "camera unavailable");
                session.phase = Phase::Idle;
                session.last_error = Some(CAMERA_DENIED_MESSAGE.to_string());
            }
            vec![]
        }

        Action::Stop => {
            stop(session);
            vec![Effect::CloseReader]
        }

        Action::Decoded(code) => {
            if session.phase != Phase::Scanning {
                debug!(phase = %session.phase, "decode ignored while not scanning");
                return vec![];
            }
            let Some(event_id) = session.selected_event_id().map(str::to_string) else {
                return vec![];
            };
            session.phase = Phase::Validating;
            session.in_flight = true;
            vec![
                Effect::PauseReader,
                Effect::Validate {
                    epoch: session.epoch,
                    code,
                    event_id,
                },
            ]
        }

        Action::DecodeFailed(reason) => {
            debug!(%reason, "unreadable frame");
            vec![]
        }

        Action::ValidationFinished { epoch, outcome } => {
            if epoch != session.epoch || session.phase != Phase::Validating {
                debug!(epoch, current = session.epoch, "discarding late validation result");
                return vec![];
            }
            session.in_flight = false;
            session.phase = Phase::Feedback;
            let mut effects = Vec::with_capacity(2);
            match outcome {
                ScanOutcome::Responded(response) => {
                    if response.is_redeemed() {
                        if let Some(id) = session.selected_event_id() {
                            effects.push(Effect::FetchDetail {
                                event_id: id.to_string(),
                            });
                        }
                    }
                    session.last_result_message = Some(response.message);
                }
                ScanOutcome::Failed {
                    server_message,
                    transport_message,
                } => {
                    session.last_error = Some(
                        server_message
                            .or(transport_message)
                            .unwrap_or_else(|| GENERIC_SCAN_ERROR.to_string()),
                    );
                }
            }
            effects.push(Effect::EndFeedbackLater { epoch });
            effects
        }

        Action::FeedbackElapsed { epoch } => {
            if epoch != session.epoch || session.phase != Phase::Feedback {
                return vec![];
            }
            session.clear_feedback();
            session.phase = Phase::Scanning;
            vec![Effect::ResumeReader]
        }

        Action::RestartElapsed { epoch } => {
            if epoch != session.epoch || session.phase != Phase::Idle {
                debug!(epoch, current = session.epoch, "skipping superseded restart");
                return vec![];
            }
            start(session)
        }
    }
}

fn start(session: &mut ScanSession) -> Vec<Effect> {
    if session.selected_event.is_none() {
        session.last_error = Some(NO_EVENT_MESSAGE.to_string());
        return vec![];
    }
    if session.phase != Phase::Idle {
        return vec![];
    }
    session.epoch += 1;
    session.clear_feedback();
    vec![Effect::OpenReader {
        epoch: session.epoch,
    }]
}

fn stop(session: &mut ScanSession) {
    session.epoch += 1;
    session.phase = Phase::Idle;
    session.in_flight = false;
    session.clear_feedback();
}

fn select_event(session: &mut ScanSession, event_id: String) -> Vec<Effect> {
    let Some(event) = session.today_events.iter().find(|e| e.id == event_id).cloned() else {
        warn!(%event_id, "ignoring selection of an event not scheduled today");
        return vec![];
    };
    let changed = session.selected_event_id() != Some(event_id.as_str());
    let was_active = session.scanning_active();
    session.selected_event = Some(event);

    let mut effects = Vec::with_capacity(3);
    if changed && was_active {
        stop(session);
        effects.push(Effect::CloseReader);
    }
    effects.push(Effect::FetchDetail { event_id });
    if changed && was_active {
        effects.push(Effect::RestartLater {
            epoch: session.epoch,
        });
    }
    effects
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{TicketStatus, TICKET_SCANNED_MESSAGE};

    fn event(id: &str) -> EventSummary {
        EventSummary {
            id: id.to_string(),
            name: format!("Event {id}"),
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            venue: "Arena".to_string(),
            time: "19:30".to_string(),
            category: None,
            status: None,
            ticket_status: None,
        }
    }

    fn loaded_session() -> ScanSession {
        let mut session = ScanSession::default();
        reduce(&mut session, Action::EventsLoaded(vec![event("e1"), event("e2")]));
        session
    }

    fn scanning_session() -> ScanSession {
        let mut session = loaded_session();
        let effects = reduce(&mut session, Action::Start);
        assert_eq!(effects, vec![Effect::OpenReader { epoch: 1 }]);
        reduce(&mut session, Action::ReaderOpened { epoch: 1 });
        assert_eq!(session.phase, Phase::Scanning);
        session
    }

    fn responded(message: &str) -> ScanOutcome {
        ScanOutcome::Responded(ScanResponse {
            message: message.to_string(),
            success: None,
        })
    }

    fn count_validations(effects: &[Effect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::Validate { .. }))
            .count()
    }

    #[test]
    fn test_first_event_selected_on_load() {
        let mut session = ScanSession::default();
        let effects = reduce(&mut session, Action::EventsLoaded(vec![event("e1"), event("e2")]));
        assert_eq!(session.selected_event_id(), Some("e1"));
        assert_eq!(
            effects,
            vec![Effect::FetchDetail {
                event_id: "e1".to_string()
            }]
        );
    }

    #[test]
    fn test_no_events_today_leaves_selection_empty() {
        let mut session = ScanSession::default();
        let effects = reduce(&mut session, Action::EventsLoaded(vec![]));
        assert!(effects.is_empty());
        assert!(session.selected_event.is_none());
    }

    #[test]
    fn test_start_without_event_never_opens_reader() {
        let mut session = ScanSession::default();
        let effects = reduce(&mut session, Action::Start);
        assert!(effects.is_empty());
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.last_error.as_deref(), Some(NO_EVENT_MESSAGE));
    }

    #[test]
    fn test_camera_denied_stays_idle() {
        let mut session = loaded_session();
        reduce(&mut session, Action::Start);
        let epoch = session.epoch;
        reduce(
            &mut session,
            Action::ReaderDenied {
                epoch,
                reason: "NotAllowedError".to_string(),
            },
        );
        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.last_error.as_deref(), Some(CAMERA_DENIED_MESSAGE));
    }

    #[test]
    fn test_decode_pauses_before_validating() {
        let mut session = scanning_session();
        let effects = reduce(&mut session, Action::Decoded("T-1".to_string()));
        assert_eq!(
            effects,
            vec![
                Effect::PauseReader,
                Effect::Validate {
                    epoch: 1,
                    code: "T-1".to_string(),
                    event_id: "e1".to_string(),
                },
            ]
        );
        assert_eq!(session.phase, Phase::Validating);
        assert!(session.in_flight);
    }

    #[test]
    fn test_rapid_double_scan_validates_once() {
        let mut session = scanning_session();
        let mut effects = reduce(&mut session, Action::Decoded("T-1".to_string()));
        effects.extend(reduce(&mut session, Action::Decoded("T-1".to_string())));
        effects.extend(reduce(&mut session, Action::Decoded("T-2".to_string())));
        assert_eq!(count_validations(&effects), 1);

        reduce(
            &mut session,
            Action::ValidationFinished {
                epoch: 1,
                outcome: responded(TICKET_SCANNED_MESSAGE),
            },
        );
        let during_feedback = reduce(&mut session, Action::Decoded("T-1".to_string()));
        assert_eq!(count_validations(&during_feedback), 0);
    }

    #[test]
    fn test_success_refreshes_stats_once() {
        let mut session = scanning_session();
        reduce(&mut session, Action::Decoded("T-1".to_string()));
        let effects = reduce(
            &mut session,
            Action::ValidationFinished {
                epoch: 1,
                outcome: responded(TICKET_SCANNED_MESSAGE),
            },
        );
        assert_eq!(
            effects,
            vec![
                Effect::FetchDetail {
                    event_id: "e1".to_string()
                },
                Effect::EndFeedbackLater { epoch: 1 },
            ]
        );
        assert_eq!(session.phase, Phase::Feedback);
        assert_eq!(session.last_result_message.as_deref(), Some(TICKET_SCANNED_MESSAGE));
        assert!(!session.in_flight);
    }

    #[test]
    fn test_other_message_shown_without_refresh() {
        let mut session = scanning_session();
        reduce(&mut session, Action::Decoded("T-1".to_string()));
        let effects = reduce(
            &mut session,
            Action::ValidationFinished {
                epoch: 1,
                outcome: responded("Ticket already scanned"),
            },
        );
        assert_eq!(effects, vec![Effect::EndFeedbackLater { epoch: 1 }]);
        assert_eq!(
            session.last_result_message.as_deref(),
            Some("Ticket already scanned")
        );
    }

    #[test]
    fn test_failure_message_fallbacks() {
        let cases = [
            (
                Some("Ticket belongs to another event"),
                Some("Request failed with status 400"),
                "Ticket belongs to another event",
            ),
            (None, Some("Request timed out"), "Request timed out"),
            (None, None, GENERIC_SCAN_ERROR),
        ];
        for (server, transport, expected) in cases {
            let mut session = scanning_session();
            reduce(&mut session, Action::Decoded("T-1".to_string()));
            let effects = reduce(
                &mut session,
                Action::ValidationFinished {
                    epoch: 1,
                    outcome: ScanOutcome::Failed {
                        server_message: server.map(str::to_string),
                        transport_message: transport.map(str::to_string),
                    },
                },
            );
            assert_eq!(effects, vec![Effect::EndFeedbackLater { epoch: 1 }]);
            assert_eq!(session.last_error.as_deref(), Some(expected));
        }
    }

    #[test]
    fn test_feedback_elapsed_resumes_and_clears() {
        let mut session = scanning_session();
        reduce(&mut session, Action::Decoded("T-1".to_string()));
        reduce(
            &mut session,
            Action::ValidationFinished {
                epoch: 1,
                outcome: ScanOutcome::Failed {
                    server_message: None,
                    transport_message: None,
                },
            },
        );
        let effects = reduce(&mut session, Action::FeedbackElapsed { epoch: 1 });
        assert_eq!(effects, vec![Effect::ResumeReader]);
        assert_eq!(session.phase, Phase::Scanning);
        assert!(session.last_error.is_none());
        assert!(session.last_result_message.is_none());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut session = ScanSession::default();
        assert_eq!(reduce(&mut session, Action::Stop), vec![Effect::CloseReader]);
        assert_eq!(reduce(&mut session, Action::Stop), vec![Effect::CloseReader]);
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.last_error.is_none());
    }

    #[test]
    fn test_result_after_stop_is_discarded() {
        let mut session = scanning_session();
        reduce(&mut session, Action::Decoded("T-1".to_string()));
        reduce(&mut session, Action::Stop);
        let effects = reduce(
            &mut session,
            Action::ValidationFinished {
                epoch: 1,
                outcome: responded(TICKET_SCANNED_MESSAGE),
            },
        );
        assert!(effects.is_empty());
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.last_result_message.is_none());
        assert!(!session.in_flight);
    }

    #[test]
    fn test_switching_event_restarts_once() {
        let mut session = scanning_session();
        let effects = reduce(&mut session, Action::SelectEvent("e2".to_string()));
        assert_eq!(
            effects,
            vec![
                Effect::CloseReader,
                Effect::FetchDetail {
                    event_id: "e2".to_string()
                },
                Effect::RestartLater { epoch: 2 },
            ]
        );
        assert_eq!(session.phase, Phase::Idle);

        let effects = reduce(&mut session, Action::RestartElapsed { epoch: 2 });
        assert_eq!(effects, vec![Effect::OpenReader { epoch: 3 }]);
        reduce(&mut session, Action::ReaderOpened { epoch: 3 });

        let effects = reduce(&mut session, Action::Decoded("T-9".to_string()));
        assert!(effects.contains(&Effect::Validate {
            epoch: 3,
            code: "T-9".to_string(),
            event_id: "e2".to_string(),
        }));
    }

    #[test]
    fn test_restart_skipped_after_manual_stop() {
        let mut session = scanning_session();
        reduce(&mut session, Action::SelectEvent("e2".to_string()));
        reduce(&mut session, Action::Stop);
        assert!(reduce(&mut session, Action::RestartElapsed { epoch: 2 }).is_empty());
    }

    #[test]
    fn test_select_while_idle_only_fetches() {
        let mut session = loaded_session();
        let effects = reduce(&mut session, Action::SelectEvent("e2".to_string()));
        assert_eq!(
            effects,
            vec![Effect::FetchDetail {
                event_id: "e2".to_string()
            }]
        );
        assert_eq!(session.selected_event_id(), Some("e2"));
    }

    #[test]
    fn test_select_unknown_event_is_ignored() {
        let mut session = loaded_session();
        assert!(reduce(&mut session, Action::SelectEvent("zzz".to_string())).is_empty());
        assert_eq!(session.selected_event_id(), Some("e1"));
    }

    #[test]
    fn test_detail_refresh_updates_stats() {
        let mut session = loaded_session();
        let mut refreshed = event("e1");
        refreshed.ticket_status = Some(TicketStatus {
            maximum_occupancy: 100,
            total_number_of_players: 60,
            unscanned_tickets: 10,
            successful_payment: 60,
        });
        reduce(&mut session, Action::DetailLoaded(refreshed));
        assert_eq!(session.stats().checked_in, 50);
        assert_eq!(session.stats().progress_percent, 50.0);
        assert!(session.today_events[0].ticket_status.is_some());
    }

    #[test]
    fn test_stale_reader_open_is_released() {
        let mut session = loaded_session();
        reduce(&mut session, Action::Start);
        reduce(&mut session, Action::Stop);
        let effects = reduce(&mut session, Action::ReaderOpened { epoch: 1 });
        assert_eq!(effects, vec![Effect::CloseReader]);
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn test_reload_repoints_selection_at_fresh_entry() {
        let mut session = loaded_session();
        reduce(&mut session, Action::SelectEvent("e2".to_string()));
        let mut moved = event("e2");
        moved.venue = "Stadium".to_string();

        let effects = reduce(&mut session, Action::EventsLoaded(vec![event("e1"), moved]));
        assert_eq!(session.selected_event_id(), Some("e2"));
        assert_eq!(session.selected_event.as_ref().unwrap().venue, "Stadium");
        assert_eq!(
            effects,
            vec![Effect::FetchDetail {
                event_id: "e2".to_string()
            }]
        );
    }

    #[test]
    fn test_decode_failure_changes_nothing() {
        let mut session = scanning_session();
        let before = session.clone();
        let effects = reduce(&mut session, Action::DecodeFailed("no code in frame".to_string()));
        assert!(effects.is_empty());
        assert_eq!(session, before);
        assert_eq!(session.phase, Phase::Scanning);
        assert!(!session.in_flight);
        assert!(session.last_error.is_none());
        assert!(session.last_result_message.is_none());
    }
}
