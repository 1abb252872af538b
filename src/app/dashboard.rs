//! Dashboard controller shared by the interactive front end.
//!
//! The controller owns all mutable UI state (forecast view + chat slot). Each
//! network request runs on its own worker thread and reports back through a
//! channel; updates are applied in arrival order on the owning thread:
//!
//! - the forecast load is started once, on mount
//! - every ask spawns its own request; overlapping asks are not serialized, so
//!   whichever response arrives last decides the answer

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::data::chat::resolve_answer;
use crate::data::forecast::fetch_forecast;
use crate::data::locator::{RuntimeContext, api_base};
use crate::data::transport::Transport;
use crate::domain::{ChatExchange, ForecastData};
use crate::error::FetchError;
use crate::view::ViewState;

/// Result of a worker, delivered to the owning thread.
#[derive(Debug)]
pub enum Update {
    ForecastSettled {
        api_base: String,
        outcome: Result<ForecastData, FetchError>,
    },
    AnswerResolved {
        request_id: u64,
        answer: String,
    },
}

pub struct Dashboard {
    transport: Arc<dyn Transport>,
    context: RuntimeContext,
    api_url_override: Option<String>,
    view: ViewState,
    chat: ChatExchange,
    next_request_id: u64,
    asks_in_flight: usize,
    loaded_at: Option<DateTime<Local>>,
    tx: Sender<Update>,
    rx: Receiver<Update>,
}

impl Dashboard {
    pub fn new(
        transport: Arc<dyn Transport>,
        context: RuntimeContext,
        api_url_override: Option<String>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            transport,
            context,
            api_url_override,
            view: ViewState::new(),
            chat: ChatExchange::default(),
            next_request_id: 0,
            asks_in_flight: 0,
            loaded_at: None,
            tx,
            rx,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn chat(&self) -> &ChatExchange {
        &self.chat
    }

    pub fn question_mut(&mut self) -> &mut String {
        &mut self.chat.question
    }

    pub fn asks_in_flight(&self) -> usize {
        self.asks_in_flight
    }

    pub fn loaded_at(&self) -> Option<DateTime<Local>> {
        self.loaded_at
    }

    /// Base URL for a request issued now.
    pub fn api_base(&self) -> String {
        api_base(&self.context, self.api_url_override.as_deref())
    }

    /// Start the one forecast load of this session.
    pub fn mount(&mut self) {
        let base = self.api_base();
        self.view.begin_load();

        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let outcome = fetch_forecast(transport.as_ref(), &base);
            let _ = tx.send(Update::ForecastSettled {
                api_base: base,
                outcome,
            });
        });
    }

    /// Send the current question. Returns the id assigned to this ask.
    pub fn ask(&mut self) -> u64 {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.asks_in_flight += 1;

        let base = self.api_base();
        let question = self.chat.question.clone();
        info!(request_id, %base, "ask issued");

        let transport = Arc::clone(&self.transport);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let answer = resolve_answer(transport.as_ref(), &base, &question);
            let _ = tx.send(Update::AnswerResolved { request_id, answer });
        });

        request_id
    }

    pub fn apply(&mut self, update: Update) {
        match update {
            Update::ForecastSettled { api_base, outcome } => {
                self.view.settle_load(outcome, &api_base);
                self.loaded_at = Some(Local::now());
            }
            Update::AnswerResolved { request_id, answer } => {
                self.asks_in_flight = self.asks_in_flight.saturating_sub(1);
                if request_id != self.next_request_id {
                    debug!(request_id, latest = self.next_request_id, "stale answer applied");
                }
                self.chat.answer = answer;
            }
        }
    }

    /// Apply every update that has already arrived. Returns true if any did.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(update) => {
                    self.apply(update);
                    changed = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return changed,
            }
        }
    }

    /// Block until the next update arrives and apply it.
    pub fn wait(&mut self) -> bool {
        match self.rx.recv() {
            Ok(update) => {
                self.apply(update);
                true
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::*;
    use crate::data::locator::PageLocation;
    use crate::data::transport::HttpResponse;
    use crate::data::transport::fake::FixedTransport;
    use crate::error::{BACKEND_START_COMMAND, TransportError};
    use crate::view::RenderState;

    /// Answers `/chat` with `"answer to <question>"`, holding back questions
    /// that have a gate until the test releases it.
    struct GatedChat {
        gates: Mutex<HashMap<String, Receiver<()>>>,
    }

    impl Transport for GatedChat {
        fn get(&self, _url: &str) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse {
                status: 200,
                body: "[]".to_string(),
            })
        }

        fn post_json(&self, _url: &str, body: &Value) -> Result<HttpResponse, TransportError> {
            let question = body["question"].as_str().unwrap_or_default().to_string();
            let gate = self.gates.lock().unwrap().remove(&question);
            if let Some(gate) = gate {
                gate.recv().unwrap();
            }
            Ok(HttpResponse {
                status: 200,
                body: serde_json::json!({ "answer": format!("answer to {question}") }).to_string(),
            })
        }
    }

    fn page_context() -> RuntimeContext {
        RuntimeContext::Page(PageLocation::parse("http://dash.local:3000/").unwrap())
    }

    #[test]
    fn mount_moves_from_loading_to_data() {
        let transport = Arc::new(FixedTransport::respond(
            200,
            r#"{"forecast":[{"ds":"2024-01-01","yhat":10}],"insight":"Sales rising."}"#,
        ));
        let mut dashboard = Dashboard::new(transport.clone(), page_context(), None);
        dashboard.mount();
        assert_eq!(dashboard.view().render(), RenderState::Loading);

        assert!(dashboard.wait());
        assert!(!dashboard.view().loading());
        assert!(dashboard.loaded_at().is_some());
        assert!(matches!(
            dashboard.view().render(),
            RenderState::Data { insight: Some("Sales rising."), .. }
        ));
        assert_eq!(
            transport.requests.lock().unwrap()[0].0,
            "http://dash.local:8000/forecast"
        );
    }

    #[test]
    fn unreachable_backend_error_names_mount_base() {
        let transport = Arc::new(FixedTransport::unreachable());
        let mut dashboard = Dashboard::new(transport, RuntimeContext::Headless, None);
        dashboard.mount();
        dashboard.wait();

        let RenderState::Error(message) = dashboard.view().render() else {
            panic!("expected error state");
        };
        assert!(message.contains("http://localhost:8000"));
        assert!(message.contains(BACKEND_START_COMMAND));
    }

    #[test]
    fn override_is_used_for_asks() {
        let transport = Arc::new(FixedTransport::respond(200, r#"{"answer":"ok"}"#));
        let mut dashboard = Dashboard::new(
            transport.clone(),
            page_context(),
            Some("https://api.example.com/".to_string()),
        );
        dashboard.question_mut().push_str("anything");
        dashboard.ask();
        dashboard.wait();

        assert_eq!(dashboard.chat().answer, "ok");
        assert_eq!(transport.requests.lock().unwrap()[0].0, "https://api.example.com/chat");
    }

    #[test]
    fn overlapping_asks_last_to_resolve_wins() {
        let (release_first, first_gate) = mpsc::channel();
        let transport = Arc::new(GatedChat {
            gates: Mutex::new(HashMap::from([("first".to_string(), first_gate)])),
        });
        let mut dashboard = Dashboard::new(transport, page_context(), None);

        dashboard.question_mut().push_str("first");
        let first_id = dashboard.ask();
        dashboard.question_mut().clear();
        dashboard.question_mut().push_str("second");
        let second_id = dashboard.ask();
        assert!(second_id > first_id);
        assert_eq!(dashboard.asks_in_flight(), 2);

        // The second ask resolves while the first is still held.
        assert!(dashboard.wait());
        assert_eq!(dashboard.chat().answer, "answer to second");
        assert_eq!(dashboard.asks_in_flight(), 1);

        release_first.send(()).unwrap();
        assert!(dashboard.wait());
        assert_eq!(dashboard.chat().answer, "answer to first");
        assert_eq!(dashboard.asks_in_flight(), 0);
    }

    #[test]
    fn ask_can_overlap_the_forecast_load() {
        let transport = Arc::new(FixedTransport::respond(200, r#"{"answer":"fine"}"#));
        let mut dashboard = Dashboard::new(transport, page_context(), None);
        dashboard.mount();
        dashboard.ask();

        dashboard.wait();
        dashboard.wait();
        assert_eq!(dashboard.chat().answer, "fine");
        assert!(!dashboard.view().loading());
        // `{"answer":"fine"}` is an object without `forecast`.
        assert_eq!(dashboard.view().render(), RenderState::Empty);
        assert!(!dashboard.pump());
    }
}
