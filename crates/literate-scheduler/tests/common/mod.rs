//! Shared test fixtures for scheduler integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use literate_domain::{ExtractedObject, ExtractionClient, ExtractionError, ExtractionResult};
use literate_scheduler::SchedulerEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

type Reply = Result<ExtractionResult, ExtractionError>;

/// Extraction client with canned replies keyed by text fragment
///
/// The first rule whose fragment occurs in the text wins; each rule can
/// delay its reply to force completions out of order.
#[derive(Default)]
pub struct ScriptedClient {
    rules: Mutex<Vec<(String, Duration, Reply)>>,
    corrections: Mutex<Vec<(String, Duration, Option<ExtractedObject>)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, fragment: &str, objects: Vec<ExtractedObject>) -> Self {
        self.reply_after(fragment, Duration::ZERO, objects)
    }

    pub fn reply_after(self, fragment: &str, delay: Duration, objects: Vec<ExtractedObject>) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((fragment.to_string(), delay, Ok(ExtractionResult::new(objects))));
        self
    }

    pub fn fail(self, fragment: &str, error: ExtractionError) -> Self {
        self.fail_after(fragment, Duration::ZERO, error)
    }

    pub fn fail_after(self, fragment: &str, delay: Duration, error: ExtractionError) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((fragment.to_string(), delay, Err(error)));
        self
    }

    pub fn correction(self, name: &str, replacement: Option<ExtractedObject>) -> Self {
        self.correction_after(name, Duration::ZERO, replacement)
    }

    pub fn correction_after(
        self,
        name: &str,
        delay: Duration,
        replacement: Option<ExtractedObject>,
    ) -> Self {
        self.corrections
            .lock()
            .unwrap()
            .push((name.to_string(), delay, replacement));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionClient for ScriptedClient {
    async fn extract(&self, text: &str) -> Result<ExtractionResult, ExtractionError> {
        self.calls.lock().unwrap().push(text.to_string());

        let rule = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _, _)| text.contains(fragment.as_str()))
            .map(|(_, delay, reply)| (*delay, reply.clone()));

        match rule {
            Some((delay, reply)) => {
                tokio::time::sleep(delay).await;
                reply
            }
            None => Ok(ExtractionResult::empty()),
        }
    }

    async fn correct(
        &self,
        name: &str,
        _text: &str,
    ) -> Result<Option<ExtractedObject>, ExtractionError> {
        let rule = self
            .corrections
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, delay, replacement)| (*delay, replacement.clone()));

        match rule {
            Some((delay, replacement)) => {
                tokio::time::sleep(delay).await;
                Ok(replacement)
            }
            None => Ok(None),
        }
    }

    async fn is_available(&self) -> bool {
        true
    }
}

/// Monotonic fake clock: 1, 2, 3, ...
pub fn ticking_clock() -> (Arc<AtomicU64>, impl Fn() -> u64 + Send + Sync + 'static) {
    let counter = Arc::new(AtomicU64::new(0));
    let shared = Arc::clone(&counter);
    (counter, move || shared.fetch_add(1, Ordering::SeqCst) + 1)
}

pub fn object(name: &str, description: &str) -> ExtractedObject {
    ExtractedObject::new(name, description)
}

/// Receive events until one matches, returning everything seen
pub async fn events_until(
    events: &mut mpsc::UnboundedReceiver<SchedulerEvent>,
    mut done: impl FnMut(&SchedulerEvent) -> bool,
) -> Vec<SchedulerEvent> {
    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        let stop = done(&event);
        seen.push(event);
        if stop {
            break;
        }
    }
    seen
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
