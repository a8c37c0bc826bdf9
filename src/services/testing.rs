//! In-memory list source for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::DayKey;
use crate::services::ListSource;

/// Serves canned payloads per day. Unknown days answer HTTP 404.
#[derive(Default)]
pub struct ScriptedSource {
    payloads: HashMap<DayKey, String>,
    failures: HashMap<DayKey, (usize, u16)>,
    panics: HashSet<DayKey>,
    calls: Mutex<HashMap<DayKey, usize>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `domains` for `day`, ranked in the given order.
    pub fn with_list(self, day: DayKey, domains: &[&str]) -> Self {
        let payload: String = domains
            .iter()
            .enumerate()
            .map(|(i, d)| format!("{},{}\n", i + 1, d))
            .collect();
        self.with_payload(day, &payload)
    }

    pub fn with_payload(mut self, day: DayKey, payload: &str) -> Self {
        self.payloads.insert(day, payload.to_string());
        self
    }

    /// Answer the first `times` calls for `day` with HTTP `status`.
    pub fn failing_first(mut self, day: DayKey, times: usize, status: u16) -> Self {
        self.failures.insert(day, (times, status));
        self
    }

    pub fn panicking(mut self, day: DayKey) -> Self {
        self.panics.insert(day);
        self
    }

    pub fn calls(&self, day: DayKey) -> usize {
        self.calls.lock().unwrap().get(&day).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ListSource for ScriptedSource {
    async fn fetch_raw(&self, day: DayKey) -> Result<String> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(day).or_insert(0);
            *n += 1;
            *n
        };

        if self.panics.contains(&day) {
            panic!("scripted panic for {day}");
        }

        if let Some(&(times, status)) = self.failures.get(&day) {
            if call <= times {
                return Err(AppError::HttpStatus {
                    url: format!("scripted://{day}"),
                    status,
                });
            }
        }

        self.payloads
            .get(&day)
            .cloned()
            .ok_or_else(|| AppError::HttpStatus {
                url: format!("scripted://{day}"),
                status: 404,
            })
    }
}
