//! Scripted in-memory backend used by the engine tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::EngineError;
use crate::playlist::Track;

use super::resource::{AudioBackend, AudioResource, CompletionCallback};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct ResourceRecord {
    pub title: String,
    pub playing: bool,
    pub released: bool,
}

#[derive(Default)]
pub(super) struct BackendLog {
    pub resources: BTreeMap<u64, ResourceRecord>,
    callbacks: BTreeMap<u64, CompletionCallback>,
    pub registrations: BTreeMap<u64, usize>,
    pub failing: HashSet<String>,
    pub position: Duration,
    pub duration: Duration,
}

impl BackendLog {
    pub fn created(&self) -> usize {
        self.resources.len()
    }

    pub fn live(&self) -> Vec<u64> {
        self.resources
            .iter()
            .filter(|(_, r)| !r.released)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn record(&self, id: u64) -> &ResourceRecord {
        &self.resources[&id]
    }
}

#[derive(Clone, Default)]
pub(super) struct SharedLog(Arc<Mutex<BackendLog>>);

impl SharedLog {
    pub fn lock(&self) -> MutexGuard<'_, BackendLog> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every future `create` for `title` fail.
    pub fn fail(&self, title: &str) {
        self.lock().failing.insert(title.to_string());
    }

    /// Simulate the live resource reaching its end.
    pub fn finish(&self, id: u64) -> bool {
        let callback = self.lock().callbacks.remove(&id);
        match callback {
            Some(cb) => {
                cb();
                true
            }
            None => false,
        }
    }

    pub fn live_one(&self) -> u64 {
        let live = self.lock().live();
        assert_eq!(live.len(), 1, "expected exactly one live resource: {live:?}");
        live[0]
    }
}

pub(super) struct ScriptedBackend {
    log: SharedLog,
    next_id: u64,
}

impl ScriptedBackend {
    pub fn new(log: SharedLog) -> Self {
        Self { log, next_id: 1 }
    }
}

impl AudioBackend for ScriptedBackend {
    type Resource = ScriptedResource;

    fn create(&mut self, track: &Track) -> Result<ScriptedResource, EngineError> {
        let mut log = self.log.lock();
        if log.failing.contains(&track.title) {
            return Err(EngineError::ResourceUnavailable {
                title: track.title.clone(),
                reason: "scripted failure".to_string(),
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        log.resources.insert(
            id,
            ResourceRecord {
                title: track.title.clone(),
                playing: false,
                released: false,
            },
        );
        let duration = log.duration;
        drop(log);

        Ok(ScriptedResource {
            id,
            log: self.log.clone(),
            duration,
        })
    }
}

pub(super) struct ScriptedResource {
    id: u64,
    log: SharedLog,
    duration: Duration,
}

impl ScriptedResource {
    fn set_playing(&self, playing: bool) {
        if let Some(r) = self.log.lock().resources.get_mut(&self.id) {
            r.playing = playing;
        }
    }
}

impl AudioResource for ScriptedResource {
    fn start(&mut self) {
        self.set_playing(true);
    }

    fn pause(&mut self) {
        self.set_playing(false);
    }

    fn stop(&mut self) {
        self.set_playing(false);
    }

    fn release(self) {
        let mut log = self.log.lock();
        log.callbacks.remove(&self.id);
        if let Some(r) = log.resources.get_mut(&self.id) {
            r.released = true;
        }
    }

    fn position(&self) -> Duration {
        self.log.lock().position
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn on_completion(&mut self, callback: CompletionCallback) {
        let mut log = self.log.lock();
        log.callbacks.insert(self.id, callback);
        *log.registrations.entry(self.id).or_default() += 1;
    }
}
