//! The transport state machine.
//!
//! `Engine` owns the session: selected index, transport state, the single
//! audio resource and the single position poller. It is driven from one
//! thread (see `thread.rs`), so every method runs to completion before the
//! next message is looked at.
//!
//! Invariants kept after every public method:
//! - a resource is held iff the state is `Playing` or `Paused`;
//! - a poller runs iff the state is `Playing`;
//! - the selected index is always valid for the playlist.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::EngineError;
use crate::playlist::{Playlist, Track};

use super::command::Command;
use super::poller::Poller;
use super::resource::{AudioBackend, AudioResource};
use super::telemetry::Telemetry;
use super::types::{EngineMsg, TransportState};

struct Session<R> {
    index: usize,
    state: TransportState,
    handle: Option<R>,
    /// Bumped whenever a resource is installed; completion notices carry it.
    generation: u64,
    poller: Option<Poller>,
    position: Duration,
    duration: Duration,
}

impl<R: AudioResource> Session<R> {
    fn new() -> Self {
        Self {
            index: 0,
            state: TransportState::Idle,
            handle: None,
            generation: 0,
            poller: None,
            position: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }

    /// Stop and free the current resource, if any.
    fn release_handle(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
            handle.release();
        }
    }

    fn cancel_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
    }
}

pub(super) struct Engine<B: AudioBackend> {
    playlist: Arc<Playlist>,
    backend: B,
    session: Session<B::Resource>,
    telemetry: Telemetry,
    mailbox: Sender<EngineMsg>,
    poll_interval: Duration,
    torn_down: bool,
}

impl<B: AudioBackend> Engine<B> {
    pub(super) fn new(
        playlist: Arc<Playlist>,
        backend: B,
        telemetry: Telemetry,
        mailbox: Sender<EngineMsg>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            playlist,
            backend,
            session: Session::new(),
            telemetry,
            mailbox,
            poll_interval,
            torn_down: false,
        }
    }

    pub(super) fn apply(&mut self, command: Command) -> Result<(), EngineError> {
        if self.torn_down {
            return Err(EngineError::Shutdown);
        }
        debug!(%command, state = %self.session.state, index = self.session.index, "command");
        match command {
            Command::Play => self.play(),
            Command::Stop => {
                self.stop();
                Ok(())
            }
            Command::Next => self.navigate(Playlist::next),
            Command::Previous => self.navigate(Playlist::previous),
        }
    }

    fn play(&mut self) -> Result<(), EngineError> {
        match self.session.state {
            TransportState::Playing => {
                if let Some(handle) = self.session.handle.as_mut() {
                    handle.pause();
                }
                self.session.cancel_poller();
                self.sample_position();
                self.session.state = TransportState::Paused;
            }
            TransportState::Paused => {
                if let Some(handle) = self.session.handle.as_mut() {
                    handle.start();
                }
                self.session.state = TransportState::Playing;
                self.start_poller();
            }
            TransportState::Idle | TransportState::Stopped => {
                let playlist = Arc::clone(&self.playlist);
                let Some(track) = lookup(&playlist, self.session.index) else {
                    return Ok(());
                };
                let resource = self.backend.create(track)?;
                self.install(resource);
                if let Some(handle) = self.session.handle.as_mut() {
                    handle.start();
                }
                self.session.position = Duration::ZERO;
                self.session.state = TransportState::Playing;
                self.start_poller();
                info!(title = %track.title, index = self.session.index, "playback started");
            }
        }

        self.refresh_track_data();
        self.telemetry.set_position(self.session.position);
        self.telemetry.set_state(self.session.state);
        Ok(())
    }

    fn stop(&mut self) {
        if !self.session.state.holds_resource() {
            return;
        }
        self.session.cancel_poller();
        self.session.release_handle();
        self.session.position = Duration::ZERO;
        self.session.duration = Duration::ZERO;
        self.session.state = TransportState::Stopped;

        self.telemetry.set_position(Duration::ZERO);
        self.telemetry.set_duration(Duration::ZERO);
        self.telemetry.set_state(TransportState::Stopped);
        info!(index = self.session.index, "playback stopped");
    }

    /// Move the selection with `step` and swap the resource to match.
    ///
    /// The replacement is created before anything changes, so a failure
    /// leaves index, state, resource and telemetry untouched. While
    /// Idle/Stopped the new track is only probed for its duration and
    /// released again.
    fn navigate(&mut self, step: fn(&Playlist, usize) -> usize) -> Result<(), EngineError> {
        let playlist = Arc::clone(&self.playlist);
        let target = step(&playlist, self.session.index);
        let Some(track) = lookup(&playlist, target) else {
            return Ok(());
        };
        let mut candidate = self.backend.create(track)?;

        self.session.index = target;
        self.session.position = Duration::ZERO;
        match self.session.state {
            TransportState::Playing | TransportState::Paused => {
                self.install(candidate);
                if self.session.state == TransportState::Playing {
                    if let Some(handle) = self.session.handle.as_mut() {
                        handle.start();
                    }
                }
            }
            TransportState::Idle | TransportState::Stopped => {
                self.session.duration = candidate.duration();
                candidate.stop();
                candidate.release();
            }
        }
        info!(title = %track.title, index = target, state = %self.session.state, "track changed");

        self.refresh_track_data();
        self.telemetry.set_position(Duration::ZERO);
        Ok(())
    }

    /// A resource finished on its own. Behaves like `Next` for the live
    /// resource in any state; notices from released resources are ignored.
    ///
    /// A notice can be queued just before a pause is processed, so Paused
    /// still advances, loading the next track without starting it.
    pub(super) fn on_completed(&mut self, generation: u64) {
        if self.torn_down
            || generation != self.session.generation
            || self.session.handle.is_none()
        {
            debug!(generation, current = self.session.generation, "stale completion ignored");
            return;
        }

        if let Err(e) = self.navigate(Playlist::next) {
            // The finished resource cannot be resumed, so do not pretend to play it.
            warn!(error = %e, "auto-advance failed; stopping");
            self.stop();
        }
    }

    /// Poller wake-up: publish the live position.
    pub(super) fn on_tick(&mut self) {
        if self.session.state != TransportState::Playing {
            return;
        }
        if self.session.handle.is_none() {
            return;
        }
        self.sample_position();
        self.telemetry.set_position(self.session.position);
    }

    /// Release everything. Safe to call any number of times.
    pub(super) fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.session.cancel_poller();
        self.session.release_handle();
        self.session.position = Duration::ZERO;
        if self.session.state.holds_resource() {
            self.session.state = TransportState::Stopped;
            self.telemetry.set_position(Duration::ZERO);
            self.telemetry.set_state(TransportState::Stopped);
        }
        self.torn_down = true;
        info!("engine torn down");
    }

    /// Take ownership of `resource` as the session's handle, releasing the
    /// previous one and subscribing to its completion.
    fn install(&mut self, mut resource: B::Resource) {
        self.session.release_handle();
        self.session.generation += 1;

        let generation = self.session.generation;
        let mailbox = self.mailbox.clone();
        resource.on_completion(Box::new(move || {
            let _ = mailbox.send(EngineMsg::Completed { generation });
        }));

        self.session.duration = resource.duration();
        self.session.handle = Some(resource);
    }

    fn start_poller(&mut self) {
        self.session.cancel_poller();
        self.session.poller = Poller::spawn(self.poll_interval, self.mailbox.clone());
    }

    fn sample_position(&mut self) {
        if let Some(handle) = self.session.handle.as_ref() {
            self.session.position = clamp_position(handle.position(), self.session.duration);
        }
    }

    /// Publish the selected track's title, index and duration.
    fn refresh_track_data(&mut self) {
        if let Some(handle) = self.session.handle.as_ref() {
            self.session.duration = handle.duration();
        }
        let playlist = Arc::clone(&self.playlist);
        if let Some(track) = lookup(&playlist, self.session.index) {
            self.telemetry.set_title(&track.title);
        }
        self.telemetry.set_index(self.session.index);
        self.telemetry.set_duration(self.session.duration);
    }

    #[cfg(test)]
    pub(super) fn state(&self) -> TransportState {
        self.session.state
    }

    #[cfg(test)]
    pub(super) fn index(&self) -> usize {
        self.session.index
    }

    #[cfg(test)]
    pub(super) fn has_handle(&self) -> bool {
        self.session.handle.is_some()
    }

    #[cfg(test)]
    pub(super) fn has_poller(&self) -> bool {
        self.session.poller.is_some()
    }

    #[cfg(test)]
    pub(super) fn generation(&self) -> u64 {
        self.session.generation
    }
}

fn lookup(playlist: &Playlist, index: usize) -> Option<&Track> {
    match playlist.get(index) {
        Ok(track) => Some(track),
        Err(e) => {
            error!(error = %e, "playlist lookup failed");
            debug_assert!(false, "{e}");
            None
        }
    }
}

/// Position never exceeds a known duration.
fn clamp_position(position: Duration, duration: Duration) -> Duration {
    if duration.is_zero() {
        position
    } else {
        position.min(duration)
    }
}
