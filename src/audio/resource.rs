//! The audio resource capability the engine drives.
//!
//! A resource renders exactly one track. The engine never decodes or mixes
//! audio itself; it only creates, starts, pauses, stops and releases
//! resources, and reads their position and duration.

use std::time::Duration;

use crate::error::EngineError;
use crate::playlist::Track;

/// Invoked once when a started resource reaches the end of its track.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

pub trait AudioResource {
    fn start(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    /// Free the underlying output. The resource must not fire its completion
    /// callback afterwards.
    fn release(self)
    where
        Self: Sized;
    fn position(&self) -> Duration;
    /// Total length, or `Duration::ZERO` when unknown.
    fn duration(&self) -> Duration;
    /// Register the completion callback, replacing any previous one.
    ///
    /// Registration belongs to this resource instance; a fresh resource starts
    /// with none.
    fn on_completion(&mut self, callback: CompletionCallback);
}

/// Factory for resources bound to tracks.
pub trait AudioBackend {
    type Resource: AudioResource;

    /// Create a loaded but unstarted resource for `track`.
    ///
    /// Fails with [`EngineError::ResourceUnavailable`] when the audio cannot be
    /// opened or decoded.
    fn create(&mut self, track: &Track) -> Result<Self::Resource, EngineError>;
}
