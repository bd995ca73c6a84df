//! Three-way readiness gate for the bridge handshake.
//!
//! Content-initiated runtime calls are only meaningful once all three
//! hold: the runtime object is installed in the hosting context, the
//! content frame has finished loading, and the session is initialized.
//! The gate makes the ordering explicit instead of leaving it to timing.

/// Tracks the three conditions of a playable session.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadinessGate {
    api_installed: bool,
    frame_loaded: bool,
    session_initialized: bool,
}

impl ReadinessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// The runtime object has been handed to the content host.
    pub fn mark_api_installed(&mut self) {
        self.api_installed = true;
    }

    /// The content frame finished loading.
    pub fn mark_frame_loaded(&mut self) {
        self.frame_loaded = true;
    }

    /// The session's Initialize handshake succeeded.
    pub fn mark_session_initialized(&mut self) {
        self.session_initialized = true;
    }

    pub fn api_installed(&self) -> bool {
        self.api_installed
    }

    pub fn frame_loaded(&self) -> bool {
        self.frame_loaded
    }

    pub fn session_initialized(&self) -> bool {
        self.session_initialized
    }

    /// All three conditions hold.
    pub fn is_ready(&self) -> bool {
        self.api_installed && self.frame_loaded && self.session_initialized
    }
}
