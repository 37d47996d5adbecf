//! Connection tracking
//!
//! One peer at a time. Whether notifications are attempted is a function
//! of the current state only.

/// Link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No peer; nothing is published
    #[default]
    Disconnected,
    /// A peer is connected and may subscribe
    Connected,
}

/// Events from the radio stack that change the link state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    PeerConnected,
    PeerDisconnected,
}

impl LinkState {
    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        match event {
            LinkEvent::PeerConnected => LinkState::Connected,
            LinkEvent::PeerDisconnected => LinkState::Disconnected,
        }
    }
}

/// Tracks whether a peer is connected
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    state: LinkState,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current state
    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Apply an event
    ///
    /// Returns the new state if it changed, `None` for a repeated event
    /// such as a second connect while already connected.
    pub fn handle(&mut self, event: LinkEvent) -> Option<LinkState> {
        let next = self.state.transition(event);
        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_disconnected() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.state(), LinkState::Disconnected);
        assert!(!tracker.is_connected());
    }

    #[test]
    fn test_connect_disconnect_edges() {
        let mut tracker = ConnectionTracker::new();
        assert_eq!(
            tracker.handle(LinkEvent::PeerConnected),
            Some(LinkState::Connected)
        );
        assert!(tracker.is_connected());
        assert_eq!(
            tracker.handle(LinkEvent::PeerDisconnected),
            Some(LinkState::Disconnected)
        );
        assert!(!tracker.is_connected());
    }

    #[test]
    fn test_second_connect_is_noop() {
        let mut tracker = ConnectionTracker::new();
        tracker.handle(LinkEvent::PeerConnected);
        assert_eq!(tracker.handle(LinkEvent::PeerConnected), None);
        assert!(tracker.is_connected());
    }

    #[test]
    fn test_disconnect_while_disconnected_is_noop() {
        let mut tracker = ConnectionTracker::new();
        assert_eq!(tracker.handle(LinkEvent::PeerDisconnected), None);
    }
}
