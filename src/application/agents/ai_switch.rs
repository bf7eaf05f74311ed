use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared on/off switch for the polling loop, flipped over HTTP
#[derive(Debug, Clone, Default)]
pub struct AiSwitch(Arc<AtomicBool>);

impl AiSwitch {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sets the switch and returns the previous state
    pub fn set(&self, enabled: bool) -> bool {
        self.0.swap(enabled, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let switch = AiSwitch::default();
        let handle = switch.clone();
        assert!(!switch.is_enabled());

        assert!(!handle.set(true));
        assert!(switch.is_enabled());
        assert!(switch.set(false));
        assert!(!handle.is_enabled());
    }
}
