//! Graded toggle resolution shared by likes, comment likes and feedback steam.
//!
//! A reaction row carries a level (likes always use 1). Pressing the same
//! level again withdraws the reaction, a different level replaces it. The
//! denormalised counter on the target moves by [`ToggleOutcome::counter_delta`].

use serde::Serialize;

/// Result of pressing a reaction button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ToggleOutcome {
    /// No reaction existed; one was inserted.
    Added { level: i16 },
    /// The same level was pressed again; the reaction was removed.
    Removed { previous: i16 },
    /// A different level was pressed; the reaction was updated.
    Changed { from: i16, to: i16 },
}

impl ToggleOutcome {
    /// How much the target's counter moves.
    #[must_use]
    pub fn counter_delta(self) -> i32 {
        match self {
            Self::Added { level } => i32::from(level),
            Self::Removed { previous } => -i32::from(previous),
            Self::Changed { from, to } => i32::from(to) - i32::from(from),
        }
    }

    /// The level held after the toggle, if any.
    #[must_use]
    pub const fn current_level(self) -> Option<i16> {
        match self {
            Self::Added { level } | Self::Changed { to: level, .. } => Some(level),
            Self::Removed { .. } => None,
        }
    }

    /// Whether a reaction exists after the toggle.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.current_level().is_some()
    }
}

/// Decide what pressing `requested` does given the stored level.
#[must_use]
pub const fn resolve_toggle(existing: Option<i16>, requested: i16) -> ToggleOutcome {
    match existing {
        None => ToggleOutcome::Added { level: requested },
        Some(previous) if previous == requested => ToggleOutcome::Removed { previous },
        Some(from) => ToggleOutcome::Changed {
            from,
            to: requested,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_when_absent() {
        let outcome = resolve_toggle(None, 1);
        assert_eq!(outcome, ToggleOutcome::Added { level: 1 });
        assert_eq!(outcome.counter_delta(), 1);
        assert!(outcome.is_active());
    }

    #[test]
    fn test_same_level_removes() {
        let outcome = resolve_toggle(Some(3), 3);
        assert_eq!(outcome, ToggleOutcome::Removed { previous: 3 });
        assert_eq!(outcome.counter_delta(), -3);
        assert_eq!(outcome.current_level(), None);
    }

    #[test]
    fn test_different_level_changes() {
        let up = resolve_toggle(Some(1), 3);
        assert_eq!(up, ToggleOutcome::Changed { from: 1, to: 3 });
        assert_eq!(up.counter_delta(), 2);

        let down = resolve_toggle(Some(3), 2);
        assert_eq!(down.counter_delta(), -1);
        assert_eq!(down.current_level(), Some(2));
    }

    #[test]
    fn test_double_toggle_is_identity() {
        for level in 1..=3 {
            let first = resolve_toggle(None, level);
            let second = resolve_toggle(first.current_level(), level);
            assert_eq!(first.counter_delta() + second.counter_delta(), 0);
            assert!(!second.is_active());
        }
    }
}
