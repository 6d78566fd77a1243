// SPDX-FileCopyrightText: 2026 Tutorlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Tutorlink.
//!
//! This crate provides the trait definitions, error types, clock, and
//! session types shared by the lifecycle manager, the signaling relay,
//! storage, and the HTTP gateway.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ErrorKind, TutorlinkError};
pub use types::{
    Actor, AdapterType, HealthStatus, Profile, Role, Session, SessionId, SessionQuery,
    SessionStatus, SessionTransition, TransitionAction, TransitionReason, UserId,
};

pub use traits::{PluginAdapter, ProfileDirectory, SessionStore};

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn any_status() -> impl Strategy<Value = SessionStatus> {
        prop::sample::select(SessionStatus::ALL.to_vec())
    }

    proptest! {
        /// Any path through the graph only ever moves forward.
        #[test]
        fn accepted_paths_never_leave_terminal_states(steps in prop::collection::vec(any_status(), 0..12)) {
            let mut current = SessionStatus::Scheduled;
            let mut reached_terminal = false;
            for next in steps {
                if current.can_transition_to(next) {
                    prop_assert!(!reached_terminal, "moved out of terminal {current}");
                    prop_assert_ne!(next, SessionStatus::Scheduled);
                    current = next;
                    reached_terminal = current.is_terminal();
                }
            }
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_session_store<T: SessionStore>() {}
        fn _assert_profile_directory<T: ProfileDirectory>() {}
    }

    #[test]
    fn adapter_type_round_trips_through_display() {
        use std::str::FromStr;

        for variant in [AdapterType::Storage, AdapterType::SignalBackend, AdapterType::Gateway] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }
}
