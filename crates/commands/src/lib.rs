//! Built-in commands.
//!
//! The command list is assembled explicitly by the binary; [`builtin`] is the
//! default set.

pub mod ping;
pub mod play;
pub mod queue;
pub mod schema;
pub mod tracks;

use std::sync::Arc;

use cadence_dispatch::CommandDefinition;

pub use tracks::{Track, TrackQueue};

/// `ping`, `play` and `queue`, sharing one track queue.
pub fn builtin(tracks: Arc<TrackQueue>) -> Vec<CommandDefinition> {
    vec![
        ping::command(),
        play::command(Arc::clone(&tracks)),
        queue::command(tracks),
    ]
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, cadence_dispatch::CommandRegistry};

    #[test]
    fn builtin_set_loads() {
        let registry = CommandRegistry::load(builtin(Arc::new(TrackQueue::new()))).unwrap();

        let names: Vec<_> = registry
            .all_definitions()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, [ping::NAME, play::NAME, queue::NAME]);
        assert_eq!(
            registry
                .lookup_by_ui_element_id(queue::SKIP_BUTTON_ID)
                .unwrap()
                .name(),
            queue::NAME
        );
        for payload in registry.payloads() {
            assert_eq!(payload["type"], 1);
            assert!(payload["description"].is_string());
        }
    }
}
