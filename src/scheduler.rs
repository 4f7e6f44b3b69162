//! Deferred flush scheduling against the host's main loop.
//!
//! Draw operations never present directly; they ask the host to run
//! [`crate::backend::Graphics::perform_flush`] at idle time so that bursts
//! of drawing collapse into a single present. The host owns the event loop,
//! so scheduling is a collaborator trait rather than an internal timer.

/// Priority for the requested idle task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    /// Run after pending paint events, the normal case.
    PostPaint,
    /// Run before anything else; used when the pending-operation budget is
    /// exhausted and the flush must not be delayed further.
    Highest,
}

/// Host event-loop collaborator.
pub trait IdleScheduler {
    /// False outside the main loop (early startup, shutdown), when idle
    /// tasks would never run and callers must flush synchronously instead.
    fn is_main_loop_running(&self) -> bool;

    /// Queue one call to the backend's flush entry point. Called at most
    /// once per pending flush; the backend tracks its own requested state.
    fn request_idle_flush(&mut self, priority: TaskPriority);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_outranks_post_paint() {
        assert!(TaskPriority::Highest > TaskPriority::PostPaint);
    }
}
