//! Evaluation context configuration

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::FatalError;

/// Default nesting limit for closure calls and lazy binding evaluation.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 128;

/// Default limit on how many expression nodes may be under evaluation at
/// once, across all calls.
pub const DEFAULT_MAX_NESTING: usize = 512;

/// Configuration and per-evaluation state.
///
/// A context is passed by reference through every evaluation step. The
/// depth counter is a `Cell`, so a context belongs to one evaluating thread;
/// other threads share the interrupt flag instead.
#[derive(Debug, Clone)]
pub struct EvalContext {
    /// Maximum call depth (stack overflow protection)
    pub max_call_depth: usize,

    /// Maximum number of nodes under evaluation at once
    pub max_nesting: usize,

    /// Interrupt flag - set to true to abort evaluation
    pub interrupt: Arc<AtomicBool>,

    /// Whether to trace evaluation (for debugging)
    pub trace: bool,

    depth: Cell<usize>,
    nesting: Cell<usize>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_nesting: DEFAULT_MAX_NESTING,
            interrupt: Arc::new(AtomicBool::new(false)),
            trace: false,
            depth: Cell::new(0),
            nesting: Cell::new(0),
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom call depth limit.
    pub fn with_max_call_depth(max_depth: usize) -> Self {
        Self {
            max_call_depth: max_depth,
            ..Default::default()
        }
    }

    /// Set the node nesting limit.
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Enable or disable per-node tracing.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Check if evaluation has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Request interruption of evaluation.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Reset the interrupt flag.
    pub fn reset_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    /// Fail with [`FatalError::Interrupted`] if the flag is set.
    pub fn check_interrupt(&self) -> Result<(), FatalError> {
        if self.is_interrupted() {
            Err(FatalError::Interrupted)
        } else {
            Ok(())
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Enter one level of nesting.
    ///
    /// Returns `None` when the limit is reached. The returned guard leaves
    /// the level again when dropped.
    pub fn enter(&self) -> Option<DepthGuard<'_>> {
        DepthGuard::new(&self.depth, self.max_call_depth)
    }

    /// Enter one expression node; `None` once [`max_nesting`] nodes are
    /// already under evaluation.
    ///
    /// [`max_nesting`]: EvalContext::max_nesting
    pub fn nest(&self) -> Option<DepthGuard<'_>> {
        DepthGuard::new(&self.nesting, self.max_nesting)
    }
}

/// Decrements a context counter on drop.
#[derive(Debug)]
pub struct DepthGuard<'a> {
    counter: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn new(counter: &'a Cell<usize>, limit: usize) -> Option<Self> {
        let depth = counter.get();
        if depth >= limit {
            return None;
        }
        counter.set(depth + 1);
        Some(Self { counter })
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.counter.set(self.counter.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_guard_restores() {
        let ctx = EvalContext::with_max_call_depth(2);
        {
            let _a = ctx.enter().unwrap();
            let _b = ctx.enter().unwrap();
            assert_eq!(ctx.depth(), 2);
            assert!(ctx.enter().is_none());
        }
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_nesting_counted_separately() {
        let ctx = EvalContext::with_max_call_depth(1).with_max_nesting(2);
        let _call = ctx.enter().unwrap();
        let _a = ctx.nest().unwrap();
        let _b = ctx.nest().unwrap();
        assert!(ctx.nest().is_none());
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_interrupt() {
        let ctx = EvalContext::new();
        assert!(ctx.check_interrupt().is_ok());
        ctx.interrupt();
        assert_eq!(ctx.check_interrupt(), Err(FatalError::Interrupted));
        ctx.reset_interrupt();
        assert!(!ctx.is_interrupted());
    }
}
