//! Slot for a self-rescheduling animation frame callback
//!
//! The callback holds a clone of its own loop so it can request the next
//! frame. That cycle lives until [`FrameLoop::stop`] takes the callback out.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct FrameLoop<C> {
    running: Rc<Cell<bool>>,
    slot: Rc<RefCell<Option<C>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl<C> Clone for FrameLoop<C> {
    fn clone(&self) -> Self {
        Self {
            running: self.running.clone(),
            slot: self.slot.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<C> Default for FrameLoop<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FrameLoop<C> {
    pub fn new() -> Self {
        Self {
            running: Rc::new(Cell::new(true)),
            slot: Rc::new(RefCell::new(None)),
            pending: Rc::new(Cell::new(None)),
        }
    }

    pub fn install(&self, callback: C) {
        *self.slot.borrow_mut() = Some(callback);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Run `f` on the installed callback while the loop is running
    pub fn with_callback<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        if !self.is_running() {
            return None;
        }
        self.slot.borrow().as_ref().map(f)
    }

    /// Remember the handle of the frame just requested
    pub fn set_pending(&self, handle: i32) {
        self.pending.set(Some(handle));
    }

    /// Stop the loop and free the callback
    ///
    /// Returns the handle of the frame still requested, if any, so the caller
    /// can cancel it. Must not be called from inside the callback.
    pub fn stop(&self) -> Option<i32> {
        self.running.set(false);
        let callback = self.slot.borrow_mut().take();
        drop(callback);
        self.pending.take()
    }
}
