// Shared frame scheduler: one frame callback loop multiplexed over every
// active engine. The frame source is injected so the ticker stays an
// explicit, mockable object instead of a hidden module-level global.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Platform frame source. The web host backs this with
/// `requestAnimationFrame`/`cancelAnimationFrame` and calls `Ticker::tick`
/// from the frame callback; tests drive frames by hand.
pub trait FrameScheduler {
    /// Ask for one upcoming frame callback.
    fn request(&self);
    /// Drop the pending frame callback, if any.
    fn cancel(&self);
}

/// One schedulable animation instance.
pub trait Tick {
    fn tick(&self, time: f64);
}

/// Multiplexes N active instances over a single frame loop. The loop starts
/// lazily when the member set becomes non-empty and stops when it empties.
pub struct Ticker {
    scheduler: Box<dyn FrameScheduler>,
    members: RefCell<Vec<Rc<dyn Tick>>>,
    running: Cell<bool>,
}

impl Ticker {
    pub fn new(scheduler: Box<dyn FrameScheduler>) -> Self {
        Ticker {
            scheduler,
            members: RefCell::new(Vec::new()),
            running: Cell::new(false),
        }
    }

    /// Insert an instance into the active set. Adding an instance that is
    /// already present is a no-op.
    pub fn add(&self, member: Rc<dyn Tick>) {
        {
            let mut members = self.members.borrow_mut();
            if members.iter().any(|m| same_instance(m, &member)) {
                return;
            }
            members.push(member);
        }
        if !self.running.get() {
            self.running.set(true);
            self.scheduler.request();
        }
    }

    /// Remove an instance from the active set. Removing an absent instance
    /// is a harmless no-op.
    pub fn remove(&self, member: &Rc<dyn Tick>) {
        let emptied = {
            let mut members = self.members.borrow_mut();
            members.retain(|m| !same_instance(m, member));
            members.is_empty()
        };
        if emptied && self.running.get() {
            self.running.set(false);
            self.scheduler.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    /// One frame: schedule the next frame first, then tick every current
    /// member in insertion order. The pass iterates a snapshot, so a member
    /// removed from within a tick still finishes this frame and disappears
    /// on the next one.
    pub fn tick(&self, time: f64) {
        if !self.running.get() {
            return;
        }
        self.scheduler.request();
        let members: Vec<Rc<dyn Tick>> = self.members.borrow().clone();
        for member in &members {
            member.tick(time);
        }
    }
}

// Identity by data address; vtable pointers are not stable enough for
// fat-pointer equality across codegen units.
fn same_instance(a: &Rc<dyn Tick>, b: &Rc<dyn Tick>) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const (),
        Rc::as_ptr(b) as *const (),
    )
}
