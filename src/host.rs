//! Process-wide event sources a mounted component hooks into: pointer moves,
//! viewport resizes and one-shot animation frames.
//!
//! Everything here is single threaded. Callbacks are invoked with no
//! `RefCell` borrow held, so they are free to subscribe, unsubscribe,
//! request or cancel frames while being dispatched.

use std::{
    cell::{Cell, RefCell},
    rc::{Rc, Weak},
};

use log::trace;

use crate::core::Viewport;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMove {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Pointer,
    Resize,
}

type Callback<E> = Rc<dyn Fn(&E)>;

struct Listeners<E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<(u64, Callback<E>)>>,
}

impl<E> Listeners<E> {
    fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(Vec::new()),
        }
    }

    fn add(&self, callback: Callback<E>) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, callback));
        id
    }

    fn remove(&self, id: u64) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    fn contains(&self, id: u64) -> bool {
        self.entries.borrow().iter().any(|(entry, _)| *entry == id)
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Listeners removed by an earlier callback of the same dispatch are skipped.
    fn dispatch(&self, event: &E) -> usize {
        let snapshot: Vec<(u64, Callback<E>)> = self
            .entries
            .borrow()
            .iter()
            .map(|(id, cb)| (*id, Rc::clone(cb)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if self.contains(id) {
                callback(event);
                delivered += 1;
            }
        }
        delivered
    }
}

type FrameCallback = Box<dyn FnOnce()>;

pub struct Host {
    viewport: Cell<Viewport>,
    pointer: Listeners<PointerMove>,
    resize: Listeners<Viewport>,
    next_frame: Cell<u64>,
    frames: RefCell<Vec<(FrameHandle, FrameCallback)>>,
}

impl Host {
    pub fn new(viewport: Viewport) -> Rc<Self> {
        Rc::new(Self {
            viewport: Cell::new(viewport),
            pointer: Listeners::new(),
            resize: Listeners::new(),
            next_frame: Cell::new(0),
            frames: RefCell::new(Vec::new()),
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    pub fn on_pointer_move<F>(self: &Rc<Self>, callback: F) -> Subscription
    where
        F: Fn(&PointerMove) + 'static,
    {
        let id = self.pointer.add(Rc::new(callback));
        Subscription::new(self, Source::Pointer, id)
    }

    pub fn on_resize<F>(self: &Rc<Self>, callback: F) -> Subscription
    where
        F: Fn(&Viewport) + 'static,
    {
        let id = self.resize.add(Rc::new(callback));
        Subscription::new(self, Source::Resize, id)
    }

    /// Returns how many listeners saw the event.
    pub fn dispatch_pointer_move(&self, x: f32, y: f32) -> usize {
        self.pointer.dispatch(&PointerMove { x, y })
    }

    /// Records the new viewport, then notifies listeners.
    pub fn dispatch_resize(&self, viewport: Viewport) -> usize {
        self.viewport.set(viewport);
        self.resize.dispatch(&viewport)
    }

    /// Queues `callback` for the next [`Host::run_frame`]. One shot: a
    /// callback that wants to keep animating requests again.
    pub fn request_frame<F>(&self, callback: F) -> FrameHandle
    where
        F: FnOnce() + 'static,
    {
        let handle = FrameHandle(self.next_frame.get());
        self.next_frame.set(handle.0 + 1);
        let callback: FrameCallback = Box::new(callback);
        self.frames.borrow_mut().push((handle, callback));
        handle
    }

    /// Returns false when the frame already ran or was cancelled.
    pub fn cancel_frame(&self, handle: FrameHandle) -> bool {
        self.take_frame(handle).is_some()
    }

    /// Runs every frame callback that was queued when this call started.
    /// Frames requested while running wait for the next call; frames
    /// cancelled while running are skipped.
    pub fn run_frame(&self) -> usize {
        let due: Vec<FrameHandle> = self.frames.borrow().iter().map(|(h, _)| *h).collect();
        let mut ran = 0;
        for handle in due {
            if let Some(callback) = self.take_frame(handle) {
                callback();
                ran += 1;
            }
        }
        trace!("host frame: {} callbacks", ran);
        ran
    }

    fn take_frame(&self, handle: FrameHandle) -> Option<FrameCallback> {
        let mut frames = self.frames.borrow_mut();
        let pos = frames.iter().position(|(h, _)| *h == handle)?;
        Some(frames.remove(pos).1)
    }

    pub fn listener_count(&self) -> usize {
        self.pointer.len() + self.resize.len()
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.borrow().len()
    }

    fn unsubscribe(&self, source: Source, id: u64) -> bool {
        match source {
            Source::Pointer => self.pointer.remove(id),
            Source::Resize => self.resize.remove(id),
        }
    }
}

/// Keeps a listener attached for as long as it lives.
#[must_use = "dropping a Subscription detaches the listener"]
pub struct Subscription {
    host: Weak<Host>,
    source: Source,
    id: u64,
}

impl Subscription {
    fn new(host: &Rc<Host>, source: Source, id: u64) -> Self {
        Self {
            host: Rc::downgrade(host),
            source,
            id,
        }
    }

    pub fn is_active(&self) -> bool {
        self.host.upgrade().is_some_and(|host| match self.source {
            Source::Pointer => host.pointer.contains(self.id),
            Source::Resize => host.resize.contains(self.id),
        })
    }

    /// Same as dropping, spelled out.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(host) = self.host.upgrade() {
            host.unsubscribe(self.source, self.id);
        }
    }
}
