//! Test doubles: an in-memory doc engine with per-thread accounting, and a
//! tracing layer that records warnings

use crate::engine::DocEngine;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::fmt;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

thread_local! {
    static DOCS: RefCell<HashMap<(String, usize, usize), String>> = RefCell::new(HashMap::new());
    static LIVE: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
    static LOOKUPS: Cell<usize> = const { Cell::new(0) };
    static RELEASES: Cell<usize> = const { Cell::new(0) };
}

/// Engine answering from `set_docs`, counting every call
pub struct FakeEngine;

impl DocEngine for FakeEngine {
    fn lookup(file: &CStr, line: usize, column: usize) -> *const c_char {
        LOOKUPS.with(|n| n.set(n.get() + 1));
        let key = (file.to_string_lossy().into_owned(), line, column);
        let Some(text) = DOCS.with(|docs| docs.borrow().get(&key).cloned()) else {
            return ptr::null();
        };
        let Ok(text) = CString::new(text) else {
            return ptr::null();
        };
        let raw = text.into_raw();
        LIVE.with(|live| live.borrow_mut().insert(raw as usize));
        raw
    }

    unsafe fn release(docs: *const c_char) {
        RELEASES.with(|n| n.set(n.get() + 1));
        let known = LIVE.with(|live| live.borrow_mut().remove(&(docs as usize)));
        assert!(known, "released a string the engine does not own");
        let owned = unsafe { CString::from_raw(docs as *mut c_char) };
        // Scribble over the buffer so later reads through it would be caught.
        let mut bytes = owned.into_bytes();
        bytes.iter_mut().for_each(|b| *b = b'#');
        drop(bytes);
    }
}

/// Forget all docs and zero the counters
pub fn reset() {
    DOCS.with(|docs| docs.borrow_mut().clear());
    LIVE.with(|live| live.borrow_mut().clear());
    LOOKUPS.with(|n| n.set(0));
    RELEASES.with(|n| n.set(0));
}

pub fn set_docs(file: &str, line: usize, column: usize, text: &str) {
    DOCS.with(|docs| {
        docs.borrow_mut()
            .insert((file.to_string(), line, column), text.to_string())
    });
}

pub fn lookups() -> usize {
    LOOKUPS.with(Cell::get)
}

pub fn releases() -> usize {
    RELEASES.with(Cell::get)
}

/// Strings handed out and not yet released
pub fn outstanding() -> usize {
    LIVE.with(|live| live.borrow().len())
}

/// Layer keeping the message of every `WARN` event
#[derive(Clone, Default)]
pub struct WarningCounter {
    messages: Arc<Mutex<Vec<String>>>,
}

impl WarningCounter {
    pub fn count(&self) -> usize {
        self.messages().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

impl<S: Subscriber> Layer<S> for WarningCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != Level::WARN {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.messages.lock().unwrap().push(visitor.0);
    }
}

/// Run `f` with `counter` as the only subscriber on this thread
pub fn with_counter<T>(counter: &WarningCounter, f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::registry().with(counter.clone());
    tracing::subscriber::with_default(subscriber, f)
}
