//! Documentation engine bridge
//!
//! The engine lives behind two C entry points: a lookup that returns an
//! engine-owned string (or null) and a release for that string. `EngineDocs`
//! owns a returned string and releases it exactly once when dropped, so every
//! exit path of a lookup, including unwinding, gives the string back.

use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::os::raw::c_char;
use std::ptr::NonNull;
use tracing::debug;

/// A documentation engine reachable through the C boundary
pub trait DocEngine: 'static {
    /// Docs for the function at `(file, line, column)`, or null.
    ///
    /// A non-null result is owned by the engine until passed to `release`.
    fn lookup(file: &CStr, line: usize, column: usize) -> *const c_char;

    /// Give a string returned by `lookup` back to the engine.
    ///
    /// # Safety
    ///
    /// `docs` must be a non-null pointer returned by `lookup` that has not
    /// been released yet.
    unsafe fn release(docs: *const c_char);
}

/// Engine-owned doc string, released on drop
pub struct EngineDocs<E: DocEngine> {
    ptr: NonNull<c_char>,
    _engine: PhantomData<E>,
}

impl<E: DocEngine> EngineDocs<E> {
    /// Take ownership of a lookup result. Null means no docs.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or a string returned by `E::lookup` that nobody
    /// else will release.
    unsafe fn from_raw(ptr: *const c_char) -> Option<Self> {
        NonNull::new(ptr as *mut c_char).map(|ptr| Self {
            ptr,
            _engine: PhantomData,
        })
    }

    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: the engine hands out NUL-terminated strings that stay valid
        // until released, and release only happens in `drop`.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// Contents as text, invalid UTF-8 replaced
    pub fn text(&self) -> Cow<'_, str> {
        self.as_c_str().to_string_lossy()
    }

    /// Write the contents and a newline
    pub fn write_line<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.as_c_str().to_bytes())?;
        out.write_all(b"\n")
    }
}

impl<E: DocEngine> Drop for EngineDocs<E> {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `E::lookup` and this is its only owner.
        unsafe { E::release(self.ptr.as_ptr()) }
    }
}

/// Ask the engine for the docs of the function at `(file, line, column)`.
///
/// A file name containing NUL cannot be passed to the engine and counts as
/// a miss.
pub fn lookup_docs<E: DocEngine>(file: &str, line: u32, column: u32) -> Option<EngineDocs<E>> {
    let Ok(c_file) = CString::new(file) else {
        debug!(file, "file name contains NUL, skipping doc lookup");
        return None;
    };
    let ptr = E::lookup(&c_file, line as usize, column as usize);
    debug!(file, line, column, found = !ptr.is_null(), "doc lookup");
    // SAFETY: `ptr` is fresh from `E::lookup` and owned by nobody else.
    unsafe { EngineDocs::from_raw(ptr) }
}

/// The engine linked into the process
#[cfg(feature = "linked-engine")]
pub struct LinkedEngine;

#[cfg(feature = "linked-engine")]
extern "C" {
    fn lambdoc_lookup_docs(filename: *const c_char, line: usize, column: usize) -> *const c_char;
    fn lambdoc_release_docs(docs: *const c_char);
}

#[cfg(feature = "linked-engine")]
impl DocEngine for LinkedEngine {
    fn lookup(file: &CStr, line: usize, column: usize) -> *const c_char {
        // SAFETY: `file` is a valid NUL-terminated string for the whole call.
        unsafe { lambdoc_lookup_docs(file.as_ptr(), line, column) }
    }

    unsafe fn release(docs: *const c_char) {
        // SAFETY: forwarded from the caller.
        unsafe { lambdoc_release_docs(docs) }
    }
}

/// Helpers for engines exporting the C entry points.
///
/// ```ignore
/// #[no_mangle]
/// pub extern "C" fn lambdoc_lookup_docs(f: *const c_char, line: usize, col: usize) -> *const c_char {
///     unsafe { lambdoc_plugin::engine::export::lookup_with(f, line, col, my_engine::docs_at) }
/// }
///
/// #[no_mangle]
/// pub extern "C" fn lambdoc_release_docs(docs: *const c_char) {
///     unsafe { lambdoc_plugin::engine::export::release(docs) }
/// }
/// ```
pub mod export {
    use std::ffi::{CStr, CString};
    use std::os::raw::c_char;
    use std::panic::{self, AssertUnwindSafe};
    use std::ptr;
    use tracing::warn;

    /// Run `f` for a C lookup request and hand back an owned C string.
    ///
    /// Returns null when the file name is not UTF-8, when `f` finds nothing,
    /// when the docs contain NUL, or when `f` panics.
    ///
    /// # Safety
    ///
    /// `filename` must be a valid NUL-terminated string.
    pub unsafe fn lookup_with<F>(filename: *const c_char, line: usize, column: usize, f: F) -> *const c_char
    where
        F: FnOnce(&str, usize, usize) -> Option<String>,
    {
        if filename.is_null() {
            return ptr::null();
        }
        // SAFETY: guaranteed by the caller.
        let Ok(file) = unsafe { CStr::from_ptr(filename) }.to_str() else {
            return ptr::null();
        };
        let docs = match panic::catch_unwind(AssertUnwindSafe(|| f(file, line, column))) {
            Ok(docs) => docs,
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(file, line, column, %reason, "doc lookup panicked");
                None
            }
        };
        docs.and_then(|s| CString::new(s).ok())
            .map_or(ptr::null(), |s| s.into_raw() as *const c_char)
    }

    /// Free a string returned by `lookup_with`. Null is ignored.
    ///
    /// # Safety
    ///
    /// `docs` must be null or come from `lookup_with` and not have been
    /// released before.
    pub unsafe fn release(docs: *const c_char) {
        if docs.is_null() {
            return;
        }
        // SAFETY: the pointer came from `CString::into_raw` in `lookup_with`.
        drop(unsafe { CString::from_raw(docs as *mut c_char) });
    }
}
