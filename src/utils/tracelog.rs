//! Per-operation trace lines (op, namespace, timing, counts) with a thread-local
//! capture sink so tests can assert on them without touching the global logger.

use std::cell::RefCell;

pub const TRACE_TARGET: &str = "memdoc::trace";

thread_local! {
    static TL_SINK: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Disables capture for the current thread when dropped.
pub struct CaptureGuard;
impl Drop for CaptureGuard {
    fn drop(&mut self) {
        TL_SINK.with(|s| *s.borrow_mut() = None);
    }
}

pub fn capture() -> CaptureGuard {
    TL_SINK.with(|s| *s.borrow_mut() = Some(Vec::new()));
    CaptureGuard
}

pub fn record(line: &str) {
    TL_SINK.with(|s| {
        if let Some(buf) = s.borrow_mut().as_mut() {
            buf.push(line.to_owned());
        }
    });
}

/// Takes the captured lines; empty when capture is off.
pub fn drain() -> Vec<String> {
    TL_SINK.with(|s| s.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}

#[macro_export]
macro_rules! qtrace {
    ($($arg:tt)*) => {{
        let __line = format!($($arg)*);
        $crate::utils::tracelog::record(&__line);
        log::trace!(target: $crate::utils::tracelog::TRACE_TARGET, "{}", __line);
    }};
}
