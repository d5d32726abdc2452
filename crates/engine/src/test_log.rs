//! Captures formatted log output so tests can assert on event names.

use std::io;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// Runs `f` under a thread-local subscriber and returns its result with everything it logged.
pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
	let buffer = Buffer::default();
	let writer = buffer.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_writer(move || writer.clone())
		.with_ansi(false)
		.with_max_level(tracing::Level::TRACE)
		.finish();
	let out = tracing::subscriber::with_default(subscriber, f);
	let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
	(out, logs)
}
