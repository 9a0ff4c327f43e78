//! Routes `tracing` events to the browser console
//!
//! The fmt layer formats each event into a fresh [`ConsoleWriter`], which
//! hands the finished line to the console method for the event's level
//! when it is dropped.

use std::io;
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::JsValue;

/// Most verbose level forwarded to the console
const MAX_LEVEL: Level = Level::DEBUG;

struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = finished_line(&self.buf) {
            emit(self.level, &line);
        }
    }
}

/// Formatted event text without the trailing newline, `None` when empty
fn finished_line(buf: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(buf);
    let line = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
    (!line.is_empty()).then(|| line.to_owned())
}

fn emit(level: Level, line: &str) {
    let value = JsValue::from_str(line);
    if level == Level::ERROR {
        web_sys::console::error_1(&value);
    } else if level == Level::WARN {
        web_sys::console::warn_1(&value);
    } else if level == Level::INFO {
        web_sys::console::info_1(&value);
    } else {
        web_sys::console::debug_1(&value);
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Install the console subscriber. Later calls keep the first one.
pub(crate) fn init_logging() {
    let result = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_max_level(MAX_LEVEL)
        .with_ansi(false)
        .with_target(false)
        // No wall clock on wasm32-unknown-unknown
        .without_time()
        .try_init();
    if let Err(e) = result {
        web_sys::console::warn_1(&format!("tracing subscriber not installed: {}", e).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_line_strips_newline() {
        assert_eq!(
            finished_line(b" INFO pointer pipeline created hand=\"left\"\n").as_deref(),
            Some(" INFO pointer pipeline created hand=\"left\"")
        );
        assert_eq!(finished_line(b"a\r\n").as_deref(), Some("a"));
        assert_eq!(finished_line(b"\n"), None);
        assert_eq!(finished_line(b""), None);
    }

    #[test]
    fn test_writer_buffers_whole_event() {
        use std::io::Write;
        let mut writer = ConsoleWriter::new(Level::DEBUG);
        write!(writer, "degenerate samples").unwrap();
        writeln!(writer, ", holding last fit").unwrap();
        assert_eq!(
            finished_line(&writer.buf).as_deref(),
            Some("degenerate samples, holding last fit")
        );
        // Dropping would hand the line to the browser console
        writer.buf.clear();
    }
}
