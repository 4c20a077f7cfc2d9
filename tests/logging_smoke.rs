use std::fs;
use std::io;
use std::io::Write;
use std::sync::{Arc, Mutex};

use omniprep::{load_windows, OmniColumn, OmniLoaderConfig, RowRange};
use tempfile::NamedTempFile;
use tracing::dispatcher::with_default;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriter;

#[derive(Clone, Default)]
struct SharedWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedWriter {
    fn output_string(&self) -> String {
        let bytes = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        String::from_utf8_lossy(&bytes).to_string()
    }
}

struct SharedWriterGuard {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for SharedWriter {
    type Writer = SharedWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut out = self
            .inner
            .lock()
            .expect("writer lock should not be poisoned");
        out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture_logs(max_level: Level, f: impl FnOnce()) -> String {
    let writer = SharedWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_max_level(max_level)
        .with_writer(writer.clone())
        .finish();
    let dispatch = tracing::Dispatch::new(subscriber);

    with_default(&dispatch, f);
    writer.output_string()
}

fn seed_file(body: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp data file");
    fs::write(file.path(), body).expect("sample file should be written");
    file
}

#[test]
fn load_emits_start_and_finish_events() {
    let file = seed_file(
        "2000 1 0 1.0 5.0 400.0 -10\n\
         2000 1 1 2.0 5.0 400.0 -11\n\
         2000 1 2 3.0 5.0 400.0 -12\n\
         2000 1 3 4.0 5.0 400.0 -13\n",
    );
    let cfg = OmniLoaderConfig {
        filename: file.path().to_path_buf(),
        dt: 1,
        nt: 2,
        fcast: 0,
    };

    let logs = capture_logs(Level::INFO, || {
        load_windows(&cfg, &[OmniColumn::Bz], &[OmniColumn::Dst], RowRange::default())
            .expect("load should succeed");
    });

    assert!(logs.contains("\"event\":\"windows.load.start\""));
    assert!(logs.contains("\"event\":\"windows.load.finish\""));
    assert!(!logs.contains("\"event\":\"windows.load.dropped\""));
}

#[test]
fn dropped_windows_emit_a_dedicated_event() {
    let file = seed_file(
        "2000 1 0 1.0 5.0 400.0 -10\n\
         2000 1 1 999.9 5.0 400.0 -11\n\
         2000 1 2 3.0 5.0 400.0 -12\n\
         2000 1 3 4.0 5.0 400.0 -13\n",
    );
    let cfg = OmniLoaderConfig {
        filename: file.path().to_path_buf(),
        dt: 1,
        nt: 2,
        fcast: 0,
    };

    let logs = capture_logs(Level::INFO, || {
        load_windows(&cfg, &[OmniColumn::Bz], &[OmniColumn::Dst], RowRange::default())
            .expect("load should succeed");
    });

    assert!(logs.contains("\"event\":\"windows.load.dropped\""));
    assert!(logs.contains("\"dropped_windows\":2"));
}

#[test]
fn raw_reads_only_log_at_debug() {
    let file = seed_file("2000 1 0 1.0 5.0 400.0 -10\n");
    let cfg = OmniLoaderConfig {
        filename: file.path().to_path_buf(),
        dt: 1,
        nt: 1,
        fcast: 0,
    };

    let info_logs = capture_logs(Level::INFO, || {
        load_windows(&cfg, &[OmniColumn::Bz], &[OmniColumn::Dst], RowRange::default())
            .expect("load should succeed");
    });
    assert!(!info_logs.contains("\"event\":\"omni.read.finish\""));

    let debug_logs = capture_logs(Level::DEBUG, || {
        load_windows(&cfg, &[OmniColumn::Bz], &[OmniColumn::Dst], RowRange::default())
            .expect("load should succeed");
    });
    assert!(debug_logs.contains("\"event\":\"omni.read.finish\""));
}
