// tests/stream_reader.rs

mod common;
use crate::common::RecordingHandlers;

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use gcmd::errors::NodeErrorKind;
use gcmd::exec::StreamReader;
use gcmd::types::StreamKind;

async fn drain_bytes(kind: StreamKind, bytes: &'static [u8]) -> (RecordingHandlers, u64) {
    let recorder = RecordingHandlers::new();
    let reader = StreamReader::new("n".to_string(), kind, recorder.handlers());
    let lines = reader.drain(bytes).await;
    (recorder, lines)
}

#[tokio::test]
async fn newline_and_crlf_are_stripped() {
    let (rec, lines) = drain_bytes(StreamKind::Stdout, b"one\ntwo\r\nthree\n").await;

    assert_eq!(lines, 3);
    assert_eq!(rec.stdout_lines("n"), vec!["one", "two", "three"]);
}

#[tokio::test]
async fn final_line_without_newline_is_delivered() {
    let (rec, lines) = drain_bytes(StreamKind::Stdout, b"first\nlast").await;

    assert_eq!(lines, 2);
    assert_eq!(rec.stdout_lines("n"), vec!["first", "last"]);
}

#[tokio::test]
async fn empty_lines_are_delivered_but_empty_input_is_not() {
    let (rec, lines) = drain_bytes(StreamKind::Stdout, b"\n\nx\n").await;
    assert_eq!(lines, 3);
    assert_eq!(rec.stdout_lines("n"), vec!["", "", "x"]);

    let (rec, lines) = drain_bytes(StreamKind::Stdout, b"").await;
    assert_eq!(lines, 0);
    assert!(rec.is_empty());
}

#[tokio::test]
async fn stderr_reader_only_calls_the_stderr_handler() {
    let (rec, _) = drain_bytes(StreamKind::Stderr, b"warn\n").await;

    assert!(rec.stdout_lines("n").is_empty());
    assert_eq!(rec.stderr_lines("n"), vec!["warn"]);
}

#[tokio::test]
async fn invalid_utf8_is_passed_through_untouched() {
    let recorder = RecordingHandlers::new();
    let reader = StreamReader::new("n".to_string(), StreamKind::Stdout, recorder.handlers());
    reader.drain(&b"ok\xff\xfe\n"[..]).await;

    let raw = recorder
        .calls()
        .into_iter()
        .find_map(|c| match c {
            common::Call::Line { line, .. } => Some(line),
            _ => None,
        })
        .expect("one line");
    assert_eq!(raw, b"ok\xff\xfe".to_vec());
}

/// Yields `data`, then fails.
struct FailingSource {
    data: Option<&'static [u8]>,
}

impl AsyncRead for FailingSource {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.data.take() {
            Some(data) => {
                buf.put_slice(data);
                Poll::Ready(Ok(()))
            }
            None => Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))),
        }
    }
}

#[tokio::test]
async fn read_error_reports_stream_read_and_stops() {
    let recorder = RecordingHandlers::new();
    let reader = StreamReader::new("n".to_string(), StreamKind::Stdout, recorder.handlers());

    let lines = reader
        .drain(FailingSource {
            data: Some(b"complete\npartial"),
        })
        .await;

    // The complete line arrives; the partial one is lost with the error.
    assert_eq!(lines, 1);
    assert_eq!(recorder.stdout_lines("n"), vec!["complete"]);

    let errors = recorder.errors("n");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind, NodeErrorKind::StreamRead);
    assert!(errors[0].message.contains("stdout"));
}

#[tokio::test]
async fn spawned_reader_returns_line_count() {
    let recorder = RecordingHandlers::new();
    let handle = StreamReader::new("n".to_string(), StreamKind::Stdout, recorder.handlers())
        .spawn(&b"a\nb\n"[..]);

    assert_eq!(handle.await.expect("reader task"), 2);
    assert_eq!(recorder.stdout_lines("n"), vec!["a", "b"]);
}
