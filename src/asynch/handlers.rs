//! Ready made [`ResponseHandler`]s.

use heapless::String;

use super::client::{Flow, ResponseHandler};
use crate::{
    classifier::ResponseCategory,
    command::error::{CmeError, DeviceError},
    scan::trim,
    status::SimStatus,
};

/// Lets every token take its default course.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHandler;

impl ResponseHandler for NoHandler {
    fn handle(&mut self, _category: ResponseCategory, _token: &[u8]) -> Flow {
        Flow::Wait
    }
}

/// Keeps the first line of information text returned by a command.
///
/// Plain text lines (`AT+CGSN`, `AT+CGMI`, ...) are captured by default.
/// Commands answering with a `+NAME: value` line are captured with
/// [`TextCapture::with_prefix`]. Text longer than `N` is truncated.
#[derive(Debug, Clone, Default)]
pub struct TextCapture<const N: usize> {
    prefix: Option<&'static str>,
    text: Option<String<N>>,
}

impl<const N: usize> TextCapture<N> {
    pub fn new() -> Self {
        Self {
            prefix: None,
            text: None,
        }
    }

    pub fn with_prefix(prefix: &'static str) -> Self {
        Self {
            prefix: Some(prefix),
            text: None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn into_text(self) -> Option<String<N>> {
        self.text
    }

    fn capture(&mut self, bytes: &[u8]) {
        let Ok(s) = core::str::from_utf8(bytes) else {
            return;
        };
        let mut text = String::new();
        for c in s.chars() {
            if text.push(c).is_err() {
                break;
            }
        }
        self.text = Some(text);
    }
}

impl<const N: usize> ResponseHandler for TextCapture<N> {
    fn handle(&mut self, category: ResponseCategory, token: &[u8]) -> Flow {
        if self.text.is_some() {
            return Flow::Wait;
        }

        let line = trim(token);
        match (category, self.prefix) {
            (ResponseCategory::Unknown, None) if !line.is_empty() => self.capture(line),
            (ResponseCategory::Unsolicited, Some(prefix)) => {
                if let Some(value) = line.strip_prefix(prefix.as_bytes()) {
                    self.capture(trim(value));
                }
            }
            _ => {}
        }
        Flow::Wait
    }
}

/// Interprets the answer to `AT+CPIN?`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PinStatusCapture {
    pub status: SimStatus,
}

impl ResponseHandler for PinStatusCapture {
    fn handle(&mut self, category: ResponseCategory, token: &[u8]) -> Flow {
        match category {
            ResponseCategory::Unsolicited => {
                if let Some(code) = trim(token).strip_prefix(b"+CPIN:") {
                    self.status = match trim(code) {
                        b"READY" => SimStatus::Ready,
                        _ => SimStatus::PinRequired,
                    };
                }
            }
            ResponseCategory::Error => {
                if DeviceError::from_token(token) == DeviceError::Cme(CmeError::SimNotInserted) {
                    self.status = SimStatus::Missing;
                }
            }
            _ => {}
        }
        Flow::Wait
    }
}
