use core::convert::Infallible;
use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
    string::{String, ToString},
    vec::Vec,
};

use embassy_time::Duration;
use embedded_hal::digital::{ErrorType, OutputPin};
use env_logger::Env;

use crate::config::ModemConfig;

/// Route crate logging (with the `log` feature) to the test output.
pub fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("trace"))
        .is_test(true)
        .try_init()
        .ok();
}

#[derive(Default)]
struct Inner {
    rx: VecDeque<u8>,
    /// Replies released when the matching command is written, in order
    script: VecDeque<(String, Vec<u8>)>,
    line: Vec<u8>,
    written: Vec<u8>,
    commands: Vec<String>,
}

/// Scripted serial port. Clones share the same port, so a test can keep a
/// handle after moving one into the code under test.
#[derive(Clone, Default)]
pub struct MockSerial {
    inner: Rc<RefCell<Inner>>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `reply` for the next time `command` is written.
    pub fn expect(self, command: &str, reply: &[u8]) -> Self {
        self.inner
            .borrow_mut()
            .script
            .push_back((command.to_string(), reply.to_vec()));
        self
    }

    /// Make bytes readable right away.
    pub fn feed(&self, bytes: &[u8]) {
        self.inner.borrow_mut().rx.extend(bytes.iter().copied());
    }

    /// Commands written so far, without terminator
    pub fn log(&self) -> Vec<String> {
        self.inner.borrow().commands.clone()
    }

    pub fn written(&self) -> Vec<u8> {
        self.inner.borrow().written.clone()
    }
}

impl embedded_io_async::ErrorType for MockSerial {
    type Error = Infallible;
}

impl embedded_io_async::Read for MockSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        let byte = self.inner.borrow_mut().rx.pop_front();
        match byte {
            Some(byte) => {
                buf[0] = byte;
                Ok(1)
            }
            None => core::future::pending().await,
        }
    }
}

impl embedded_io_async::Write for MockSerial {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut inner = self.inner.borrow_mut();
        inner.written.extend_from_slice(buf);

        for &byte in buf {
            if byte != b'\r' {
                inner.line.push(byte);
                continue;
            }

            let command = String::from_utf8_lossy(&inner.line).into_owned();
            inner.line.clear();
            if inner.script.front().is_some_and(|(c, _)| *c == command) {
                if let Some((_, reply)) = inner.script.pop_front() {
                    inner.rx.extend(reply);
                }
            }
            inner.commands.push(command);
        }

        Ok(buf.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Output pin recording every level it is driven to.
#[derive(Debug, Clone, Default)]
pub struct MockPin {
    levels: Rc<RefCell<Vec<Level>>>,
}

impl MockPin {
    pub fn levels(&self) -> Rc<RefCell<Vec<Level>>> {
        self.levels.clone()
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(Level::High);
        Ok(())
    }
}

/// Module configuration with the delays cut down for tests.
pub struct TestConfig {
    pub pin: MockPin,
    pub sim_pin: Option<&'static str>,
}

impl ModemConfig for TestConfig {
    type PowerPin = MockPin;

    const POWER_ON_ATTEMPTS: u8 = 3;
    const SIM_UNLOCK_ATTEMPTS: u8 = 3;

    const PWR_ON_FIRST_LOW: Duration = Duration::from_millis(1);
    const PWR_ON_FIRST_HIGH: Duration = Duration::from_millis(1);
    const PWR_ON_SECOND_LOW: Duration = Duration::from_millis(1);
    const PWR_ON_SETTLE: Duration = Duration::from_millis(1);

    const PROBE_TIMEOUT: Duration = Duration::from_millis(30);
    const BRINGUP_TIMEOUT: Duration = Duration::from_millis(100);
    const BAUD_SETTLE_TIME: Duration = Duration::from_millis(1);
    const SIM_RETRY_DELAY: Duration = Duration::from_millis(1);

    fn power_pin(&mut self) -> Option<&mut Self::PowerPin> {
        Some(&mut self.pin)
    }

    fn sim_pin(&self) -> Option<&str> {
        self.sim_pin
    }
}

/// Replies to the configuration and identity queries following a
/// successful power-on probe.
pub fn bringup_script(serial: MockSerial) -> MockSerial {
    const OK: &[u8] = b"\r\nOK\r\n";
    serial
        .expect("ATE0", b"ATE0\r\r\nOK\r\n")
        .expect("AT+CMEE=2", OK)
        .expect("AT+CMER=1,0,0,2,1", OK)
        .expect("AT+IPR=115200", OK)
        .expect("AT+CGSN", b"\r\n356726010000000\r\n\r\nOK\r\n")
        .expect("AT+CGMI", b"\r\nu-blox\r\n\r\nOK\r\n")
        .expect("AT+CGMM", b"\r\nSARA-U270\r\n\r\nOK\r\n")
        .expect("AT+CGMR", b"\r\n23.41\r\n\r\nOK\r\n")
        .expect(
            "AT+CCID",
            b"\r\n+CCID: 8939107800023416395\r\n\r\nOK\r\n",
        )
}
