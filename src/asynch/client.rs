//! Command channel and response orchestration.

use atat::AtatCmd;
use embassy_time::{Duration, Instant};
use embedded_io_async::{Read, Write};
use heapless::Vec;

use super::{state::State, urc_handler};
use crate::{
    classifier::{classify, Outcome, ResponseCategory},
    error::{DeviceError, Error},
    fmt::LossyStr,
    framer::{LineFramer, CR},
    scan::trim,
};

/// Successful end of a command exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// Final `OK`
    Ok,
    /// The module is waiting for payload (`>` or `@` prompt)
    AwaitingInput,
}

/// What a [`ResponseHandler`] wants the exchange to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Keep processing tokens
    Wait,
    /// End the exchange now with this result
    Return(Result<Completion, Error>),
}

/// Caller hook invoked for every token of a command exchange, before the
/// exchange decides whether the token is terminal.
pub trait ResponseHandler {
    fn handle(&mut self, category: ResponseCategory, token: &[u8]) -> Flow;
}

impl<F> ResponseHandler for F
where
    F: FnMut(ResponseCategory, &[u8]) -> Flow,
{
    fn handle(&mut self, category: ResponseCategory, token: &[u8]) -> Flow {
        self(category, token)
    }
}

pub struct AtClient<T, const INGRESS_BUF_SIZE: usize, const CMD_BUF_SIZE: usize> {
    transport: T,
    framer: LineFramer<INGRESS_BUF_SIZE>,
    /// Framed bytes not yet consumed by the classifier
    ingress: Vec<u8, INGRESS_BUF_SIZE>,
    cmd_buf: [u8; CMD_BUF_SIZE],
    cmd_len: usize,
}

impl<T, const INGRESS_BUF_SIZE: usize, const CMD_BUF_SIZE: usize>
    AtClient<T, INGRESS_BUF_SIZE, CMD_BUF_SIZE>
where
    T: Read + Write,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            framer: LineFramer::new(),
            ingress: Vec::new(),
            cmd_buf: [0; CMD_BUF_SIZE],
            cmd_len: 0,
        }
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Send a raw command, appending the `\r` terminator.
    pub async fn send_command(&mut self, command: &str) -> Result<(), Error> {
        let bytes = command.as_bytes();
        if bytes.len() + 1 > CMD_BUF_SIZE {
            error!("Command of {} bytes does not fit the transmit buffer", bytes.len());
            return Err(Error::Overflow);
        }
        self.cmd_buf[..bytes.len()].copy_from_slice(bytes);
        self.cmd_buf[bytes.len()] = CR;
        self.cmd_len = bytes.len() + 1;
        self.transmit().await
    }

    /// Serialise and send a typed command.
    pub async fn send_cmd<Cmd: AtatCmd>(&mut self, cmd: &Cmd) -> Result<(), Error> {
        if Cmd::MAX_LEN > CMD_BUF_SIZE {
            error!("Command of up to {} bytes does not fit the transmit buffer", Cmd::MAX_LEN);
            return Err(Error::Overflow);
        }
        self.cmd_len = cmd.write(&mut self.cmd_buf);
        self.transmit().await
    }

    async fn transmit(&mut self) -> Result<(), Error> {
        let cmd = &self.cmd_buf[..self.cmd_len];
        debug!("Sending command: {:?}", LossyStr(cmd));
        self.transport.write_all(cmd).await.map_err(|_| Error::Io)?;
        self.transport.flush().await.map_err(|_| Error::Io)
    }

    /// Forget the last command so nothing is treated as its echo.
    pub(crate) fn clear_command(&mut self) {
        self.cmd_len = 0;
    }

    /// Drop the first `n` ingress bytes. Undecided bytes after them stay for
    /// the next exchange.
    fn consume(&mut self, n: usize) {
        let remaining = self.ingress.len() - n;
        self.ingress.copy_within(n.., 0);
        self.ingress.truncate(remaining);
    }

    /// Process incoming lines until a terminal token, a handler decision or
    /// the end of the `timeout` budget.
    ///
    /// Bytes still undecided when this returns are picked up by the next call.
    pub async fn wait_response<H>(
        &mut self,
        state: &mut State,
        handler: &mut H,
        timeout: Duration,
    ) -> Result<Completion, Error>
    where
        H: ResponseHandler + ?Sized,
    {
        let deadline = Instant::now() + timeout;

        loop {
            let line = self.framer.read_line(&mut self.transport, deadline).await?;
            if line.is_empty() {
                return Err(Error::Timeout);
            }

            if self.ingress.extend_from_slice(line).is_err() {
                warn!(
                    "Ingress buffer full, dropping {} undecided bytes",
                    self.ingress.len()
                );
                self.ingress.clear();
                // The framer never yields more than the ingress capacity
                self.ingress.extend_from_slice(line).ok();
            }

            let echo = trim(&self.cmd_buf[..self.cmd_len]);
            let mut cursor = 0;
            while cursor < self.ingress.len() {
                match classify(&self.ingress[cursor..]) {
                    Outcome::Matched(token) => {
                        let bytes = &self.ingress[cursor..cursor + token.len];
                        cursor += token.len;
                        if let Some(result) =
                            dispatch_token(state, handler, token.category, bytes, echo)
                        {
                            self.consume(cursor);
                            return result;
                        }
                    }
                    Outcome::NeedMoreData => break,
                    Outcome::NoMatch => {
                        debug!(
                            "Discarding unrecognised bytes: {:?}",
                            LossyStr(&self.ingress[cursor..])
                        );
                        cursor = self.ingress.len();
                    }
                }
            }

            self.consume(cursor);

            if Instant::now() >= deadline {
                return Err(Error::Timeout);
            }
        }
    }

    /// Send `command` and wait for its outcome.
    pub async fn send_and_wait<H>(
        &mut self,
        state: &mut State,
        command: &str,
        handler: &mut H,
        timeout: Duration,
    ) -> Result<Completion, Error>
    where
        H: ResponseHandler + ?Sized,
    {
        self.send_command(command).await?;
        self.wait_response(state, handler, timeout).await
    }
}

/// Route one token. Returns the result of the exchange once it is decided.
fn dispatch_token<H>(
    state: &mut State,
    handler: &mut H,
    category: ResponseCategory,
    token: &[u8],
    echo: &[u8],
) -> Option<Result<Completion, Error>>
where
    H: ResponseHandler + ?Sized,
{
    match category {
        ResponseCategory::Unsolicited => urc_handler::handle_unsolicited(state, token),
        ResponseCategory::DoubleNewline => return None,
        ResponseCategory::Unknown => {
            let text = trim(token);
            if text.is_empty() {
                return None;
            }
            if !echo.is_empty() && text == echo {
                trace!("Echo: {:?}", LossyStr(text));
                return None;
            }
        }
        _ => {}
    }

    if let Flow::Return(result) = handler.handle(category, token) {
        return Some(result);
    }

    match category {
        ResponseCategory::Ok => Some(Ok(Completion::Ok)),
        ResponseCategory::Prompt => Some(Ok(Completion::AwaitingInput)),
        ResponseCategory::Error => {
            let error = DeviceError::from_token(token);
            debug!("Command failed: {:?}", error);
            Some(Err(Error::Device(error)))
        }
        ResponseCategory::Aborted => {
            warn!("Command aborted by the module");
            Some(Err(Error::Aborted))
        }
        ResponseCategory::Unknown => {
            debug!("Response line: {:?}", LossyStr(token));
            None
        }
        ResponseCategory::Unsolicited | ResponseCategory::DoubleNewline => None,
        other => {
            info!("Intermediate result code {:?}", other);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        asynch::handlers::{NoHandler, TextCapture},
        command::{error::CmeError, general::GetIMEI},
        socket::SocketHandle,
        test_helpers::MockSerial,
    };

    type Client = AtClient<MockSerial, 256, 64>;

    fn client(serial: MockSerial) -> (Client, State) {
        (AtClient::new(serial), State::new(0))
    }

    #[tokio::test]
    async fn captures_text_and_skips_echo() {
        let serial = MockSerial::new().expect(
            "AT+CGSN",
            b"\r\nAT+CGSN\r\n\r\n1234567890123456\r\n\r\nOK\r\n",
        );
        let (mut client, mut state) = client(serial);
        let mut capture = TextCapture::<32>::new();

        let res = client
            .send_and_wait(&mut state, "AT+CGSN", &mut capture, Duration::from_secs(10))
            .await;

        assert_eq!(res, Ok(Completion::Ok));
        assert_eq!(capture.text(), Some("1234567890123456"));
        assert_eq!(client.transport.written(), b"AT+CGSN\r");
    }

    #[tokio::test]
    async fn typed_command_is_terminated_with_cr() {
        let serial = MockSerial::new().expect("AT+CGSN", b"\r\n356726010000000\r\n\r\nOK\r\n");
        let (mut client, mut state) = client(serial);
        let mut capture = TextCapture::<16>::new();

        client.send_cmd(&GetIMEI).await.unwrap();
        let res = client
            .wait_response(&mut state, &mut capture, Duration::from_millis(100))
            .await;

        assert_eq!(res, Ok(Completion::Ok));
        assert_eq!(capture.text(), Some("356726010000000"));
        assert_eq!(client.transport.written(), b"AT+CGSN\r");
    }

    #[tokio::test]
    async fn silence_times_out() {
        let (mut client, mut state) = client(MockSerial::new());

        let start = Instant::now();
        let res = client
            .send_and_wait(&mut state, "AT", &mut NoHandler, Duration::from_millis(50))
            .await;

        assert_eq!(res, Err(Error::Timeout));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn partial_response_times_out() {
        let serial = MockSerial::new().expect("AT+CGMI", b"\r\nu-blox\r\n\r\nO");
        let (mut client, mut state) = client(serial);

        let res = client
            .send_and_wait(&mut state, "AT+CGMI", &mut NoHandler, Duration::from_millis(50))
            .await;

        assert_eq!(res, Err(Error::Timeout));
    }

    #[tokio::test]
    async fn reply_split_by_timeout_completes_later() {
        let serial = MockSerial::new().expect("AT+CGMI", b"\r\nu-blox\r\n\r\nO");
        let (mut client, mut state) = client(serial);

        let res = client
            .send_and_wait(&mut state, "AT+CGMI", &mut NoHandler, Duration::from_millis(30))
            .await;
        assert_eq!(res, Err(Error::Timeout));

        client.transport.feed(b"K\r\n");
        let res = client
            .wait_response(&mut state, &mut NoHandler, Duration::from_millis(30))
            .await;
        assert_eq!(res, Ok(Completion::Ok));
    }

    #[tokio::test]
    async fn payload_split_by_timeout_is_reassembled() {
        let serial = MockSerial::new().expect("AT+USORD=0,4", b"\r\n+USORD: 0,4,\"a\r\n");
        let (mut client, mut state) = client(serial);
        let mut tokens = std::vec::Vec::new();
        let mut record = |category: ResponseCategory, token: &[u8]| {
            if category == ResponseCategory::Unsolicited {
                tokens.push(token.to_vec());
            }
            Flow::Wait
        };

        let res = client
            .send_and_wait(&mut state, "AT+USORD=0,4", &mut record, Duration::from_millis(30))
            .await;
        assert_eq!(res, Err(Error::Timeout));

        client.transport.feed(b"b\"\r\n\r\nOK\r\n");
        let res = client
            .wait_response(&mut state, &mut record, Duration::from_millis(30))
            .await;
        assert_eq!(res, Ok(Completion::Ok));
        assert_eq!(tokens, [b"\r\n+USORD: 0,4,\"a\r\nb\"".to_vec()]);
    }

    #[tokio::test]
    async fn full_size_read_reply_fits_default_buffers() {
        let mut reply = b"\r\n+USORD: 0,1024,\"".to_vec();
        let header = reply.len();
        reply.extend_from_slice(&[b'x'; 1024]);
        reply.extend_from_slice(b"\"\r\n\r\nOK\r\n");
        let serial = MockSerial::new().expect("AT+USORD=0,1024", &reply);
        let mut client: AtClient<MockSerial, { crate::asynch::DEFAULT_INGRESS_BUF_SIZE }, 64> =
            AtClient::new(serial);
        let mut state = State::new(0);
        let mut payload_len = None;

        let res = client
            .send_and_wait(
                &mut state,
                "AT+USORD=0,1024",
                &mut |category: ResponseCategory, token: &[u8]| {
                    if category == ResponseCategory::Unsolicited {
                        payload_len = Some(token.len() - header - 1);
                    }
                    Flow::Wait
                },
                Duration::from_millis(500),
            )
            .await;

        assert_eq!(res, Ok(Completion::Ok));
        assert_eq!(payload_len, Some(1024));
    }

    #[tokio::test]
    async fn urc_during_exchange_closes_socket() {
        let serial = MockSerial::new().expect("AT", b"\r\n+UUSOCL: 3\r\n\r\nOK\r\n");
        let (mut client, mut state) = client(serial);
        state.sockets.allocate(SocketHandle(3)).unwrap();

        let res = client
            .send_and_wait(&mut state, "AT", &mut NoHandler, Duration::from_millis(100))
            .await;

        assert_eq!(res, Ok(Completion::Ok));
        assert_eq!(state.sockets.find(SocketHandle(3)), None);
        assert!(state.sockets.is_empty());
    }

    #[tokio::test]
    async fn terminal_tokens() {
        let serial = MockSerial::new()
            .expect("AT+CPIN?", b"\r\n+CME ERROR: SIM not inserted\r\n")
            .expect("AT+X", b"\r\nERROR\r\n")
            .expect("AT+USOWR=0,4", b"\r\n@")
            .expect("AT+COPS=0", b"\r\nABORTED\r\n");
        let (mut client, mut state) = client(serial);
        let t = Duration::from_millis(100);

        assert_eq!(
            client.send_and_wait(&mut state, "AT+CPIN?", &mut NoHandler, t).await,
            Err(Error::Device(DeviceError::Cme(CmeError::SimNotInserted)))
        );
        assert_eq!(
            client.send_and_wait(&mut state, "AT+X", &mut NoHandler, t).await,
            Err(Error::Device(DeviceError::Generic))
        );
        assert_eq!(
            client.send_and_wait(&mut state, "AT+USOWR=0,4", &mut NoHandler, t).await,
            Ok(Completion::AwaitingInput)
        );
        assert_eq!(
            client.send_and_wait(&mut state, "AT+COPS=0", &mut NoHandler, t).await,
            Err(Error::Aborted)
        );
    }

    #[tokio::test]
    async fn intermediate_codes_do_not_end_exchange() {
        let serial = MockSerial::new().expect("ATD123;", b"\r\nRING\r\n\r\nBUSY\r\n\r\nOK\r\n");
        let (mut client, mut state) = client(serial);
        let mut seen = std::vec::Vec::new();

        let res = client
            .send_and_wait(
                &mut state,
                "ATD123;",
                &mut |category: ResponseCategory, _: &[u8]| {
                    seen.push(category);
                    Flow::Wait
                },
                Duration::from_millis(100),
            )
            .await;

        assert_eq!(res, Ok(Completion::Ok));
        assert_eq!(
            seen,
            [
                ResponseCategory::Ring,
                ResponseCategory::Busy,
                ResponseCategory::Ok
            ]
        );
    }

    #[tokio::test]
    async fn handler_can_end_exchange_early() {
        let serial = MockSerial::new().expect("AT+URDFILE=\"f\"", b"\r\n+URDFILE: \"f\",3,\"a\r\n\"\r\n\r\nOK\r\n");
        let (mut client, mut state) = client(serial);
        let mut payload = std::vec::Vec::new();

        let res = client
            .send_and_wait(
                &mut state,
                "AT+URDFILE=\"f\"",
                &mut |category: ResponseCategory, token: &[u8]| {
                    if category == ResponseCategory::Unsolicited {
                        payload.extend_from_slice(token);
                        Flow::Return(Ok(Completion::Ok))
                    } else {
                        Flow::Wait
                    }
                },
                Duration::from_millis(100),
            )
            .await;

        assert_eq!(res, Ok(Completion::Ok));
        assert_eq!(payload, b"\r\n+URDFILE: \"f\",3,\"a\r\n\"");
    }

    #[tokio::test]
    async fn junk_before_response_is_skipped() {
        let serial = MockSerial::new().expect("AT", b"\x00\xffAT\r\r\nOK\r\n");
        let (mut client, mut state) = client(serial);

        let res = client
            .send_and_wait(&mut state, "AT", &mut NoHandler, Duration::from_millis(100))
            .await;

        assert_eq!(res, Ok(Completion::Ok));
    }

    #[tokio::test]
    async fn oversized_command_is_rejected() {
        let (mut client, mut state) = client(MockSerial::new());
        let long = "A".repeat(64);

        let res = client
            .send_and_wait(&mut state, &long, &mut NoHandler, Duration::from_millis(10))
            .await;

        assert_eq!(res, Err(Error::Overflow));
        assert!(client.transport.written().is_empty());
    }
}
