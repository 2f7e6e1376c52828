use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{info, warn};

use crate::session::{ChannelEvent, Connector, Transport};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens nonblocking TCP line channels. Address parse/resolve failures are
/// returned to the caller before any socket exists.
#[derive(Debug, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    fn connect(&mut self, address: &str) -> std::io::Result<Box<dyn Transport>> {
        let addr: SocketAddr = address.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("address '{address}' did not resolve"),
            )
        })?;

        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)?;
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        info!("opened channel to {addr}");

        Ok(Box::new(TcpTransport::new(stream, addr)))
    }
}

/// A connected JSON-line channel over nonblocking TCP. Sends are buffered
/// and flushed on the next poll; receives are split on newlines.
pub struct TcpTransport {
    stream: TcpStream,
    addr: SocketAddr,
    read_buf: Vec<u8>,
    write_buf: Vec<u8>,
    opened_reported: bool,
    closed: bool,
    closed_reported: bool,
}

impl TcpTransport {
    fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            stream,
            addr,
            read_buf: Vec::new(),
            write_buf: Vec::new(),
            opened_reported: false,
            closed: false,
            closed_reported: false,
        }
    }

    fn flush_outgoing(&mut self) {
        while !self.write_buf.is_empty() {
            match self.stream.write(&self.write_buf) {
                Ok(0) => {
                    self.closed = true;
                    return;
                }
                Ok(written) => {
                    self.write_buf.drain(..written);
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => return,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("send to {} failed: {err}", self.addr);
                    self.closed = true;
                    return;
                }
            }
        }
    }

    fn read_incoming(&mut self) {
        let mut buf = [0u8; 4096];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) => {
                    self.closed = true;
                    return;
                }
                Ok(received) => self.read_buf.extend_from_slice(&buf[..received]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => return,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("receive from {} failed: {err}", self.addr);
                    self.closed = true;
                    return;
                }
            }
        }
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, line: &str) {
        if self.closed {
            return;
        }
        self.write_buf.extend_from_slice(line.as_bytes());
        self.write_buf.push(b'\n');
    }

    fn poll(&mut self) -> Vec<ChannelEvent> {
        let mut events = Vec::new();

        if !self.opened_reported {
            self.opened_reported = true;
            events.push(ChannelEvent::Opened);
        }

        if !self.closed {
            self.flush_outgoing();
        }
        if !self.closed {
            self.read_incoming();
        }

        while let Some(newline) = self.read_buf.iter().position(|&byte| byte == b'\n') {
            let raw: Vec<u8> = self.read_buf.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1])
                .trim_end_matches('\r')
                .to_string();
            if !line.is_empty() {
                events.push(ChannelEvent::Message(line));
            }
        }

        if self.closed && !self.closed_reported {
            self.closed_reported = true;
            events.push(ChannelEvent::Closed);
        }

        events
    }
}
