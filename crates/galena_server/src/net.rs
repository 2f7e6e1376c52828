use std::collections::{HashMap, VecDeque};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};

use tracing::{info, warn};

pub const MAX_CLIENTS: usize = 32;

struct ClientConnection {
    stream: TcpStream,
    addr: SocketAddr,
    read_buf: Vec<u8>,
    write_buf: Vec<u8>,
    incoming: VecDeque<String>,
    closed: bool,
}

impl ClientConnection {
    fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            stream,
            addr,
            read_buf: Vec::new(),
            write_buf: Vec::new(),
            incoming: VecDeque::new(),
            closed: false,
        }
    }

    fn queue_line(&mut self, line: &str) {
        if self.closed {
            return;
        }
        self.write_buf.extend_from_slice(line.as_bytes());
        self.write_buf.push(b'\n');
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
                    break;
                }
                Ok(received) => self.read_buf.extend_from_slice(&buf[..received]),
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("receive from {} failed: {err}", self.addr);
                    self.closed = true;
                    break;
                }
            }
        }

        for line in drain_complete_lines(&mut self.read_buf) {
            self.incoming.push_back(line);
        }
    }
}

/// Splits off every complete newline-terminated frame, leaving a partial
/// trailing frame in the buffer for the next read.
fn drain_complete_lines(buf: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(newline) = buf.iter().position(|&byte| byte == b'\n') {
        let raw: Vec<u8> = buf.drain(..=newline).collect();
        let line = String::from_utf8_lossy(&raw[..raw.len() - 1])
            .trim_end_matches('\r')
            .to_string();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Nonblocking TCP listener speaking newline-delimited messages. The relay
/// loop drives it once per tick: accept new sockets, pump per-client IO,
/// then hand out connect/disconnect events and queued lines.
pub struct NetworkServer {
    listener: TcpListener,
    clients: HashMap<u64, ClientConnection>,
    next_client_id: u64,
    connected_events: Vec<u64>,
    disconnected_events: Vec<u64>,
}

impl NetworkServer {
    pub fn new(port: u16) -> Self {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .unwrap_or_else(|err| panic!("failed to bind TCP listener on 0.0.0.0:{port}: {err}"));
        listener
            .set_nonblocking(true)
            .unwrap_or_else(|err| panic!("failed to enable nonblocking TCP listener: {err}"));

        Self {
            listener,
            clients: HashMap::new(),
            next_client_id: 1,
            connected_events: Vec::new(),
            disconnected_events: Vec::new(),
        }
    }

    pub fn update(&mut self) {
        self.connected_events.clear();
        self.disconnected_events.clear();

        self.accept_new_clients();

        for client in self.clients.values_mut() {
            if !client.closed {
                client.flush_outgoing();
            }
            if !client.closed {
                client.read_incoming();
            }
        }

        let closed: Vec<u64> = self
            .clients
            .iter()
            .filter_map(|(id, client)| client.closed.then_some(*id))
            .collect();
        for client_id in closed {
            if let Some(client) = self.clients.remove(&client_id) {
                info!("client {client_id} disconnected ({})", client.addr);
            }
            self.disconnected_events.push(client_id);
        }
    }

    pub fn send_to(&mut self, client_id: u64, line: &str) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.queue_line(line);
        }
    }

    pub fn receive(&mut self, client_id: u64) -> Option<String> {
        self.clients
            .get_mut(&client_id)
            .and_then(|client| client.incoming.pop_front())
    }

    pub fn connected_clients(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.clients.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn client_addr(&self, client_id: u64) -> Option<SocketAddr> {
        self.clients.get(&client_id).map(|client| client.addr)
    }

    pub fn disconnect(&mut self, client_id: u64) {
        if let Some(client) = self.clients.get_mut(&client_id) {
            client.flush_outgoing();
            let _ = client.stream.shutdown(std::net::Shutdown::Both);
            client.closed = true;
        }
    }

    pub fn take_connected(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.connected_events)
    }

    pub fn take_disconnected(&mut self) -> Vec<u64> {
        std::mem::take(&mut self.disconnected_events)
    }

    fn accept_new_clients(&mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if self.clients.len() >= MAX_CLIENTS {
                        warn!("rejecting connection from {addr}: server full");
                        continue;
                    }
                    if let Err(err) = stream.set_nonblocking(true) {
                        warn!("failed to enable nonblocking stream for {addr}: {err}");
                        continue;
                    }
                    let _ = stream.set_nodelay(true);

                    let client_id = self.next_client_id;
                    self.next_client_id = self.next_client_id.saturating_add(1);
                    info!("client {client_id} connected from {addr}");
                    self.clients
                        .insert(client_id, ClientConnection::new(stream, addr));
                    self.connected_events.push(client_id);
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!("accept failed: {err}");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::drain_complete_lines;

    #[test]
    fn complete_frames_split_and_partials_wait() {
        let mut buf = b"{\"type\":\"join\"}\n{\"type\":\"player_up".to_vec();
        assert_eq!(drain_complete_lines(&mut buf), vec!["{\"type\":\"join\"}"]);
        assert_eq!(buf, b"{\"type\":\"player_up".to_vec());

        buf.extend_from_slice(b"date\"}\n");
        assert_eq!(
            drain_complete_lines(&mut buf),
            vec!["{\"type\":\"player_update\"}"]
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn crlf_and_blank_lines_are_tolerated() {
        let mut buf = b"first\r\n\nsecond\n".to_vec();
        assert_eq!(drain_complete_lines(&mut buf), vec!["first", "second"]);
    }
}
