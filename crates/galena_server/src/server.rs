use std::collections::HashSet;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::IVec3;
use tracing::{info, warn};

use galena_shared::protocol::{self, Message};

use crate::commands::{self, Command};
use crate::net::NetworkServer;
use crate::world::RelayWorld;

const TICK_RATE: u32 = 30;
const TICK_DURATION: Duration = Duration::from_millis(1000 / TICK_RATE as u64);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// The relay: assigns ids, hands joiners the current world snapshot, and
/// forwards every block edit and pose to the other clients. It never
/// simulates and never rejects an edit; clients stay authoritative over
/// their own view.
pub struct RelayServer {
    config: ServerConfig,
    network: NetworkServer,
    world: RelayWorld,
    joined: HashSet<u64>,
    running: Arc<AtomicBool>,
    command_rx: Receiver<Command>,
}

impl RelayServer {
    pub fn new(
        config: ServerConfig,
        running: Arc<AtomicBool>,
        command_rx: Receiver<Command>,
    ) -> Self {
        Self {
            network: NetworkServer::new(config.port),
            world: RelayWorld::new(),
            joined: HashSet::new(),
            config,
            running,
            command_rx,
        }
    }

    pub fn run(&mut self) {
        info!("Starting Galena relay on port {}", self.config.port);

        while self.running.load(Ordering::SeqCst) {
            let tick_start = Instant::now();

            self.network.update();
            self.handle_connections();
            self.handle_disconnections();
            self.receive_messages();
            self.handle_console_commands();

            let elapsed = tick_start.elapsed();
            if elapsed < TICK_DURATION {
                std::thread::sleep(TICK_DURATION - elapsed);
            }
        }

        info!("Relay shutting down");
        for client_id in self.network.connected_clients() {
            self.network.disconnect(client_id);
        }
        self.network.update();
    }

    fn handle_connections(&mut self) {
        for client_id in self.network.take_connected() {
            info!("client {client_id} connected, waiting for join request");
        }
    }

    fn handle_disconnections(&mut self) {
        for client_id in self.network.take_disconnected() {
            let was_joined = self.joined.remove(&client_id);
            if !was_joined {
                continue;
            }

            let left = protocol::encode(&Message::PlayerDisconnect { id: client_id });
            for &other in &self.joined {
                self.network.send_to(other, &left);
            }
        }
    }

    fn receive_messages(&mut self) {
        for client_id in self.network.connected_clients() {
            while let Some(line) = self.network.receive(client_id) {
                match protocol::decode(&line) {
                    Ok(msg) => self.handle_message(client_id, msg),
                    Err(err) => warn!("dropping malformed line from {client_id}: {err}"),
                }
            }
        }
    }

    pub(crate) fn handle_message(&mut self, client_id: u64, msg: Message) {
        match msg {
            Message::Join => {
                let snapshot = self.world.snapshot();
                info!(
                    "client {client_id} joins, sending welcome with {} blocks",
                    snapshot.len()
                );
                self.joined.insert(client_id);
                let welcome = Message::Welcome {
                    id: client_id,
                    world: Some(snapshot),
                };
                self.network.send_to(client_id, &protocol::encode(&welcome));
            }
            Message::BlockChange { x, y, z, block } => {
                self.world.apply(IVec3::new(x, y, z), block);
                self.relay_from(client_id, &Message::BlockChange { x, y, z, block });
            }
            Message::PlayerUpdate { pos, .. } => {
                // the connection's id is the identity; whatever the client
                // claimed is dropped on the floor
                self.relay_from(client_id, &Message::PlayerState { id: client_id, pos });
            }
            Message::Unknown => {
                warn!("ignoring unrecognized message tag from {client_id}");
            }
            other => {
                warn!("ignoring message not addressed to the relay from {client_id}: {other:?}");
            }
        }
    }

    /// Sends to every joined client except the originator.
    fn relay_from(&mut self, sender: u64, msg: &Message) {
        if !self.joined.contains(&sender) {
            return;
        }
        let encoded = protocol::encode(msg);
        let recipients: Vec<u64> = self
            .joined
            .iter()
            .copied()
            .filter(|&other| other != sender)
            .collect();
        for other in recipients {
            self.network.send_to(other, &encoded);
        }
    }

    fn handle_console_commands(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.execute_console_command(command);
        }
    }

    fn execute_console_command(&mut self, command: Command) {
        match command {
            Command::Noop => {}
            Command::Stop => {
                info!("Shutdown requested via console /stop");
                self.running.store(false, Ordering::SeqCst);
            }
            Command::List => self.log_client_list(),
            Command::Kick(client_id) => {
                if self.network.client_addr(client_id).is_some() {
                    info!("[CONSOLE] kicking client {client_id}");
                    self.network.disconnect(client_id);
                } else {
                    warn!("[CONSOLE] /kick failed: client {client_id} is not connected");
                }
            }
            Command::Help => self.log_help(),
            Command::InvalidUsage(message) => warn!("[CONSOLE] {message}"),
            Command::Unknown(input) => {
                warn!("[CONSOLE] unknown command '{input}' (try /help)")
            }
        }
    }

    fn log_client_list(&self) {
        let clients = self.network.connected_clients();
        if clients.is_empty() {
            info!("[CONSOLE] no connected clients");
            return;
        }

        info!(
            "[CONSOLE] connected clients ({}), relaying {} blocks:",
            clients.len(),
            self.world.solid_block_count()
        );
        for client_id in clients {
            let addr = self
                .network
                .client_addr(client_id)
                .map(|addr| addr.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let joined = if self.joined.contains(&client_id) {
                "joined"
            } else {
                "pending"
            };
            info!("[CONSOLE] - client {client_id} ({addr}, {joined})");
        }
    }

    fn log_help(&self) {
        info!("[CONSOLE] Available commands:");
        info!("[CONSOLE]   /help");
        info!("[CONSOLE]   /list");
        info!("[CONSOLE]   /kick <client id>");
        info!("[CONSOLE]   /stop");
    }
}

pub fn run(config: ServerConfig, running: Arc<AtomicBool>) -> io::Result<()> {
    let (command_tx, command_rx) = mpsc::channel();
    spawn_console_command_thread(command_tx);

    let mut server = RelayServer::new(config, running, command_rx);
    server.run();
    Ok(())
}

fn spawn_console_command_thread(command_tx: Sender<Command>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line_result in stdin.lock().lines() {
            let line = match line_result {
                Ok(line) => line,
                Err(err) => {
                    warn!("Failed to read server console input: {err}");
                    break;
                }
            };

            let command = commands::parse_command(&line);
            if command_tx.send(command).is_err() {
                break;
            }
        }
    });
}
