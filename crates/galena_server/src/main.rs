mod commands;
mod net;
mod server;
mod world;

use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use server::ServerConfig;

const DEFAULT_PORT: u16 = 25600;

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut port: u16 = DEFAULT_PORT;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let Some(value) = args.next() else {
                    eprintln!("--port expects a numeric argument");
                    std::process::exit(2);
                };
                match value.parse::<u16>() {
                    Ok(parsed) => port = parsed,
                    Err(err) => {
                        eprintln!("invalid port '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--help" | "-h" => {
                println!("Usage: galena_server [--port <u16>]");
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nShutdown signal received");
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    let config = ServerConfig { port };
    if let Err(err) = server::run(config, running) {
        eprintln!("server failed: {err}");
        std::process::exit(1);
    }
}
