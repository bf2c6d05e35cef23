use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;

use crate::registry::CommandRegistry;

/// Bind the command listener and serve it on a background thread.
/// Returns the bound address (useful with a `:0` port request).
pub fn spawn_server(
    bind: &str,
    registry: CommandRegistry,
) -> Result<(SocketAddr, thread::JoinHandle<()>), String> {
    let listener = TcpListener::bind(bind)
        .map_err(|e| format!("Failed to bind command listener on {bind}: {e}"))?;
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to read listener address: {e}"))?;
    let handle = thread::spawn(move || serve(listener, registry));
    Ok((addr, handle))
}

/// Accept loop: one thread per client, line-in/line-out.
pub fn serve(listener: TcpListener, registry: CommandRegistry) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let registry = registry.clone();
                thread::spawn(move || {
                    if let Err(err) = handle_client(stream, &registry) {
                        eprintln!("Command client error: {err}");
                    }
                });
            }
            Err(err) => {
                eprintln!("Command accept error: {err}");
            }
        }
    }
}

/// Replies `OK` / `OK <text>` on success and `ERR <message>` on failure,
/// one line per received command.
fn handle_client(stream: TcpStream, registry: &CommandRegistry) -> Result<(), String> {
    let reader = BufReader::new(stream.try_clone().map_err(|e| e.to_string())?);
    let mut writer = stream;
    for line in reader.lines() {
        let line = line.map_err(|e| e.to_string())?;
        if line.trim().is_empty() {
            continue;
        }
        log::debug!("remote command: {}", line.trim());
        let reply = match registry.dispatch(&line) {
            Ok(msg) if msg.is_empty() => "OK".to_string(),
            Ok(msg) => format!("OK {msg}"),
            Err(msg) => format!("ERR {msg}"),
        };
        writer
            .write_all(format!("{reply}\n").as_bytes())
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}
