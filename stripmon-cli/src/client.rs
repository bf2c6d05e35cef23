use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;

/// Send one command line to a running monitor and return its reply line.
pub fn send_command(addr: &str, command: &str) -> Result<String, String> {
    let mut stream = TcpStream::connect(addr)
        .map_err(|_| format!("Failed to connect to monitor at {addr}. Is it running?"))?;
    stream
        .write_all(format!("{command}\n").as_bytes())
        .map_err(|e| e.to_string())?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).map_err(|e| e.to_string())?;
    if line.trim().is_empty() {
        return Err("Monitor returned empty response".to_string());
    }
    Ok(line.trim().to_string())
}
