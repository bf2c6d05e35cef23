pub mod client;
pub mod registry;
pub mod server;

pub use client::send_command;
pub use registry::CommandRegistry;
