use stripmon_cli::server::spawn_server;
use stripmon_cli::{send_command, CommandRegistry};

#[test]
fn dispatch_splits_name_and_argument() {
    let registry = CommandRegistry::new();
    registry.add_cmd("Echo", |arg| Ok(arg.to_string()));
    assert_eq!(registry.dispatch("Echo hello world"), Ok("hello world".to_string()));
    assert_eq!(registry.dispatch("Echo"), Ok(String::new()));
    assert_eq!(registry.dispatch("  Echo   padded  "), Ok("padded".to_string()));
}

#[test]
fn unknown_and_empty_commands_error() {
    let registry = CommandRegistry::new();
    assert!(registry.dispatch("Nope").is_err());
    assert!(registry.dispatch("   ").is_err());
}

#[test]
fn handler_may_register_further_commands() {
    let registry = CommandRegistry::new();
    let inner = registry.clone();
    registry.add_cmd("AddEcho", move |name| {
        let cmd = format!("{name}_Echo");
        inner.add_cmd(cmd.clone(), |arg| Ok(arg.to_string()));
        Ok(String::new())
    });

    assert_eq!(registry.dispatch("AddEcho temp1"), Ok(String::new()));
    assert!(registry.contains("temp1_Echo"));
    assert_eq!(registry.dispatch("temp1_Echo hi"), Ok("hi".to_string()));

    assert!(registry.remove_cmd("temp1_Echo"));
    assert!(registry.dispatch("temp1_Echo hi").is_err());
}

#[test]
fn command_names_are_sorted() {
    let registry = CommandRegistry::new();
    registry.add_cmd("B", |_| Ok(String::new()));
    registry.add_cmd("A", |_| Ok(String::new()));
    assert_eq!(registry.command_names(), vec!["A".to_string(), "B".to_string()]);
}

#[test]
fn server_round_trip_over_loopback() {
    let registry = CommandRegistry::new();
    registry.add_cmd("Ping", |_| Ok("pong".to_string()));
    registry.add_cmd("Fail", |_| Err("broken on purpose".to_string()));
    registry.add_cmd("Silent", |_| Ok(String::new()));

    let (addr, _handle) = spawn_server("127.0.0.1:0", registry).unwrap();
    let addr = addr.to_string();

    assert_eq!(send_command(&addr, "Ping").unwrap(), "OK pong");
    assert_eq!(send_command(&addr, "Silent").unwrap(), "OK");
    assert_eq!(send_command(&addr, "Fail").unwrap(), "ERR broken on purpose");
    assert_eq!(
        send_command(&addr, "Missing").unwrap(),
        "ERR Unknown command 'Missing'."
    );
}

#[test]
fn client_reports_unreachable_monitor() {
    // A port nothing listens on; connect must fail with a helpful message.
    let err = send_command("127.0.0.1:1", "Ping").unwrap_err();
    assert!(err.contains("Is it running?"));
}
