use std::env;
use std::process::ExitCode;

use timer_sync::{client, model::command::Command, server};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    let result = match args.get(1).map(String::as_str) {
        None | Some("server") => server::main(),
        Some("client") => match client_args(&args[2..]) {
            Some((url, command)) => client::main(url, command),
            None => {
                print_usage();
                return ExitCode::FAILURE;
            }
        },
        Some(_) => {
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `[URL] [COMMAND]`, in either order.
fn client_args(rest: &[String]) -> Option<(String, Option<Command>)> {
    let mut url = None;
    let mut command = None;
    for arg in rest {
        if let Ok(c) = arg.parse::<Command>() {
            command = Some(c);
        } else if url.is_none() {
            url = Some(arg.clone());
        } else {
            return None;
        }
    }
    Some((url.unwrap_or_else(|| client::DEFAULT_URL.to_owned()), command))
}

fn print_usage() {
    println!("Timer Sync");
    println!("Usage:");
    println!("  timer-sync [server]                 - Start the timer server (PORT, default 8080)");
    println!("  timer-sync client [URL] [COMMAND]   - Watch the timer, optionally sending start|stop|reset");
}
