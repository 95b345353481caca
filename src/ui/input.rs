use crate::app::ConnectionConfig;
use crate::dashboard::Command;
use std::io::BufRead;
use std::thread;
use tokio::sync::mpsc;

pub const HELP: &str = "commands: r refresh · s <n> select board · n new board · d delete board · c configure · q quit";

#[derive(Debug, PartialEq)]
enum Action {
    Refresh,
    Select(usize),
    NewBoard,
    Delete,
    Configure,
    Quit,
    Help,
}

fn parse_line(line: &str) -> Option<Action> {
    let mut words = line.split_whitespace();
    let action = match words.next()? {
        "r" | "refresh" => Action::Refresh,
        "s" | "select" => Action::Select(words.next()?.parse().ok()?),
        "n" | "new" => Action::NewBoard,
        "d" | "delete" => Action::Delete,
        "c" | "config" | "configure" => Action::Configure,
        "q" | "quit" | "exit" => Action::Quit,
        "h" | "help" | "?" => Action::Help,
        _ => return None,
    };
    Some(action)
}

/// Read terminal commands on a dedicated thread. Forms run on this thread
/// too, so prompts never compete with the command reader for stdin.
pub fn spawn_input_thread(
    mut current: Option<ConnectionConfig>,
    tx: mpsc::UnboundedSender<Command>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let command = match parse_line(&line) {
                Some(Action::Refresh) => Command::Refresh,
                Some(Action::Select(n)) => Command::Select(n),
                Some(Action::Delete) => Command::DeleteActive,
                Some(Action::Quit) => Command::Quit,
                Some(Action::NewBoard) => match super::board_form::prompt_new_board() {
                    Ok(Some(board)) => Command::CreateBoard(board),
                    Ok(None) => continue,
                    Err(e) => {
                        log::warn!("board form: {}", e);
                        continue;
                    }
                },
                Some(Action::Configure) => match super::config_form::prompt_connection(current.as_ref()) {
                    Ok(cfg) => {
                        current = Some(cfg.clone());
                        Command::Configure(cfg)
                    }
                    Err(e) => {
                        log::warn!("configuration form: {}", e);
                        continue;
                    }
                },
                Some(Action::Help) => {
                    println!("{}", HELP);
                    continue;
                }
                None => {
                    println!("unknown command '{}'; {}", line.trim(), HELP);
                    continue;
                }
            };
            let quit = matches!(command, Command::Quit);
            if tx.send(command).is_err() || quit {
                break;
            }
        }
    })
}
