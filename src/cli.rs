use crate::sched::Policy;
use log::debug;
use std::io::{self, Write};

/// The single action an invocation resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ShowUsage,
    ShowAllLimits,
    ShowSettings {
        pid: libc::pid_t,
    },
    ChangeSettings {
        pid: libc::pid_t,
        policy: Policy,
        priority: i32,
    },
    ChangeThenExec {
        policy: Policy,
        priority: i32,
        command: String,
        args: Vec<String>,
    },
}

/// Resolve argv (program name already stripped) into a request.
///
/// Tokens are consumed left to right. The first token that parses as an
/// integer ends flag scanning and becomes the priority; whatever follows it
/// is the command to launch. Anything malformed falls back to ShowUsage
/// rather than surfacing a parse error.
pub fn parse(argv: &[String]) -> Request {
    if argv.is_empty() {
        return Request::ShowUsage;
    }

    let mut policy = Policy::Rr;
    let mut idx = 0;

    let priority = loop {
        let Some(token) = argv.get(idx) else {
            // Ran out of tokens without ever seeing a priority.
            return Request::ShowUsage;
        };
        idx += 1;

        if let Ok(priority) = token.parse::<i32>() {
            break priority;
        }

        match token.as_str() {
            "-h" | "--help" => return Request::ShowUsage,
            "-b" | "--batch" => policy = Policy::Batch,
            "-f" | "--fifo" => policy = Policy::Fifo,
            "-o" | "--other" => policy = Policy::Other,
            "-r" | "--rr" => policy = Policy::Rr,
            "-m" | "--max" => return Request::ShowAllLimits,
            "-p" | "--pid" => return parse_pid_form(policy, &argv[idx..]),
            unknown => {
                debug!("Unrecognized token '{}', showing usage", unknown);
                return Request::ShowUsage;
            }
        }
    };

    match argv.get(idx) {
        Some(command) => Request::ChangeThenExec {
            policy,
            priority,
            command: command.clone(),
            args: argv[idx + 1..].to_vec(),
        },
        None => Request::ShowUsage,
    }
}

/// `-p` takes either a lone pid (report settings) or a priority and a pid
/// (change settings). Tokens past those two are ignored.
fn parse_pid_form(policy: Policy, rest: &[String]) -> Request {
    match rest {
        [] => Request::ShowUsage,
        [pid] => match pid.parse() {
            Ok(pid) => Request::ShowSettings { pid },
            Err(_) => Request::ShowUsage,
        },
        [priority, pid, ..] => match (priority.parse(), pid.parse()) {
            (Ok(priority), Ok(pid)) => Request::ChangeSettings {
                pid,
                policy,
                priority,
            },
            _ => Request::ShowUsage,
        },
    }
}

pub fn write_usage(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "rchrt: manipulate real-time attributes of a process
usage: rchrt [options] [prio] [pid | cmd [args...]]
  -b, --batch                        set policy to SCHED_BATCH
  -f, --fifo                         set policy to SCHED_FIFO
  -p, --pid                          operate on existing given pid
  -m, --max                          show min and max valid priorities
  -o, --other                        set policy to SCHED_OTHER
  -r, --rr                           set policy to SCHED_RR (default)
  -h, --help                         display this help

You must give a priority if changing policy."
    )
}
