use anyhow::Result;
use log::debug;
use rchrt::cli::{self, Request};
use rchrt::runner::{Execvp, Launcher};
use rchrt::sched::KernelScheduler;
use rchrt::{logging, report};
use std::io;

fn main() -> Result<()> {
    logging::init(std::env::var_os("RCHRT_DEBUG").is_some())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    debug!("Command line arguments: {:?}", args);

    let request = cli::parse(&args);
    debug!("Resolved request: {:?}", request);

    let sched = KernelScheduler;
    let mut out = io::stdout().lock();

    match request {
        Request::ShowUsage => cli::write_usage(&mut out)?,
        Request::ShowAllLimits => report::write_all_priority_limits(&mut out, &sched)?,
        Request::ShowSettings { pid } => report::write_settings(&mut out, &sched, pid)?,
        Request::ChangeSettings {
            pid,
            policy,
            priority,
        } => report::change_settings(&mut out, &sched, pid, policy, priority)?,
        Request::ChangeThenExec {
            policy,
            priority,
            command,
            args,
        } => {
            drop(out);
            let never = Launcher::new(policy, priority, command, args).execute(&sched, &Execvp)?;
            match never {}
        }
    }

    Ok(())
}
