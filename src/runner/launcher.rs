use crate::sched::{Policy, Scheduler};
use anyhow::{Context, Result};
use log::{debug, info};
use std::convert::Infallible;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::Command;

/// Replaces the current process image with another command. Split out so
/// tests can intercept the exec instead of actually performing it.
#[cfg_attr(test, mockall::automock)]
pub trait ImageReplacer {
    /// On success this never returns; the only value that comes back is the
    /// exec failure.
    fn replace(&self, command: &str, args: &[String]) -> io::Error;
}

/// execvp via std: searches PATH and inherits the just-set scheduler
/// attributes along with everything else.
pub struct Execvp;

impl ImageReplacer for Execvp {
    fn replace(&self, command: &str, args: &[String]) -> io::Error {
        Command::new(command).args(args).exec()
    }
}

/// Launches a command under a scheduling policy by changing the calling
/// process's scheduler first and then exec-ing the command into this pid.
pub struct Launcher {
    policy: Policy,
    priority: i32,
    command: String,
    args: Vec<String>,
}

impl Launcher {
    pub fn new(policy: Policy, priority: i32, command: String, args: Vec<String>) -> Self {
        debug!(
            "Initializing launcher: {} priority {} for '{}' {:?}",
            policy.name(),
            priority,
            command,
            args
        );
        Launcher {
            policy,
            priority,
            command,
            args,
        }
    }

    /// One-way on success: the process becomes the launched command. Both
    /// failure modes are fatal, the scheduler change on self as much as the
    /// exec itself.
    pub fn execute(
        self,
        sched: &dyn Scheduler,
        replacer: &dyn ImageReplacer,
    ) -> Result<Infallible> {
        sched
            .set_scheduler(0, self.policy, self.priority)
            .with_context(|| {
                format!(
                    "failed to set own policy to {} priority {}",
                    self.policy.name(),
                    self.priority
                )
            })?;

        info!(
            "Scheduler set to {} priority {}, executing '{}'",
            self.policy.name(),
            self.priority,
            self.command
        );

        let error = replacer.replace(&self.command, &self.args);

        // *If* we get here, exec has failed.
        Err(error).with_context(|| format!("failed to execute '{}'", self.command))
    }
}
