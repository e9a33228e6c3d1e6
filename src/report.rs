use crate::sched::{Policy, Scheduler, schedstr};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;

/// Print the valid priority range for one policy, re-queried from the kernel
/// on every call. The field is padded to 32 columns as the classic chrt
/// output does.
pub fn write_priority_limits(
    out: &mut impl Write,
    sched: &dyn Scheduler,
    policy: Policy,
) -> Result<()> {
    let min = sched
        .priority_min(policy)
        .with_context(|| format!("sched_get_priority_min({})", policy.name()))?;
    let max = sched
        .priority_max(policy)
        .with_context(|| format!("sched_get_priority_max({})", policy.name()))?;

    debug!("{}: priority range {}..={}", policy.name(), min, max);
    writeln!(
        out,
        "{:<32.32}: {}/{}",
        format!("{} min/max priority", policy.name()),
        min,
        max
    )?;
    Ok(())
}

/// One line per policy, fixed order: OTHER, FIFO, RR, BATCH.
pub fn write_all_priority_limits(out: &mut impl Write, sched: &dyn Scheduler) -> Result<()> {
    for policy in Policy::ALL {
        write_priority_limits(out, sched, policy)?;
    }
    Ok(())
}

/// Report the current policy and priority of `pid`. A pid the kernel refuses
/// to answer for (gone, or not ours to inspect) propagates as the underlying
/// kernel error.
pub fn write_settings(out: &mut impl Write, sched: &dyn Scheduler, pid: libc::pid_t) -> Result<()> {
    let raw_policy = sched
        .scheduler_of(pid)
        .with_context(|| format!("sched_getscheduler({})", pid))?;
    let priority = sched
        .priority_of(pid)
        .with_context(|| format!("sched_getparam({})", pid))?;

    writeln!(
        out,
        "pid {}'s current scheduling policy: {}",
        pid,
        schedstr(raw_policy)
    )?;
    writeln!(out, "pid {}'s current scheduling priority: {}", pid, priority)?;
    Ok(())
}

/// Apply a new policy and priority to an existing pid. Kernel rejection is
/// reported on stdout and swallowed; the invocation still exits cleanly.
pub fn change_settings(
    out: &mut impl Write,
    sched: &dyn Scheduler,
    pid: libc::pid_t,
    policy: Policy,
    priority: i32,
) -> Result<()> {
    debug!(
        "Requesting {} priority {} for pid {}",
        policy.name(),
        priority,
        pid
    );

    match sched.set_scheduler(pid, policy, priority) {
        Ok(()) => {
            info!(
                "Set pid {} to {} priority {}",
                pid,
                policy.name(),
                priority
            );
        }
        Err(err) => {
            warn!("Kernel rejected the change for pid {}: {}", pid, err);
            writeln!(out, "sched_setscheduler: {}", err.message())?;
            writeln!(out, "failed to set pid {}'s policy", pid)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::{KernelError, MockScheduler};
    use mockall::predicate::eq;
    use nix::errno::Errno;

    fn render<F>(run: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut out = Vec::new();
        run(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn limits_line_uses_padded_format() {
        let mut sched = MockScheduler::new();
        sched
            .expect_priority_min()
            .with(eq(Policy::Fifo))
            .returning(|_| Ok(1));
        sched
            .expect_priority_max()
            .with(eq(Policy::Fifo))
            .returning(|_| Ok(99));

        let text = render(|out| write_priority_limits(out, &sched, Policy::Fifo));
        assert_eq!(text, format!("{:<32.32}: 1/99\n", "SCHED_FIFO min/max priority"));
    }

    #[test]
    fn all_limits_prints_four_lines_in_fixed_order() {
        let mut sched = MockScheduler::new();
        sched.expect_priority_min().returning(|_| Ok(0));
        sched.expect_priority_max().returning(|_| Ok(0));

        let text = render(|out| write_all_priority_limits(out, &sched));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("SCHED_OTHER min/max priority"));
        assert!(lines[1].starts_with("SCHED_FIFO min/max priority"));
        assert!(lines[2].starts_with("SCHED_RR min/max priority"));
        assert!(lines[3].starts_with("SCHED_BATCH min/max priority"));
    }

    #[test]
    fn settings_report_prints_policy_and_priority() {
        let mut sched = MockScheduler::new();
        sched
            .expect_scheduler_of()
            .with(eq(1234))
            .returning(|_| Ok(libc::SCHED_RR));
        sched
            .expect_priority_of()
            .with(eq(1234))
            .returning(|_| Ok(42));

        let text = render(|out| write_settings(out, &sched, 1234));
        assert_eq!(
            text,
            "pid 1234's current scheduling policy: SCHED_RR\n\
             pid 1234's current scheduling priority: 42\n"
        );
    }

    #[test]
    fn settings_report_names_unknown_policies() {
        let mut sched = MockScheduler::new();
        sched
            .expect_scheduler_of()
            .returning(|_| Ok(libc::SCHED_IDLE));
        sched.expect_priority_of().returning(|_| Ok(0));

        let text = render(|out| write_settings(out, &sched, 1));
        assert!(text.contains("scheduling policy: UNKNOWN"));
    }

    #[test]
    fn settings_report_propagates_kernel_errors() {
        let mut sched = MockScheduler::new();
        sched
            .expect_scheduler_of()
            .returning(|_| Err(KernelError::from(Errno::ESRCH)));

        let mut out = Vec::new();
        let err = write_settings(&mut out, &sched, 99999).unwrap_err();
        assert!(err.to_string().contains("sched_getscheduler(99999)"));
        assert!(out.is_empty());
    }

    #[test]
    fn change_success_prints_nothing() {
        let mut sched = MockScheduler::new();
        sched
            .expect_set_scheduler()
            .with(eq(1234), eq(Policy::Fifo), eq(10))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let text = render(|out| change_settings(out, &sched, 1234, Policy::Fifo, 10));
        assert!(text.is_empty());
    }

    #[test]
    fn change_rejection_is_reported_not_fatal() {
        let mut sched = MockScheduler::new();
        sched
            .expect_set_scheduler()
            .returning(|_, _, _| Err(KernelError::from(Errno::EINVAL)));

        let text = render(|out| change_settings(out, &sched, 1234, Policy::Other, 50));
        assert!(text.starts_with("sched_setscheduler: "));
        assert!(text.ends_with("failed to set pid 1234's policy\n"));
    }

    #[test]
    fn change_permission_denied_is_reported_not_fatal() {
        let mut sched = MockScheduler::new();
        sched
            .expect_set_scheduler()
            .returning(|_, _, _| Err(KernelError::from(Errno::EPERM)));

        let text = render(|out| change_settings(out, &sched, 1, Policy::Rr, 99));
        assert!(text.contains(Errno::EPERM.desc()));
        assert!(text.contains("failed to set pid 1's policy"));
    }
}
