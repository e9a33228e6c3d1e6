use nix::errno::Errno;
use std::fmt;

/// CPU scheduling policies understood by this tool, in the order they are
/// reported by `--max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Other,
    Fifo,
    Rr,
    Batch,
}

impl Policy {
    pub const ALL: [Policy; 4] = [Policy::Other, Policy::Fifo, Policy::Rr, Policy::Batch];

    /// Raw kernel identifier for the policy.
    pub fn raw(self) -> libc::c_int {
        match self {
            Policy::Other => libc::SCHED_OTHER,
            Policy::Fifo => libc::SCHED_FIFO,
            Policy::Rr => libc::SCHED_RR,
            Policy::Batch => libc::SCHED_BATCH,
        }
    }

    pub fn from_raw(raw: libc::c_int) -> Option<Self> {
        match raw {
            x if x == libc::SCHED_OTHER => Some(Policy::Other),
            x if x == libc::SCHED_FIFO => Some(Policy::Fifo),
            x if x == libc::SCHED_RR => Some(Policy::Rr),
            x if x == libc::SCHED_BATCH => Some(Policy::Batch),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Policy::Other => "SCHED_OTHER",
            Policy::Fifo => "SCHED_FIFO",
            Policy::Rr => "SCHED_RR",
            Policy::Batch => "SCHED_BATCH",
        }
    }
}

/// Human-readable name for a raw policy value as returned by the kernel.
/// The kernel can report policies outside the four this tool sets, e.g.
/// SCHED_IDLE for a pid it never touched.
pub fn schedstr(raw: libc::c_int) -> &'static str {
    Policy::from_raw(raw).map_or("UNKNOWN", Policy::name)
}

/// A scheduler syscall rejection, carrying the errno the kernel handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelError {
    errno: Errno,
}

impl KernelError {
    fn last() -> Self {
        KernelError {
            errno: Errno::last(),
        }
    }

    pub fn code(&self) -> i32 {
        self.errno as i32
    }

    pub fn message(&self) -> &'static str {
        self.errno.desc()
    }
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.errno.desc())
    }
}

impl std::error::Error for KernelError {}

#[cfg(test)]
impl From<Errno> for KernelError {
    fn from(errno: Errno) -> Self {
        KernelError { errno }
    }
}

/// Scheduler attribute access for a target process. Pid 0 addresses the
/// calling process, as in the underlying syscalls.
#[cfg_attr(test, mockall::automock)]
pub trait Scheduler {
    /// Raw scheduling policy currently applied to `pid`.
    fn scheduler_of(&self, pid: libc::pid_t) -> Result<libc::c_int, KernelError>;

    /// Set policy and priority for `pid` in a single syscall.
    fn set_scheduler(
        &self,
        pid: libc::pid_t,
        policy: Policy,
        priority: i32,
    ) -> Result<(), KernelError>;

    /// Current real-time priority of `pid`.
    fn priority_of(&self, pid: libc::pid_t) -> Result<i32, KernelError>;

    fn priority_min(&self, policy: Policy) -> Result<i32, KernelError>;

    fn priority_max(&self, policy: Policy) -> Result<i32, KernelError>;
}

/// The real thing: thin wrappers over the sched_* syscalls.
pub struct KernelScheduler;

impl Scheduler for KernelScheduler {
    fn scheduler_of(&self, pid: libc::pid_t) -> Result<libc::c_int, KernelError> {
        let rc = unsafe { libc::sched_getscheduler(pid) };
        if rc < 0 {
            return Err(KernelError::last());
        }
        Ok(rc)
    }

    fn set_scheduler(
        &self,
        pid: libc::pid_t,
        policy: Policy,
        priority: i32,
    ) -> Result<(), KernelError> {
        let param = libc::sched_param {
            sched_priority: priority,
        };
        let rc = unsafe { libc::sched_setscheduler(pid, policy.raw(), &param) };
        if rc < 0 {
            return Err(KernelError::last());
        }
        Ok(())
    }

    fn priority_of(&self, pid: libc::pid_t) -> Result<i32, KernelError> {
        let mut param = libc::sched_param { sched_priority: -1 };
        let rc = unsafe { libc::sched_getparam(pid, &mut param) };
        if rc != 0 {
            return Err(KernelError::last());
        }
        Ok(param.sched_priority)
    }

    fn priority_min(&self, policy: Policy) -> Result<i32, KernelError> {
        let rc = unsafe { libc::sched_get_priority_min(policy.raw()) };
        if rc < 0 {
            return Err(KernelError::last());
        }
        Ok(rc)
    }

    fn priority_max(&self, policy: Policy) -> Result<i32, KernelError> {
        let rc = unsafe { libc::sched_get_priority_max(policy.raw()) };
        if rc < 0 {
            return Err(KernelError::last());
        }
        Ok(rc)
    }
}
