use std::fmt;

use log::{debug, error, info};
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::sys::wait::WaitPidFlag as WF;
use nix::sys::wait::WaitStatus as WS;
use nix::unistd::Pid;

/// What one `waitpid` call observed.
#[derive(Copy, Clone, PartialEq, Eq)]
pub enum WaitStatus {
    Exited(Pid, i32),
    Signaled(Pid, i32),
    /// Non-blocking wait with nothing finished yet.
    StillAlive,
    Error(Errno),
}

impl WaitStatus {
    pub fn get_pid(&self) -> Option<Pid> {
        match self {
            WaitStatus::Exited(pid, _) | WaitStatus::Signaled(pid, _) => Some(*pid),
            _ => None,
        }
    }

    /// Shell-style status: the exit code, or 128 + signal number.
    pub fn get_status(&self) -> i32 {
        match self {
            WaitStatus::Exited(_, status) => *status,
            WaitStatus::Signaled(_, sig) => 128 + sig,
            WaitStatus::StillAlive => 0,
            WaitStatus::Error(_) => 1,
        }
    }
}

impl fmt::Debug for WaitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitStatus::Exited(pid, status) => write!(f, "Exited(pid={}, status={})", pid, status),
            WaitStatus::Signaled(pid, sig) => write!(f, "Signaled(pid={}, signal={})", pid, sig),
            WaitStatus::StillAlive => write!(f, "StillAlive"),
            WaitStatus::Error(errno) => write!(f, "Error({})", errno),
        }
    }
}

/// `waitpid` reduced to termination events. `None` waits for any child.
pub fn waitpidx(pid: Option<Pid>, block: bool) -> WaitStatus {
    let options = if block { None } else { Some(WF::WNOHANG) };
    loop {
        match waitpid(pid, options) {
            Ok(WS::Exited(pid, status)) => return WaitStatus::Exited(pid, status),
            Ok(WS::Signaled(pid, sig, _core_dumped)) => {
                return WaitStatus::Signaled(pid, sig as i32)
            }
            Ok(WS::StillAlive) => return WaitStatus::StillAlive,
            // stop/continue reports are only delivered when asked for
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => return WaitStatus::Error(e),
        }
    }
}

/// Blocks until `pid` terminates and returns its shell-style status.
pub fn wait_child(pid: Pid) -> i32 {
    let ws = waitpidx(Some(pid), true);
    if let WaitStatus::Error(e) = ws {
        error!("waitpid {} failed: {}", pid, e);
    } else {
        debug!("child {:?}", ws);
    }
    ws.get_status()
}

/// Collects every child that has already terminated, without blocking.
pub fn reap_finished() -> usize {
    let mut reaped = 0;
    loop {
        let ws = waitpidx(None, false);
        match ws.get_pid() {
            Some(pid) => {
                info!("reaped {} ({:?})", pid, ws);
                reaped += 1;
            }
            // StillAlive, or ECHILD once no children are left
            None => return reaped,
        }
    }
}
