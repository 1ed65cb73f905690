use crate::error::ShellError;
use crate::shell::{Status, PROG};
use log::debug;
use nix::errno::Errno;
use nix::libc::{self, c_char, STDERR_FILENO};
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{fork, write, ForkResult, Pid};
use once_cell::sync::Lazy;
use std::ffi::CString;
use std::io::Write;
use std::ptr;
use std::sync::{Mutex, PoisonError};

/// Children that were stopped rather than terminated, still to be reaped.
static STOPPED: Lazy<Mutex<Vec<Pid>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Runs an external program and waits for it.
///
/// - `argv[0]` is resolved through `PATH` by `execvp`; the remaining tokens
///   are passed through verbatim.
/// - The child inherits stdin, stdout and stderr, and gets the default
///   SIGPIPE disposition back.
/// - If the program cannot be executed, the child reports it and exits with
///   status 1. The parent is unaffected.
/// - Control returns when the child exits, is killed, or is stopped. A stopped
///   child is reported on `err` and left as it is.
pub fn launch(argv: &[String], err: &mut dyn Write) -> Result<Status, ShellError> {
    if argv.is_empty() {
        return Ok(Status::Continue);
    }

    // Everything the child needs is allocated before forking.
    let cargs = argv
        .iter()
        .map(|arg| CString::new(arg.as_str()).map_err(|_| ShellError::NulByte(arg.clone())))
        .collect::<Result<Vec<_>, _>>()?;
    let mut ptrs: Vec<*const c_char> = cargs.iter().map(|arg| arg.as_ptr()).collect();
    ptrs.push(ptr::null());
    let prefix = format!("{}: {}: ", PROG, argv[0]);

    // Safety: the child only calls async-signal-safe functions before exec.
    match unsafe { fork() } {
        Ok(ForkResult::Child) => exec_child(&ptrs, prefix.as_bytes()),
        Ok(ForkResult::Parent { child }) => {
            debug!("launched {} as pid {}", argv[0], child);
            wait_for(child, err)?;
            Ok(Status::Continue)
        }
        Err(errno) => Err(ShellError::Fork(errno)),
    }
}

/// `argv` is null-terminated and points into `CString`s owned by the parent's
/// copy of the address space.
fn exec_child(argv: &[*const c_char], prefix: &[u8]) -> ! {
    // Safety: sigaction, execvp, write and _exit are async-signal-safe, and
    // nothing here allocates.
    unsafe {
        // The Rust runtime ignores SIGPIPE; launched programs expect the default.
        let _ = signal(Signal::SIGPIPE, SigHandler::SigDfl);
        libc::execvp(argv[0], argv.as_ptr());
    }
    let errno = Errno::last();
    let _ = write(STDERR_FILENO, prefix);
    let _ = write(STDERR_FILENO, errno.desc().as_bytes());
    let _ = write(STDERR_FILENO, b"\n");
    unsafe { libc::_exit(1) }
}

fn wait_for(child: Pid, err: &mut dyn Write) -> Result<(), ShellError> {
    loop {
        match waitpid(child, Some(WaitPidFlag::WUNTRACED)) {
            Ok(WaitStatus::Exited(pid, code)) => {
                debug!("pid {} exited with status {}", pid, code);
                return Ok(());
            }
            Ok(WaitStatus::Signaled(pid, sig, _)) => {
                debug!("pid {} killed by {}", pid, sig.as_str());
                return Ok(());
            }
            Ok(WaitStatus::Stopped(pid, sig)) => {
                STOPPED
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(pid);
                writeln!(err, "{}: [{}] stopped by {}", PROG, pid, sig.as_str())
                    .map_err(|e| ShellError::io("write", e))?;
                return Ok(());
            }
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(errno) => return Err(ShellError::sys("waitpid", errno)),
        }
    }
}

/// Reaps stopped children that have since terminated. Never blocks.
pub fn reap_stopped() {
    let mut stopped = STOPPED.lock().unwrap_or_else(PoisonError::into_inner);
    stopped.retain(|&pid| match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::StillAlive) | Err(Errno::EINTR) => true,
        Ok(status) => {
            debug!("reaped stopped child {}: {:?}", pid, status);
            false
        }
        Err(_) => false,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn test_launch_true_continues() {
        let mut err = Vec::new();
        let status = launch(&argv(&["true"]), &mut err).unwrap();
        assert_eq!(status, Status::Continue);
        assert!(err.is_empty());
    }

    #[test]
    fn test_failing_program_still_continues() {
        let mut err = Vec::new();
        let status = launch(&argv(&["false"]), &mut err).unwrap();
        assert_eq!(status, Status::Continue);
    }

    #[test]
    fn test_missing_program_continues() {
        let mut err = Vec::new();
        let status = launch(&argv(&["smartshell-no-such-program"]), &mut err).unwrap();
        assert_eq!(status, Status::Continue);
    }

    #[test]
    fn test_interior_nul_is_rejected_before_fork() {
        let mut err = Vec::new();
        let result = launch(&argv(&["echo", "a\0b"]), &mut err);
        assert!(matches!(result, Err(ShellError::NulByte(arg)) if arg == "a\0b"));
    }

    #[test]
    fn test_stopped_child_is_reported_then_reaped() {
        use nix::sys::signal::kill;
        use std::thread;
        use std::time::Duration;

        let mut err = Vec::new();
        let status = launch(&argv(&["sh", "-c", "kill -STOP $$"]), &mut err).unwrap();
        assert_eq!(status, Status::Continue);

        let report = String::from_utf8(err).unwrap();
        assert!(report.starts_with("smartshell: ["));
        assert!(report.ends_with("] stopped by SIGSTOP\n"));
        let pid: i32 = report
            .split(|c: char| c == '[' || c == ']')
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        let pid = Pid::from_raw(pid);
        assert!(STOPPED.lock().unwrap().contains(&pid));

        // Still stopped: nothing to reap yet.
        reap_stopped();
        assert!(STOPPED.lock().unwrap().contains(&pid));

        kill(pid, Signal::SIGKILL).unwrap();
        for _ in 0..200 {
            reap_stopped();
            if !STOPPED.lock().unwrap().contains(&pid) {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!STOPPED.lock().unwrap().contains(&pid));
        assert_eq!(
            waitpid(pid, Some(WaitPidFlag::WNOHANG)),
            Err(Errno::ECHILD)
        );
    }
}
