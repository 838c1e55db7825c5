//! Registration and state for the sender-reporting signal handler.
//!
//! The handler may run more than once if the awaited signal is delivered
//! repeatedly before the main loop notices; each run prints one line and the
//! last run wins the stored pid. Signal coalescing makes anything stronger
//! unobservable, so no ordering between rapid deliveries is promised.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use libc::{c_int, c_void};
use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

/// Set once by the handler; polled by the idle loop. Never reset.
static RECEIVED_SIGNAL: AtomicBool = AtomicBool::new(false);

/// Pid of the process whose signal the handler last observed.
static SENDER_PID: AtomicI32 = AtomicI32::new(0);

/// Descriptor the handler reports the sender on. Unit tests swap in a pipe.
static OUTPUT_FD: AtomicI32 = AtomicI32::new(libc::STDOUT_FILENO);

/// Longest possible report line: `i32::MIN` in decimal plus the newline.
const PID_LINE_CAP: usize = 12;

/// Arms `signal` with the sender-reporting handler.
///
/// Requests `SA_SIGINFO` delivery so the kernel hands the handler the
/// sender's pid alongside the signal number. Fails with the raw errno of
/// `sigaction(2)`, e.g. `EINVAL` for uncatchable signals.
pub fn install_report_handler(signal: Signal) -> Result<(), Errno> {
    let action = SigAction::new(
        SigHandler::SigAction(report_sender),
        SaFlags::SA_SIGINFO,
        SigSet::empty(),
    );
    // SAFETY: report_sender touches only atomics and write(2), all of which
    // are async-signal-safe.
    unsafe { sigaction(signal, &action) }?;
    Ok(())
}

/// True once the awaited signal has been observed.
pub fn received() -> bool {
    RECEIVED_SIGNAL.load(Ordering::Acquire)
}

/// Pid stored by the most recent handler run. Only meaningful once
/// [`received`] returns true.
pub fn sender_pid() -> i32 {
    SENDER_PID.load(Ordering::Acquire)
}

/// The handler itself. Preempts the main loop at an arbitrary point, so the
/// body is restricted to atomic loads/stores and a single write(2): no
/// allocation, no locking, no formatting machinery.
extern "C" fn report_sender(_signum: c_int, info: *mut libc::siginfo_t, _context: *mut c_void) {
    // SAFETY: with SA_SIGINFO set the kernel always passes a valid siginfo
    // pointer, and si_pid is populated for kill-originated signals.
    let pid = unsafe { (*info).si_pid() };

    let mut buf = [0u8; PID_LINE_CAP];
    let line = format_pid_line(&mut buf, pid);
    let fd = OUTPUT_FD.load(Ordering::Relaxed);
    // Nothing useful can be done about a short or failed write here.
    let _ = unsafe { libc::write(fd, line.as_ptr().cast(), line.len()) };

    SENDER_PID.store(pid, Ordering::Relaxed);
    // Release pairs with the Acquire in received().
    RECEIVED_SIGNAL.store(true, Ordering::Release);
}

/// Formats `pid` as a newline-terminated decimal into `buf`, back to front,
/// without allocating. Returns the filled tail of the buffer.
fn format_pid_line(buf: &mut [u8; PID_LINE_CAP], pid: i32) -> &[u8] {
    let mut end = buf.len() - 1;
    buf[end] = b'\n';

    // Widen before negating so i32::MIN survives.
    let mut value = i64::from(pid);
    let negative = value < 0;
    if negative {
        value = -value;
    }

    if value == 0 {
        end -= 1;
        buf[end] = b'0';
    }
    while value > 0 {
        end -= 1;
        buf[end] = b'0' + (value % 10) as u8;
        value /= 10;
    }
    if negative {
        end -= 1;
        buf[end] = b'-';
    }

    &buf[end..]
}
