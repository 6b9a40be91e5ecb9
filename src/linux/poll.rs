use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use crate::{
    Error,
    Result,
};

/// Waits until any of the file descriptors is readable or the timeout
/// expires.
///
/// Returns the indices of readable file descriptors, which is empty on
/// timeout or interruption by a signal.
pub fn wait_readable(fds: &[RawFd], timeout: Duration) -> Result<Vec<usize>> {
    let mut pollfds: Vec<_> = fds
        .iter()
        .map(|fd| libc::pollfd {
            fd: *fd,
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();

    let timeout_ms = timeout.as_secs() as libc::c_int * 1000
        + timeout.subsec_nanos() as libc::c_int / 1_000_000;

    let ready = unsafe {
        libc::poll(
            pollfds.as_mut_ptr(),
            pollfds.len() as libc::nfds_t,
            timeout_ms,
        )
    };

    if ready < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(vec![]);
        }
        return Err(Error::Io(err));
    }

    Ok(pollfds
        .iter()
        .enumerate()
        .filter(|(_, pollfd)| pollfd.revents & libc::POLLIN != 0)
        .map(|(i, _)| i)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_readable_pipe() {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);

        let timeout = Duration::from_millis(10);
        assert_eq!(wait_readable(&[fds[0]], timeout).unwrap(), Vec::<usize>::new());

        let wrote = unsafe { libc::write(fds[1], [1u8].as_ptr() as *const libc::c_void, 1) };
        assert_eq!(wrote, 1);
        assert_eq!(wait_readable(&[fds[1], fds[0]], timeout).unwrap(), vec![1]);

        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }
}
