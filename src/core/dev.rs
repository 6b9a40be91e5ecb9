use std::collections::VecDeque;
use std::io;

use crate::{
    Error,
    Result,
};

/// An interface for sending and receiving raw Ethernet frames.
pub trait Device {
    /// Sends a frame via the device.
    fn send(&mut self, buffer: &[u8]) -> Result<()>;

    /// Receives a frame from the device into the buffer and returns the frame
    /// length. Returns Error::Exhausted if no frame is pending.
    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Returns the largest frame the device can receive.
    fn max_transmission_unit(&self) -> usize;
}

/// A device backed by in memory queues.
///
/// Frames queued in rx are handed out by recv(...), frames passed to
/// send(...) are appended to tx. A queued frame larger than the receive
/// buffer is dropped with Error::Malformed.
#[derive(Debug, Default)]
pub struct MockDevice {
    pub rx: VecDeque<Vec<u8>>,
    pub tx: VecDeque<Vec<u8>>,
    /// Makes send(...) fail with an IO error when set.
    pub broken: bool,
}

impl MockDevice {
    pub const MTU: usize = 1514;

    pub fn new() -> MockDevice {
        MockDevice::default()
    }
}

impl Device for MockDevice {
    fn send(&mut self, buffer: &[u8]) -> Result<()> {
        if self.broken {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "device is broken",
            )));
        }

        self.tx.push_back(buffer.to_vec());
        Ok(())
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let frame = self.rx.pop_front().ok_or(Error::Exhausted)?;

        if frame.len() > buffer.len() {
            return Err(Error::Malformed);
        }

        buffer[.. frame.len()].copy_from_slice(&frame);
        Ok(frame.len())
    }

    fn max_transmission_unit(&self) -> usize {
        Self::MTU
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_device_send() {
        let mut dev = MockDevice::new();
        dev.send(&[1, 2, 3]).unwrap();
        assert_eq!(dev.tx.pop_front(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_mock_device_broken() {
        let mut dev = MockDevice::new();
        dev.broken = true;
        assert_matches!(dev.send(&[1, 2, 3]), Err(Error::Io(_)));
        assert!(dev.tx.is_empty());
    }

    #[test]
    fn test_mock_device_recv() {
        let mut dev = MockDevice::new();
        dev.rx.push_back(vec![4, 5]);

        let mut buffer = [0; MockDevice::MTU];
        assert_eq!(dev.recv(&mut buffer).unwrap(), 2);
        assert_eq!(&buffer[.. 2], &[4, 5]);
        assert_matches!(dev.recv(&mut buffer), Err(Error::Exhausted));
    }

    #[test]
    fn test_mock_device_recv_oversized() {
        let mut dev = MockDevice::new();
        dev.rx.push_back(vec![0; 8]);
        dev.rx.push_back(vec![1, 2]);

        let mut buffer = [0; 4];
        assert_matches!(dev.recv(&mut buffer), Err(Error::Malformed));
        assert_eq!(dev.recv(&mut buffer).unwrap(), 2);
        assert_matches!(dev.recv(&mut buffer), Err(Error::Exhausted));
    }
}
