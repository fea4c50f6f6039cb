/*
 *  i2c/mock.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock I2C handle for testing without hardware
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::io;
use std::sync::{Arc, Mutex};

use super::handle::{I2cHandle, I2cMessage};

/// Mock I2C handle
///
/// Simulates the kernel side of an I2C device node. Every call is recorded
/// and the outcome can be steered (short transfers, errno failures, odd
/// ioctl return values) to exercise the transport strategies.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockHandleState>>,
}

/// Internal state for the mock handle (shared for inspection in tests)
#[derive(Debug)]
pub struct MockHandleState {
    /// Number of write(2) calls
    pub write_calls: usize,

    /// Number of read(2) calls
    pub read_calls: usize,

    /// Number of ioctl(I2C_RDWR) calls
    pub rdwr_calls: usize,

    /// Every byte written, by either mechanism
    pub written: Vec<u8>,

    /// (addr, flags, len) of the last I2C_RDWR message
    pub last_message: Option<(u16, u16, usize)>,

    /// Bytes served to reads
    pub reply: Vec<u8>,

    /// Cap on bytes moved by one write(2)/read(2), simulates short transfers
    pub transfer_limit: Option<usize>,

    /// When set, every call fails with this errno
    pub fail_errno: Option<i32>,

    /// Value a successful ioctl(I2C_RDWR) returns
    pub ioctl_rc: i32,
}

impl Default for MockHandleState {
    fn default() -> Self {
        Self {
            write_calls: 0,
            read_calls: 0,
            rdwr_calls: 0,
            written: Vec::new(),
            last_message: None,
            reply: Vec::new(),
            transfer_limit: None,
            fail_errno: None,
            // single message transactions report 1 on success
            ioctl_rc: 1,
        }
    }
}

impl MockHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockHandleState::default())),
        }
    }

    pub fn with_reply(reply: &[u8]) -> Self {
        let handle = Self::new();
        handle.state.lock().unwrap().reply = reply.to_vec();
        handle
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockHandleState>> {
        Arc::clone(&self.state)
    }

    fn check_failure(state: &MockHandleState) -> io::Result<()> {
        match state.fail_errno {
            Some(errno) => Err(io::Error::from_raw_os_error(errno)),
            None => Ok(()),
        }
    }

    fn fill(state: &MockHandleState, buf: &mut [u8]) -> usize {
        let n = buf.len().min(state.reply.len());
        buf[..n].copy_from_slice(&state.reply[..n]);
        n
    }
}

impl I2cHandle for MockHandle {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.write_calls += 1;
        Self::check_failure(&state)?;

        let n = state.transfer_limit.map_or(bytes.len(), |limit| limit.min(bytes.len()));
        state.written.extend_from_slice(&bytes[..n]);
        Ok(n)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.read_calls += 1;
        Self::check_failure(&state)?;

        let limit = state.transfer_limit.map_or(buf.len(), |limit| limit.min(buf.len()));
        Ok(Self::fill(&state, &mut buf[..limit]))
    }

    fn rdwr(&mut self, msg: I2cMessage<'_>) -> io::Result<i32> {
        let mut state = self.state.lock().unwrap();
        state.rdwr_calls += 1;
        state.last_message = Some((msg.addr(), msg.flags(), msg.len()));
        Self::check_failure(&state)?;

        match msg {
            I2cMessage::Write { data, .. } => state.written.extend_from_slice(data),
            I2cMessage::Read { buf, .. } => {
                Self::fill(&state, buf);
            }
        }
        Ok(state.ioctl_rc)
    }
}
