/*
 *  i2c/ioctl.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Batched transport strategy: one ioctl(I2C_RDWR) transaction per call
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

use log::{debug, trace};

use super::DDC_SLAVE_ADDR;
use super::handle::{I2cHandle, I2cMessage};
use super::strategy::I2cTransport;
use crate::status::StatusCode;

/// Submits each transfer as a single-message `I2C_RDWR` transaction
/// addressed to the DDC/CI slave (0x37).
#[derive(Debug, Clone, Copy, Default)]
pub struct IoctlTransport;

/// Maps the outcome of `ioctl(I2C_RDWR)` onto the shared status domain.
///
/// Any non-negative result is success and becomes `0`. The kernel reports
/// the number of messages processed, so a single-message transaction
/// normally returns `1`.
pub fn normalize_rdwr_result(result: io::Result<i32>) -> StatusCode {
    match result {
        Ok(rc) if rc >= 0 => {
            if rc != 1 {
                debug!("ioctl(I2C_RDWR) returned {}", rc);
            }
            StatusCode::OK
        }
        Ok(rc) => rc.checked_neg().map_or(StatusCode::from_errno(libc::EIO), StatusCode::from_errno),
        Err(e) => StatusCode::from_io_error(&e),
    }
}

impl I2cTransport for IoctlTransport {
    fn name(&self) -> &'static str {
        "ioctl"
    }

    fn write(&self, handle: &mut dyn I2cHandle, bytes: &[u8]) -> StatusCode {
        let msg = I2cMessage::Write {
            addr: DDC_SLAVE_ADDR,
            data: bytes,
        };
        let rc = normalize_rdwr_result(handle.rdwr(msg));
        if !rc.is_ok() {
            trace!("ioctl(I2C_RDWR) write of {} bytes failed: {}", bytes.len(), rc);
        }
        rc
    }

    fn read(&self, handle: &mut dyn I2cHandle, buf: &mut [u8]) -> StatusCode {
        let len = buf.len();
        let msg = I2cMessage::Read {
            addr: DDC_SLAVE_ADDR,
            buf,
        };
        let rc = normalize_rdwr_result(handle.rdwr(msg));
        if !rc.is_ok() {
            trace!("ioctl(I2C_RDWR) read of {} bytes failed: {}", len, rc);
        }
        rc
    }
}
