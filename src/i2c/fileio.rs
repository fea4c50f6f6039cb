/*
 *  i2c/fileio.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Direct transport strategy: plain write(2) and read(2) on the device node
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

use log::trace;

use super::handle::I2cHandle;
use super::strategy::I2cTransport;
use crate::status::StatusCode;

/// Writes and reads with a single system call each.
///
/// The slave address must already be bound to the handle (`I2C_SLAVE`).
/// A transfer shorter than requested is reported as
/// [`StatusCode::DATA_LENGTH_MISMATCH`]: on an I2C bus that means the
/// monitor stopped mid-frame, which is not a kernel fault.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileIoTransport;

impl I2cTransport for FileIoTransport {
    fn name(&self) -> &'static str {
        "fileio"
    }

    fn write(&self, handle: &mut dyn I2cHandle, bytes: &[u8]) -> StatusCode {
        let result = handle.write_bytes(bytes);
        if let Ok(n) = result {
            trace!("write() of {} bytes transferred {}", bytes.len(), n);
        }
        let rc = StatusCode::classify(result, bytes.len());
        if !rc.is_ok() {
            trace!("write() failed: {}", rc);
        }
        rc
    }

    fn read(&self, handle: &mut dyn I2cHandle, buf: &mut [u8]) -> StatusCode {
        let expected = buf.len();
        let result = handle.read_bytes(buf);
        if let Ok(n) = result {
            trace!("read() of {} bytes transferred {}", expected, n);
        }
        let rc = StatusCode::classify(result, expected);
        if !rc.is_ok() {
            trace!("read() failed: {}", rc);
        }
        rc
    }
}
