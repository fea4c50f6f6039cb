/*
 *  i2c/bus.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  /dev/i2c-N device nodes: open, slave address binding, functionality
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

use std::fmt;
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use linux_embedded_hal::i2cdev::core::{I2CDevice, I2CMessage, I2CTransfer};
use linux_embedded_hal::i2cdev::linux::{LinuxI2CBus, LinuxI2CDevice, LinuxI2CMessage};
use log::debug;

use super::handle::{I2cHandle, I2cMessage};
use super::I2C_FUNCS;
use crate::status::{StatusCode, StatusError};

bitflags! {
    /// Adapter functionality reported by `ioctl(I2C_FUNCS)`, linux/i2c.h
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct I2cFunctionality: u64 {
        /// Plain I2C transfers, required for I2C_RDWR
        const I2C                    = 0x0000_0001;
        const TEN_BIT_ADDR           = 0x0000_0002;
        const PROTOCOL_MANGLING      = 0x0000_0004;
        const SMBUS_PEC              = 0x0000_0008;
        const NOSTART                = 0x0000_0010;
        const SLAVE                  = 0x0000_0020;
        const SMBUS_BLOCK_PROC_CALL  = 0x0000_8000;
        const SMBUS_QUICK            = 0x0001_0000;
        const SMBUS_READ_BYTE        = 0x0002_0000;
        const SMBUS_WRITE_BYTE       = 0x0004_0000;
        const SMBUS_READ_BYTE_DATA   = 0x0008_0000;
        const SMBUS_WRITE_BYTE_DATA  = 0x0010_0000;
        const SMBUS_READ_WORD_DATA   = 0x0020_0000;
        const SMBUS_WRITE_WORD_DATA  = 0x0040_0000;
        const SMBUS_PROC_CALL        = 0x0080_0000;
        const SMBUS_READ_BLOCK_DATA  = 0x0100_0000;
        const SMBUS_WRITE_BLOCK_DATA = 0x0200_0000;
        const SMBUS_READ_I2C_BLOCK   = 0x0400_0000;
        const SMBUS_WRITE_I2C_BLOCK  = 0x0800_0000;
        const SMBUS_HOST_NOTIFY      = 0x1000_0000;
    }
}

/// An open `/dev/i2c-N` node.
///
/// I2C_RDWR transactions go through the bus handle and carry their own
/// address. write(2)/read(2) go through a device handle that exists only
/// once a slave address is bound.
pub struct I2cBus {
    bus: LinuxI2CBus,
    device: Option<LinuxI2CDevice>,
    path: PathBuf,
    slave_address: Option<u16>,
}

impl fmt::Debug for I2cBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("I2cBus")
            .field("path", &self.path)
            .field("slave_address", &self.slave_address)
            .finish()
    }
}

impl I2cBus {
    pub fn device_path(busno: u8) -> PathBuf {
        PathBuf::from(format!("/dev/i2c-{}", busno))
    }

    pub fn open(busno: u8) -> io::Result<Self> {
        Self::open_path(Self::device_path(busno))
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bus = LinuxI2CBus::new(&path).map_err(io::Error::from)?;
        debug!("Opened I2C bus {}", path.display());
        Ok(Self {
            bus,
            device: None,
            path,
            slave_address: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Slave address bound by the last successful [`I2cBus::set_slave_address`]
    pub fn slave_address(&self) -> Option<u16> {
        self.slave_address
    }

    /// Binds the slave address used by write(2)/read(2).
    ///
    /// `force` claims the address even when a kernel driver holds it.
    pub fn set_slave_address(&mut self, addr: u16, force: bool) -> StatusCode {
        let result = if force {
            // SAFETY: the caller asked to share the address with whatever
            // kernel driver owns it; DDC/CI traffic does not disturb EDID
            // or the display driver's own transfers.
            unsafe { LinuxI2CDevice::force_new(&self.path, addr) }
        } else {
            LinuxI2CDevice::new(&self.path, addr)
        };

        match result {
            Ok(device) => {
                self.device = Some(device);
                self.slave_address = Some(addr);
                StatusCode::OK
            }
            Err(e) => {
                let rc = StatusCode::from_io_error(&io::Error::from(e));
                debug!("I2C_SLAVE{} 0x{:02x} on {} failed: {}",
                    if force { "_FORCE" } else { "" }, addr, self.path.display(), rc);
                rc
            }
        }
    }

    pub fn functionality(&self) -> Result<I2cFunctionality, StatusError> {
        let mut funcs: libc::c_ulong = 0;
        // SAFETY: I2C_FUNCS writes one unsigned long through the pointer.
        let rc = unsafe {
            libc::ioctl(self.bus.as_raw_fd(), I2C_FUNCS as _, &mut funcs as *mut libc::c_ulong)
        };
        if rc < 0 {
            return Err(StatusError(StatusCode::from_io_error(&io::Error::last_os_error())));
        }
        Ok(I2cFunctionality::from_bits_truncate(funcs as u64))
    }

    fn bound_device(&mut self) -> io::Result<&mut LinuxI2CDevice> {
        self.device
            .as_mut()
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EDESTADDRREQ))
    }
}

// i2c-dev completes a write(2) or read(2) in full or fails, so success
// accounts for the whole buffer.
impl I2cHandle for I2cBus {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.bound_device()?.write(bytes).map_err(io::Error::from)?;
        Ok(bytes.len())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.bound_device()?.read(buf).map_err(io::Error::from)?;
        Ok(buf.len())
    }

    fn rdwr(&mut self, msg: I2cMessage<'_>) -> io::Result<i32> {
        let addr = msg.addr();
        let message = match msg {
            I2cMessage::Write { data, .. } => LinuxI2CMessage::write(data),
            I2cMessage::Read { buf, .. } => LinuxI2CMessage::read(buf),
        };
        let mut messages = [message.with_address(addr)];
        let n = self.bus.transfer(&mut messages).map_err(io::Error::from)?;
        Ok(i32::try_from(n).unwrap_or(i32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(tag: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ddcio-bus-{}-{}", tag, std::process::id()));
        std::fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_device_path() {
        assert_eq!(I2cBus::device_path(3), PathBuf::from("/dev/i2c-3"));
    }

    #[test]
    fn test_open_missing_node() {
        let err = I2cBus::open_path("/nonexistent/i2c-99").unwrap_err();
        assert_eq!(StatusCode::from_io_error(&err).raw(), -libc::ENOENT);
    }

    #[test]
    fn test_ioctls_on_regular_file_fail() {
        let path = scratch_file("ioctl");

        let mut bus = I2cBus::open_path(&path).unwrap();
        // regular files reject I2C ioctls, normally with ENOTTY
        assert!(bus.set_slave_address(0x37, false).errno().is_some());
        assert_eq!(bus.slave_address(), None);
        assert!(bus.functionality().unwrap_err().0.errno().is_some());

        let data = [0x51, 0x82, 0x01, 0x10, 0xac];
        let err = bus.rdwr(I2cMessage::Write { addr: 0x37, data: &data }).unwrap_err();
        assert!(err.raw_os_error().is_some());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unbound_write_needs_address() {
        let path = scratch_file("unbound");
        let mut bus = I2cBus::open_path(&path).unwrap();

        let err = bus.write_bytes(&[0x51]).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EDESTADDRREQ));
        let mut buf = [0u8; 2];
        assert_eq!(bus.read_bytes(&mut buf).unwrap_err().raw_os_error(), Some(libc::EDESTADDRREQ));
        assert!(format!("{:?}", bus).contains("slave_address: None"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_functionality_flags() {
        let funcs = I2cFunctionality::from_bits_truncate(0x0eff_0001);
        assert!(funcs.contains(I2cFunctionality::I2C));
        assert!(funcs.contains(I2cFunctionality::SMBUS_READ_I2C_BLOCK));
    }
}
