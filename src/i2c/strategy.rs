/*
 *  i2c/strategy.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Transport strategy selection and per-session binding
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
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bus::{I2cBus, I2cFunctionality};
use super::fileio::FileIoTransport;
use super::handle::I2cHandle;
use super::ioctl::IoctlTransport;
use super::DDC_SLAVE_ADDR;
use crate::status::{StatusCode, StatusError};

/// Contract shared by every transport mechanism.
///
/// Each call performs exactly one write or one read and returns one
/// [`StatusCode`]: `0` on success, `-errno` for kernel faults,
/// [`StatusCode::DATA_LENGTH_MISMATCH`] for short transfers. Implementations
/// never retry, sleep or buffer; that policy belongs to the protocol layer.
pub trait I2cTransport: Send + Sync {
    /// Short name used in logs and configuration
    fn name(&self) -> &'static str;

    /// Write all of `bytes` to the monitor
    fn write(&self, handle: &mut dyn I2cHandle, bytes: &[u8]) -> StatusCode;

    /// Read exactly `buf.len()` bytes from the monitor
    fn read(&self, handle: &mut dyn I2cHandle, buf: &mut [u8]) -> StatusCode;
}

/// The closed set of transport mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum I2cIoStrategy {
    /// write(2) / read(2)
    #[default]
    FileIo,
    /// ioctl(I2C_RDWR)
    Ioctl,
}

static FILEIO: FileIoTransport = FileIoTransport;
static IOCTL: IoctlTransport = IoctlTransport;

impl I2cIoStrategy {
    pub fn transport(self) -> &'static dyn I2cTransport {
        match self {
            I2cIoStrategy::FileIo => &FILEIO,
            I2cIoStrategy::Ioctl => &IOCTL,
        }
    }

    pub fn name(self) -> &'static str {
        self.transport().name()
    }

    /// Picks the mechanism a bus supports. I2C_RDWR needs plain I2C
    /// transfers (`I2C_FUNC_I2C`); adapters limited to SMBus fall back to
    /// write(2)/read(2).
    pub fn detect(funcs: I2cFunctionality) -> Self {
        if funcs.contains(I2cFunctionality::I2C) {
            I2cIoStrategy::Ioctl
        } else {
            I2cIoStrategy::FileIo
        }
    }
}

impl fmt::Display for I2cIoStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown I2C io strategy '{0}' (expected fileio or ioctl)")]
pub struct UnknownStrategy(pub String);

impl FromStr for I2cIoStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fileio" | "file" => Ok(I2cIoStrategy::FileIo),
            "ioctl" | "rdwr" => Ok(I2cIoStrategy::Ioctl),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// A handle bound to one transport strategy for its whole lifetime.
#[derive(Debug)]
pub struct I2cSession<H: I2cHandle = I2cBus> {
    handle: H,
    strategy: I2cIoStrategy,
}

impl<H: I2cHandle> I2cSession<H> {
    pub fn new(handle: H, strategy: I2cIoStrategy) -> Self {
        debug!("Binding I2C session to {} transport", strategy);
        Self { handle, strategy }
    }

    pub fn strategy(&self) -> I2cIoStrategy {
        self.strategy
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn write(&mut self, bytes: &[u8]) -> StatusCode {
        self.strategy.transport().write(&mut self.handle, bytes)
    }

    pub fn read(&mut self, buf: &mut [u8]) -> StatusCode {
        self.strategy.transport().read(&mut self.handle, buf)
    }
}

impl I2cSession<I2cBus> {
    /// Binds an open bus to a strategy.
    ///
    /// With no explicit strategy the bus functionality decides. File io
    /// sessions get the DDC/CI slave address bound up front; `force` uses
    /// `I2C_SLAVE_FORCE` for addresses already claimed by a kernel driver.
    pub fn open(
        mut bus: I2cBus,
        strategy: Option<I2cIoStrategy>,
        force: bool,
    ) -> Result<Self, StatusError> {
        let strategy = match strategy {
            Some(s) => s,
            None => {
                let funcs = bus.functionality()?;
                let s = I2cIoStrategy::detect(funcs);
                debug!("{} functionality {:?}, detected {} transport", bus.path().display(), funcs, s);
                s
            }
        };

        if strategy == I2cIoStrategy::FileIo {
            bus.set_slave_address(DDC_SLAVE_ADDR, force).into_result()?;
        }

        debug!("Opened DDC/CI session on {} using {} transport", bus.path().display(), strategy);
        Ok(Self::new(bus, strategy))
    }
}
