/*
 *  i2c/mod.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  I2C transport - alternative kernel mechanisms behind one contract
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

pub mod handle;
pub mod fileio;
pub mod ioctl;
pub mod strategy;
pub mod bus;

// Recording handle for testing without hardware
#[cfg(test)]
pub mod mock;

/// DDC/CI command interface slave address
pub const DDC_SLAVE_ADDR: u16 = 0x37;

// ioctl request, linux/i2c-dev.h
pub const I2C_FUNCS: u32 = 0x0705;

// i2c_msg flags, linux/i2c.h
pub const I2C_M_RD: u16 = 0x0001;

pub use handle::{I2cHandle, I2cMessage};
pub use fileio::FileIoTransport;
pub use ioctl::IoctlTransport;
pub use strategy::{I2cIoStrategy, I2cSession, I2cTransport, UnknownStrategy};
pub use bus::{I2cBus, I2cFunctionality};
