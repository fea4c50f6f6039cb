/*
 *  i2c/handle.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Kernel boundary for I2C transfers: write(2), read(2) and ioctl(I2C_RDWR)
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

use super::I2C_M_RD;

/// One message of an I2C_RDWR transaction.
#[derive(Debug)]
pub enum I2cMessage<'a> {
    Write { addr: u16, data: &'a [u8] },
    Read { addr: u16, buf: &'a mut [u8] },
}

impl I2cMessage<'_> {
    pub fn addr(&self) -> u16 {
        match self {
            I2cMessage::Write { addr, .. } | I2cMessage::Read { addr, .. } => *addr,
        }
    }

    pub fn flags(&self) -> u16 {
        match self {
            I2cMessage::Write { .. } => 0,
            I2cMessage::Read { .. } => I2C_M_RD,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            I2cMessage::Write { data, .. } => data.len(),
            I2cMessage::Read { buf, .. } => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An open handle bound to an I2C device node.
///
/// Each method issues exactly one system call and hands back its raw
/// outcome; normalization into a [`StatusCode`](crate::status::StatusCode)
/// is left to the transport strategies.
pub trait I2cHandle {
    /// Single `write(2)`, returns the number of bytes written.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<usize>;

    /// Single `read(2)`, returns the number of bytes read.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Single `ioctl(I2C_RDWR)` carrying one message, returns the ioctl's
    /// non-negative result.
    fn rdwr(&mut self, msg: I2cMessage<'_>) -> io::Result<i32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let data = [0x51, 0x82, 0x01, 0x10];
        let msg = I2cMessage::Write { addr: 0x37, data: &data };
        assert_eq!((msg.addr(), msg.flags(), msg.len()), (0x37, 0, 4));

        let mut buf = [0u8; 0];
        let msg = I2cMessage::Read { addr: 0x37, buf: &mut buf };
        assert_eq!(msg.flags(), I2C_M_RD);
        assert!(msg.is_empty());
    }
}
