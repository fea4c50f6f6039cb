/*
 *  status.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified status codes for the I2C transport and DDC/CI layers
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

//! Status codes have three sources that share one `i32` domain:
//!
//! * `0` is success,
//! * `-errno` when the kernel reported an error,
//! * named DDC sentinels for protocol level integrity failures.
//!
//! The bands are disjoint: raw errno values live in `1..=999` (absolute
//! value), DDC sentinels in `3000..=3999`. Always match the named sentinels
//! (see [`StatusCode::kind`]) before reasoning about numeric ranges.

use std::fmt;
use std::io;
use thiserror::Error;

/// Reserved bands of the status code domain (absolute values).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetcodeRange {
    /// Raw, unmodulated values: `1..=999`. Linux errno numbers live here.
    Base,
    /// Modulated errno values: `1000..=1999`.
    Errno,
    /// DDC/CI specific sentinels: `3000..=3999`.
    Ddc,
}

impl RetcodeRange {
    const ALL: [RetcodeRange; 3] = [RetcodeRange::Base, RetcodeRange::Errno, RetcodeRange::Ddc];

    /// Offset added to a base value when it is moved into this band.
    pub const fn offset(self) -> i32 {
        match self {
            RetcodeRange::Base => 0,
            RetcodeRange::Errno => 1000,
            RetcodeRange::Ddc => 3000,
        }
    }

    pub const fn start(self) -> i32 {
        match self {
            RetcodeRange::Base => 1,
            RetcodeRange::Errno => 1000,
            RetcodeRange::Ddc => 3000,
        }
    }

    pub const fn max(self) -> i32 {
        match self {
            RetcodeRange::Base => 999,
            RetcodeRange::Errno => 1999,
            RetcodeRange::Ddc => 3999,
        }
    }

    fn contains(self, abs_rc: i32) -> bool {
        abs_rc >= self.start() && abs_rc <= self.max()
    }

    /// Band containing `rc`, `None` for `0` and for values outside every band.
    pub fn of(rc: i32) -> Option<RetcodeRange> {
        let abs_rc = rc.checked_abs()?;
        Self::ALL.into_iter().find(|r| r.contains(abs_rc))
    }
}

/// Named DDC/CI sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DdcStatus {
    /// Wrong number of bytes sent or received, or otherwise corrupt data
    Data = -3001,
    NullResponse = -3002,
    ReadAllZero = -3006,
    /// Byte count mismatch, superseded by `Data` for transport results
    BadByteCount = -3007,
    ReadEqualsWrite = -3008,
    Retries = -3010,
    Arg = -3013,
    NotFound = -3020,
}

impl DdcStatus {
    const ALL: [DdcStatus; 8] = [
        DdcStatus::Data,
        DdcStatus::NullResponse,
        DdcStatus::ReadAllZero,
        DdcStatus::BadByteCount,
        DdcStatus::ReadEqualsWrite,
        DdcStatus::Retries,
        DdcStatus::Arg,
        DdcStatus::NotFound,
    ];

    pub fn from_code(rc: i32) -> Option<DdcStatus> {
        Self::ALL.into_iter().find(|s| *s as i32 == rc)
    }

    pub const fn code(self) -> StatusCode {
        StatusCode(self as i32)
    }

    pub const fn name(self) -> &'static str {
        match self {
            DdcStatus::Data => "DDCRC_DATA",
            DdcStatus::NullResponse => "DDCRC_NULL_RESPONSE",
            DdcStatus::ReadAllZero => "DDCRC_READ_ALL_ZERO",
            DdcStatus::BadByteCount => "DDCRC_BAD_BYTECT",
            DdcStatus::ReadEqualsWrite => "DDCRC_READ_EQUALS_WRITE",
            DdcStatus::Retries => "DDCRC_RETRIES",
            DdcStatus::Arg => "DDCRC_ARG",
            DdcStatus::NotFound => "DDCRC_NOT_FOUND",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            DdcStatus::Data => "DDC data error, incorrect number of bytes transferred",
            DdcStatus::NullResponse => "Received DDC null response",
            DdcStatus::ReadAllZero => "Packet contents all zero",
            DdcStatus::BadByteCount => "Wrong number of bytes in DDC packet",
            DdcStatus::ReadEqualsWrite => "Response identical to request",
            DdcStatus::Retries => "Maximum retries exceeded",
            DdcStatus::Arg => "Invalid argument",
            DdcStatus::NotFound => "Not found",
        }
    }
}

/// Decoded view of a [`StatusCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ok,
    /// Linux error number, positive
    Errno(i32),
    Ddc(DdcStatus),
    Unknown(i32),
}

/// Signed status code shared by every transport strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(i32);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(0);
    pub const DATA_LENGTH_MISMATCH: StatusCode = DdcStatus::Data.code();

    pub const fn from_raw(rc: i32) -> Self {
        StatusCode(rc)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Negated errno. A zero or negative errno cannot express a failure and
    /// is reported as `-EIO`.
    pub fn from_errno(errno: i32) -> Self {
        if errno > 0 {
            StatusCode(-errno)
        } else {
            StatusCode(-libc::EIO)
        }
    }

    pub fn from_io_error(err: &io::Error) -> Self {
        Self::from_errno(err.raw_os_error().unwrap_or(libc::EIO))
    }

    /// Normalizes the outcome of a byte transferring system call.
    ///
    /// An OS error becomes its negated errno. A successful call that moved a
    /// different number of bytes than requested is a data integrity fault,
    /// not success and not a kernel error.
    pub fn classify(result: io::Result<usize>, expected: usize) -> Self {
        match result {
            Ok(actual) if actual == expected => StatusCode::OK,
            Ok(_) => StatusCode::DATA_LENGTH_MISMATCH,
            Err(e) => Self::from_io_error(&e),
        }
    }

    pub fn kind(self) -> StatusKind {
        if self.0 == 0 {
            return StatusKind::Ok;
        }
        if let Some(ddc) = DdcStatus::from_code(self.0) {
            return StatusKind::Ddc(ddc);
        }
        match RetcodeRange::of(self.0) {
            Some(RetcodeRange::Base) if self.0 < 0 => StatusKind::Errno(-self.0),
            _ => StatusKind::Unknown(self.0),
        }
    }

    pub fn range(self) -> Option<RetcodeRange> {
        RetcodeRange::of(self.0)
    }

    pub fn errno(self) -> Option<i32> {
        match self.kind() {
            StatusKind::Errno(e) => Some(e),
            _ => None,
        }
    }

    /// Moves a base-band value into `range`, keeping its sign.
    /// Returns `None` if `rc` is not a base-band value.
    pub fn modulate(rc: i32, range: RetcodeRange) -> Option<i32> {
        if rc == 0 {
            return Some(0);
        }
        if RetcodeRange::of(rc) != Some(RetcodeRange::Base) {
            return None;
        }
        let offset = range.offset();
        Some(if rc < 0 { rc - offset } else { rc + offset })
    }

    /// Inverse of [`StatusCode::modulate`].
    pub fn demodulate(rc: i32, range: RetcodeRange) -> Option<i32> {
        if rc == 0 {
            return Some(0);
        }
        if RetcodeRange::of(rc) != Some(range) {
            return None;
        }
        let offset = range.offset();
        Some(if rc < 0 { rc + offset } else { rc - offset })
    }

    /// Transient faults that a protocol layer may reasonably retry.
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(self) -> bool {
        match self.kind() {
            StatusKind::Ddc(DdcStatus::Data) | StatusKind::Ddc(DdcStatus::BadByteCount) => true,
            StatusKind::Ddc(DdcStatus::NullResponse) | StatusKind::Ddc(DdcStatus::ReadAllZero) => true,
            StatusKind::Errno(e) => matches!(
                e,
                libc::EBUSY | libc::EAGAIN | libc::EIO | libc::EREMOTEIO | libc::ETIMEDOUT | libc::EPROTO
            ),
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self.kind() {
            StatusKind::Ok => "OK",
            StatusKind::Ddc(ddc) => ddc.name(),
            StatusKind::Errno(e) => errno_name(e),
            StatusKind::Unknown(_) => "UNKNOWN",
        }
    }

    pub fn description(self) -> String {
        match self.kind() {
            StatusKind::Ok => "success".to_string(),
            StatusKind::Ddc(ddc) => ddc.description().to_string(),
            StatusKind::Errno(e) => {
                // strip the " (os error N)" suffix std appends
                let text = io::Error::from_raw_os_error(e).to_string();
                match text.rfind(" (os error") {
                    Some(pos) => text[..pos].to_string(),
                    None => text,
                }
            }
            StatusKind::Unknown(rc) => format!("unrecognized status code {}", rc),
        }
    }

    pub fn into_result(self) -> Result<(), StatusError> {
        if self.is_ok() { Ok(()) } else { Err(StatusError(self)) }
    }
}

impl Default for StatusCode {
    fn default() -> Self {
        StatusCode::OK
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.name(), self.0, self.description())
    }
}

impl From<StatusCode> for i32 {
    fn from(rc: StatusCode) -> Self {
        rc.0
    }
}

impl From<DdcStatus> for StatusCode {
    fn from(ddc: DdcStatus) -> Self {
        ddc.code()
    }
}

/// A non-zero [`StatusCode`] carried as an error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StatusError(pub StatusCode);

fn errno_name(errno: i32) -> &'static str {
    match errno {
        libc::EPERM => "EPERM",
        libc::ENOENT => "ENOENT",
        libc::EINTR => "EINTR",
        libc::EIO => "EIO",
        libc::ENXIO => "ENXIO",
        libc::EBADF => "EBADF",
        libc::EAGAIN => "EAGAIN",
        libc::ENOMEM => "ENOMEM",
        libc::EACCES => "EACCES",
        libc::EFAULT => "EFAULT",
        libc::EBUSY => "EBUSY",
        libc::ENODEV => "ENODEV",
        libc::EINVAL => "EINVAL",
        libc::ENOTTY => "ENOTTY",
        libc::EPROTO => "EPROTO",
        libc::EOPNOTSUPP => "EOPNOTSUPP",
        libc::ETIMEDOUT => "ETIMEDOUT",
        libc::EREMOTEIO => "EREMOTEIO",
        _ => "ERRNO",
    }
}
