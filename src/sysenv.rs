/*
 *  sysenv.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  System environment facts gathered for I2C diagnostics
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

use std::ffi::CStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace};

/// Video driver modules known to expose DDC capable I2C buses
pub const KNOWN_VIDEO_DRIVERS: &[&str] = &[
    "amdgpu",
    "ast",
    "fglrx",
    "i915",
    "mgag200",
    "nouveau",
    "nvidia",
    "radeon",
    "vboxvideo",
    "vc4",
    "xe",
];

/// Facts collected once and consulted by later checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvAccumulator {
    pub architecture: String,
    pub distributor_id: Option<String>,
    pub is_raspbian: bool,
    pub is_arm: bool,
    /// `N` of each `/dev/i2c-N`, ascending
    pub i2c_device_numbers: Vec<u8>,
    /// Drivers bound to the I2C adapters, deduplicated
    pub driver_names: Vec<String>,
}

impl EnvAccumulator {
    pub fn collect() -> Self {
        Self::collect_from(Path::new("/"))
    }

    /// Gathers facts with `/dev`, `/sys` and `/etc` taken relative to `root`.
    pub fn collect_from(root: &Path) -> Self {
        let architecture = machine_architecture();
        let distributor_id = fs::read_to_string(root.join("etc/os-release"))
            .ok()
            .and_then(|text| distributor_from_os_release(&text));

        let mut accum = EnvAccumulator {
            is_arm: is_arm_architecture(&architecture),
            is_raspbian: distributor_id.as_deref() == Some("raspbian"),
            architecture,
            distributor_id,
            ..Default::default()
        };

        match scan_i2c_device_numbers(&root.join("dev")) {
            Ok(numbers) => accum.i2c_device_numbers = numbers,
            Err(e) => debug!("Unable to scan for i2c devices: {}", e),
        }

        let sys_devices = root.join("sys/bus/i2c/devices");
        for busno in accum.i2c_device_numbers.clone() {
            if let Some(driver) = adapter_driver(&sys_devices, busno) {
                accum.add_driver(&driver);
            }
        }

        debug!("Environment: {:?}", accum);
        accum
    }

    pub fn add_driver(&mut self, name: &str) {
        if !self.driver_names.iter().any(|d| d == name) {
            self.driver_names.push(name.to_string());
        }
    }

    pub fn has_known_video_driver(&self) -> bool {
        self.driver_names
            .iter()
            .any(|d| KNOWN_VIDEO_DRIVERS.contains(&d.as_str()))
    }

    pub fn summary(&self) -> String {
        let buses: Vec<String> = self.i2c_device_numbers.iter().map(|n| format!("i2c-{}", n)).collect();
        let or_none = |items: &[String]| if items.is_empty() { "(none)".to_string() } else { items.join(" ") };

        let mut out = format!("Architecture:   {}\n", self.architecture);
        out.push_str(&format!("Distributor id: {}\n", self.distributor_id.as_deref().unwrap_or("(unknown)")));
        out.push_str(&format!("ARM:            {}\n", self.is_arm));
        out.push_str(&format!("Raspbian:       {}\n", self.is_raspbian));
        out.push_str(&format!("I2C devices:    {}\n", or_none(&buses)));
        out.push_str(&format!("Drivers:        {}\n", or_none(&self.driver_names)));
        out
    }
}

/// Bus numbers of the `i2c-N` nodes in `dev_dir`, ascending.
fn scan_i2c_device_numbers(dev_dir: &Path) -> io::Result<Vec<u8>> {
    let mut numbers: Vec<u8> = fs::read_dir(dev_dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix("i2c-"))
                .and_then(|n| n.parse::<u8>().ok())
        })
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    trace!("i2c devices in {}: {:?}", dev_dir.display(), numbers);
    Ok(numbers)
}

/// Value of `ID=` in an os-release file, unquoted and lowercased.
pub fn distributor_from_os_release(text: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("ID="))
        .map(|v| v.trim_matches(|c| c == '"' || c == '\'').to_ascii_lowercase())
        .find(|v| !v.is_empty())
}

fn is_arm_architecture(arch: &str) -> bool {
    arch.starts_with("arm") || arch.starts_with("aarch64")
}

fn machine_architecture() -> String {
    // SAFETY: utsname is plain arrays of c_char, all zeroes is a valid value.
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    // SAFETY: uts is a live, writable utsname for the duration of the call.
    if unsafe { libc::uname(&mut uts) } == 0 {
        // SAFETY: uname succeeded, so machine holds a NUL terminated string
        // inside the array, and uts outlives the borrow.
        let machine = unsafe { CStr::from_ptr(uts.machine.as_ptr()) };
        if let Ok(m) = machine.to_str() {
            return m.to_string();
        }
    }
    std::env::consts::ARCH.to_string()
}

// The adapter's parent device carries the driver link.
fn adapter_driver(sys_devices: &Path, busno: u8) -> Option<String> {
    let adapter: PathBuf = fs::canonicalize(sys_devices.join(format!("i2c-{}", busno))).ok()?;
    let driver = fs::read_link(adapter.parent()?.join("driver")).ok()?;
    driver.file_name()?.to_str().map(str::to_string)
}
