/*
 *  lib.rs
 *
 *  ddcio - DDC/CI over I2C
 *  (c) 2020-26 Stuart Hunter
 *
 *  I2C transport, status codes and per-model feature definitions
 *  for talking DDC/CI to monitors
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

pub mod status;
pub mod i2c;
pub mod model_key;
pub mod features;
pub mod sysenv;
pub mod config;

pub use status::{DdcStatus, StatusCode, StatusError, StatusKind};
pub use model_key::{ModelKeyError, MonitorModelKey};
pub use features::{FeatureDefinitionLoader, FeatureMetadata, FeatureRegistry};
pub use i2c::{I2cBus, I2cIoStrategy, I2cSession};
