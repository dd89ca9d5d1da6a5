/*
 * This file is part of switchinfo.
 *
 * Copyright (C) 2025 switchinfo contributors
 *
 * switchinfo is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * switchinfo is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with switchinfo. If not, see <https://www.gnu.org/licenses/>.
 */

//! switchinfo - hardware report for unmanaged switches
//!
//! This library holds the command line surface around `sw-core`: argument
//! and config handling, device validation, rendering and the event log.

pub mod cli;
pub mod config;
pub mod logger;
pub mod render;
pub mod runner;
pub mod system;

#[cfg(test)]
pub mod test_utils;
