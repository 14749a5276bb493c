// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Per-page metadata embedded by the content host.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::seed::{derive_seed, Seed};
use crate::transform::SeedTransform;

const PDATA_MARKER: &str = "_pdata_ = ";
const PDATA_END: &str = " var ";

/// Metadata for one page of images.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageData {
    #[serde(default)]
    pub title: String,
    pub img: Vec<PageImage>,
}

/// One image entry, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageImage {
    /// Image locator. May be protocol-relative.
    pub path: String,
}

impl PageData {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Extract metadata from an inline page script containing
    /// `_pdata_ = {...} var ...`.
    pub fn from_script(script: &str) -> Result<Self> {
        let (_, rest) = script
            .split_once(PDATA_MARKER)
            .ok_or(Error::MissingMetadata)?;
        let object = rest.split(PDATA_END).next().unwrap_or_default();
        let object = object.trim().trim_end_matches(';').trim_end();

        Self::from_json(object)
    }

    pub fn len(&self) -> usize {
        self.img.len()
    }

    pub fn is_empty(&self) -> bool {
        self.img.is_empty()
    }
}

impl PageImage {
    /// Absolute locator, with `https:` prepended to protocol-relative paths.
    pub fn locator(&self) -> String {
        if self.path.contains("://") {
            self.path.clone()
        } else {
            format!("https:{}", self.path)
        }
    }

    /// Last path segment, without query or fragment.
    pub fn file_name(&self) -> &str {
        let path = self.path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        path.rsplit('/').next().unwrap_or_default()
    }

    pub fn seed(&self, transform: &dyn SeedTransform) -> Result<Seed> {
        derive_seed(&self.path, transform)
    }
}
