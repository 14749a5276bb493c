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

//! Seed derivation from an image locator.
//!
//! The checksum path segment is rotated right by the digit sum of the
//! `expires` parameter, then passed through a [`SeedTransform`].

use std::borrow::Cow;
use std::fmt;

use url::Url;

use crate::error::{Error, Result, TransformError};
use crate::transform::SeedTransform;

/// Per-image seed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seed(String);

impl Seed {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Seed {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The parts of a locator that feed seed derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator<'a> {
    checksum: &'a str,
    expires: String,
}

impl<'a> Locator<'a> {
    /// Parse a locator.
    ///
    /// `expires` is read like a browser reads query parameters: first
    /// occurrence, percent-decoded, `+` as space. Protocol-relative locators
    /// are resolved against `https:`. The checksum is the second-to-last
    /// `/`-separated segment of the whole string, the same split the host's
    /// reader uses.
    pub fn parse(locator: &'a str) -> Result<Self> {
        let absolute = if locator.starts_with("http") {
            Cow::Borrowed(locator)
        } else {
            Cow::Owned(format!("https:{locator}"))
        };
        let url = Url::parse(&absolute).map_err(|_| Error::InvalidLocator(locator.to_owned()))?;

        let expires = url
            .query_pairs()
            .find(|(k, _)| k == "expires")
            .map(|(_, v)| v.into_owned())
            .ok_or_else(|| Error::MissingExpiry(locator.to_owned()))?;

        let mut segments = locator.rsplit('/');
        let checksum = match (segments.next(), segments.next()) {
            (Some(_), Some(c)) if !c.is_empty() => c,
            _ => return Err(Error::MissingChecksum(locator.to_owned())),
        };

        Ok(Self { checksum, expires })
    }

    pub fn checksum(&self) -> &'a str {
        self.checksum
    }

    /// Decoded `expires` value.
    pub fn expires(&self) -> &str {
        &self.expires
    }

    /// Sum of the decimal digits of `expires`.
    ///
    /// `None` if it contains anything but ASCII digits.
    pub fn expiry_total(&self) -> Option<u64> {
        self.expires
            .chars()
            .map(|c| c.is_ascii_digit().then(|| u64::from(c as u8 - b'0')))
            .sum()
    }

    /// Right rotation applied to the checksum. Zero when `expires` is not
    /// all digits, as the host leaves the checksum as-is then.
    pub fn rotation(&self) -> usize {
        match self.expiry_total() {
            Some(total) => (total % self.checksum.chars().count() as u64) as usize,
            None => 0,
        }
    }

    pub fn rotated_checksum(&self) -> String {
        rotate_right(self.checksum, self.rotation())
    }
}

/// Move the last `r` characters of `s` to its front.
pub fn rotate_right(s: &str, r: usize) -> String {
    let len = s.chars().count();
    if len == 0 || r % len == 0 {
        return s.to_owned();
    }

    let split = s
        .char_indices()
        .nth(len - r % len)
        .map_or(s.len(), |(i, _)| i);
    let (head, tail) = s.split_at(split);

    let mut out = String::with_capacity(s.len());
    out.push_str(tail);
    out.push_str(head);
    out
}

/// Derive the descrambling seed for one image.
pub fn derive_seed(locator: &str, transform: &dyn SeedTransform) -> Result<Seed> {
    let rotated = Locator::parse(locator)?.rotated_checksum();

    let out = transform.transform(rotated.as_bytes())?;
    if out.len() != rotated.len() {
        return Err(TransformError::LengthMismatch {
            expected: rotated.len(),
            actual: out.len(),
        }
        .into());
    }

    let seed = String::from_utf8(out).map_err(|_| TransformError::InvalidUtf8)?;
    log::debug!("derived seed {seed:?} from checksum {rotated:?}");

    Ok(Seed(seed))
}
