//! Store URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated document store URL.
///
/// Supports both network stores (HTTPS, or HTTP for a local emulator) and
/// local filesystem stores (`file://`).
///
/// # Example
///
/// ```
/// use folio_core::StoreUrl;
///
/// let hosted = StoreUrl::new("https://firestore.googleapis.com").unwrap();
/// assert_eq!(hosted.api_url("v1/projects/demo"),
///            "https://firestore.googleapis.com/v1/projects/demo");
///
/// let emulator = StoreUrl::new("http://localhost:8080").unwrap();
/// assert!(emulator.is_network());
///
/// let local = StoreUrl::new("file:///tmp/folio").unwrap();
/// assert!(local.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreUrl(Url);

impl StoreUrl {
    /// Create a new store URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::StoreUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Create a `file://` store URL for a local directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let url = Url::from_directory_path(path).map_err(|_| InvalidInputError::StoreUrl {
            value: path.display().to_string(),
            reason: "path must be absolute".to_string(),
        })?;
        Ok(Self(url))
    }

    /// Returns an API URL below this base.
    pub fn api_url(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the URL scheme (e.g., "https", "http", "file").
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns true if this is a local filesystem store (file:// URL).
    pub fn is_local(&self) -> bool {
        self.0.scheme() == "file"
    }

    /// Returns true if this is a network store.
    pub fn is_network(&self) -> bool {
        !self.is_local()
    }

    /// Convert a file:// URL to a local path.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.is_local() {
            self.0.to_file_path().ok()
        } else {
            None
        }
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::StoreUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();

        if scheme == "file" {
            if url.path().is_empty() || url.path() == "/" {
                return Err(InvalidInputError::StoreUrl {
                    value: original.to_string(),
                    reason: "file:// URL must have a path".to_string(),
                }
                .into());
            }
            return Ok(());
        }

        // Plain HTTP is only for a local emulator
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::StoreUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::StoreUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoreUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for StoreUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for StoreUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StoreUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for StoreUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let url = StoreUrl::new("https://firestore.googleapis.com").unwrap();
        assert_eq!(url.host(), Some("firestore.googleapis.com"));
    }

    #[test]
    fn valid_emulator_url() {
        let url = StoreUrl::new("http://localhost:8080").unwrap();
        assert_eq!(url.host(), Some("localhost"));
        assert!(url.is_network());
    }

    #[test]
    fn api_url_construction() {
        let url = StoreUrl::new("https://firestore.googleapis.com/").unwrap();
        assert_eq!(
            url.api_url("/v1/projects/demo"),
            "https://firestore.googleapis.com/v1/projects/demo"
        );
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(StoreUrl::new("http://firestore.googleapis.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(StoreUrl::new("/v1/projects").is_err());
    }

    #[test]
    fn file_url_roundtrip() {
        #[cfg(unix)]
        {
            let url = StoreUrl::new("file:///tmp/folio").unwrap();
            assert!(url.is_local());
            assert_eq!(url.to_file_path().unwrap(), PathBuf::from("/tmp/folio"));

            let from_dir = StoreUrl::from_directory("/tmp/folio").unwrap();
            assert!(from_dir.is_local());
            assert_eq!(from_dir.to_file_path().unwrap(), PathBuf::from("/tmp/folio"));
        }
    }

    #[test]
    fn network_url_has_no_file_path() {
        let url = StoreUrl::new("https://firestore.googleapis.com").unwrap();
        assert!(url.to_file_path().is_none());
    }
}
