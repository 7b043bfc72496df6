use crate::MediumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The substrate a delivery medium crawls over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediumKind {
    /// Plain HTTP requests
    DirectRequest,

    /// HTTP requests routed through an anonymizing relay
    AnonymizedRequest,

    /// A driven Chromium session
    DrivenSession,
}

impl MediumKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectRequest => "direct-request",
            Self::AnonymizedRequest => "anonymized-request",
            Self::DrivenSession => "driven-session",
        }
    }

    /// Returns true for the two mediums that evaluate selectors over fetched HTML
    pub fn is_http(&self) -> bool {
        matches!(self, Self::DirectRequest | Self::AnonymizedRequest)
    }

    /// The login shape this medium can perform
    pub fn login_shape(&self) -> &'static str {
        if self.is_http() {
            "form"
        } else {
            "credentials"
        }
    }
}

impl fmt::Display for MediumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediumKind {
    type Err = MediumError;

    /// Parses a medium name, case-insensitively
    ///
    /// Accepts the canonical names plus `request`, `torrequest` and `selenium`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct-request" | "request" => Ok(Self::DirectRequest),
            "anonymized-request" | "torrequest" => Ok(Self::AnonymizedRequest),
            "driven-session" | "selenium" => Ok(Self::DrivenSession),
            _ => Err(MediumError::UnsupportedMedium(s.to_string())),
        }
    }
}
