use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which distribution of the game is installed.
///
/// Drives the filename stem used to resolve file locations. `None` and
/// `NotSupported` are sentinels produced by detection; neither can be patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientType {
    /// No client detected
    #[default]
    None,
    /// Mainland China release (`YuanShen`)
    Chinese,
    /// Global release (`GenshinImpact`)
    Ocean,
    /// A client was found but cannot be handled
    NotSupported,
}

impl ClientType {
    pub const SUPPORTED: [ClientType; 2] = [ClientType::Chinese, ClientType::Ocean];

    pub fn is_valid(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }

    /// Filename stem for this client (`<stem>.exe`, `<stem>_Data/`).
    pub fn stem(self) -> Option<&'static str> {
        match self {
            ClientType::Chinese => Some("YuanShen"),
            ClientType::Ocean => Some("GenshinImpact"),
            ClientType::None | ClientType::NotSupported => None,
        }
    }

    /// `<stem>_Data`, the Unity data directory name.
    pub fn data_dir(self) -> Option<String> {
        self.stem().map(|stem| format!("{stem}_Data"))
    }

    /// `<stem>.exe`
    pub fn executable(self) -> Option<String> {
        self.stem().map(|stem| format!("{stem}.exe"))
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientType::None => write!(f, "none"),
            ClientType::Chinese => write!(f, "chinese"),
            ClientType::Ocean => write!(f, "ocean"),
            ClientType::NotSupported => write!(f, "not-supported"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseClientTypeError(String);

impl fmt::Display for ParseClientTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown client type '{}' (expected 'chinese' or 'ocean')",
            self.0
        )
    }
}

impl std::error::Error for ParseClientTypeError {}

impl FromStr for ClientType {
    type Err = ParseClientTypeError;

    /// Accepts the client name or its stem, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chinese" | "cn" | "yuanshen" => Ok(ClientType::Chinese),
            "ocean" | "global" | "os" | "genshinimpact" => Ok(ClientType::Ocean),
            _ => Err(ParseClientTypeError(s.to_string())),
        }
    }
}
