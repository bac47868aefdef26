//! RunspacePool init info: batas min/max runspace di server pool

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitInfoError {
    #[error("min runspaces must be positive, got {0}")]
    NonPositiveMin(i32),

    #[error("min runspaces ({min}) exceeds max runspaces ({max})")]
    MinExceedsMax { min: i32, max: i32 },
}

/// Payload `RunspacePoolInitData`. Immutable, `0 < min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPoolInitInfo")]
pub struct PoolInitInfo {
    #[serde(rename = "MinRunspaces")]
    min_runspaces: i32,
    #[serde(rename = "MaxRunspaces")]
    max_runspaces: i32,
}

#[derive(Deserialize)]
struct RawPoolInitInfo {
    #[serde(rename = "MinRunspaces")]
    min_runspaces: i32,
    #[serde(rename = "MaxRunspaces")]
    max_runspaces: i32,
}

impl PoolInitInfo {
    pub fn new(min_runspaces: i32, max_runspaces: i32) -> Result<Self, InitInfoError> {
        if min_runspaces <= 0 {
            return Err(InitInfoError::NonPositiveMin(min_runspaces));
        }
        if min_runspaces > max_runspaces {
            return Err(InitInfoError::MinExceedsMax {
                min: min_runspaces,
                max: max_runspaces,
            });
        }
        Ok(Self {
            min_runspaces,
            max_runspaces,
        })
    }

    #[inline(always)]
    pub fn min_runspaces(&self) -> i32 {
        self.min_runspaces
    }

    #[inline(always)]
    pub fn max_runspaces(&self) -> i32 {
        self.max_runspaces
    }
}

impl TryFrom<RawPoolInitInfo> for PoolInitInfo {
    type Error = InitInfoError;

    fn try_from(raw: RawPoolInitInfo) -> Result<Self, Self::Error> {
        PoolInitInfo::new(raw.min_runspaces, raw.max_runspaces)
    }
}
