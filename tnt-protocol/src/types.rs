//! Core identifier and sink types
//!
//! All ids are plain integer newtypes so they copy cheaply through the
//! resolver and serialize deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Local index of a tap or attachment inside a tank
pub type IndexType = u16;

/// Asset identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct AssetId(pub u64);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset:{}", self.0)
    }
}

/// Account identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct AccountId(pub u64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account:{}", self.0)
    }
}

/// Tank identifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct TankId(pub u64);

impl fmt::Display for TankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tank:{}", self.0)
    }
}

/// Reference to an attachment
///
/// When `tank_id` is absent the attachment lives on whichever tank is the
/// current context: the tank under evaluation, or the tank most recently
/// entered while walking a sink chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId {
    /// Owning tank, if not the contextual one
    #[serde(default)]
    pub tank_id: Option<TankId>,
    /// Index of the attachment within its tank
    pub attachment_id: IndexType,
}

impl AttachmentId {
    /// Attachment on an explicit tank
    pub fn new(tank_id: TankId, attachment_id: IndexType) -> Self {
        Self {
            tank_id: Some(tank_id),
            attachment_id,
        }
    }

    /// Attachment on the contextual tank
    pub fn local(attachment_id: IndexType) -> Self {
        Self {
            tank_id: None,
            attachment_id,
        }
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tank_id {
            Some(tank) => write!(f, "{}/attachment:{}", tank, self.attachment_id),
            None => write!(f, "attachment:{}", self.attachment_id),
        }
    }
}

/// Reference to a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TapId {
    /// Owning tank, if not the contextual one
    #[serde(default)]
    pub tank_id: Option<TankId>,
    /// Index of the tap within its tank
    pub tap_index: IndexType,
}

impl TapId {
    /// Tap on an explicit tank
    pub fn new(tank_id: TankId, tap_index: IndexType) -> Self {
        Self {
            tank_id: Some(tank_id),
            tap_index,
        }
    }
}

impl fmt::Display for TapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tank_id {
            Some(tank) => write!(f, "{}/tap:{}", tank, self.tap_index),
            None => write!(f, "tap:{}", self.tap_index),
        }
    }
}

/// Destination for released value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sink {
    /// The tank currently in context
    SameTank,
    /// An account; accepts any asset
    Account(AccountId),
    /// A tank; accepts the tank's configured asset
    Tank(TankId),
    /// An attachment, which forwards to a further sink
    Attachment(AttachmentId),
}

impl Sink {
    /// Whether resolution stops at this sink
    ///
    /// Only accounts and explicitly identified tanks are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Sink::Account(_) | Sink::Tank(_))
    }

    /// Bind contextual references to the given tank
    ///
    /// `SameTank` becomes that tank and local attachment references gain its
    /// id. Without a context the sink is returned unchanged.
    pub fn in_context(&self, tank: Option<TankId>) -> Sink {
        match (*self, tank) {
            (Sink::SameTank, Some(tank)) => Sink::Tank(tank),
            (Sink::Attachment(id), Some(tank)) if id.tank_id.is_none() => {
                Sink::Attachment(AttachmentId::new(tank, id.attachment_id))
            }
            (sink, _) => sink,
        }
    }
}

impl From<AccountId> for Sink {
    fn from(id: AccountId) -> Self {
        Sink::Account(id)
    }
}

impl From<TankId> for Sink {
    fn from(id: TankId) -> Self {
        Sink::Tank(id)
    }
}

impl From<AttachmentId> for Sink {
    fn from(id: AttachmentId) -> Self {
        Sink::Attachment(id)
    }
}

impl fmt::Display for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sink::SameTank => write!(f, "same-tank"),
            Sink::Account(id) => write!(f, "{}", id),
            Sink::Tank(id) => write!(f, "{}", id),
            Sink::Attachment(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_sinks() {
        assert!(Sink::Account(AccountId(1)).is_terminal());
        assert!(Sink::Tank(TankId(2)).is_terminal());
        assert!(!Sink::SameTank.is_terminal());
        assert!(!Sink::Attachment(AttachmentId::local(0)).is_terminal());
    }

    #[test]
    fn test_in_context() {
        let local = Sink::Attachment(AttachmentId::local(3));
        assert_eq!(
            local.in_context(Some(TankId(9))),
            Sink::Attachment(AttachmentId::new(TankId(9), 3))
        );
        assert_eq!(local.in_context(None), local);

        let pinned = Sink::Attachment(AttachmentId::new(TankId(1), 3));
        assert_eq!(pinned.in_context(Some(TankId(9))), pinned);

        assert_eq!(Sink::SameTank.in_context(Some(TankId(4))), Sink::Tank(TankId(4)));
        assert_eq!(Sink::SameTank.in_context(None), Sink::SameTank);
    }

    #[test]
    fn test_sink_json_shape() {
        let sink = Sink::Attachment(AttachmentId::new(TankId(5), 1));
        let json = serde_json::to_string(&sink).unwrap();
        assert_eq!(json, r#"{"attachment":{"tank_id":5,"attachment_id":1}}"#);
        let back: Sink = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sink);

        let same: Sink = serde_json::from_str(r#""same_tank""#).unwrap();
        assert_eq!(same, Sink::SameTank);
    }
}
