//! Outward notifications: messages and sound cues
//!
//! The engine never waits on these. The caller drains them after each
//! step and shows or plays them however it likes; they are not saved.

use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;

/// Sound cue kinds a renderer may play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEvent {
    Spotted,
    GunFired,
    MgFired,
    Hit,
    Penetrated,
    Destroyed,
    Moved,
    Bogged,
    Smoke,
    Artillery,
    AirStrike,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    /// A message, with the unit whose portrait goes beside it
    Message { text: String, unit: Option<UnitId> },
    Sound { unit: Option<UnitId>, kind: SoundEvent },
}

/// Pending notifications for the current step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationLog {
    pending: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&mut self, text: impl Into<String>, unit: Option<UnitId>) {
        self.pending.push(Notification::Message {
            text: text.into(),
            unit,
        });
    }

    pub fn sound(&mut self, unit: Option<UnitId>, kind: SoundEvent) {
        self.pending.push(Notification::Sound { unit, kind });
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    /// Pending sound cues of `kind`
    pub fn count_sounds(&self, kind: SoundEvent) -> usize {
        self.pending
            .iter()
            .filter(|n| matches!(n, Notification::Sound { kind: k, .. } if *k == kind))
            .count()
    }
}
