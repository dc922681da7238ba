use thiserror::Error;

use crate::core::types::UnitId;

/// Expected rejections of a player or AI action.
///
/// The `Display` text is shown to the player verbatim; the AI discards
/// options that produce one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IllegalAction {
    #[error("Not possible during the {0} phase")]
    WrongPhase(String),

    #[error("Weapon has already fired this turn")]
    AlreadyFired,

    #[error("No crewman is operating this weapon")]
    NoOperator,

    #[error("Target is not in the weapon's covered arc")]
    OutsideCoveredArc,

    #[error("Target is beyond the weapon's maximum range")]
    OutOfRange,

    #[error("No ammunition of the selected type is available")]
    NoAmmo,

    #[error("No ammunition type is selected")]
    NoAmmoSelected,

    #[error("Another weapon in the same firing group has already fired")]
    FiringGroupFired,

    #[error("Hull-mounted weapon is blocked by Hull Down position")]
    BlockedByHullDown,

    #[error("Cannot attack a friendly unit")]
    FriendlyTarget,

    #[error("Target is no longer in play")]
    TargetGone,

    #[error("Unit {0:?} not found")]
    UnknownUnit(UnitId),

    #[error("No weapon with index {0}")]
    UnknownWeapon(usize),

    #[error("No crew position with index {0}")]
    UnknownPosition(usize),

    #[error("No weapon is selected")]
    NoWeaponSelected,

    #[error("No target is selected")]
    NoTargetSelected,

    #[error("That command is not available for this crewman")]
    CommandNotAvailable,

    #[error("Position has no hatch")]
    NoHatch,

    #[error("Position is empty")]
    EmptyPosition,

    #[error("Unit is bogged down")]
    Bogged,

    #[error("Unit is immobilized")]
    Immobilized,

    #[error("Unit has no turret")]
    NoTurret,

    #[error("Weapon cannot use that ammunition type")]
    WrongAmmoType,

    #[error("Ammunition capacity exceeded")]
    AmmoCapacityExceeded,

    #[error("Ready rack is full")]
    ReadyRackFull,

    #[error("Ready rack holds none of that ammunition")]
    ReadyRackEmpty,

    #[error("General stores hold none of that ammunition")]
    StoresEmpty,

    #[error("Weapon has no ready rack")]
    NoReadyRack,

    #[error("No smoke available")]
    NoSmoke,

    #[error("Not enough advance points")]
    NoAdvancePoints,

    #[error("Skill requires {0} first")]
    MissingPrerequisite(String),

    #[error("Skill is not available for this position")]
    SkillNotForPosition,

    #[error("Skill already known")]
    SkillKnown,

    #[error("Scenario is finished")]
    ScenarioFinished,
}

/// Content-authoring defects found while resolving an action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("No AP penetration entry for calibre key '{0}'")]
    MissingPenetrationEntry(String),

    #[error("Weapon '{0}' has no calibre")]
    MissingCalibre(String),

    #[error("Unknown unit type '{0}'")]
    UnknownUnitType(String),

    #[error("Invalid content: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Illegal(#[from] IllegalAction),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_action_reason_text() {
        assert_eq!(
            IllegalAction::AlreadyFired.to_string(),
            "Weapon has already fired this turn"
        );
    }

    #[test]
    fn test_engine_error_wraps_illegal_action() {
        let err: EngineError = IllegalAction::NoOperator.into();
        assert!(matches!(err, EngineError::Illegal(IllegalAction::NoOperator)));
        assert_eq!(err.to_string(), "No crewman is operating this weapon");
    }

    #[test]
    fn test_content_error_names_key() {
        let err = ContentError::MissingPenetrationEntry("99L".into());
        assert!(err.to_string().contains("99L"));
    }
}
