// Battle timeline data: participants, turns and actions

use serde::{Deserialize, Serialize};

use crate::core::hex::AxialCoord;

/// Errors raised while reading battle data
#[derive(Debug, thiserror::Error)]
pub enum BattleDataError {
    #[error("Malformed battle data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate participant id '{0}'")]
    DuplicateParticipant(String),
}

/// Sprite selection for a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpriteConfig {
    /// Registered atlas name
    pub atlas: String,
    /// Draw scale (1.0 = atlas size)
    #[serde(default = "default_scale")]
    pub scale: f32,
}

fn default_scale() -> f32 {
    1.0
}

/// A combatant as recorded at battle setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleParticipant {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub initial_position: AxialCoord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite_config: Option<SpriteConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_id: Option<String>,
}

impl BattleParticipant {
    pub fn new(id: impl Into<String>, initial_position: AxialCoord) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            initial_position,
            sprite_config: None,
            weapon_id: None,
        }
    }

    pub fn with_sprite(mut self, atlas: impl Into<String>) -> Self {
        self.sprite_config = Some(SpriteConfig {
            atlas: atlas.into(),
            scale: default_scale(),
        });
        self
    }
}

/// Kind of a recorded action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Attack,
    Skill,
    Effect,
    /// Any type this build does not know how to play
    #[serde(other)]
    Unknown,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Move => "move",
            ActionKind::Attack => "attack",
            ActionKind::Skill => "skill",
            ActionKind::Effect => "effect",
            ActionKind::Unknown => "unknown",
        }
    }
}

/// One atomic behaviour of one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub actor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<AxialCoord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<AxialCoord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl BattleAction {
    fn new(kind: ActionKind, actor: impl Into<String>) -> Self {
        Self {
            kind,
            actor: actor.into(),
            target: None,
            position: None,
            path: None,
            data: None,
        }
    }

    /// Jump straight to a hex
    pub fn move_to(actor: impl Into<String>, position: AxialCoord) -> Self {
        Self {
            position: Some(position),
            ..Self::new(ActionKind::Move, actor)
        }
    }

    /// Walk a sequence of hexes
    pub fn move_along(actor: impl Into<String>, path: Vec<AxialCoord>) -> Self {
        Self {
            path: Some(path),
            ..Self::new(ActionKind::Move, actor)
        }
    }

    pub fn attack(actor: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..Self::new(ActionKind::Attack, actor)
        }
    }

    pub fn skill(actor: impl Into<String>, target: Option<String>) -> Self {
        Self {
            target,
            ..Self::new(ActionKind::Skill, actor)
        }
    }

    pub fn effect(actor: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self {
            data,
            ..Self::new(ActionKind::Effect, actor)
        }
    }

    /// Where a move ends, if it has a destination at all
    pub fn destination(&self) -> Option<AxialCoord> {
        match &self.path {
            Some(path) if !path.is_empty() => path.last().copied(),
            _ => self.position,
        }
    }
}

/// A batch of actions sharing a timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleTurn {
    pub id: String,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub actions: Vec<BattleAction>,
}

/// Complete, static description of a battle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleData {
    #[serde(default)]
    pub participants: Vec<BattleParticipant>,
    #[serde(default)]
    pub turns: Vec<BattleTurn>,
}

impl BattleData {
    /// Parse and validate battle JSON
    pub fn from_json(json: &str) -> Result<Self, BattleDataError> {
        let data: BattleData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    pub fn to_json_pretty(&self) -> Result<String, BattleDataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Participant ids must be unique
    pub fn validate(&self) -> Result<(), BattleDataError> {
        let mut seen = std::collections::HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.id.as_str()) {
                return Err(BattleDataError::DuplicateParticipant(
                    participant.id.clone(),
                ));
            }
        }
        Ok(())
    }

    pub fn participant(&self, id: &str) -> Option<&BattleParticipant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Number of actions across every turn
    pub fn total_actions(&self) -> usize {
        self.turns.iter().map(|turn| turn.actions.len()).sum()
    }

    /// Action at a cursor position
    pub fn action_at(&self, turn_index: usize, action_index: usize) -> Option<&BattleAction> {
        self.turns.get(turn_index)?.actions.get(action_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "participants": [
            {"id": "hero", "name": "Hero", "initialPosition": {"q": 1, "r": 1},
             "spriteConfig": {"atlas": "knight"}, "weaponId": "sword"},
            {"id": "orc", "initialPosition": {"q": -1, "r": 0}}
        ],
        "turns": [
            {"id": "t1", "timestamp": 0, "actions": [
                {"type": "move", "actor": "hero", "path": [{"q": 1, "r": 1}, {"q": 0, "r": 1}]},
                {"type": "attack", "actor": "hero", "target": "orc"},
                {"type": "teleport", "actor": "orc"}
            ]},
            {"id": "t2", "timestamp": 1000, "actions": [
                {"type": "effect", "actor": "orc", "data": {"name": "smoke"}}
            ]}
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let data = BattleData::from_json(SAMPLE).unwrap();
        assert_eq!(data.participants.len(), 2);
        assert_eq!(data.total_actions(), 4);

        let hero = data.participant("hero").unwrap();
        assert_eq!(hero.initial_position, AxialCoord::new(1, 1));
        assert_eq!(hero.sprite_config.as_ref().unwrap().atlas, "knight");
        assert_eq!(hero.sprite_config.as_ref().unwrap().scale, 1.0);
        assert_eq!(hero.weapon_id.as_deref(), Some("sword"));
    }

    #[test]
    fn test_unknown_action_type_parses() {
        let data = BattleData::from_json(SAMPLE).unwrap();
        assert_eq!(data.action_at(0, 2).unwrap().kind, ActionKind::Unknown);
        assert!(data.action_at(0, 3).is_none());
        assert!(data.action_at(5, 0).is_none());
    }

    #[test]
    fn test_destination() {
        let path = vec![AxialCoord::new(1, 1), AxialCoord::new(0, 1)];
        assert_eq!(
            BattleAction::move_along("hero", path).destination(),
            Some(AxialCoord::new(0, 1))
        );
        assert_eq!(
            BattleAction::move_to("hero", AxialCoord::new(3, -1)).destination(),
            Some(AxialCoord::new(3, -1))
        );
        assert_eq!(BattleAction::attack("hero", "orc").destination(), None);
    }

    #[test]
    fn test_timestamps_are_plain_numbers() {
        let json = r#"{"turns": [
            {"id": "a", "timestamp": 1697040000123.5},
            {"id": "b", "timestamp": -20}
        ]}"#;
        let data = BattleData::from_json(json).unwrap();
        assert_eq!(data.turns[0].timestamp, 1697040000123.5);
        assert_eq!(data.turns[1].timestamp, -20.0);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            BattleData::from_json("{\"turns\": 3}"),
            Err(BattleDataError::Json(_))
        ));
    }

    #[test]
    fn test_duplicate_participant_rejected() {
        let json = r#"{"participants": [
            {"id": "a", "initialPosition": {"q": 0, "r": 0}},
            {"id": "a", "initialPosition": {"q": 1, "r": 0}}
        ]}"#;
        assert!(matches!(
            BattleData::from_json(json),
            Err(BattleDataError::DuplicateParticipant(id)) if id == "a"
        ));
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let data = BattleData {
            participants: vec![BattleParticipant::new("hero", AxialCoord::ORIGIN)],
            turns: vec![BattleTurn {
                id: "t1".into(),
                timestamp: 0.0,
                actions: vec![BattleAction::attack("hero", "orc")],
            }],
        };
        let json = data.to_json_pretty().unwrap();
        assert!(json.contains("\"initialPosition\""));
        assert!(json.contains("\"type\": \"attack\""));
        assert!(!json.contains("spriteConfig"));
    }
}
