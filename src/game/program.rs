// Battle programs: scripted routines that expand into a battle timeline
//
// A program is what the visual editor saves: named routines made of
// instructions, plus a table of variables. Each routine becomes one turn.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::hex::AxialCoord;

use super::battle::{BattleAction, BattleData, BattleDataError, BattleParticipant, BattleTurn};

/// Errors raised while reading or expanding a program
#[derive(Debug, thiserror::Error)]
pub enum ProgramError {
    #[error("Malformed battle program: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Routine '{routine}' uses undefined variable '{name}'")]
    UndefinedVariable { routine: String, name: String },

    #[error("Variable '{0}' does not name a participant")]
    NotAName(String),

    #[error(transparent)]
    Battle(#[from] BattleDataError),
}

/// One editor block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Instruction {
    Move {
        actor: String,
        position: AxialCoord,
    },
    MoveAlong {
        actor: String,
        path: Vec<AxialCoord>,
    },
    Attack {
        actor: String,
        target: String,
    },
    UseSkill {
        actor: String,
        skill: String,
        #[serde(default)]
        target: Option<String>,
    },
    Effect {
        actor: String,
        name: String,
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        position: Option<AxialCoord>,
    },
    /// A block this build cannot expand
    #[serde(other)]
    Unknown,
}

/// A named list of instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub body: Vec<Instruction>,
}

/// A program variable. Variables the editor declares without a value stay unbound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }
}

/// Variables as saved: a list of entries, or a `name -> value` object
#[derive(Deserialize)]
#[serde(untagged)]
enum VariableTable {
    List(Vec<Variable>),
    Map(HashMap<String, serde_json::Value>),
}

fn deserialize_variables<'de, D>(deserializer: D) -> Result<Vec<Variable>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match VariableTable::deserialize(deserializer)? {
        VariableTable::List(list) => list,
        VariableTable::Map(map) => {
            let mut list: Vec<_> = map
                .into_iter()
                .map(|(name, value)| Variable::new(name, value))
                .collect();
            list.sort_by(|a, b| a.name.cmp(&b.name));
            list
        }
    })
}

/// Serialized editor program
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleProgram {
    #[serde(default, deserialize_with = "deserialize_variables")]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub routines: Vec<Routine>,
}

impl BattleProgram {
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Expand every routine into a turn, in order.
    ///
    /// Actor and target names starting with `$` are looked up in
    /// `variables`. Unknown blocks are dropped with a warning.
    pub fn to_battle_data(
        &self,
        participants: Vec<BattleParticipant>,
    ) -> Result<BattleData, ProgramError> {
        let mut turns = Vec::with_capacity(self.routines.len());

        for (index, routine) in self.routines.iter().enumerate() {
            let mut actions = Vec::with_capacity(routine.body.len());
            for instruction in &routine.body {
                if let Some(action) = self.expand(routine, instruction)? {
                    actions.push(action);
                }
            }
            turns.push(BattleTurn {
                id: routine.name.clone(),
                timestamp: index as f64,
                actions,
            });
        }

        let data = BattleData {
            participants,
            turns,
        };
        data.validate()?;
        log::debug!(
            "Expanded {} routine(s) into {} action(s)",
            self.routines.len(),
            data.total_actions()
        );
        Ok(data)
    }

    fn expand(
        &self,
        routine: &Routine,
        instruction: &Instruction,
    ) -> Result<Option<BattleAction>, ProgramError> {
        let action = match instruction {
            Instruction::Move { actor, position } => {
                BattleAction::move_to(self.resolve(routine, actor)?, *position)
            }
            Instruction::MoveAlong { actor, path } => {
                BattleAction::move_along(self.resolve(routine, actor)?, path.clone())
            }
            Instruction::Attack { actor, target } => BattleAction::attack(
                self.resolve(routine, actor)?,
                self.resolve(routine, target)?,
            ),
            Instruction::UseSkill {
                actor,
                skill,
                target,
            } => {
                let target = target
                    .as_deref()
                    .map(|t| self.resolve(routine, t))
                    .transpose()?;
                let mut action = BattleAction::skill(self.resolve(routine, actor)?, target);
                action.data = Some(serde_json::json!({ "skill": skill }));
                action
            }
            Instruction::Effect {
                actor,
                name,
                target,
                position,
            } => {
                let mut action = BattleAction::effect(
                    self.resolve(routine, actor)?,
                    Some(serde_json::json!({ "name": name })),
                );
                action.target = target
                    .as_deref()
                    .map(|t| self.resolve(routine, t))
                    .transpose()?;
                action.position = *position;
                action
            }
            Instruction::Unknown => {
                log::warn!("Routine '{}': dropping unsupported block", routine.name);
                return Ok(None);
            }
        };
        Ok(Some(action))
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Literal names pass through; `$name` reads a string variable
    fn resolve(&self, routine: &Routine, name: &str) -> Result<String, ProgramError> {
        let Some(variable) = name.strip_prefix('$') else {
            return Ok(name.to_string());
        };
        match self.variable(variable).map(|v| v.value.as_ref()) {
            Some(Some(serde_json::Value::String(value))) => Ok(value.clone()),
            Some(Some(_)) => Err(ProgramError::NotAName(variable.to_string())),
            Some(None) | None => Err(ProgramError::UndefinedVariable {
                routine: routine.name.clone(),
                name: variable.to_string(),
            }),
        }
    }
}

/// A program file: participants plus the program that drives them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramDocument {
    #[serde(default)]
    pub participants: Vec<BattleParticipant>,
    #[serde(default)]
    pub program: BattleProgram,
}

impl ProgramDocument {
    pub fn from_json(json: &str) -> Result<Self, ProgramError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_battle_data(&self) -> Result<BattleData, ProgramError> {
        self.program.to_battle_data(self.participants.clone())
    }
}
