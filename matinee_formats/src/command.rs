use std::collections::BTreeSet;
use std::fmt;

use serde::de::{Deserialize, Deserializer, Error as _};
use serde_json::Value;
use thiserror::Error;

/// One authored script command, as it appears in a scene definition.
///
/// The wire shape is an object with exactly one key (the command name) whose
/// value is the parameter payload, e.g. `{"wait": 0.5}` or
/// `{"setVar": ["gold", "gold + 1"]}`. `if` carries a nested object with
/// `condition` / `then` / `else` fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandDoc {
    ShowDialog(String),
    ShowDebugMessage(String),
    Wait(f64),
    PlayerMovement(bool),
    FadeIn(f64),
    FadeOut(f64),
    SetVar { name: String, expr: String },
    If {
        condition: String,
        then: Vec<CommandDoc>,
        otherwise: Vec<CommandDoc>,
    },
}

#[derive(Debug, Error)]
pub enum ScriptParseError {
    #[error("command entry must be an object with exactly one key, got {found}")]
    NotACommandMap { found: String },
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` expects {expected}, got {found}")]
    BadParameter {
        command: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("`if` parameter is missing its `condition` string")]
    MissingCondition,
}

impl CommandDoc {
    pub fn kind(&self) -> &'static str {
        match self {
            CommandDoc::ShowDialog(_) => "showDialog",
            CommandDoc::ShowDebugMessage(_) => "showDebugMessage",
            CommandDoc::Wait(_) => "wait",
            CommandDoc::PlayerMovement(_) => "playerMovement",
            CommandDoc::FadeIn(_) => "fadeIn",
            CommandDoc::FadeOut(_) => "fadeOut",
            CommandDoc::SetVar { .. } => "setVar",
            CommandDoc::If { .. } => "if",
        }
    }

    pub fn from_value(entry: &Value) -> Result<Self, ScriptParseError> {
        let map = entry
            .as_object()
            .filter(|map| map.len() == 1)
            .ok_or_else(|| ScriptParseError::NotACommandMap {
                found: value_kind(entry).to_string(),
            })?;
        let (name, param) = map
            .iter()
            .next()
            .ok_or_else(|| ScriptParseError::NotACommandMap {
                found: "empty object".to_string(),
            })?;

        match name.as_str() {
            "showDialog" => Ok(CommandDoc::ShowDialog(require_string(
                "showDialog",
                param,
            )?)),
            "showDebugMessage" => Ok(CommandDoc::ShowDebugMessage(require_string(
                "showDebugMessage",
                param,
            )?)),
            "wait" => Ok(CommandDoc::Wait(require_seconds("wait", param)?)),
            "playerMovement" => Ok(CommandDoc::PlayerMovement(require_flag(
                "playerMovement",
                param,
            )?)),
            "fadeIn" => Ok(CommandDoc::FadeIn(require_seconds("fadeIn", param)?)),
            "fadeOut" => Ok(CommandDoc::FadeOut(require_seconds("fadeOut", param)?)),
            "setVar" => parse_set_var(param),
            "if" => parse_if(param),
            other => Err(ScriptParseError::UnknownCommand(other.to_string())),
        }
    }

    /// Collect every dialog group name referenced by `showDialog`, recursing
    /// into `if` branches. Used by the dump/inspect tooling to report dangling
    /// references before the runtime silently drops them.
    pub fn collect_dialog_refs(script: &[CommandDoc], out: &mut BTreeSet<String>) {
        for command in script {
            match command {
                CommandDoc::ShowDialog(group) => {
                    out.insert(group.clone());
                }
                CommandDoc::If {
                    then, otherwise, ..
                } => {
                    Self::collect_dialog_refs(then, out);
                    Self::collect_dialog_refs(otherwise, out);
                }
                _ => {}
            }
        }
    }
}

impl fmt::Display for CommandDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandDoc::ShowDialog(group) => write!(f, "showDialog {group}"),
            CommandDoc::ShowDebugMessage(text) => write!(f, "showDebugMessage {text:?}"),
            CommandDoc::Wait(seconds) => write!(f, "wait {seconds}"),
            CommandDoc::PlayerMovement(enabled) => write!(f, "playerMovement {enabled}"),
            CommandDoc::FadeIn(seconds) => write!(f, "fadeIn {seconds}"),
            CommandDoc::FadeOut(seconds) => write!(f, "fadeOut {seconds}"),
            CommandDoc::SetVar { name, expr } => write!(f, "setVar {name} = {expr}"),
            CommandDoc::If { condition, .. } => write!(f, "if {condition:?}"),
        }
    }
}

impl<'de> Deserialize<'de> for CommandDoc {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        CommandDoc::from_value(&value).map_err(D::Error::custom)
    }
}

pub fn parse_script(entries: &[Value]) -> Result<Vec<CommandDoc>, ScriptParseError> {
    entries.iter().map(CommandDoc::from_value).collect()
}

fn parse_set_var(param: &Value) -> Result<CommandDoc, ScriptParseError> {
    let pair = param
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| bad_parameter("setVar", "a two-element [name, expression] array", param))?;
    let name = pair[0]
        .as_str()
        .ok_or_else(|| bad_parameter("setVar", "a string variable name", &pair[0]))?;
    let expr = match &pair[1] {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => return Err(bad_parameter("setVar", "a string expression", other)),
    };
    Ok(CommandDoc::SetVar {
        name: name.to_string(),
        expr,
    })
}

fn parse_if(param: &Value) -> Result<CommandDoc, ScriptParseError> {
    let map = param
        .as_object()
        .ok_or_else(|| bad_parameter("if", "an object with condition/then/else", param))?;
    let condition = map
        .get("condition")
        .and_then(Value::as_str)
        .ok_or(ScriptParseError::MissingCondition)?
        .to_string();
    let then = parse_branch(map.get("then"))?;
    let otherwise = parse_branch(map.get("else"))?;
    Ok(CommandDoc::If {
        condition,
        then,
        otherwise,
    })
}

fn parse_branch(branch: Option<&Value>) -> Result<Vec<CommandDoc>, ScriptParseError> {
    match branch {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => parse_script(entries),
        Some(other) => Err(bad_parameter("if", "a command array branch", other)),
    }
}

fn require_string(command: &'static str, param: &Value) -> Result<String, ScriptParseError> {
    param
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| bad_parameter(command, "a string", param))
}

fn require_seconds(command: &'static str, param: &Value) -> Result<f64, ScriptParseError> {
    param
        .as_f64()
        .ok_or_else(|| bad_parameter(command, "a number of seconds", param))
}

fn require_flag(command: &'static str, param: &Value) -> Result<bool, ScriptParseError> {
    param
        .as_bool()
        .ok_or_else(|| bad_parameter(command, "a boolean", param))
}

fn bad_parameter(command: &'static str, expected: &'static str, found: &Value) -> ScriptParseError {
    ScriptParseError::BadParameter {
        command,
        expected,
        found: value_kind(found).to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Vec<CommandDoc> {
        let entries: Vec<Value> = serde_json::from_str(text).expect("script json");
        parse_script(&entries).expect("script commands")
    }

    #[test]
    fn parses_every_leaf_command() {
        let script = parse(
            r#"[
                {"showDialog": "welcome"},
                {"showDebugMessage": "hi"},
                {"wait": 0.5},
                {"playerMovement": false},
                {"fadeIn": 2},
                {"fadeOut": 1.5},
                {"setVar": ["gold", "gold + 10"]}
            ]"#,
        );
        assert_eq!(script.len(), 7);
        assert_eq!(script[0], CommandDoc::ShowDialog("welcome".into()));
        assert_eq!(script[2], CommandDoc::Wait(0.5));
        assert_eq!(script[3], CommandDoc::PlayerMovement(false));
        assert_eq!(script[4], CommandDoc::FadeIn(2.0));
        assert_eq!(
            script[6],
            CommandDoc::SetVar {
                name: "gold".into(),
                expr: "gold + 10".into(),
            }
        );
    }

    #[test]
    fn parses_nested_if_branches() {
        let script = parse(
            r#"[
                {"if": {
                    "condition": "doorOpen",
                    "then": [
                        {"showDebugMessage": "open"},
                        {"if": {"condition": "gold >= 5", "then": [{"wait": 1}]}}
                    ],
                    "else": [{"showDialog": "locked"}]
                }}
            ]"#,
        );
        match &script[0] {
            CommandDoc::If {
                condition,
                then,
                otherwise,
            } => {
                assert_eq!(condition, "doorOpen");
                assert_eq!(then.len(), 2);
                assert!(matches!(then[1], CommandDoc::If { .. }));
                assert_eq!(otherwise.len(), 1);
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn set_var_accepts_literal_payloads() {
        let script = parse(r#"[{"setVar": ["hp", 10]}, {"setVar": ["alive", true]}]"#);
        assert_eq!(
            script[0],
            CommandDoc::SetVar {
                name: "hp".into(),
                expr: "10".into(),
            }
        );
        assert_eq!(
            script[1],
            CommandDoc::SetVar {
                name: "alive".into(),
                expr: "true".into(),
            }
        );
    }

    #[test]
    fn rejects_unknown_commands_and_bad_shapes() {
        let unknown = CommandDoc::from_value(&serde_json::json!({"teleport": "room2"}));
        assert!(matches!(
            unknown,
            Err(ScriptParseError::UnknownCommand(name)) if name == "teleport"
        ));

        let two_keys = CommandDoc::from_value(&serde_json::json!({"wait": 1, "fadeIn": 1}));
        assert!(matches!(
            two_keys,
            Err(ScriptParseError::NotACommandMap { .. })
        ));

        let bad_wait = CommandDoc::from_value(&serde_json::json!({"wait": "soon"}));
        assert!(matches!(
            bad_wait,
            Err(ScriptParseError::BadParameter { command: "wait", .. })
        ));

        let bad_pair = CommandDoc::from_value(&serde_json::json!({"setVar": ["gold"]}));
        assert!(matches!(
            bad_pair,
            Err(ScriptParseError::BadParameter { command: "setVar", .. })
        ));
    }

    #[test]
    fn collects_dialog_references_through_branches() {
        let script = parse(
            r#"[
                {"showDialog": "intro"},
                {"if": {
                    "condition": "met",
                    "then": [{"showDialog": "again"}],
                    "else": [{"showDialog": "first"}]
                }}
            ]"#,
        );
        let mut refs = BTreeSet::new();
        CommandDoc::collect_dialog_refs(&script, &mut refs);
        let refs: Vec<_> = refs.into_iter().collect();
        assert_eq!(refs, vec!["again", "first", "intro"]);
    }
}
