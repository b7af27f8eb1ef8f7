//! Scene-scoped variable store and the small expression language used by
//! script commands.
//!
//! Conditions split on literal `" and "` / `" or "` tokens and evaluate
//! strictly left to right with no precedence or grouping. That flat model is
//! the authored format's contract, so it is preserved here rather than fixed.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value as JsonValue;

static VAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("variable token pattern"));

/// A dynamically typed variable value. The type is whatever the most recent
/// assignment stored; reads coerce instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    /// Truthiness for bare condition atoms: bools directly, numbers by
    /// non-zero test, strings by the literals `true` / `false` only.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            Value::Int(n) => Some(*n != 0),
            Value::Float(n) => Some(*n != 0.0),
            Value::Str(text) => match text.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
        }
    }

    /// Numeric coercion for comparisons and arithmetic.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Str(text) => text.trim().parse().ok(),
        }
    }

    pub fn is_whole(&self) -> bool {
        match self {
            Value::Bool(_) => true,
            Value::Int(_) => true,
            Value::Float(n) => n.fract() == 0.0,
            Value::Str(_) => false,
        }
    }

    pub fn from_json(value: &JsonValue) -> Option<Value> {
        match value {
            JsonValue::Bool(flag) => Some(Value::Bool(*flag)),
            JsonValue::Number(number) => {
                if let Some(n) = number.as_i64() {
                    Some(Value::Int(n))
                } else {
                    number.as_f64().map(Value::Float)
                }
            }
            JsonValue::String(text) => Some(Value::Str(text.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Str(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct VarStore {
    values: BTreeMap<String, Value>,
}

impl VarStore {
    pub fn new() -> Self {
        VarStore::default()
    }

    /// Seed the store from a scene's `GlobalVars` literals. Non-scalar
    /// literals are skipped with a warning; the scene still loads.
    pub fn seed(globals: &BTreeMap<String, JsonValue>) -> Self {
        let mut store = VarStore::new();
        for (name, literal) in globals {
            match Value::from_json(literal) {
                Some(value) => store.set(name, value),
                None => log::warn!("global var `{name}` has a non-scalar literal; skipped"),
            }
        }
        store
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `{name}` token with the stringified value of that
    /// variable. Unknown names are left in place, braces and all.
    pub fn interpolate(&self, text: &str) -> String {
        VAR_TOKEN
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                match self.values.get(name) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Evaluate a flat boolean condition: atoms joined by `" and "` /
    /// `" or "`, folded strictly left to right.
    pub fn eval_condition(&self, condition: &str) -> bool {
        let mut rest = condition.trim();
        if rest.is_empty() {
            return false;
        }

        let (first, mut tail) = split_next_atom(rest);
        let mut acc = self.eval_atom(first);
        while let Some((op, after)) = tail {
            rest = after;
            let (atom, next_tail) = split_next_atom(rest);
            let rhs = self.eval_atom(atom);
            acc = match op {
                BoolOp::And => acc && rhs,
                BoolOp::Or => acc || rhs,
            };
            tail = next_tail;
        }
        acc
    }

    /// Evaluate an assignment expression: either a single operand or two
    /// operands joined by `+`. Single operands resolve as literal, variable
    /// copy, or raw string in that order.
    pub fn eval_expression(&self, expr: &str) -> Value {
        let expr = expr.trim();
        if let Some((lhs, rhs)) = expr.split_once('+') {
            return self.eval_sum(lhs.trim(), rhs.trim());
        }
        self.resolve_operand(expr)
    }

    fn eval_sum(&self, lhs: &str, rhs: &str) -> Value {
        let left = self.resolve_operand(lhs);
        let right = self.resolve_operand(rhs);
        // Unresolvable operands contribute zero instead of poisoning the sum.
        let (a, a_whole) = match left.as_float() {
            Some(n) => (n, left.is_whole()),
            None => {
                log::warn!("operand `{lhs}` is not numeric; using 0");
                (0.0, true)
            }
        };
        let (b, b_whole) = match right.as_float() {
            Some(n) => (n, right.is_whole()),
            None => {
                log::warn!("operand `{rhs}` is not numeric; using 0");
                (0.0, true)
            }
        };
        let sum = a + b;
        if a_whole && b_whole {
            Value::Int(sum as i64)
        } else {
            Value::Float(sum)
        }
    }

    fn resolve_operand(&self, operand: &str) -> Value {
        if let Ok(n) = operand.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(n) = operand.parse::<f64>() {
            return Value::Float(n);
        }
        match operand {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Some(value) = self.values.get(operand) {
            return value.clone();
        }
        Value::Str(operand.to_string())
    }

    fn eval_atom(&self, atom: &str) -> bool {
        let atom = atom.trim();
        let (negated, body) = match atom.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, atom),
        };
        let result = self.eval_comparison_or_ref(body);
        if negated { !result } else { result }
    }

    fn eval_comparison_or_ref(&self, body: &str) -> bool {
        // Two-character operators first so ">=" is never read as ">" "=".
        const OPS: [(&str, fn(f64, f64) -> bool); 6] = [
            (">=", |a, b| a >= b),
            ("<=", |a, b| a <= b),
            (">", |a, b| a > b),
            ("<", |a, b| a < b),
            ("==", |a, b| a == b),
            ("!=", |a, b| a != b),
        ];
        for (token, apply) in OPS {
            if let Some((lhs, rhs)) = body.split_once(token) {
                let lhs = self.comparison_operand(lhs.trim());
                let rhs = self.comparison_operand(rhs.trim());
                return match (lhs, rhs) {
                    (Some(a), Some(b)) => apply(a, b),
                    _ => {
                        log::warn!("comparison `{body}` has an unresolvable operand");
                        false
                    }
                };
            }
        }

        match body {
            "true" => true,
            "false" => false,
            name => match self.values.get(name).and_then(Value::as_bool) {
                Some(flag) => flag,
                None => {
                    log::warn!("condition references unknown or non-boolean `{name}`");
                    false
                }
            },
        }
    }

    fn comparison_operand(&self, operand: &str) -> Option<f64> {
        if let Ok(n) = operand.parse::<f64>() {
            return Some(n);
        }
        self.values.get(operand).and_then(Value::as_float)
    }
}

#[derive(Debug, Clone, Copy)]
enum BoolOp {
    And,
    Or,
}

/// Split off the next atom, returning it plus the operator and remainder when
/// another atom follows. The earliest joiner wins so mixed expressions fold
/// left to right.
fn split_next_atom(rest: &str) -> (&str, Option<(BoolOp, &str)>) {
    let and_at = rest.find(" and ");
    let or_at = rest.find(" or ");
    match (and_at, or_at) {
        (Some(a), Some(o)) if a < o => (&rest[..a], Some((BoolOp::And, &rest[a + 5..]))),
        (Some(a), None) => (&rest[..a], Some((BoolOp::And, &rest[a + 5..]))),
        (_, Some(o)) => (&rest[..o], Some((BoolOp::Or, &rest[o + 4..]))),
        (None, None) => (rest, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> VarStore {
        let mut vars = VarStore::new();
        vars.set("hp", Value::Int(5));
        vars.set("alive", Value::Bool(true));
        vars.set("gold", Value::Int(42));
        vars.set("ratio", Value::Float(0.5));
        vars.set("name", Value::Str("Willy".into()));
        vars
    }

    #[test]
    fn interpolates_known_tokens_and_keeps_unknown_ones() {
        let vars = store();
        assert_eq!(vars.interpolate("Gold: {gold}"), "Gold: 42");
        assert_eq!(vars.interpolate("{name} ({alive})"), "Willy (true)");
        assert_eq!(vars.interpolate("ratio={ratio}"), "ratio=0.5");
        assert_eq!(vars.interpolate("{unknown} stays"), "{unknown} stays");
        assert_eq!(vars.interpolate("no tokens"), "no tokens");
    }

    #[test]
    fn evaluates_flat_and_or_conditions() {
        let mut vars = store();
        assert!(vars.eval_condition("hp > 0 and alive"));
        vars.set("alive", Value::Bool(false));
        assert!(!vars.eval_condition("hp > 0 and alive"));
        assert!(vars.eval_condition("hp > 0 or alive"));
        assert!(vars.eval_condition("!alive"));
        assert!(vars.eval_condition("true"));
        assert!(!vars.eval_condition("false or !true"));
    }

    #[test]
    fn mixed_joiners_fold_left_to_right() {
        let vars = store();
        // ((false and false) or true) is true under the flat left fold.
        assert!(vars.eval_condition("false and false or true"));
        // ((true or false) and false) is false, where precedence rules would
        // give true.
        assert!(!vars.eval_condition("true or false and false"));
    }

    #[test]
    fn comparison_operators_scan_in_order() {
        let vars = store();
        assert!(vars.eval_condition("hp >= 5"));
        assert!(vars.eval_condition("hp <= 5"));
        assert!(!vars.eval_condition("hp > 5"));
        assert!(vars.eval_condition("hp < 6"));
        assert!(vars.eval_condition("hp == 5"));
        assert!(vars.eval_condition("hp != 4"));
        assert!(vars.eval_condition("ratio < 1"));
    }

    #[test]
    fn unresolvable_comparison_operands_are_false() {
        let vars = store();
        assert!(!vars.eval_condition("mana > 0"));
        assert!(!vars.eval_condition("hp > mana"));
        assert!(!vars.eval_condition("missing"));
        // Negation still applies to the degraded atom.
        assert!(vars.eval_condition("!missing"));
    }

    #[test]
    fn arithmetic_keeps_intness_when_both_operands_are_whole() {
        let mut vars = store();
        vars.set("score", Value::Int(9));
        assert_eq!(vars.eval_expression("score + 1"), Value::Int(10));
        vars.set("score", Value::Float(9.5));
        assert_eq!(vars.eval_expression("score + 1"), Value::Float(10.5));
        assert_eq!(vars.eval_expression("2 + 3"), Value::Int(5));
        assert_eq!(vars.eval_expression("2.5 + 0.5"), Value::Float(3.0));
    }

    #[test]
    fn single_operand_expressions_resolve_literals_vars_and_strings() {
        let vars = store();
        assert_eq!(vars.eval_expression("7"), Value::Int(7));
        assert_eq!(vars.eval_expression("7.5"), Value::Float(7.5));
        assert_eq!(vars.eval_expression("true"), Value::Bool(true));
        assert_eq!(vars.eval_expression("gold"), Value::Int(42));
        assert_eq!(
            vars.eval_expression("Sir Willy"),
            Value::Str("Sir Willy".into())
        );
    }

    #[test]
    fn unresolvable_sum_operands_contribute_zero() {
        let vars = store();
        assert_eq!(vars.eval_expression("mystery + 2"), Value::Int(2));
        assert_eq!(vars.eval_expression("name + 1"), Value::Int(1));
    }

    #[test]
    fn seeding_from_json_literals_keeps_types() {
        let globals: BTreeMap<String, JsonValue> = serde_json::from_str(
            r#"{"hasKey": false, "gold": 12, "pi": 3.5, "label": "inn"}"#,
        )
        .expect("globals json");
        let vars = VarStore::seed(&globals);
        assert_eq!(vars.get("hasKey"), Some(&Value::Bool(false)));
        assert_eq!(vars.get("gold"), Some(&Value::Int(12)));
        assert_eq!(vars.get("pi"), Some(&Value::Float(3.5)));
        assert_eq!(vars.get("label"), Some(&Value::Str("inn".into())));
    }
}
