//! Scenario iteration documents: one trigger condition plus scoring rules.

use crate::ast::AstNode;
use crate::serializer::{from_serialized, SerializedNode};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioIteration {
    pub scenario_id: String,
    pub iteration_id: String,
    #[serde(default)]
    pub trigger_condition: Option<SerializedNode>,
    #[serde(default)]
    pub rules: Vec<ScoringRule>,
}

/// A rule adds `score_modifier` to the decision score when its formula holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub score_modifier: i64,
    #[serde(default)]
    pub formula: Option<SerializedNode>,
}

/// The expression a session edits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditTarget {
    Trigger,
    Rule {
        #[serde(rename = "ruleId")]
        rule_id: String,
    },
}

impl EditTarget {
    pub fn rule(rule_id: impl Into<String>) -> Self {
        Self::Rule {
            rule_id: rule_id.into(),
        }
    }
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::Trigger => write!(f, "trigger"),
            EditTarget::Rule { rule_id } => write!(f, "rule:{}", rule_id),
        }
    }
}

impl ScenarioIteration {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn rule(&self, rule_id: &str) -> Option<&ScoringRule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    /// Every editable expression, trigger first
    pub fn targets(&self) -> Vec<EditTarget> {
        std::iter::once(EditTarget::Trigger)
            .chain(self.rules.iter().map(|r| EditTarget::rule(r.id.clone())))
            .collect()
    }

    /// Tree for `target`; a missing expression opens as a lone placeholder.
    /// `None` if the target names an unknown rule.
    pub fn expression(&self, target: &EditTarget) -> Option<AstNode> {
        let serialized = match target {
            EditTarget::Trigger => self.trigger_condition.as_ref(),
            EditTarget::Rule { rule_id } => self.rule(rule_id)?.formula.as_ref(),
        };
        Some(serialized.map_or_else(AstNode::undefined, from_serialized))
    }

    /// Store `expression` for `target`. Returns false for an unknown rule.
    pub fn set_expression(&mut self, target: &EditTarget, expression: SerializedNode) -> bool {
        match target {
            EditTarget::Trigger => {
                self.trigger_condition = Some(expression);
                true
            }
            EditTarget::Rule { rule_id } => match self.rules.iter_mut().find(|r| &r.id == rule_id) {
                Some(rule) => {
                    rule.formula = Some(expression);
                    true
                }
                None => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITERATION: &str = r#"{
        "scenarioId": "sc-1",
        "iterationId": "it-3",
        "triggerCondition": {
            "type": "operator",
            "operator": "=",
            "children": [
                { "type": "field", "table": "transactions", "field": "country" },
                { "type": "constant", "value": "FR" }
            ]
        },
        "rules": [
            { "id": "r1", "name": "Large amount", "scoreModifier": 30 },
            {
                "id": "r2",
                "name": "Blocked",
                "scoreModifier": -10,
                "formula": { "type": "constant", "value": true }
            }
        ]
    }"#;

    #[test]
    fn test_parse_iteration() {
        let iteration = ScenarioIteration::from_json(ITERATION).unwrap();

        assert_eq!(iteration.rules.len(), 2);
        assert_eq!(iteration.rules[1].score_modifier, -10);
        assert_eq!(
            iteration.targets(),
            vec![EditTarget::Trigger, EditTarget::rule("r1"), EditTarget::rule("r2")]
        );
    }

    #[test]
    fn test_expressions() {
        let iteration = ScenarioIteration::from_json(ITERATION).unwrap();

        let trigger = iteration.expression(&EditTarget::Trigger).unwrap();
        assert_eq!(trigger.to_string(), "transactions.country = \"FR\"");

        let missing = iteration.expression(&EditTarget::rule("r1")).unwrap();
        assert!(missing.is_undefined());

        assert!(iteration.expression(&EditTarget::rule("nope")).is_none());
    }

    #[test]
    fn test_target_serde() {
        let json = serde_json::to_string(&EditTarget::rule("r2")).unwrap();
        assert_eq!(json, r#"{"kind":"rule","ruleId":"r2"}"#);
    }
}
