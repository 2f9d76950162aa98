//! Explicit rule table
//!
//! Rules encode domain knowledge that sparse history can't teach (well-known
//! chains, utility providers, subscription services). They are evaluated in
//! table order against the lower-cased description and the first match wins.

use regex::{Regex, RegexBuilder};

use crate::config::RuleConfig;
use crate::error::{Error, Result};
use crate::models::{CategoryPair, PatternType};

/// A rule ready for matching
#[derive(Debug, Clone)]
pub struct Rule {
    pub pattern: String,
    pub pattern_type: PatternType,
    pub assignment: CategoryPair,
    /// Lower-cased text the row's current subcategory must contain
    pub subcategory_guard: Option<String>,
    /// Lower-cased alternatives for the text pattern types
    alternatives: Vec<String>,
    regex: Option<Regex>,
}

impl Rule {
    pub fn compile(config: &RuleConfig) -> Result<Self> {
        let regex = match config.pattern_type {
            PatternType::Regex => Some(
                RegexBuilder::new(&config.pattern)
                    .case_insensitive(true)
                    .build()?,
            ),
            _ => None,
        };
        let alternatives = config
            .pattern
            .split('|')
            .filter(|p| !p.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>();
        if regex.is_none() && alternatives.is_empty() {
            return Err(Error::Config(format!(
                "rule for '{}' has no usable pattern",
                config.category
            )));
        }

        Ok(Self {
            pattern: config.pattern.clone(),
            pattern_type: config.pattern_type,
            assignment: CategoryPair::new(&config.category, &config.subcategory),
            subcategory_guard: config
                .subcategory_guard
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_lowercase),
            alternatives,
            regex,
        })
    }

    /// Check a lower-cased description and the row's current subcategory
    pub fn matches(&self, description_lower: &str, current_subcategory: &str) -> bool {
        if let Some(guard) = &self.subcategory_guard {
            if !current_subcategory.to_lowercase().contains(guard.as_str()) {
                return false;
            }
        }

        match self.pattern_type {
            PatternType::Contains => self
                .alternatives
                .iter()
                .any(|p| description_lower.contains(p.as_str())),
            PatternType::StartsWith => self
                .alternatives
                .iter()
                .any(|p| description_lower.starts_with(p.as_str())),
            PatternType::Exact => self
                .alternatives
                .iter()
                .any(|p| description_lower.trim() == p.trim()),
            PatternType::Regex => self
                .regex
                .as_ref()
                .is_some_and(|re| re.is_match(description_lower)),
        }
    }
}

/// Ordered rule table
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn compile(configs: &[RuleConfig]) -> Result<Self> {
        let rules = configs.iter().map(Rule::compile).collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// First rule matching the description, if any
    pub fn first_match(&self, description: &str, current_subcategory: &str) -> Option<&Rule> {
        let desc_lower = description.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&desc_lower, current_subcategory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, pattern_type: PatternType, category: &str, sub: &str) -> RuleConfig {
        RuleConfig {
            pattern: pattern.to_string(),
            pattern_type,
            category: category.to_string(),
            subcategory: sub.to_string(),
            subcategory_guard: None,
        }
    }

    #[test]
    fn test_contains_with_alternatives() {
        let set = RuleSet::compile(&[rule(
            "mercadona|LIDL",
            PatternType::Contains,
            "ALIMENTACIÓN",
            "SUPERMERCADO",
        )])
        .unwrap();

        assert!(set.first_match("MERCADONA MADRID 12345", "").is_some());
        assert!(set.first_match("Compra lidl centro", "").is_some());
        assert!(set.first_match("ALDI", "").is_none());
    }

    #[test]
    fn test_empty_alternatives_ignored() {
        let set = RuleSet::compile(&[rule("acme||", PatternType::Contains, "A", "B")]).unwrap();
        assert!(set.first_match("something else", "").is_none());
        assert!(RuleSet::compile(&[rule("|", PatternType::Contains, "A", "B")]).is_err());
    }

    #[test]
    fn test_starts_with_and_exact() {
        let set = RuleSet::compile(&[
            rule("bizum", PatternType::StartsWith, "BIZUM", "ENVIADO"),
            rule("cuota mensual", PatternType::Exact, "BANCO", "COMISIONES"),
        ])
        .unwrap();

        assert!(set.first_match("BIZUM A PEPE", "").is_some());
        assert!(set.first_match("PAGO BIZUM", "").is_none());
        assert!(set.first_match("Cuota Mensual", "").is_some());
        assert!(set.first_match("CUOTA MENSUAL TARJETA", "").is_none());
    }

    #[test]
    fn test_regex_rule() {
        let set = RuleSet::compile(&[rule(
            r"^peaje\s+ap-\d+",
            PatternType::Regex,
            "TRANSPORTE",
            "PEAJES",
        )])
        .unwrap();
        assert!(set.first_match("PEAJE AP-7 TARRAGONA", "").is_some());
        assert!(set.first_match("AUTOPISTA PEAJE", "").is_none());
    }

    #[test]
    fn test_invalid_regex_is_error() {
        let result = RuleSet::compile(&[rule("([", PatternType::Regex, "A", "B")]);
        assert!(matches!(result, Err(Error::Regex(_))));
    }

    #[test]
    fn test_first_rule_in_order_wins() {
        let set = RuleSet::compile(&[
            rule("amazon prime", PatternType::Contains, "SUSCRIPCIONES", "PRIME"),
            rule("amazon", PatternType::Contains, "COMPRAS", "ONLINE"),
        ])
        .unwrap();

        let hit = set.first_match("AMAZON PRIME*2K4", "").unwrap();
        assert_eq!(hit.assignment, CategoryPair::new("SUSCRIPCIONES", "PRIME"));

        let hit = set.first_match("AMAZON.ES MARKETPLACE", "").unwrap();
        assert_eq!(hit.assignment, CategoryPair::new("COMPRAS", "ONLINE"));
    }

    #[test]
    fn test_subcategory_guard() {
        let mut guarded = rule("repsol", PatternType::Contains, "TRANSPORTE", "COMBUSTIBLE");
        guarded.subcategory_guard = Some("Combustible".to_string());
        let set = RuleSet::compile(&[guarded]).unwrap();

        assert!(set.first_match("REPSOL E.S. 1234", "SIN SUBCATEGORÍA").is_none());
        assert!(set.first_match("REPSOL E.S. 1234", "COMBUSTIBLE").is_some());
        assert!(set.first_match("REPSOL E.S. 1234", "combustible coche").is_some());
    }
}
