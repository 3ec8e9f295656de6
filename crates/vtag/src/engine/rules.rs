//! Rule expression parsing.
//!
//! `required,min=3,max=50` is three rules evaluated in order; `tel|mobile` is
//! one rule that passes when either alternative passes. `0x2C` and `0x7C` in a
//! parameter stand for a literal `,` and `|`.

use crate::error::{Error, Result};

/// One alternative of a rule: a tag and its (possibly empty) parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub tag: String,
    pub param: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Skip the remaining rules when the value is empty.
    OmitEmpty,
    /// Passes when any alternative passes.
    Check(Vec<Alternative>),
}

impl Rule {
    /// Tag reported when this rule fails.
    pub fn failing_tag(&self) -> String {
        match self {
            Rule::OmitEmpty => "omitempty".to_string(),
            Rule::Check(alts) => alts
                .iter()
                .map(|a| a.tag.as_str())
                .collect::<Vec<_>>()
                .join("|"),
        }
    }

    /// Param reported when this rule fails; OR groups report none.
    pub fn failing_param(&self) -> String {
        match self {
            Rule::Check(alts) if alts.len() == 1 => alts[0].param.clone(),
            _ => String::new(),
        }
    }
}

/// A parsed rule expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every tag referenced by the expression, with its param.
    pub fn alternatives(&self) -> impl Iterator<Item = &Alternative> {
        self.rules.iter().flat_map(|r| match r {
            Rule::OmitEmpty => &[] as &[Alternative],
            Rule::Check(alts) => alts.as_slice(),
        })
    }
}

fn decode_param(raw: &str) -> String {
    raw.replace("0x2C", ",").replace("0x7C", "|")
}

fn parse_alternative(expr: &str, raw: &str) -> Result<Alternative> {
    let (tag, param) = match raw.split_once('=') {
        Some((tag, param)) => (tag.trim(), decode_param(param)),
        None => (raw.trim(), String::new()),
    };

    if tag.is_empty() {
        return Err(Error::MalformedRule(expr.to_string()));
    }

    Ok(Alternative {
        tag: tag.to_string(),
        param,
    })
}

/// Parse a rule expression. An empty expression yields an empty rule set.
pub fn parse(expr: &str) -> Result<RuleSet> {
    if expr.trim().is_empty() {
        return Ok(RuleSet::default());
    }

    let mut rules = Vec::new();
    for token in expr.split(',') {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::MalformedRule(expr.to_string()));
        }

        if token == "omitempty" {
            rules.push(Rule::OmitEmpty);
            continue;
        }

        let alts = token
            .split('|')
            .map(|raw| parse_alternative(expr, raw))
            .collect::<Result<Vec<_>>>()?;
        rules.push(Rule::Check(alts));
    }

    Ok(RuleSet { rules })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alt(tag: &str, param: &str) -> Alternative {
        Alternative {
            tag: tag.to_string(),
            param: param.to_string(),
        }
    }

    #[test]
    fn parses_sequence() {
        let set = parse("required,min=3,max=50").unwrap();
        assert_eq!(
            set.rules(),
            &[
                Rule::Check(vec![alt("required", "")]),
                Rule::Check(vec![alt("min", "3")]),
                Rule::Check(vec![alt("max", "50")]),
            ]
        );
    }

    #[test]
    fn parses_or_group() {
        let set = parse("omitempty,tel|mobile").unwrap();
        assert_eq!(set.rules()[0], Rule::OmitEmpty);
        let rule = &set.rules()[1];
        assert_eq!(rule.failing_tag(), "tel|mobile");
        assert_eq!(rule.failing_param(), "");
    }

    #[test]
    fn decodes_escaped_separators() {
        let set = parse("oneof=a0x2Cb c0x7Cd").unwrap();
        assert_eq!(set.rules()[0], Rule::Check(vec![alt("oneof", "a,b c|d")]));
    }

    #[test]
    fn empty_expression_is_empty_set() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_tokens() {
        assert!(matches!(parse("required,,min=1"), Err(Error::MalformedRule(_))));
        assert!(matches!(parse("required,"), Err(Error::MalformedRule(_))));
        assert!(matches!(parse("=3"), Err(Error::MalformedRule(_))));
        assert!(matches!(parse("tel|"), Err(Error::MalformedRule(_))));
    }

    #[test]
    fn alternatives_flatten_groups() {
        let set = parse("omitempty,tel|mobile,max=11").unwrap();
        let tags: Vec<_> = set.alternatives().map(|a| a.tag.as_str()).collect();
        assert_eq!(tags, vec!["tel", "mobile", "max"]);
    }
}
