//! System prompt selection from the request's context hint

use regex::Regex;
use serde::Deserialize;

use crate::domain::DomainError;

/// Predicate over the context hint (usually the source page URL)
#[derive(Debug, Clone)]
pub enum HintMatcher {
    /// Hint contains the substring
    Contains(String),
    /// Hint parses as a URL whose host equals the pattern or is a subdomain of it
    Host(String),
    /// Hint matches the regular expression
    Regex(Regex),
}

impl HintMatcher {
    pub fn matches(&self, hint: &str) -> bool {
        match self {
            Self::Contains(needle) => hint.contains(needle.as_str()),
            Self::Host(domain) => match extract_host(hint) {
                Some(host) => host == *domain || host.ends_with(&format!(".{}", domain)),
                None => false,
            },
            Self::Regex(regex) => regex.is_match(hint),
        }
    }
}

/// A `(predicate, addendum)` pair of the prompt policy table
#[derive(Debug, Clone)]
pub struct PromptRule {
    pub name: String,
    pub matcher: HintMatcher,
    pub addendum: String,
}

impl PromptRule {
    pub fn new(name: impl Into<String>, matcher: HintMatcher, addendum: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher,
            addendum: addendum.into(),
        }
    }
}

/// Matcher kinds accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Contains,
    Host,
    Regex,
}

/// Prompt rule as written in configuration files
#[derive(Debug, Clone, Deserialize)]
pub struct PromptRuleConfig {
    pub name: String,
    #[serde(rename = "match")]
    pub kind: MatchKind,
    pub pattern: String,
    pub addendum: String,
}

impl TryFrom<PromptRuleConfig> for PromptRule {
    type Error = DomainError;

    fn try_from(config: PromptRuleConfig) -> Result<Self, Self::Error> {
        let matcher = match config.kind {
            MatchKind::Contains => HintMatcher::Contains(config.pattern),
            MatchKind::Host => HintMatcher::Host(config.pattern.to_lowercase()),
            MatchKind::Regex => HintMatcher::Regex(Regex::new(&config.pattern).map_err(|e| {
                DomainError::configuration(format!(
                    "Invalid regex in prompt rule '{}': {}",
                    config.name, e
                ))
            })?),
        };

        Ok(Self::new(config.name, matcher, config.addendum))
    }
}

/// Ordered table of prompt rules applied on top of a base system prompt
#[derive(Debug, Clone)]
pub struct PromptPolicy {
    target_language: String,
    rules: Vec<PromptRule>,
}

const CODE_HOSTING_ADDENDUM: &str = "This page is from a code-hosting site: keep terms such as PR, Pull Request, Issue, Commit, Branch, Merge, Fork and Release untranslated.";

const DOCUMENTATION_ADDENDUM: &str = "This page is technical documentation: keep API names, function and type names, command-line flags and configuration keys exactly as written.";

impl PromptPolicy {
    /// Creates a policy with no rules
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            rules: Vec::new(),
        }
    }

    /// Creates a policy with the built-in code-hosting and documentation rules
    pub fn with_defaults(target_language: impl Into<String>) -> Self {
        let mut policy = Self::new(target_language);

        for host in ["github.com", "gitlab.com", "bitbucket.org"] {
            policy = policy.with_rule(PromptRule::new(
                host,
                HintMatcher::Host(host.to_string()),
                CODE_HOSTING_ADDENDUM,
            ));
        }

        for host in ["docs.rs", "readthedocs.io", "developer.mozilla.org"] {
            policy = policy.with_rule(PromptRule::new(
                host,
                HintMatcher::Host(host.to_string()),
                DOCUMENTATION_ADDENDUM,
            ));
        }

        // docs.<anything> subdomains
        if let Ok(regex) = Regex::new(r"^https?://docs\.[^/]+") {
            policy = policy.with_rule(PromptRule::new(
                "docs-subdomain",
                HintMatcher::Regex(regex),
                DOCUMENTATION_ADDENDUM,
            ));
        }

        policy
    }

    /// Appends a rule; rules are evaluated in insertion order
    pub fn with_rule(mut self, rule: PromptRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[PromptRule] {
        &self.rules
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Builds the system prompt for a context hint.
    ///
    /// Every matching rule contributes its addendum once, in table order;
    /// identical addenda from several matching rules are emitted once.
    pub fn system_prompt(&self, context_hint: &str) -> String {
        let mut lines = vec![
            format!(
                "You are a translation engine. Translate each of the provided text segments into {}.",
                self.target_language
            ),
            "Rules:".to_string(),
        ];

        let mut instructions: Vec<&str> = vec![
            "Return exactly as many segments as you were given, in the same order.",
            "Separate translated segments with a line containing only \"---\".",
            "Keep technical terms, code identifiers, brand names and placeholders such as {{0}} unchanged.",
            "Return only the translations, without explanations.",
        ];

        for rule in &self.rules {
            if rule.matcher.matches(context_hint) && !instructions.contains(&rule.addendum.as_str()) {
                instructions.push(rule.addendum.as_str());
            }
        }

        lines.extend(
            instructions
                .iter()
                .enumerate()
                .map(|(i, text)| format!("{}. {}", i + 1, text)),
        );

        lines.join("\n")
    }

    /// Names of the rules matching a context hint, in table order
    pub fn matching_rules(&self, context_hint: &str) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.matcher.matches(context_hint))
            .map(|rule| rule.name.as_str())
            .collect()
    }
}

/// Extracts the lowercase host from a URL-like hint
fn extract_host(hint: &str) -> Option<String> {
    let rest = hint.trim().split_once("://").map(|(_, rest)| rest)?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = host_port.split(':').next()?;

    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host() {
        assert_eq!(
            extract_host("https://github.com/rust-lang/rust/pull/1"),
            Some("github.com".to_string())
        );
        assert_eq!(
            extract_host("http://user@Docs.Example.com:8080/path?q=1"),
            Some("docs.example.com".to_string())
        );
        assert_eq!(extract_host("github.com/no-scheme"), None);
        assert_eq!(extract_host(""), None);
    }

    #[test]
    fn test_host_matcher_includes_subdomains() {
        let matcher = HintMatcher::Host("github.com".to_string());
        assert!(matcher.matches("https://github.com/org/repo"));
        assert!(matcher.matches("https://gist.github.com/abc"));
        assert!(!matcher.matches("https://notgithub.com/"));
        assert!(!matcher.matches("https://example.com/?ref=github.com"));
    }

    #[test]
    fn test_contains_matcher() {
        let matcher = HintMatcher::Contains("wiki".to_string());
        assert!(matcher.matches("https://en.wikipedia.org/wiki/Rust"));
        assert!(!matcher.matches("https://example.com"));
    }

    #[test]
    fn test_base_prompt_without_matches() {
        let policy = PromptPolicy::with_defaults("Simplified Chinese");
        let prompt = policy.system_prompt("https://example.com/blog");

        assert!(prompt.contains("into Simplified Chinese"));
        assert!(prompt.contains("\"---\""));
        assert!(prompt.contains("4. Return only the translations"));
        assert!(!prompt.contains("5."));
    }

    #[test]
    fn test_code_hosting_addendum() {
        let policy = PromptPolicy::with_defaults("Simplified Chinese");
        let prompt = policy.system_prompt("https://github.com/tokio-rs/tokio/issues/1");

        assert!(prompt.contains(&format!("5. {}", CODE_HOSTING_ADDENDUM)));
        assert!(!prompt.contains(DOCUMENTATION_ADDENDUM));
    }

    #[test]
    fn test_documentation_addendum_emitted_once() {
        let policy = PromptPolicy::with_defaults("Simplified Chinese");
        // Matches both the docs.rs host rule and the docs subdomain regex
        let prompt = policy.system_prompt("https://docs.rs/tokio/latest/tokio/");

        assert_eq!(prompt.matches(DOCUMENTATION_ADDENDUM).count(), 1);
        assert_eq!(
            policy.matching_rules("https://docs.rs/tokio/latest/tokio/"),
            vec!["docs.rs", "docs-subdomain"]
        );
    }

    #[test]
    fn test_custom_rule_extends_table() {
        let policy = PromptPolicy::new("Japanese").with_rule(PromptRule::new(
            "wikipedia",
            HintMatcher::Contains("wikipedia.org".to_string()),
            "Keep citation markers like [1] in place.",
        ));

        let prompt = policy.system_prompt("https://en.wikipedia.org/wiki/Rust");
        assert!(prompt.contains("into Japanese"));
        assert!(prompt.contains("5. Keep citation markers like [1] in place."));
    }

    #[test]
    fn test_rule_from_config() {
        let config = PromptRuleConfig {
            name: "stackoverflow".to_string(),
            kind: MatchKind::Host,
            pattern: "StackOverflow.com".to_string(),
            addendum: "Keep code blocks untranslated.".to_string(),
        };

        let rule = PromptRule::try_from(config).unwrap();
        assert!(rule.matcher.matches("https://stackoverflow.com/questions/1"));
    }

    #[test]
    fn test_invalid_regex_rule_is_configuration_error() {
        let config = PromptRuleConfig {
            name: "broken".to_string(),
            kind: MatchKind::Regex,
            pattern: "([".to_string(),
            addendum: "x".to_string(),
        };

        let err = PromptRule::try_from(config).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
