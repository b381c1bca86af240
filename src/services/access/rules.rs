//! Route rules: path pattern + method filter + requirement.
//!
//! Patterns are parsed once when the table is built. A malformed pattern is a
//! startup error, never a request-time one.

use axum::http::Method;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("empty path pattern")]
    Empty,
    #[error("path pattern must start with '/': {0}")]
    MissingLeadingSlash(String),
    #[error("'**' is only supported as the trailing segment: {0}")]
    UnsupportedWildcard(String),
    #[error("rule {0} has an empty method set")]
    EmptyMethodSet(String),
    #[error("'/**' is the implicit last rule and cannot be declared")]
    DeclaredCatchAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
}

/// Parsed form of an ant-style pattern.
///
/// - `/**`          => every path
/// - `/prefix/**`   => `/prefix` itself and anything under `/prefix/`
/// - anything else  => exact literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Any,
    Prefix(String),
    Exact(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, RuleError> {
        if pattern.is_empty() {
            return Err(RuleError::Empty);
        }
        if !pattern.starts_with('/') {
            return Err(RuleError::MissingLeadingSlash(pattern.to_string()));
        }
        if pattern == "/**" {
            return Ok(Self::Any);
        }

        let (literal, prefix) = match pattern.strip_suffix("/**") {
            Some(literal) => (literal, true),
            None => (pattern, false),
        };

        if literal.contains('*') {
            return Err(RuleError::UnsupportedWildcard(pattern.to_string()));
        }

        Ok(if prefix {
            Self::Prefix(literal.to_string())
        } else {
            Self::Exact(literal.to_string())
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(literal) => path == literal,
            Self::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    Any,
    Only(Vec<Method>),
}

impl MethodSet {
    pub fn contains(&self, method: &Method) -> bool {
        match self {
            Self::Any => true,
            Self::Only(methods) => methods.contains(method),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pattern: String,
    path: PathPattern,
    methods: MethodSet,
    requirement: Requirement,
}

impl RouteRule {
    pub fn new(pattern: &str, requirement: Requirement) -> Result<Self, RuleError> {
        Ok(Self {
            pattern: pattern.to_string(),
            path: PathPattern::parse(pattern)?,
            methods: MethodSet::Any,
            requirement,
        })
    }

    pub fn public(pattern: &str) -> Result<Self, RuleError> {
        Self::new(pattern, Requirement::Public)
    }

    pub fn authenticated(pattern: &str) -> Result<Self, RuleError> {
        Self::new(pattern, Requirement::Authenticated)
    }

    /// Restrict the rule to the given methods.
    pub fn with_methods<I>(mut self, methods: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = Method>,
    {
        let methods: Vec<Method> = methods.into_iter().collect();
        if methods.is_empty() {
            return Err(RuleError::EmptyMethodSet(self.pattern));
        }
        self.methods = MethodSet::Only(methods);
        Ok(self)
    }

    fn catch_all() -> Self {
        Self {
            pattern: "/**".to_string(),
            path: PathPattern::Any,
            methods: MethodSet::Any,
            requirement: Requirement::Authenticated,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn requirement(&self) -> Requirement {
        self.requirement
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn matches(&self, path: &str, method: &Method) -> bool {
        self.methods.contains(method) && self.path.matches(path)
    }
}

/// Ordered, immutable rule list. First match wins.
///
/// The implicit `/**` (any method, Authenticated) catch-all always sits after
/// the declared rules, so every lookup resolves to some rule.
#[derive(Debug, Clone)]
pub struct RuleTable {
    declared: Vec<RouteRule>,
    catch_all: RouteRule,
}

impl RuleTable {
    pub fn new(declared: Vec<RouteRule>) -> Result<Self, RuleError> {
        if declared.iter().any(|rule| rule.path == PathPattern::Any) {
            return Err(RuleError::DeclaredCatchAll);
        }
        Ok(Self {
            declared,
            catch_all: RouteRule::catch_all(),
        })
    }

    /// The gateway's declared rule order. Reordering changes outcomes for
    /// overlapping patterns.
    pub fn default_gateway() -> Result<Self, RuleError> {
        Self::new(vec![
            RouteRule::public("/challenges/**")?,
            RouteRule::public("/leaders")?,
            RouteRule::public("/actuator/**")?,
            RouteRule::authenticated("/attempts/**")?,
            RouteRule::authenticated("/users/**")?,
        ])
    }

    /// All rules in evaluation order, catch-all included.
    pub fn rules(&self) -> impl Iterator<Item = &RouteRule> {
        self.declared.iter().chain(std::iter::once(&self.catch_all))
    }

    pub fn first_match(&self, path: &str, method: &Method) -> &RouteRule {
        self.declared
            .iter()
            .find(|rule| rule.matches(path, method))
            .unwrap_or(&self.catch_all)
    }
}
