//! Route authorization rules
//!
//! An ordered table of `(method, path pattern, requirement)` rules,
//! evaluated top-down with the first match deciding. Patterns use the
//! same notation as route declarations: literal segments, `{name}` for
//! exactly one segment, and a trailing `/**` for any remainder
//! (including none).

use super::AuthContext;
use axum::http::Method;
use storefront_shared::{AuthError, RoleName};

/// What a matching request must present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// No identity needed
    Permit,
    /// Any validated identity
    Authenticated,
    /// An identity holding at least one of these roles
    AnyRole(Vec<RoleName>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable,
    Rest,
}

/// Parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "**" => Segment::Rest,
                s if s.starts_with('{') && s.ends_with('}') => Segment::Variable,
                s => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = match path.strip_prefix('/') {
            Some("") => Vec::new(),
            Some(rest) => rest.split('/').collect(),
            None => return false,
        };

        let mut parts = parts.into_iter();
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Variable => match parts.next() {
                    Some(part) if !part.is_empty() => {}
                    _ => return false,
                },
                Segment::Literal(lit) => match parts.next() {
                    Some(part) if part == lit => {}
                    _ => return false,
                },
            }
        }
        parts.next().is_none()
    }
}

/// One row of the policy table
#[derive(Debug, Clone)]
pub struct Rule {
    /// `None` matches every method
    method: Option<Method>,
    pattern: PathPattern,
    access: Access,
}

impl Rule {
    pub fn new(method: Option<Method>, pattern: &str, access: Access) -> Self {
        Self {
            method,
            pattern: PathPattern::parse(pattern),
            access,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }
}

/// Ordered authorization table
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<Rule>,
}

impl AuthorizationPolicy {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Rules guarding the user-management service
    pub fn users_service() -> Self {
        let user_or_admin = Access::AnyRole(vec![RoleName::User, RoleName::Admin]);
        let admin = Access::AnyRole(vec![RoleName::Admin]);

        Self::new(vec![
            Rule::new(Some(Method::GET), "/health/**", Access::Permit),
            Rule::new(Some(Method::GET), "/users", Access::Permit),
            Rule::new(Some(Method::GET), "/users/{id}", user_or_admin),
            Rule::new(Some(Method::POST), "/users", admin.clone()),
            Rule::new(None, "/users/**", admin),
            Rule::new(None, "/**", Access::Authenticated),
        ])
    }

    /// Requirement of the first rule matching the request
    pub fn requirement(&self, method: &Method, path: &str) -> Option<&Access> {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| &rule.access)
    }

    /// Decide whether `identity` may perform the request
    ///
    /// Requests no rule covers need an authenticated identity.
    pub fn check(
        &self,
        method: &Method,
        path: &str,
        identity: Option<&AuthContext>,
    ) -> Result<(), AuthError> {
        match (self.requirement(method, path), identity) {
            (Some(Access::Permit), _) => Ok(()),
            (_, None) => Err(AuthError::Unauthenticated),
            (None | Some(Access::Authenticated), Some(_)) => Ok(()),
            (Some(Access::AnyRole(roles)), Some(ctx)) if ctx.has_any_role(roles) => Ok(()),
            (Some(Access::AnyRole(_)), Some(_)) => Err(AuthError::Forbidden),
        }
    }
}
