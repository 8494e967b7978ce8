//! Pages and the role gate
//!
//! Every page is either public or requires one [`Role`]. The gate is a
//! pure function of (page, session presence, role lookup result), so
//! asking twice with the same inputs always yields the same decision.

use serde::{Deserialize, Serialize};

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    Login,
    Signup,
    Submit,
    Evaluate,
    Unauthorized,
    ThankYou,
}

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const THANK_YOU_PATH: &str = "/thank-you";

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Login,
        Page::Signup,
        Page::Submit,
        Page::Evaluate,
        Page::Unauthorized,
        Page::ThankYou,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Page::Login => LOGIN_PATH,
            Page::Signup => "/signup",
            Page::Submit => "/submit",
            Page::Evaluate => "/evaluate",
            Page::Unauthorized => UNAUTHORIZED_PATH,
            Page::ThankYou => THANK_YOU_PATH,
        }
    }

    /// Role a session must hold to render the page; `None` for public pages
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Page::Submit => Some(Role::Developer),
            Page::Evaluate => Some(Role::Evaluator),
            Page::Login | Page::Signup | Page::Unauthorized | Page::ThankYou => None,
        }
    }

    /// Resolve a path segment such as `thank-you` or `/evaluate`
    pub fn from_slug(slug: &str) -> Option<Page> {
        let slug = slug.trim_start_matches('/');
        Page::ALL
            .into_iter()
            .find(|p| p.path().trim_start_matches('/') == slug)
    }

    /// Gate decision for this page
    pub fn gate(
        &self,
        has_session: bool,
        stored_role: Result<Option<Role>, String>,
    ) -> GateDecision {
        match self.required_role() {
            None => GateDecision::allow(),
            Some(required) => check_role(required, has_session, stored_role),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    Allow,
    RedirectLogin,
    RedirectUnauthorized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub outcome: GateOutcome,
    /// Page-level error from the role lookup; does not decide the outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GateDecision {
    fn allow() -> Self {
        Self {
            outcome: GateOutcome::Allow,
            error: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.outcome == GateOutcome::Allow
    }

    /// Where to navigate instead of rendering, if anywhere
    pub fn redirect(&self) -> Option<&'static str> {
        match self.outcome {
            GateOutcome::Allow => None,
            GateOutcome::RedirectLogin => Some(LOGIN_PATH),
            GateOutcome::RedirectUnauthorized => Some(UNAUTHORIZED_PATH),
        }
    }
}

/// Compare the stored role against the required one.
///
/// A failed lookup is reported in `error`, and since no role was
/// resolved the comparison fails and the session is sent to
/// `/unauthorized`.
pub fn check_role(
    required: Role,
    has_session: bool,
    stored_role: Result<Option<Role>, String>,
) -> GateDecision {
    if !has_session {
        return GateDecision {
            outcome: GateOutcome::RedirectLogin,
            error: None,
        };
    }

    let (role, error) = match stored_role {
        Ok(role) => (role, None),
        Err(e) => (None, Some(e)),
    };

    let outcome = match (required, role) {
        (Role::Developer, Some(Role::Developer)) | (Role::Evaluator, Some(Role::Evaluator)) => {
            GateOutcome::Allow
        }
        (Role::Developer, Some(Role::Evaluator))
        | (Role::Evaluator, Some(Role::Developer))
        | (_, None) => GateOutcome::RedirectUnauthorized,
    };

    GateDecision { outcome, error }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_session_goes_to_login() {
        let d = Page::Evaluate.gate(false, Ok(None));
        assert_eq!(d.outcome, GateOutcome::RedirectLogin);
        assert_eq!(d.redirect(), Some("/login"));
    }

    #[test]
    fn matching_role_is_allowed() {
        assert!(Page::Submit.gate(true, Ok(Some(Role::Developer))).is_allowed());
        assert!(Page::Evaluate.gate(true, Ok(Some(Role::Evaluator))).is_allowed());
    }

    #[test]
    fn wrong_role_is_unauthorized_every_time() {
        let first = Page::Evaluate.gate(true, Ok(Some(Role::Developer)));
        let second = Page::Evaluate.gate(true, Ok(Some(Role::Developer)));
        assert_eq!(first, second);
        assert_eq!(first.redirect(), Some("/unauthorized"));
        assert!(!first.is_allowed());
    }

    #[test]
    fn lookup_error_is_surfaced_and_denied() {
        let d = Page::Submit.gate(true, Err("row not found".into()));
        assert_eq!(d.outcome, GateOutcome::RedirectUnauthorized);
        assert_eq!(d.error.as_deref(), Some("row not found"));
    }

    #[test]
    fn public_pages_always_render() {
        for page in [Page::Login, Page::Signup, Page::Unauthorized, Page::ThankYou] {
            assert!(page.gate(false, Err("ignored".into())).is_allowed());
        }
    }

    #[test]
    fn slugs_resolve() {
        assert_eq!(Page::from_slug("thank-you"), Some(Page::ThankYou));
        assert_eq!(Page::from_slug("/evaluate"), Some(Page::Evaluate));
        assert_eq!(Page::from_slug("admin"), None);
    }
}
