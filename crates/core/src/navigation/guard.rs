use std::sync::Arc;

use tracing::{debug, warn};

use super::routes::{RouteMeta, RouteTable};
use crate::{
    authentication::decode_claims,
    session::{SessionError, SessionManager},
    yaml::RoutesConfig,
};

pub const SESSION_EXPIRED_NOTICE: &str = "Your session has expired. Please sign in again.";
pub const INSUFFICIENT_ROLE_NOTICE: &str = "You do not have permission to access this page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPolicy {
    pub login_path: String,
    pub landing_path: String,
    pub admin_role: String,
    pub enforce_admin_role: bool,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        GuardPolicy::from(&RoutesConfig::default())
    }
}

impl From<&RoutesConfig> for GuardPolicy {
    fn from(config: &RoutesConfig) -> Self {
        Self {
            login_path: config.login.clone(),
            landing_path: config.landing.clone(),
            admin_role: config.admin_role.clone(),
            enforce_admin_role: config.enforce_admin_role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    SessionExpired,
    MalformedToken,
    LoginRequired,
    AlreadyAuthenticated,
    InsufficientRole,
}

impl RedirectReason {
    /// Message to show the user, for the reasons that warrant one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            RedirectReason::SessionExpired => Some(SESSION_EXPIRED_NOTICE),
            RedirectReason::InsufficientRole => Some(INSUFFICIENT_ROLE_NOTICE),
            RedirectReason::MalformedToken
            | RedirectReason::LoginRequired
            | RedirectReason::AlreadyAuthenticated => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    pub reason: RedirectReason,
    pub clear_credentials: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    Allow,
    Redirect(Redirect),
}

impl NavigationDecision {
    fn redirect(to: &str, reason: RedirectReason, clear_credentials: bool) -> Self {
        NavigationDecision::Redirect(Redirect { to: to.to_string(), reason, clear_credentials })
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationDecision::Allow)
    }
}

/// Decides whether a navigation may proceed.
///
/// Rules, first match wins:
/// 1. stored token expired: clear credentials, go to login
/// 2. stored token undecodable: clear credentials, go to login
/// 3. no token and destination not public: go to login
/// 4. token and destination public: go to the landing page
/// 5. destination admin-only and role does not match: go to the landing page
/// 6. otherwise allow
///
/// # Arguments
/// * `token` - The stored access token, if any
/// * `destination` - Meta of the route being navigated to
/// * `now` - Current time in seconds since the epoch
/// * `policy` - Login/landing routes and the admin role
pub fn evaluate(
    token: Option<&str>,
    destination: &RouteMeta,
    now: i64,
    policy: &GuardPolicy,
) -> NavigationDecision {
    let claims = match token.filter(|token| !token.is_empty()) {
        Some(token) => match decode_claims(token) {
            Ok(claims) if claims.is_expired_at(now) => {
                return NavigationDecision::redirect(
                    &policy.login_path,
                    RedirectReason::SessionExpired,
                    true,
                );
            }
            Ok(claims) => Some(claims),
            Err(_) => {
                return NavigationDecision::redirect(
                    &policy.login_path,
                    RedirectReason::MalformedToken,
                    true,
                );
            }
        },
        None => None,
    };

    match claims {
        None if !destination.public => NavigationDecision::redirect(
            &policy.login_path,
            RedirectReason::LoginRequired,
            false,
        ),
        Some(_) if destination.public => NavigationDecision::redirect(
            &policy.landing_path,
            RedirectReason::AlreadyAuthenticated,
            false,
        ),
        Some(claims)
            if destination.requires_admin
                && policy.enforce_admin_role
                && !claims.has_role(&policy.admin_role) =>
        {
            NavigationDecision::redirect(
                &policy.landing_path,
                RedirectReason::InsufficientRole,
                false,
            )
        }
        _ => NavigationDecision::Allow,
    }
}

/// Runs [`evaluate`] against the stored session before each navigation and applies
/// its side effects.
#[derive(Clone)]
pub struct NavigationGuard {
    session: SessionManager,
    routes: Arc<RouteTable>,
    policy: GuardPolicy,
}

impl NavigationGuard {
    pub fn new(session: SessionManager, routes: RouteTable, policy: GuardPolicy) -> Self {
        Self { session, routes: Arc::new(routes), policy }
    }

    pub fn from_config(session: SessionManager, config: &RoutesConfig) -> Self {
        Self::new(session, RouteTable::standard(config), GuardPolicy::from(config))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn before_each(&self, path: &str) -> Result<NavigationDecision, SessionError> {
        self.before_each_at(path, chrono::Utc::now().timestamp())
    }

    pub fn before_each_at(
        &self,
        path: &str,
        now: i64,
    ) -> Result<NavigationDecision, SessionError> {
        let token = self.session.get_access_token()?;
        let destination = self.routes.resolve(path);

        let decision = evaluate(token.as_deref(), &destination, now, &self.policy);

        if let NavigationDecision::Redirect(redirect) = &decision {
            debug!(
                "Navigation to {} redirected to {} ({:?})",
                destination.path, redirect.to, redirect.reason
            );

            match redirect.reason {
                RedirectReason::SessionExpired => {
                    self.session.expire(SESSION_EXPIRED_NOTICE, &redirect.to)?;
                }
                RedirectReason::MalformedToken => {
                    warn!("Stored access token could not be decoded, clearing credentials");
                    self.session.clear()?;
                }
                RedirectReason::InsufficientRole => {
                    self.session.deny_access(&destination.path, &redirect.to);
                }
                RedirectReason::LoginRequired | RedirectReason::AlreadyAuthenticated => {}
            }
        }

        Ok(decision)
    }
}
