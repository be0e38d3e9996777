mod guard;
pub use guard::{
    evaluate, GuardPolicy, NavigationDecision, NavigationGuard, Redirect, RedirectReason,
    INSUFFICIENT_ROLE_NOTICE, SESSION_EXPIRED_NOTICE,
};

mod routes;
pub use routes::{normalize_path, RouteMeta, RouteTable};
