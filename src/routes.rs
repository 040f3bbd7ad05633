//! Navigable routes and their prerequisites

use serde::{Serialize, Serializer};

use crate::store::AppState;

/// Redirect chains are short (learn → onboarding → sign-in); anything longer is a bug
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    SignIn,
    SignUp,
    Onboarding,
    Learn,
    Dashboard,
    Profile,
    VrPreview,
    NotFound,
}

impl Route {
    pub const ALL: [Route; 9] = [
        Route::Home,
        Route::SignIn,
        Route::SignUp,
        Route::Onboarding,
        Route::Learn,
        Route::Dashboard,
        Route::Profile,
        Route::VrPreview,
        Route::NotFound,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::SignIn => "/auth/sign-in",
            Route::SignUp => "/auth/sign-up",
            Route::Onboarding => "/onboarding",
            Route::Learn => "/learn",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::VrPreview => "/vr/preview",
            Route::NotFound => "*",
        }
    }

    /// Match a path, ignoring query, fragment and a trailing slash
    pub fn from_path(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL
            .iter()
            .copied()
            .find(|r| *r != Route::NotFound && r.path() == normalized)
            .unwrap_or(Route::NotFound)
    }

    /// Where to send the learner instead, if a prerequisite is missing
    pub fn guard(self, state: &AppState) -> Option<Route> {
        let signed_in = state.user.is_some();
        match self {
            Route::Home if signed_in => Some(if state.is_onboarded() {
                Route::Dashboard
            } else {
                Route::Onboarding
            }),
            Route::Onboarding | Route::Profile | Route::VrPreview if !signed_in => Some(Route::SignIn),
            Route::Learn | Route::Dashboard if !state.is_onboarded() => Some(Route::Onboarding),
            Route::Learn if state.current_topic.is_none() => Some(Route::Onboarding),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of navigating to a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    /// Route that ends up rendered
    pub route: Route,
    /// Fragment of the requested path, e.g. the step in `/learn#quiz`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    /// Originally requested route when guards redirected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<Route>,
}

/// Resolve a path against the current state, following guard redirects
pub fn resolve(path: &str, state: &AppState) -> Navigation {
    let requested = Route::from_path(path);
    let fragment = path
        .split_once('#')
        .map(|(_, f)| f.to_string())
        .filter(|f| !f.is_empty());

    let mut route = requested;
    for _ in 0..MAX_REDIRECTS {
        match route.guard(state) {
            Some(next) if next != route => route = next,
            _ => break,
        }
    }

    Navigation {
        route,
        fragment: if route == requested { fragment } else { None },
        redirected_from: (route != requested).then_some(requested),
    }
}
