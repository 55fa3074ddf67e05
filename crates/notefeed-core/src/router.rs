//! Client routes and the navigation guard.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::NoteId;
use crate::session::SessionPredicates;

/// Access requirements attached to a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_guest: bool,
    pub requires_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Home,
    Favorites,
    Profile { username: Option<String> },
    Settings,
    Admin,
    AuthCallback,
    NoteDetail { id: NoteId },
    NotFound(String),
}

impl Route {
    /// Parses a path such as `/notes/42` or `/profile/ann`.
    ///
    /// Query strings and fragments are ignored.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let trimmed = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_matches('/');
        let segments = trimmed
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["favorites"] => Self::Favorites,
            ["profile"] => Self::Profile { username: None },
            ["profile", username] => Self::Profile {
                username: Some(decode_segment(username)),
            },
            ["settings"] => Self::Settings,
            ["admin"] => Self::Admin,
            ["auth", "callback"] => Self::AuthCallback,
            ["notes", id] => Self::NoteDetail {
                id: NoteId::new(decode_segment(id)),
            },
            _ => Self::NotFound(format!("/{trimmed}")),
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Home => "/".to_string(),
            Self::Favorites => "/favorites".to_string(),
            Self::Profile { username: None } => "/profile".to_string(),
            Self::Profile {
                username: Some(username),
            } => format!("/profile/{}", urlencoding::encode(username)),
            Self::Settings => "/settings".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::AuthCallback => "/auth/callback".to_string(),
            Self::NoteDetail { id } => format!("/notes/{}", urlencoding::encode(id.as_str())),
            Self::NotFound(path) => path.clone(),
        }
    }

    #[must_use]
    pub const fn meta(&self) -> RouteMeta {
        match self {
            Self::Login | Self::Register => RouteMeta {
                requires_auth: false,
                requires_guest: true,
                requires_admin: false,
            },
            Self::Home
            | Self::Favorites
            | Self::Profile { .. }
            | Self::Settings
            | Self::NoteDetail { .. } => RouteMeta {
                requires_auth: true,
                requires_guest: false,
                requires_admin: false,
            },
            Self::Admin => RouteMeta {
                requires_auth: true,
                requires_guest: false,
                requires_admin: true,
            },
            Self::AuthCallback | Self::NotFound(_) => RouteMeta {
                requires_auth: false,
                requires_guest: false,
                requires_admin: false,
            },
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |decoded| decoded.into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Route),
}

/// Decides whether navigating to `to` is allowed. First match wins:
/// auth required but signed out goes to login, guest-only while signed in
/// goes home, admin required without the admin role goes home.
pub fn guard(to: &Route, session: &impl SessionPredicates) -> Navigation {
    let meta = to.meta();
    let authenticated = session.is_authenticated();

    if meta.requires_auth && !authenticated {
        Navigation::Redirect(Route::Login)
    } else if meta.requires_guest && authenticated {
        Navigation::Redirect(Route::Home)
    } else if meta.requires_admin && !session.is_admin() {
        Navigation::Redirect(Route::Home)
    } else {
        Navigation::Allow
    }
}

/// Tracks the current location; every push passes through [`guard`].
pub struct Navigator<S> {
    session: Arc<S>,
    history: Mutex<Vec<Route>>,
}

impl<S: SessionPredicates> Navigator<S> {
    pub fn new(session: Arc<S>) -> Self {
        Self {
            session,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Navigates to `to`, following a guard redirect when one applies.
    /// Returns the route actually landed on.
    pub fn push(&self, to: Route) -> Route {
        let landed = match guard(&to, self.session.as_ref()) {
            Navigation::Allow => to,
            Navigation::Redirect(target) => {
                tracing::info!("Navigation to {} redirected to {}", to, target);
                // redirect targets are re-checked once; login/home never loop
                match guard(&target, self.session.as_ref()) {
                    Navigation::Allow => target,
                    Navigation::Redirect(next) => next,
                }
            }
        };
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(landed.clone());
        landed
    }

    pub fn push_path(&self, path: &str) -> Route {
        self.push(Route::parse(path))
    }

    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
