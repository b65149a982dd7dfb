//! Navigation targets.

use std::fmt;

/// A page of the application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Route {
    /// Landing page.
    #[default]
    Home,
    /// Every lounge, annotated for the viewer.
    Lounges,
    /// A single lounge looked up by slug.
    Lounge {
        /// URL-safe lounge identifier.
        slug: String,
    },
    /// Lounges the viewer belongs to. Requires sign-in.
    MyLounges,
    /// Account creation by email.
    SignUp,
    /// Sign-in by email.
    SignIn,
}

impl Route {
    /// Detail route for a slug.
    pub fn lounge(slug: impl Into<String>) -> Self {
        Self::Lounge { slug: slug.into() }
    }

    /// Read that populates this route's cards. `None` for static pages.
    pub fn query(&self) -> Option<LoungeQuery> {
        match self {
            Self::Lounges => Some(LoungeQuery::All),
            Self::MyLounges => Some(LoungeQuery::Mine),
            Self::Lounge { slug } => Some(LoungeQuery::BySlug(slug.clone())),
            Self::Home | Self::SignUp | Self::SignIn => None,
        }
    }

    /// Path as it appears in the address bar.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Lounges => "/lounges".to_string(),
            Self::Lounge { slug } => format!("/lounges/{slug}"),
            Self::MyLounges => "/my-lounges".to_string(),
            Self::SignUp => "/signup".to_string(),
            Self::SignIn => "/signin".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Store read backing a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoungeQuery {
    /// All lounges with the viewer's membership flag.
    All,
    /// Only lounges the viewer belongs to.
    Mine,
    /// Zero or one lounge matching a slug.
    BySlug(String),
}
