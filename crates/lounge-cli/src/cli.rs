//! Command-line arguments and the event scripts they expand to.

use clap::{Parser, Subcommand};
use lounge_app::{AppEvent, Route};
use lounge_client::{BackendConfig, DEFAULT_BACKEND_URL};
use lounge_core::MembershipIntent;

/// Lounge command-line client
#[derive(Parser, Debug)]
#[command(name = "lounge")]
#[command(about = "Browse lounges and manage your memberships")]
#[command(version)]
pub struct Cli {
    /// Backend project URL
    #[arg(long, env = "LOUNGE_URL", default_value = DEFAULT_BACKEND_URL)]
    pub url: String,

    /// Public API key sent with every request
    #[arg(long, env = "LOUNGE_ANON_KEY", default_value = "", hide_env_values = true)]
    pub anon_key: String,

    /// Access token from a completed magic-link sign-in
    #[arg(long, env = "LOUNGE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Backend settings taken from the parsed arguments.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            url: self.url.clone(),
            anon_key: self.anon_key.clone(),
            access_token: self.access_token.clone(),
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every lounge
    Lounges,
    /// List the lounges you have joined
    Mine,
    /// Show one lounge
    Show {
        /// Lounge slug
        slug: String,
    },
    /// Join a lounge
    Join {
        /// Lounge slug
        slug: String,
    },
    /// Leave a lounge
    Leave {
        /// Lounge slug
        slug: String,
    },
    /// Join a lounge if you are not a member, leave it otherwise
    Toggle {
        /// Lounge slug
        slug: String,
    },
    /// Send a magic sign-in link
    SignIn {
        /// Address to send the link to
        email: String,
    },
    /// Create an account by magic link
    SignUp {
        /// Address to send the link to
        email: String,
    },
    /// End the current session
    SignOut,
    /// Print the signed-in user
    Whoami,
}

/// One scripted input for the terminal driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Deliver the event as is.
    Event(AppEvent),
    /// Change membership of the card shown for `slug`.
    ///
    /// The lounge ID is only known once the page has loaded, so the slug is
    /// resolved against the App when the step is polled. `None` toggles.
    Membership {
        /// Lounge slug.
        slug: String,
        /// Explicit target, or `None` to toggle.
        intent: Option<MembershipIntent>,
    },
}

impl Command {
    /// Expand the command into the steps the driver feeds the runtime.
    pub fn script(&self) -> Vec<Step> {
        match self {
            Self::Lounges => vec![Step::Event(AppEvent::Navigate(Route::Lounges))],
            Self::Mine => vec![Step::Event(AppEvent::Navigate(Route::MyLounges))],
            Self::Show { slug } => vec![Step::Event(AppEvent::Navigate(Route::lounge(slug)))],
            Self::Join { slug } => membership(slug, Some(MembershipIntent::Join)),
            Self::Leave { slug } => membership(slug, Some(MembershipIntent::Leave)),
            Self::Toggle { slug } => membership(slug, None),
            Self::SignIn { email } => sign_in(Route::SignIn, email),
            Self::SignUp { email } => sign_in(Route::SignUp, email),
            Self::SignOut => vec![Step::Event(AppEvent::SignOut)],
            Self::Whoami => Vec::new(),
        }
    }

    /// Whether the output should start with the session line.
    pub fn shows_session(&self) -> bool {
        matches!(self, Self::Whoami)
    }
}

fn membership(slug: &str, intent: Option<MembershipIntent>) -> Vec<Step> {
    vec![
        Step::Event(AppEvent::Navigate(Route::lounge(slug))),
        Step::Membership { slug: slug.to_string(), intent },
    ]
}

fn sign_in(page: Route, email: &str) -> Vec<Step> {
    vec![Step::Event(AppEvent::Navigate(page)), Step::Event(AppEvent::SignIn {
        email: email.to_string(),
    })]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lounge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_to_local_backend() {
        let cli = parse(&["lounges"]);

        assert_eq!(cli.url, DEFAULT_BACKEND_URL);
        assert_eq!(cli.log_level, "warn");
        assert_eq!(cli.command, Command::Lounges);
    }

    #[test]
    fn backend_config_carries_token() {
        let cli =
            parse(&["--url", "https://db.example", "--access-token", "jwt", "show", "rust"]);

        let config = cli.backend_config();

        assert_eq!(config.url, "https://db.example");
        assert_eq!(config.access_token.as_deref(), Some("jwt"));
        assert_eq!(cli.command, Command::Show { slug: "rust".into() });
    }

    #[test]
    fn missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["lounge"]).is_err());
    }

    #[test]
    fn join_navigates_then_resolves_slug() {
        let script = Command::Join { slug: "rust".into() }.script();

        assert_eq!(script, vec![
            Step::Event(AppEvent::Navigate(Route::lounge("rust"))),
            Step::Membership { slug: "rust".into(), intent: Some(MembershipIntent::Join) },
        ]);
    }

    #[test]
    fn toggle_has_no_explicit_intent() {
        let script = Command::Toggle { slug: "chess".into() }.script();

        assert!(matches!(&script[1], Step::Membership { intent: None, .. }));
    }

    #[test]
    fn sign_up_uses_magic_link_flow() {
        let script = Command::SignUp { email: "ada@example.com".into() }.script();

        assert_eq!(script, vec![
            Step::Event(AppEvent::Navigate(Route::SignUp)),
            Step::Event(AppEvent::SignIn { email: "ada@example.com".into() }),
        ]);
    }

    #[test]
    fn whoami_only_reads_session() {
        assert!(Command::Whoami.script().is_empty());
        assert!(Command::Whoami.shows_session());
        assert!(!Command::Lounges.shows_session());
    }
}
