//! Command parsing
//!
//! One command per invocation, or one per line in shell mode.

use session::UserRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login {
        email: String,
        password: String,
        next: Option<String>,
    },
    Register {
        email: String,
        password: String,
        role: UserRole,
    },
    Google {
        token: String,
    },
    Callback {
        access_token: String,
        refresh_token: Option<String>,
    },
    Whoami,
    Refresh,
    Logout,
    Visit {
        path: String,
    },
    Help,
    Quit,
}

pub const USAGE: &str = "\
commands:
  login <email> <password> [next]
  register <email> <password> <customer|freelancer>
  google <id-token>
  callback <access-token> [refresh-token]
  whoami
  refresh
  logout
  visit <path>
  help
  quit";

impl Command {
    pub fn parse<S: AsRef<str>>(words: &[S]) -> Result<Self, String> {
        let words: Vec<&str> = words.iter().map(AsRef::as_ref).collect();
        let Some((name, args)) = words.split_first() else {
            return Ok(Command::Help);
        };

        let arg = |i: usize, what: &str| {
            args.get(i)
                .map(|s| s.to_string())
                .ok_or_else(|| format!("{name}: missing {what}"))
        };

        match name.to_ascii_lowercase().as_str() {
            "login" => Ok(Command::Login {
                email: arg(0, "email")?,
                password: arg(1, "password")?,
                next: args.get(2).map(|s| s.to_string()),
            }),
            "register" => {
                let role = UserRole::from_code(&arg(2, "role")?);
                Ok(Command::Register {
                    email: arg(0, "email")?,
                    password: arg(1, "password")?,
                    role,
                })
            }
            "google" => Ok(Command::Google {
                token: arg(0, "token")?,
            }),
            "callback" => Ok(Command::Callback {
                access_token: arg(0, "access token")?,
                refresh_token: args.get(1).map(|s| s.to_string()),
            }),
            "whoami" => Ok(Command::Whoami),
            "refresh" => Ok(Command::Refresh),
            "logout" => Ok(Command::Logout),
            "visit" => Ok(Command::Visit {
                path: arg(0, "path")?,
            }),
            "help" | "-h" | "--help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }

    /// Whether the command reads or changes the session
    pub fn needs_session(&self) -> bool {
        !matches!(self, Command::Help | Command::Quit)
    }
}
