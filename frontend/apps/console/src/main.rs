//! Console Entry Point
//!
//! Drives the session gate from a terminal against a running Auth API.
//! Uses `anyhow` for startup errors; gate failures are reported with
//! their `GateError` message.

mod command;

use std::env;
use std::process::ExitCode;

use session::models::token::{AccessToken, RefreshToken};
use session::{
    CredentialStore, Credentials, GateConfig, GateError, GuardOutcome, HttpAuthApi, RouteGuard,
    Session, SessionGate, cookie_gate, file_gate,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::command::{Command, USAGE};

const DEFAULT_CREDENTIALS_PATH: &str = ".gigerly/credentials.json";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "console=info,session=info,platform=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = GateConfig::from_env();
    let args: Vec<String> = env::args().skip(1).collect();

    let store_kind = env::var("GATE_CREDENTIAL_STORE").unwrap_or_else(|_| "file".to_string());
    tracing::info!(api = %config.api_base_url, store = %store_kind, "Session gate configured");

    match store_kind.as_str() {
        "cookie" => run(cookie_gate(config)?, &args).await,
        "file" => {
            let path = env::var("GATE_CREDENTIALS_PATH")
                .unwrap_or_else(|_| DEFAULT_CREDENTIALS_PATH.to_string());
            run(file_gate(config, path)?, &args).await
        }
        other => anyhow::bail!("GATE_CREDENTIAL_STORE must be `file` or `cookie`, got `{other}`"),
    }
}

/// One command from the arguments, or a shell reading commands from stdin
async fn run<S>(gate: SessionGate<HttpAuthApi, S>, args: &[String]) -> anyhow::Result<ExitCode>
where
    S: CredentialStore + Send + Sync + 'static,
{
    let guard = RouteGuard::new(gate.shared_policy(), gate.config());

    if !args.is_empty() {
        let command = Command::parse(args).map_err(anyhow::Error::msg)?;
        return Ok(match execute(&gate, &guard, command).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => report(&err),
        });
    }

    println!("{USAGE}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        match Command::parse(&words[..]) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(err) = execute(&gate, &guard, command).await {
                    report(&err);
                }
            }
            Err(msg) => eprintln!("{msg}"),
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn execute<S>(
    gate: &SessionGate<HttpAuthApi, S>,
    guard: &RouteGuard,
    command: Command,
) -> Result<(), GateError>
where
    S: CredentialStore + Send + Sync + 'static,
{
    if command.needs_session() {
        gate.hydrate().await;
    }

    match command {
        Command::Login {
            email,
            password,
            next,
        } => {
            let session = gate.login(&email, &password).await?;
            print_session(&session);
            println!("-> {}", guard.after_sign_in(&session, next.as_deref()));
        }
        Command::Register {
            email,
            password,
            role,
        } => {
            let session = gate.register(&email, &password, role).await?;
            print_session(&session);
            println!("-> {}", guard.after_sign_in(&session, None));
        }
        Command::Google { token } => {
            let session = gate.login_with_google(&token).await?;
            print_session(&session);
        }
        Command::Callback {
            access_token,
            refresh_token,
        } => {
            let credentials = Credentials::new(AccessToken::new(access_token))
                .with_refresh_token(refresh_token.map(RefreshToken::new));
            let session = gate.accept_callback(credentials).await?;
            print_session(&session);
        }
        Command::Whoami => print_session(&gate.session()),
        Command::Refresh => {
            let session = gate.refresh().await?;
            print_session(&session);
        }
        Command::Logout => {
            gate.logout().await;
            println!("signed out");
        }
        Command::Visit { path } => match guard.evaluate_path(&gate.session(), &path) {
            GuardOutcome::Loading => println!("{path}: loading"),
            GuardOutcome::Redirect(target) => println!("{path}: redirect -> {target}"),
            GuardOutcome::Render => println!("{path}: render"),
        },
        Command::Help => println!("{USAGE}"),
        Command::Quit => {}
    }

    Ok(())
}

fn print_session(session: &Session) {
    match session {
        Session::Loading => println!("session: loading"),
        Session::Anonymous => println!("session: not signed in"),
        Session::Authenticated { user, .. } => println!(
            "session: {} <{}> role={} status={}",
            user.display_name(),
            user.email,
            user.role,
            user.status
        ),
    }
}

/// Print the error and pick an exit code (2 for rejected input)
fn report(err: &GateError) -> ExitCode {
    eprintln!("error: {}", err.user_message());
    tracing::debug!(error = %err, kind = %err.kind().as_str(), "Command failed");

    if err.kind().is_client_error() {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}
