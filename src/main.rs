use tokio::io::{AsyncBufReadExt, BufReader};

use dinetime::config::AppConfig;
use dinetime::session::SessionFlags;
use dinetime::signup::{Field, SignUpController, SubmitOutcome};
use dinetime::state::AppState;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Set(Field, String),
    Blur(Field),
    Submit,
    Guest,
    SignIn,
    Quit,
}

fn parse_command(line: &str) -> anyhow::Result<Command> {
    // Field values keep their trailing spaces; only the verb is trimmed.
    let line = line.trim_start().trim_end_matches(['\r', '\n']);
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let verb = verb.trim_end();
    let cmd = match verb {
        "email" => Command::Set(Field::Email, rest.to_string()),
        "password" => Command::Set(Field::Password, rest.to_string()),
        "blur" => Command::Blur(rest.trim().parse()?),
        "submit" => Command::Submit,
        "guest" => Command::Guest,
        "signin" => Command::SignIn,
        "quit" | "exit" => Command::Quit,
        other => anyhow::bail!("unknown command {other:?}"),
    };
    Ok(cmd)
}

fn print_errors(controller: &SignUpController) {
    for field in Field::ALL {
        if let Some(msg) = controller.visible_error(field) {
            println!("  {field}: {msg}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "dinetime=debug".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let state = AppState::init(AppConfig::from_env()?).await?;
    let flags = SessionFlags::load(state.storage.as_ref()).await?;
    tracing::info!(is_guest = flags.is_guest, user_email = ?flags.user_email, "session flags");

    let controller = SignUpController::new(state);
    println!("Let's get you started");
    println!("commands: email <v> | password <v> | blur <field> | submit | guest | signin | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match parse_command(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match cmd {
            Command::Set(field, value) => {
                controller.change(field, value);
                print_errors(&controller);
            }
            Command::Blur(field) => {
                controller.blur(field);
                print_errors(&controller);
            }
            Command::Submit => match controller.submit().await {
                SubmitOutcome::SignedUp(_) => break,
                SubmitOutcome::Invalid(_) => print_errors(&controller),
                SubmitOutcome::AlreadySubmitting
                | SubmitOutcome::AlreadySignedUp
                | SubmitOutcome::Failed(_) => {}
            },
            Command::Guest => {
                controller.continue_as_guest().await;
                break;
            }
            Command::SignIn => {
                controller.go_to_sign_in().await;
                break;
            }
            Command::Quit => break,
        }
    }

    Ok(())
}
