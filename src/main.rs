use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::error;
use taskboard::auth::{self, LoginForm, LoginOutcome, MessageBoard, RegisterForm};
use taskboard::backend::{LocalBackend, RemoteBackend};
use taskboard::board::{header_date, EditKey, Route};
use taskboard::client::ApiClient;
use taskboard::config::{BackendKind, Config};
use taskboard::session::Session;
use taskboard::storage::{FileStorage, Storage};
use taskboard::store::{Ephemeral, StoragePersistence, TaskStore};
use taskboard::{AppError, Board, Filter};

#[derive(Parser)]
#[command(name = "taskboard", version, about = "A to-do list in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD")]
        password: String,
    },
    /// Create an account and log in
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD")]
        password: String,
        #[arg(long)]
        repeat: String,
    },
    /// Forget the session token
    Logout,
    /// Show tasks
    List {
        #[arg(long, default_value = "all")]
        filter: Filter,
    },
    /// Add a task
    Add { title: String },
    /// Flip a task between todo and done
    Toggle { id: String },
    /// Delete a task
    Rm { id: String },
    /// Rename a task
    Rename { id: String, title: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(AppError::MissingSession) => {
            eprintln!("No session found. Run `taskboard login` first.");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let config = Config::from_env()?;
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.storage_dir)?);
    let session = Session::new(storage.clone());
    let client = ApiClient::new(config.api_url.as_str());

    match cli.command {
        Command::Login { email, password } => {
            let form = LoginForm { email, password };
            let mut messages = MessageBoard::new();
            let outcome = auth::submit_login(&form, &mut messages, &client, &session).await?;
            Ok(report_auth(outcome, &messages))
        }
        Command::Register {
            username,
            email,
            password,
            repeat,
        } => {
            let form = RegisterForm {
                username,
                email,
                password,
                repeat_password: repeat,
            };
            let mut messages = MessageBoard::new();
            let outcome = auth::submit_register(&form, &mut messages, &client, &session).await?;
            Ok(report_auth(outcome, &messages))
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out.");
            Ok(ExitCode::SUCCESS)
        }
        command => {
            let mut board = match config.backend {
                BackendKind::Local => Board::new(
                    TaskStore::open(StoragePersistence::new(storage.clone()))?,
                    LocalBackend::new(StoragePersistence::new(storage)),
                ),
                BackendKind::Remote => Board::new(
                    TaskStore::open(Ephemeral)?,
                    RemoteBackend::new(client, session),
                ),
            };
            run_board(&mut board, command).await
        }
    }
}

async fn run_board(board: &mut Board, command: Command) -> Result<ExitCode, AppError> {
    let filter = match &command {
        Command::List { filter } => *filter,
        _ => Filter::All,
    };
    if !board.load(filter).await? {
        eprintln!("Could not load tasks.");
        return Ok(ExitCode::FAILURE);
    }

    let applied = match command {
        Command::Add { title } => board.create(&title).await?.is_some(),
        Command::Toggle { id } => board.toggle_status(&id).await?,
        Command::Rm { id } => board.delete(&id).await?,
        Command::Rename { id, title } => {
            if board.begin_edit(&id) && board.edit_input(&id, &title) {
                board.edit_key(&id, EditKey::Enter).await?
            } else {
                false
            }
        }
        _ => true,
    };
    board.frame();

    if board.route() == Route::Login {
        return Err(AppError::MissingSession);
    }
    println!("{}\n", header_date(chrono::Local::now().date_naive()));
    print!("{}", board);
    Ok(if applied {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn report_auth(outcome: LoginOutcome, messages: &MessageBoard) -> ExitCode {
    match outcome {
        LoginOutcome::LoggedIn(user) => {
            let name = user.username.or(user.email).unwrap_or_default();
            println!("Logged in {}", name);
            ExitCode::SUCCESS
        }
        LoginOutcome::Invalid | LoginOutcome::Rejected(_) => {
            for (field, message) in messages.iter() {
                eprintln!("{}: {}", field, message);
            }
            ExitCode::FAILURE
        }
    }
}
