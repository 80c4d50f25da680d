//! Line-oriented driver for the organizer core.
//!
//! # Responsibility
//! - Wire configuration, logging, store and session provider into one facade.
//! - Read commands from stdin and print one result block per command.
//!
//! # Invariants
//! - Failures print `error code=<code> message=<text>` and never end the loop.
//! - Every intent is tagged with the provider's current session.

mod command;

use command::{parse_line, Command, ParseError, HELP};
use log::{error, info};
use organizer_core::{
    core_version, init_logging_from_config, ping, CoreConfig, DocumentStore, Event,
    FavoriteToggle, InMemoryDocumentStore, InMemorySessionProvider, OrganizerFacade,
    OrganizerResult, Session, SqliteDocumentStore,
};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

type Facade<S> = OrganizerFacade<S, InMemorySessionProvider>;

#[tokio::main]
async fn main() -> ExitCode {
    println!("organizer_core ping={} version={}", ping(), core_version());

    let config = match CoreConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error code=config message={err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("error code=logging message={err}");
        return ExitCode::FAILURE;
    }

    let provider = Arc::new(InMemorySessionProvider::new());
    let outcome = match config.db_path.as_ref() {
        Some(path) => match SqliteDocumentStore::open(path) {
            Ok(store) => {
                info!(
                    "event=cli_start module=cli status=ok store=sqlite path={}",
                    path.display()
                );
                run(OrganizerFacade::new(Arc::new(store), provider)).await
            }
            Err(err) => {
                error!("event=cli_start module=cli status=error error={err}");
                eprintln!("error code=store message={err}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            info!("event=cli_start module=cli status=ok store=memory");
            run(OrganizerFacade::new(
                Arc::new(InMemoryDocumentStore::new()),
                provider,
            ))
            .await
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error code=io message={err}");
            ExitCode::FAILURE
        }
    }
}

async fn run<S: DocumentStore>(facade: Facade<S>) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(err) => {
                println!("error code=usage message={err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(err) = execute(&facade, command).await {
            println!("error code={} message={err}", err.code());
        }
    }
    Ok(())
}

async fn execute<S: DocumentStore>(facade: &Facade<S>, command: Command) -> OrganizerResult<()> {
    let caller = facade.current_session();
    match command {
        Command::SignUp { email, password } => {
            let session = facade.sign_up(&email, &password).await?;
            println!("ok signed_up user_id={}", display_user(&session));
        }
        Command::SignIn { email, password } => {
            let session = facade.sign_in(&email, &password).await?;
            println!("ok signed_in user_id={}", display_user(&session));
        }
        Command::SignOut => {
            facade.sign_out().await?;
            println!("ok signed_out");
        }
        Command::WhoAmI => {
            println!(
                "ok state={} user_id={}",
                facade.observed_state().as_str(),
                display_user(&caller)
            );
        }
        Command::Create(fields) => {
            let event = facade.create_event(&caller, fields).await?;
            println!("ok created {}", render_event(&event));
        }
        Command::Edit { event_id, fields } => {
            let event = facade.edit_event(&caller, &event_id, fields).await?;
            println!("ok updated {}", render_event(&event));
        }
        Command::Delete(event_id) => {
            facade.delete_event(&caller, &event_id).await?;
            println!("ok deleted id={event_id}");
        }
        Command::List => {
            let events = facade.list_events(&caller).await?;
            println!("ok events={}", events.len());
            for event in &events {
                println!("  {}", render_event(event));
            }
        }
        Command::Dashboard => {
            let entries = facade.dashboard(&caller).await?;
            println!("ok events={}", entries.len());
            for entry in &entries {
                println!(
                    "  {} owned={} favorited={}",
                    render_event(&entry.event),
                    entry.owned_by_caller,
                    entry.favorited
                );
            }
        }
        Command::Favorite(event_id) => match facade.toggle_favorite(&caller, &event_id).await? {
            FavoriteToggle::Added(link) => {
                println!("ok favorited id={} link_id={}", link.event_id, link.id);
            }
            FavoriteToggle::Removed { links_removed } => {
                println!("ok unfavorited id={event_id} links_removed={links_removed}");
            }
        },
        Command::Favorites => {
            let events = facade.list_favorites(&caller).await?;
            println!("ok favorites={}", events.len());
            for event in &events {
                println!("  {}", render_event(event));
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

fn display_user(session: &Session) -> String {
    session
        .user_id()
        .map(|user_id| user_id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn render_event(event: &Event) -> String {
    format!(
        "id={} date={} creator={} title={:?} description={:?}",
        event.id, event.date, event.creator_id, event.title, event.description
    )
}
