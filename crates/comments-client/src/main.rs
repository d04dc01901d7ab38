use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use comments_client::{
    reconciler::FallbackDelete, view, AdminToggle, ApiClient, ClientCache, CreateOutcome,
    DeleteOutcome, EditOutcome, FailureKind, LoadOutcome, LocalStorage, Reconciler,
};
use comments_shared::CommentId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Usage: comments-client [--admin] <COMMAND>

Commands:
  list                        Show server and local comments
  post <author> <text>        Post a comment (kept locally if the server is down)
  edit <id> <text>            Change a comment's text (admin mode)
  delete <id> [--yes]         Delete a comment (admin mode)
  sync                        Retry posting every local-only comment
  admin on [--token <TOKEN>]  Turn admin mode on
  admin off                   Turn admin mode off
  admin token <TOKEN>         Store the admin token
  admin status                Show admin mode and whether a token is stored

Options:
  --admin     Treat this invocation as admin mode
  --help, -h  Show this help message";

enum Command {
    List,
    Post { author: String, text: String },
    Edit { id: CommentId, text: String },
    Delete { id: CommentId, yes: bool },
    Sync,
    Admin(AdminCommand),
}

enum AdminCommand {
    On { token: Option<String> },
    Off,
    Token(String),
    Status,
}

struct Args {
    force_admin: bool,
    command: Command,
}

fn parse_args(raw: Vec<String>) -> Result<Option<Args>> {
    let mut force_admin = false;
    let mut yes = false;
    let mut token = None;
    let mut positional = Vec::new();

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(None),
            "--admin" => force_admin = true,
            "--yes" | "-y" => yes = true,
            "--token" => match iter.next() {
                Some(t) => token = Some(t),
                None => bail!("--token requires a value"),
            },
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(name) = positional.next() else {
        return Ok(None);
    };
    let rest: Vec<String> = positional.collect();

    let command = match (name.as_str(), rest.as_slice()) {
        ("list", []) => Command::List,
        ("post", [author, text @ ..]) if !text.is_empty() => Command::Post {
            author: author.clone(),
            text: text.join(" "),
        },
        ("edit", [id, text @ ..]) if !text.is_empty() => Command::Edit {
            id: id.parse()?,
            text: text.join(" "),
        },
        ("delete", [id]) => Command::Delete { id: id.parse()?, yes },
        ("sync", []) => Command::Sync,
        ("admin", [sub]) if sub == "on" => Command::Admin(AdminCommand::On { token }),
        ("admin", [sub]) if sub == "off" => Command::Admin(AdminCommand::Off),
        ("admin", [sub]) if sub == "status" => Command::Admin(AdminCommand::Status),
        ("admin", [sub, t]) if sub == "token" => Command::Admin(AdminCommand::Token(t.clone())),
        _ => bail!("Unrecognized command: {} {}\n\n{}", name, rest.join(" "), USAGE),
    };

    Ok(Some(Args {
        force_admin,
        command,
    }))
}

fn ask(question: &str) -> Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = ask(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

fn describe(kind: &FailureKind) -> String {
    match kind {
        FailureKind::Forbidden => {
            "the server rejected the admin token. Check it with `comments-client admin token <TOKEN>` \
             (it must match ADMIN_TOKEN on the server)"
                .to_string()
        }
        FailureKind::NotFound => "the comment no longer exists on the server".to_string(),
        FailureKind::Unreachable => "the server is unreachable".to_string(),
        FailureKind::Rejected(msg) => msg.clone(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comments_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let Some(args) = parse_args(std::env::args().skip(1).collect())? else {
        println!("{}", USAGE);
        return Ok(());
    };

    let server_url = std::env::var("COMMENTS_SERVER_URL")
        .unwrap_or_else(|_| "http://localhost:3200".to_string());

    let storage = match std::env::var("COMMENTS_DATA_DIR") {
        Ok(dir) => LocalStorage::open(dir)?,
        Err(_) => LocalStorage::open_default()?,
    };
    let cache = ClientCache::new(storage);

    if let Command::Admin(cmd) = args.command {
        return run_admin(&cache, cmd);
    }

    let is_admin = args.force_admin || cache.is_admin()?;
    if matches!(args.command, Command::Edit { .. } | Command::Delete { .. }) && !is_admin {
        bail!("Editing and deleting need admin mode. Run `comments-client admin on` first.");
    }

    let api = ApiClient::new(&server_url).with_admin_token(cache.admin_token()?);
    let mut reconciler = Reconciler::new(api, cache);

    if let LoadOutcome::LocalOnly { local, .. } = reconciler.load().await {
        eprintln!(
            "Server at {} is unreachable, showing {} local comment(s) only.",
            server_url, local
        );
    }

    match args.command {
        Command::List => {}
        Command::Post { author, text } => match reconciler.create(&author, &text).await? {
            CreateOutcome::Confirmed(c) => println!("Posted comment {}.", c.id),
            CreateOutcome::SavedLocally { comment, reason } => println!(
                "Could not post ({}). Saved locally as {}; run `comments-client sync` later.",
                describe(&reason),
                comment.id
            ),
        },
        Command::Sync => {
            let outcomes = reconciler.sync_pending().await?;
            if outcomes.is_empty() {
                println!("Nothing to sync.");
            }
            for (id, outcome) in outcomes {
                match outcome {
                    CreateOutcome::Confirmed(c) => println!("{} -> posted as {}", id, c.id),
                    CreateOutcome::SavedLocally { reason, .. } => {
                        println!("{} -> still local ({})", id, describe(&reason))
                    }
                }
            }
        }
        Command::Edit { id, text } => match reconciler.edit(&id, &text).await? {
            EditOutcome::UpdatedLocally(_) => println!("Updated local comment {}.", id),
            EditOutcome::Updated(_) => println!("Updated comment {}.", id),
            EditOutcome::Failed(kind) => {
                eprintln!("Could not update on the server: {}.", describe(&kind))
            }
        },
        Command::Delete { id, yes } => {
            if reconciler.entry(&id).is_none() {
                bail!("No comment with id {}", id);
            }
            let confirmed = yes || confirm("Delete this comment?")?;
            let outcome = reconciler.delete(&id, confirmed).await?;
            report_delete(&mut reconciler, &id, outcome)?;
        }
        Command::Admin(_) => unreachable!("handled before loading"),
    }

    println!();
    println!("{}", view::render_list(reconciler.view()));
    Ok(())
}

fn report_delete(
    reconciler: &mut Reconciler<ApiClient>,
    id: &CommentId,
    outcome: DeleteOutcome,
) -> Result<()> {
    match outcome {
        DeleteOutcome::Cancelled => println!("Kept comment {}.", id),
        DeleteOutcome::RemovedLocally => println!("Removed local comment {}.", id),
        DeleteOutcome::Removed => println!("Deleted comment {}.", id),
        DeleteOutcome::Forbidden => eprintln!(
            "Could not delete on the server: {}.",
            describe(&FailureKind::Forbidden)
        ),
        DeleteOutcome::NeedsFallbackDecision(fallback) => {
            let remove = ask_fallback(&fallback)?;
            let resolved = reconciler.resolve_fallback(fallback, remove)?;
            report_delete(reconciler, id, resolved)?;
        }
    }
    Ok(())
}

fn ask_fallback(fallback: &FallbackDelete) -> Result<bool> {
    confirm(&format!(
        "Could not delete on the server ({}). Remove the local copy anyway?",
        describe(&fallback.reason)
    ))
}

fn run_admin(cache: &ClientCache, cmd: AdminCommand) -> Result<()> {
    match cmd {
        AdminCommand::On { token } => {
            if let Some(token) = token {
                cache.set_admin_token(&token)?;
            }
            if !cache.is_admin()? && cache.toggle_admin()? == AdminToggle::EnabledNeedsToken {
                let token = ask("Admin token (leave empty if the server has no ADMIN_TOKEN):")?;
                if !token.is_empty() {
                    cache.set_admin_token(&token)?;
                }
            }
            println!("Admin mode on.");
        }
        AdminCommand::Off => {
            cache.set_admin(false)?;
            println!("Admin mode off.");
        }
        AdminCommand::Token(token) => {
            cache.set_admin_token(&token)?;
            println!("Admin token saved.");
        }
        AdminCommand::Status => {
            let on = cache.is_admin()?;
            let has_token = cache.admin_token()?.is_some();
            println!(
                "Admin mode: {}. Token: {}.",
                if on { "on" } else { "off" },
                if has_token { "stored" } else { "not set" }
            );
        }
    }
    Ok(())
}
