use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::normalize_api_url, format_event_date, load_settings, ClientSettings,
    EventFormController, EventListController, EventService, FormPhase, HttpEventService,
    ListPhase, ListState, Navigator, Route, SubmitOutcome,
};
use shared::domain::EventId;
use tokio::sync::broadcast;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "events", about = "Manage sporting events on a remote events service")]
struct Args {
    /// Overrides `api_url` from events.toml / EVENTS_API_URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every event in backend order.
    List,
    /// Create an event.
    Add {
        #[arg(long)]
        title: String,
        /// Calendar date, YYYY-MM-DD.
        #[arg(long)]
        date: String,
        #[arg(long)]
        location: String,
    },
    /// Change fields of an existing event; omitted fields keep their value.
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete an event after confirmation.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(url) = &args.api_url {
        settings.api_url = normalize_api_url(url)?;
    }
    let service: Arc<dyn EventService> = Arc::new(
        HttpEventService::from_settings(&settings).context("failed to build http client")?,
    );
    debug!(api_url = %settings.api_url, "events: using backend");

    match args.command {
        Command::List => show_list(service).await,
        Command::Add {
            title,
            date,
            location,
        } => add_event(service, &settings, title, date, location).await,
        Command::Edit {
            id,
            title,
            date,
            location,
        } => edit_event(service, &settings, EventId::new(id), title, date, location).await,
        Command::Delete { id, yes } => delete_event(service, EventId::new(id), yes).await,
    }
}

async fn load_list(service: Arc<dyn EventService>) -> Result<EventListController> {
    let controller = EventListController::new(service, Navigator::new());
    controller.mount().await;
    if let ListPhase::Failed { message } = controller.snapshot().await.phase {
        bail!(message);
    }
    Ok(controller)
}

async fn show_list(service: Arc<dyn EventService>) -> Result<()> {
    let controller = load_list(service).await?;
    print_list(&controller.snapshot().await);
    controller.unmount().await;
    Ok(())
}

fn print_list(state: &ListState) {
    if state.events.is_empty() {
        println!("No events yet.");
        return;
    }
    for event in &state.events {
        println!(
            "{:<26} {:<18} {:<30} {}",
            event.id,
            format_event_date(event.date),
            event.title,
            event.location
        );
    }
}

async fn add_event(
    service: Arc<dyn EventService>,
    settings: &ClientSettings,
    title: String,
    date: String,
    location: String,
) -> Result<()> {
    let navigator = Navigator::new();
    let routes = navigator.subscribe();
    let form = EventFormController::create(service.clone(), navigator)
        .with_navigation_delay(settings.navigation_delay());

    form.set_title(title).await;
    form.set_date(date).await;
    form.set_location(location).await;

    finish_submit(&form, routes, service).await
}

async fn edit_event(
    service: Arc<dyn EventService>,
    settings: &ClientSettings,
    id: EventId,
    title: Option<String>,
    date: Option<String>,
    location: Option<String>,
) -> Result<()> {
    let navigator = Navigator::new();
    let routes = navigator.subscribe();
    let form = EventFormController::edit(service.clone(), navigator, id)
        .with_navigation_delay(settings.navigation_delay());

    form.mount().await;
    let state = form.snapshot().await;
    if let FormPhase::LoadFailed { message } = state.phase {
        bail!(message);
    }

    if title.is_none() && date.is_none() && location.is_none() {
        println!("title:    {}", state.draft.title);
        println!("date:     {}", state.draft.date);
        println!("location: {}", state.draft.location);
        form.unmount().await;
        return Ok(());
    }

    if let Some(title) = title {
        form.set_title(title).await;
    }
    if let Some(date) = date {
        form.set_date(date).await;
    }
    if let Some(location) = location {
        form.set_location(location).await;
    }

    finish_submit(&form, routes, service).await
}

async fn finish_submit(
    form: &EventFormController,
    mut routes: broadcast::Receiver<Route>,
    service: Arc<dyn EventService>,
) -> Result<()> {
    match form.submit().await {
        SubmitOutcome::Saved(event) => {
            let message = form.snapshot().await.success_message.unwrap_or_default();
            println!("{message}: {} ({})", event.title, event.id);
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            bail!("event not saved");
        }
        SubmitOutcome::Failed(message) => bail!(message),
        SubmitOutcome::Ignored => bail!("form is not accepting submissions"),
    }

    let route = routes.recv().await.context("navigation channel closed")?;
    debug!(path = %route.path(), "events: navigating");
    if route == Route::EventList {
        println!();
        show_list(service).await?;
    }
    Ok(())
}

async fn delete_event(service: Arc<dyn EventService>, id: EventId, yes: bool) -> Result<()> {
    let controller = load_list(service).await?;
    if !controller.request_delete(&id).await {
        bail!("event {id} is not in the list");
    }

    let state = controller.snapshot().await;
    let Some(candidate) = state.pending_delete.as_ref() else {
        bail!("event {id} is not in the list");
    };

    if !yes && !confirm(&format!(
        "Delete '{}' ({})? This cannot be undone. [y/N] ",
        candidate.title,
        format_event_date(candidate.date)
    ))? {
        controller.cancel_delete().await;
        println!("Cancelled.");
        return Ok(());
    }

    if !controller.confirm_delete().await {
        let notice = controller.snapshot().await.notice.unwrap_or_default();
        bail!(notice);
    }

    println!("Deleted {id}.");
    print_list(&controller.snapshot().await);
    controller.unmount().await;
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
