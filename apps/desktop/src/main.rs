use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use client_core::{
    AsyncState, ControllerEvent, DelayedMealClient, DetailState, ListState, LiveMealClient,
    MealClient, MealsController,
};
use shared::domain::{DetailItem, ListItem};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

const LOADING_TEXT: &str = "Chopping the onions...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ClientKind {
    Live,
    Mock,
    Slow,
}

#[derive(Parser, Debug)]
#[command(about = "Browse dessert recipes from TheMealDB")]
struct Args {
    #[arg(long, value_enum, default_value_t = ClientKind::Live)]
    client: ClientKind,
    /// Meal id to open; defaults to the first meal in the list.
    #[arg(long)]
    select: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
}

fn build_client(kind: ClientKind, settings: &config::Settings) -> Result<Arc<dyn MealClient>> {
    let client: Arc<dyn MealClient> = match kind {
        ClientKind::Live => Arc::new(
            LiveMealClient::new(settings.client_config()).context("failed to build live client")?,
        ),
        ClientKind::Mock => Arc::new(settings.mock_client()),
        ClientKind::Slow => Arc::new(
            DelayedMealClient::live(settings.client_config(), settings.slow_delay())
                .context("failed to build delayed live client")?,
        ),
    };
    Ok(client)
}

/// A failed list load is fatal so scripts see a non-zero exit status.
fn loaded_list(state: ListState) -> Result<Vec<ListItem>> {
    match state {
        AsyncState::Loaded(items) => Ok(items),
        AsyncState::Failed(err) => Err(anyhow!("something went wrong.. {err}")),
        AsyncState::Loading => Err(anyhow!("meal list is still loading")),
    }
}

fn print_list(items: &[ListItem]) {
    for item in items {
        println!("{:>6}  {}", item.id, item.title);
    }
}

fn print_detail(detail: &DetailItem) {
    println!();
    println!("{}", detail.title);
    println!("{} | {}", detail.category, detail.area);
    if !detail.ingredients.is_empty() {
        println!();
        for ingredient in &detail.ingredients {
            println!("  - {} {}", ingredient.measure, ingredient.name);
        }
    }
    println!();
    println!("{}", detail.instructions);
    if let Some(video_url) = &detail.video_url {
        println!();
        println!("Video: {video_url}");
    }
}

async fn wait_for_detail(
    events: &mut tokio::sync::broadcast::Receiver<ControllerEvent>,
    id: &str,
) -> Result<DetailState> {
    loop {
        match events.recv().await.context("controller event stream closed")? {
            ControllerEvent::DetailChanged { id: changed, state } if changed == id => {
                if state.is_loading() {
                    println!("{LOADING_TEXT}");
                } else {
                    return Ok(state);
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = config::load_settings(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let client = build_client(args.client, &settings)?;
    let controller = MealsController::new(client);
    let mut events = controller.subscribe_events();

    info!(client = ?args.client, "starting dessert browser");
    println!("{LOADING_TEXT}");
    controller.on_start().await;

    let items = loaded_list(controller.list_state())?;
    print_list(&items);

    let Some(id) = args
        .select
        .or_else(|| items.first().map(|item| item.id.clone()))
    else {
        println!("No desserts found.");
        return Ok(());
    };

    controller.on_select(id.clone());
    match wait_for_detail(&mut events, &id).await? {
        AsyncState::Loaded(detail) => print_detail(&detail),
        AsyncState::Failed(err) => eprintln!("something went wrong.. {err}"),
        AsyncState::Loading => {}
    }
    controller.on_deselect();

    Ok(())
}
