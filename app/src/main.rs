//! `todomvc`: terminal TodoMVC client
//!
//! Usage: `todomvc [QUERY]`, where `QUERY` may carry `delay` and
//! `addTodoDelay` (e.g. `todomvc '?delay=500'`). Everything else comes from
//! the environment, see [`Config::from_env`].

use anyhow::Context;
use std::sync::Arc;
use todomvc_app::terminal::{self, Command, HELP};
use todomvc_app::{
    Config, PeriodicRefresh, TodoController, TodoEnvironment, TodoReducer, TodoState, TodoStore,
};
use todomvc_client::HttpTodoApi;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = Config::from_env();
    if let Some(query) = std::env::args().nth(1) {
        config = config.with_query(&query);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        api_url = %config.api_url,
        delay = ?config.delay,
        add_todo_delay = ?config.add_todo_delay,
        "Starting todomvc"
    );

    let api = HttpTodoApi::with_timeout(&config.api_url, config.request_timeout)
        .context("building HTTP client")?;
    let store = TodoStore::new(
        TodoState::new(),
        TodoReducer::new(),
        TodoEnvironment::production(Arc::new(api)),
    );
    let controller = TodoController::new(store.clone());

    controller.set_delay(config.delay).await?;
    controller.set_add_todo_delay(config.add_todo_delay).await?;
    controller.load_todos_and_wait().await?;

    let refresh = PeriodicRefresh::start(store.clone(), config.refresh_interval);

    print!("{}", terminal::render(&controller.view_model().await));
    run(&controller).await?;

    refresh.stop();
    controller
        .shutdown(store.default_shutdown_timeout())
        .await
        .context("shutting down store")?;

    tracing::info!("Stopped");
    Ok(())
}

async fn run(controller: &TodoController) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            return Ok(());
        };

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        if command == Command::Quit {
            return Ok(());
        }
        let mark = controller.error_mark().await;
        execute(controller, command).await?;

        if let Some(error) = controller.error_since(mark).await {
            println!("error: {error}");
        }
        print!("{}", terminal::render(&controller.view_model().await));
    }
}

async fn execute(controller: &TodoController, command: Command) -> anyhow::Result<()> {
    let mut handle = match command {
        Command::Add(title) => match controller.submit(&title).await {
            Ok(handle) => handle,
            Err(error) => {
                println!("{error}");
                return Ok(());
            },
        },
        Command::Toggle(n) => match nth(controller, n).await {
            Some(id) => controller.toggle(id).await?,
            None => {
                no_such(n);
                return Ok(());
            },
        },
        Command::Remove(n) => match nth(controller, n).await {
            Some(id) => controller.remove_todo(id).await?,
            None => {
                no_such(n);
                return Ok(());
            },
        },
        Command::Edit(n, title) => match nth(controller, n).await {
            Some(id) => controller.rename(id, title).await?,
            None => {
                no_such(n);
                return Ok(());
            },
        },
        Command::ClearCompleted => controller.remove_completed().await?,
        Command::Show(visibility) => {
            controller.navigate(&visibility.hash());
            return Ok(());
        },
        Command::Reload => controller.load_todos().await?,
        Command::Help => {
            println!("{HELP}");
            return Ok(());
        },
        Command::Quit | Command::Redraw => return Ok(()),
    };

    handle.wait().await;
    Ok(())
}

/// Id of the `n`-th todo currently shown, counting from one
async fn nth(controller: &TodoController, n: usize) -> Option<todomvc_core::todo::TodoId> {
    controller
        .filtered_todos()
        .await
        .get(n.checked_sub(1)?)
        .map(|todo| todo.id)
}

fn no_such(n: usize) {
    println!("no todo #{n}");
}
