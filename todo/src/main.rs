//! Terminal demo for the to-do client.
//!
//! Plays the part of the view layer: it subscribes a renderer to the store,
//! then dispatches a short script of actions against the remote API.
//!
//! ```text
//! TODO_API_URL=http://localhost:3000/todo cargo run -p todo-client
//! cargo run -p todo-client -- --in-memory
//! ```

use anyhow::Context;
use std::sync::Arc;
use todo_client::{
    ApiConfig, InMemoryTodoApi, Todo, TodoEnvironment, TodoState, TodoStore, clear_error,
    create_store, create_todo, delete_todo, fetch_todo_list, update_todo,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn render(state: &TodoState) {
    println!("\n--- {} todos ({} done) ---", state.todo_list.len(), state.done_count());
    for todo in &state.todo_list {
        let status = if todo.done { "x" } else { " " };
        println!("  [{status}] #{} {}", todo.id, todo.name);
    }
    if let Some(error) = &state.error {
        println!("  ! {error}");
    }
}

fn environment(in_memory: bool) -> anyhow::Result<TodoEnvironment> {
    if in_memory {
        tracing::info!("Using in-memory collection");
        let api = InMemoryTodoApi::with_todos(vec![Todo::new(1, "Read the docs", true)]);
        return Ok(TodoEnvironment::new(Arc::new(api)));
    }

    let config = match std::env::var("TODO_API_URL") {
        Ok(url) => ApiConfig::new(url),
        Err(_) => ApiConfig::default(),
    };
    tracing::info!(base_url = %config.base_url, "Using remote collection");
    TodoEnvironment::http(config).context("failed to build HTTP client")
}

async fn run_script(store: &TodoStore) -> anyhow::Result<()> {
    store.dispatch(fetch_todo_list()).await?;

    // Both requests are in flight from the caller's point of view; the store
    // still applies them one after the other.
    let milk = store.dispatch(create_todo("Buy milk"));
    let docs = store.dispatch(create_todo("Write documentation"));
    milk.await?;
    docs.await?;

    let state = store.state();
    if let Some(first) = state.todo_list.first() {
        let toggled = Todo {
            done: !first.done,
            ..first.clone()
        };
        store.dispatch(update_todo(toggled)).await?;
    }
    if let Some(last) = state.todo_list.last() {
        store.dispatch(delete_todo(last.id)).await?;
    }

    if store.state().error.is_some() {
        store.dispatch(clear_error()).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_client=info,flux_store_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let in_memory = std::env::args().skip(1).any(|arg| arg == "--in-memory");
    let store = create_store(environment(in_memory)?);

    let subscription = store.subscribe(render);
    run_script(&store).await?;
    subscription.unsubscribe();

    let state = store.state();
    println!(
        "\nFinal: {} todos, {} done",
        state.todo_list.len(),
        state.done_count()
    );
    Ok(())
}
