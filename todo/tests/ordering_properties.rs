//! Property tests: random action sequences submitted without waiting.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flux_store_runtime::Store;
use flux_store_testing::RecordingHook;
use futures::future::join_all;
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use todo_client::{
    InMemoryTodoApi, Todo, TodoAction, TodoEnvironment, TodoId, TodoPatch, TodoReducer, TodoState,
    clear_error, create_todo, delete_todo, fetch_todo_list, update_todo,
};

fn arb_id() -> impl Strategy<Value = TodoId> {
    (1u64..8).prop_map(TodoId::new)
}

fn arb_action() -> impl Strategy<Value = TodoAction> {
    prop_oneof![
        3 => "[a-z]{1,6}".prop_map(|name| create_todo(name)),
        2 => (arb_id(), any::<bool>())
            .prop_map(|(id, done)| update_todo(TodoPatch::new(id).done(done))),
        2 => arb_id().prop_map(delete_todo),
        1 => Just(fetch_todo_list()),
        1 => Just(clear_error()),
    ]
}

fn seed() -> Vec<Todo> {
    vec![Todo::new(1, "one", false), Todo::new(2, "two", true)]
}

/// Submit every action before awaiting any of them
async fn run_overlapping(actions: Vec<TodoAction>) -> (TodoState, InMemoryTodoApi, RecordingHook<TodoState>) {
    let api = InMemoryTodoApi::with_todos(seed()).with_latency(Duration::from_millis(1));
    let hook = RecordingHook::new();
    let env = TodoEnvironment::new(Arc::new(api.clone()));
    let store = Store::builder(TodoState::with_todos(seed()), TodoReducer::new(), env)
        .with_hook(hook.clone())
        .build();

    let pending: Vec<_> = actions.into_iter().map(|action| store.dispatch(action)).collect();
    for result in join_all(pending).await {
        result.unwrap();
    }

    let state = (*store.state()).clone();
    (state, api, hook)
}

/// Await every action before submitting the next
async fn run_sequential(actions: Vec<TodoAction>) -> TodoState {
    let api = InMemoryTodoApi::with_todos(seed());
    let env = TodoEnvironment::new(Arc::new(api));
    let store = Store::new(TodoState::with_todos(seed()), TodoReducer::new(), env);

    for action in actions {
        store.dispatch(action).await.unwrap();
    }

    (*store.state()).clone()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn each_reducer_observes_previous_result(actions in prop::collection::vec(arb_action(), 1..16)) {
        let count = actions.len();
        let (_, _, hook) = tokio_test::block_on(run_overlapping(actions));

        prop_assert_eq!(hook.observed().len(), count);
        prop_assert!(hook.is_chained());
    }

    #[test]
    fn local_list_mirrors_server(actions in prop::collection::vec(arb_action(), 1..16)) {
        let (state, api, _) = tokio_test::block_on(run_overlapping(actions));

        prop_assert_eq!(&state.todo_list, &api.todos());

        let ids: HashSet<_> = state.todo_list.iter().map(|todo| todo.id).collect();
        prop_assert_eq!(ids.len(), state.todo_list.len());
    }

    #[test]
    fn overlapping_matches_sequential(actions in prop::collection::vec(arb_action(), 1..16)) {
        let (overlapping, _, _) = tokio_test::block_on(run_overlapping(actions.clone()));
        let sequential = tokio_test::block_on(run_sequential(actions));

        prop_assert_eq!(overlapping, sequential);
    }
}
