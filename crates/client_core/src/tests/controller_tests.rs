use super::*;
use crate::{FetchResult, MockMealClient, MOCK_DETAIL_UNAVAILABLE};
use async_trait::async_trait;
use shared::{
    domain::{DetailItem, ListItem},
    error::FetchError,
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

enum PendingCall {
    List(oneshot::Sender<FetchResult<Vec<ListItem>>>),
    Detail {
        id: String,
        reply: oneshot::Sender<FetchResult<DetailItem>>,
    },
}

/// Client whose calls block until the test answers them.
struct ScriptedClient {
    calls: mpsc::UnboundedSender<PendingCall>,
}

#[async_trait]
impl MealClient for ScriptedClient {
    async fn fetch_list(&self) -> FetchResult<Vec<ListItem>> {
        let (reply, rx) = oneshot::channel();
        self.calls
            .send(PendingCall::List(reply))
            .map_err(|_| FetchError::network("script closed"))?;
        rx.await
            .map_err(|_| FetchError::network("list reply dropped"))?
    }

    async fn fetch_detail(&self, id: &str) -> FetchResult<DetailItem> {
        let (reply, rx) = oneshot::channel();
        self.calls
            .send(PendingCall::Detail {
                id: id.to_string(),
                reply,
            })
            .map_err(|_| FetchError::network("script closed"))?;
        rx.await
            .map_err(|_| FetchError::network("detail reply dropped"))?
    }
}

fn scripted() -> (Arc<MealsController>, mpsc::UnboundedReceiver<PendingCall>) {
    let (calls, rx) = mpsc::unbounded_channel();
    (MealsController::new(Arc::new(ScriptedClient { calls })), rx)
}

fn list_item(id: &str, title: &str) -> ListItem {
    ListItem {
        id: id.into(),
        title: title.into(),
        thumbnail_url: format!("https://img.example/{id}.jpg"),
    }
}

fn detail(id: &str, title: &str) -> DetailItem {
    DetailItem {
        id: id.into(),
        title: title.into(),
        category: "Dessert".into(),
        area: "British".into(),
        instructions: "Bake until golden.".into(),
        thumbnail_url: None,
        video_url: None,
        ingredients: Vec::new(),
    }
}

async fn next_call(rx: &mut mpsc::UnboundedReceiver<PendingCall>) -> PendingCall {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("client call within timeout")
        .expect("script open")
}

async fn next_detail_call(
    rx: &mut mpsc::UnboundedReceiver<PendingCall>,
) -> (String, oneshot::Sender<FetchResult<DetailItem>>) {
    match next_call(rx).await {
        PendingCall::Detail { id, reply } => (id, reply),
        PendingCall::List(_) => panic!("expected a detail call, got a list call"),
    }
}

async fn wait_for_settled_detail(
    events: &mut broadcast::Receiver<ControllerEvent>,
    expected_id: &str,
) -> DetailState {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match events.recv().await.expect("event stream open") {
                ControllerEvent::DetailChanged { id, state }
                    if id == expected_id && !state.is_loading() =>
                {
                    return state;
                }
                _ => {}
            }
        }
    })
    .await
    .expect("detail settles within timeout")
}

#[tokio::test]
async fn starts_loading_with_nothing_selected() {
    let (controller, _calls) = scripted();

    assert_eq!(controller.list_state(), AsyncState::Loading);
    assert_eq!(controller.selection(), None);
    assert_eq!(controller.current_detail_state(), None);
}

#[tokio::test]
async fn on_start_sorts_list_by_title_after_loading() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    let respond = async {
        match next_call(&mut calls).await {
            PendingCall::List(reply) => {
                assert_eq!(controller.list_state(), AsyncState::Loading);
                let _ = reply.send(Ok(vec![
                    list_item("2", "Banana Cake"),
                    list_item("1", "Apple Pie"),
                ]));
            }
            PendingCall::Detail { .. } => panic!("expected a list call"),
        }
    };
    tokio::join!(controller.on_start(), respond);

    let titles: Vec<String> = controller
        .list_state()
        .loaded()
        .expect("list loaded")
        .iter()
        .map(|item| item.title.clone())
        .collect();
    assert_eq!(titles, ["Apple Pie", "Banana Cake"]);

    assert_eq!(
        events.try_recv().expect("loading event"),
        ControllerEvent::ListChanged(AsyncState::Loading)
    );
    assert!(matches!(
        events.try_recv().expect("loaded event"),
        ControllerEvent::ListChanged(AsyncState::Loaded(_))
    ));
}

#[tokio::test]
async fn on_start_captures_list_failure() {
    let (controller, mut calls) = scripted();

    let respond = async {
        if let PendingCall::List(reply) = next_call(&mut calls).await {
            let _ = reply.send(Err(FetchError::decode("expected value at line 1")));
        }
    };
    tokio::join!(controller.on_start(), respond);

    assert_eq!(
        controller.list_state(),
        AsyncState::Failed(FetchError::decode("expected value at line 1"))
    );
}

#[tokio::test]
async fn overlapping_starts_keep_whichever_list_lands_last() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    let respond = async {
        let PendingCall::List(first_reply) = next_call(&mut calls).await else {
            panic!("expected a list call");
        };
        let PendingCall::List(second_reply) = next_call(&mut calls).await else {
            panic!("expected a list call");
        };
        assert_eq!(controller.list_state(), AsyncState::Loading);

        let _ = second_reply.send(Ok(vec![list_item("2", "second")]));
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                if let ControllerEvent::ListChanged(AsyncState::Loaded(_)) =
                    events.recv().await.expect("event stream open")
                {
                    break;
                }
            }
        })
        .await
        .expect("second list lands");
        assert_eq!(
            controller.list_state(),
            AsyncState::Loaded(vec![list_item("2", "second")])
        );

        // The earlier fetch was not cancelled and still overwrites.
        let _ = first_reply.send(Ok(vec![list_item("1", "first")]));
    };
    tokio::join!(controller.on_start(), controller.on_start(), respond);

    assert_eq!(
        controller.list_state(),
        AsyncState::Loaded(vec![list_item("1", "first")])
    );
}

#[tokio::test]
async fn retry_list_reloads_after_failure() {
    let (controller, mut calls) = scripted();

    let fail = async {
        if let PendingCall::List(reply) = next_call(&mut calls).await {
            let _ = reply.send(Err(FetchError::network("connection reset")));
        }
    };
    tokio::join!(controller.on_start(), fail);
    assert!(controller.list_state().error().is_some());

    let succeed = async {
        if let PendingCall::List(reply) = next_call(&mut calls).await {
            let _ = reply.send(Ok(vec![list_item("1", "Eton Mess")]));
        }
    };
    tokio::join!(controller.on_retry_list(), succeed);
    assert_eq!(
        controller.list_state(),
        AsyncState::Loaded(vec![list_item("1", "Eton Mess")])
    );
}

#[tokio::test]
async fn select_sets_cursor_and_loading_before_fetch_completes() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    controller.on_select("52893");

    assert_eq!(controller.selection().as_deref(), Some("52893"));
    assert_eq!(controller.current_detail_state(), Some(AsyncState::Loading));

    let (id, reply) = next_detail_call(&mut calls).await;
    assert_eq!(id, "52893");
    let _ = reply.send(Ok(detail("52893", "Apple & Blackberry Crumble")));

    let settled = wait_for_settled_detail(&mut events, "52893").await;
    assert_eq!(
        settled,
        AsyncState::Loaded(detail("52893", "Apple & Blackberry Crumble"))
    );
    assert_eq!(controller.current_detail_state(), Some(settled));
    assert!(!controller.is_detail_inflight("52893"));
}

#[tokio::test]
async fn reselecting_loaded_id_fetches_again() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    controller.on_select("52767");
    let (_, reply) = next_detail_call(&mut calls).await;
    let _ = reply.send(Ok(detail("52767", "Bakewell tart")));
    wait_for_settled_detail(&mut events, "52767").await;

    controller.on_select("52767");
    assert_eq!(controller.detail_state("52767"), Some(AsyncState::Loading));

    let (id, reply) = next_detail_call(&mut calls).await;
    assert_eq!(id, "52767");
    let _ = reply.send(Ok(detail("52767", "Bakewell tart (updated)")));
    let settled = wait_for_settled_detail(&mut events, "52767").await;
    assert_eq!(
        settled,
        AsyncState::Loaded(detail("52767", "Bakewell tart (updated)"))
    );
}

#[tokio::test]
async fn detail_failure_is_captured_per_id() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    controller.on_select("404");
    let (_, reply) = next_detail_call(&mut calls).await;
    let _ = reply.send(Err(FetchError::not_found("404")));

    let settled = wait_for_settled_detail(&mut events, "404").await;
    assert_eq!(settled, AsyncState::Failed(FetchError::not_found("404")));
    assert_eq!(
        settled.error().map(ToString::to_string).as_deref(),
        Some("no meal found for id 404")
    );
}

#[tokio::test]
async fn deselect_clears_cursor_but_keeps_cache_entry() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    controller.on_select("A");
    let (_, reply) = next_detail_call(&mut calls).await;
    let _ = reply.send(Ok(detail("A", "Pancakes")));
    wait_for_settled_detail(&mut events, "A").await;

    controller.on_deselect();

    assert_eq!(controller.selection(), None);
    assert_eq!(controller.current_detail_state(), None);
    assert_eq!(
        controller.detail_state("A"),
        Some(AsyncState::Loaded(detail("A", "Pancakes")))
    );
}

#[tokio::test]
async fn fetch_in_flight_at_deselect_still_lands_in_cache() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    controller.on_select("A");
    let (_, reply) = next_detail_call(&mut calls).await;
    controller.on_deselect();
    assert_eq!(controller.detail_state("A"), Some(AsyncState::Loading));

    let _ = reply.send(Ok(detail("A", "Pancakes")));
    wait_for_settled_detail(&mut events, "A").await;

    assert_eq!(controller.current_detail_state(), None);
    assert_eq!(
        controller.detail_state("A"),
        Some(AsyncState::Loaded(detail("A", "Pancakes")))
    );
}

#[tokio::test]
async fn superseded_fetch_for_same_id_never_overwrites_newer_result() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    controller.on_select("A");
    let (_, first_reply) = next_detail_call(&mut calls).await;
    controller.on_select("A");
    let (_, second_reply) = next_detail_call(&mut calls).await;

    let _ = second_reply.send(Ok(detail("A", "newer")));
    let settled = wait_for_settled_detail(&mut events, "A").await;
    assert_eq!(settled, AsyncState::Loaded(detail("A", "newer")));

    // The first task was aborted, so this reply has nowhere to go.
    let _ = first_reply.send(Ok(detail("A", "older")));
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        controller.detail_state("A"),
        Some(AsyncState::Loaded(detail("A", "newer")))
    );
}

#[tokio::test]
async fn independent_ids_settle_in_any_order() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    controller.on_select("A");
    let (_, reply_a) = next_detail_call(&mut calls).await;
    controller.on_select("B");
    let (_, reply_b) = next_detail_call(&mut calls).await;

    let _ = reply_b.send(Ok(detail("B", "Treacle Tart")));
    wait_for_settled_detail(&mut events, "B").await;
    assert_eq!(controller.detail_state("A"), Some(AsyncState::Loading));

    let _ = reply_a.send(Err(FetchError::network("timed out")));
    wait_for_settled_detail(&mut events, "A").await;

    assert_eq!(controller.selection().as_deref(), Some("B"));
    assert_eq!(
        controller.current_detail_state(),
        Some(AsyncState::Loaded(detail("B", "Treacle Tart")))
    );
    assert_eq!(
        controller.detail_state("A"),
        Some(AsyncState::Failed(FetchError::network("timed out")))
    );
}

#[tokio::test]
async fn retry_detail_refetches_selected_id_only() {
    let (controller, mut calls) = scripted();
    let mut events = controller.subscribe_events();

    assert!(!controller.on_retry_detail());

    controller.on_select("A");
    let (_, reply) = next_detail_call(&mut calls).await;
    let _ = reply.send(Err(FetchError::network("connection refused")));
    wait_for_settled_detail(&mut events, "A").await;

    assert!(controller.on_retry_detail());
    assert_eq!(controller.current_detail_state(), Some(AsyncState::Loading));
    let (id, reply) = next_detail_call(&mut calls).await;
    assert_eq!(id, "A");
    let _ = reply.send(Ok(detail("A", "Eton Mess")));
    let settled = wait_for_settled_detail(&mut events, "A").await;
    assert!(settled.loaded().is_some());
}

#[tokio::test]
async fn mock_client_drives_list_and_fails_details() {
    let controller = MealsController::new(Arc::new(MockMealClient::bundled()));
    let mut events = controller.subscribe_events();

    controller.on_start().await;
    let items = controller.list_state().loaded().cloned().expect("fixture list");
    assert!(!items.is_empty());
    assert!(items.windows(2).all(|pair| pair[0].title <= pair[1].title));

    controller.on_select(items[0].id.clone());
    let settled = wait_for_settled_detail(&mut events, &items[0].id).await;
    assert_eq!(
        settled,
        AsyncState::Failed(FetchError::invalid_request(MOCK_DETAIL_UNAVAILABLE))
    );
}
