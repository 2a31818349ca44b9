//! Lifecycle behaviour of `CatalogFetcher` and `DetailLookup` driven by a
//! scripted gateway, so response ordering is deterministic.

mod common;

use std::sync::Arc;

use nicheradar_client::{
    CatalogFetcher, DetailLookup, FetchError, InputError, LifecycleState, Phase, Settled,
};

use common::{product, ScriptedGateway};

// ---------------------------------------------------------------------------
// Staleness guard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn later_catalog_load_wins_when_earlier_response_arrives_last() {
    let gateway = Arc::new(ScriptedGateway::new());
    let es_tx = gateway.script_catalog();
    let fr_tx = gateway.script_catalog();
    let fetcher = CatalogFetcher::new(Arc::clone(&gateway));

    let es_list = vec![product("Eau ES", "10", "https://n.es/es")];
    let fr_list = vec![product("Eau FR", "20", "https://n.fr/fr")];

    let driver = async {
        fr_tx.send(Ok(fr_list.clone())).unwrap();
        tokio::task::yield_now().await;
        es_tx.send(Ok(es_list.clone())).unwrap();
    };

    let (es, fr, ()) = tokio::join!(fetcher.load(12, "es"), fetcher.load(12, "fr"), driver);

    assert_eq!(es, Ok(Settled::Discarded));
    assert_eq!(fr, Ok(Settled::Applied));
    assert_eq!(fetcher.current(), LifecycleState::Success(fr_list));
    assert_eq!(
        *gateway.catalog_calls.lock().unwrap(),
        vec![(12, "es".to_string()), (12, "fr".to_string())]
    );
}

#[tokio::test]
async fn stale_error_does_not_override_newer_success() {
    let gateway = Arc::new(ScriptedGateway::new());
    let first_tx = gateway.script_catalog();
    let second_tx = gateway.script_catalog();
    let fetcher = CatalogFetcher::new(Arc::clone(&gateway));
    let list = vec![product("Eau X", "45.5", "https://n.es/x")];

    let driver = async {
        second_tx.send(Ok(list.clone())).unwrap();
        tokio::task::yield_now().await;
        first_tx
            .send(Err(FetchError::Transport {
                message: "timed out".to_string(),
            }))
            .unwrap();
    };

    let (first, second, ()) =
        tokio::join!(fetcher.load(12, "es"), fetcher.load(12, "de"), driver);

    assert_eq!(first, Ok(Settled::Discarded));
    assert_eq!(second, Ok(Settled::Applied));
    assert_eq!(fetcher.current().phase(), Phase::Success);
}

#[tokio::test]
async fn newer_lookup_is_not_overwritten_by_slow_earlier_lookup() {
    let gateway = Arc::new(ScriptedGateway::new());
    let slow_tx = gateway.script_detail();
    let fast_tx = gateway.script_detail();
    let lookup = DetailLookup::new(Arc::clone(&gateway));

    let slow = product("Old", "1", "https://n.es/p/1");
    let fast = product("New", "2", "https://n.es/p/2");

    let driver = async {
        fast_tx.send(Ok(fast.clone())).unwrap();
        tokio::task::yield_now().await;
        slow_tx.send(Ok(slow.clone())).unwrap();
    };

    let (a, b, ()) = tokio::join!(
        lookup.lookup("https://n.es/p/1"),
        lookup.lookup("https://n.es/p/2"),
        driver
    );

    assert_eq!(a, Ok(Settled::Discarded));
    assert_eq!(b, Ok(Settled::Applied));
    assert_eq!(lookup.current(), LifecycleState::Success(fast));
}

#[tokio::test]
async fn triggered_catalog_order_holds_when_later_load_is_polled_first() {
    let gateway = Arc::new(ScriptedGateway::new());
    // Polled first, so the "fr" load pops the first scripted response.
    let fr_tx = gateway.script_catalog();
    let es_tx = gateway.script_catalog();
    let fetcher = Arc::new(CatalogFetcher::new(Arc::clone(&gateway)));

    let es_list = vec![product("Eau ES", "10", "https://n.es/es")];
    let fr_list = vec![product("Eau FR", "20", "https://n.fr/fr")];

    let es = fetcher.trigger(12, "es").unwrap();
    let fr = fetcher.trigger(12, "fr").unwrap();
    assert_eq!(fetcher.current(), LifecycleState::Loading);

    let driver = async {
        fr_tx.send(Ok(fr_list.clone())).unwrap();
        tokio::task::yield_now().await;
        es_tx.send(Ok(es_list.clone())).unwrap();
    };

    let (fr, es, ()) = tokio::join!(fr, es, driver);

    assert_eq!(fr, Settled::Applied);
    assert_eq!(es, Settled::Discarded);
    assert_eq!(fetcher.current(), LifecycleState::Success(fr_list));
    assert_eq!(
        *gateway.catalog_calls.lock().unwrap(),
        vec![(12, "fr".to_string()), (12, "es".to_string())]
    );
}

#[tokio::test]
async fn triggered_catalog_order_holds_across_spawned_tasks() {
    let gateway = Arc::new(ScriptedGateway::new());
    let first_tx = gateway.script_catalog();
    let second_tx = gateway.script_catalog();
    let fetcher = Arc::new(CatalogFetcher::new(Arc::clone(&gateway)));

    let es = fetcher.trigger(12, "es").unwrap();
    let fr = fetcher.trigger(12, "fr").unwrap();
    let fr_task = tokio::spawn(fr);
    let es_task = tokio::spawn(es);

    // Whichever task reached the gateway first got the first sender; both
    // carry the same payload shape so only the token decides the winner.
    let newest = vec![product("Newest", "1", "https://n.es/n")];
    first_tx.send(Ok(newest.clone())).unwrap();
    second_tx.send(Ok(newest.clone())).unwrap();

    assert_eq!(fr_task.await.unwrap(), Settled::Applied);
    assert_eq!(es_task.await.unwrap(), Settled::Discarded);
    assert_eq!(fetcher.current(), LifecycleState::Success(newest));
}

#[tokio::test]
async fn triggered_lookup_order_holds_when_later_lookup_is_polled_first() {
    let gateway = Arc::new(ScriptedGateway::new());
    let second_tx = gateway.script_detail();
    let first_tx = gateway.script_detail();
    let lookup = Arc::new(DetailLookup::new(Arc::clone(&gateway)));

    let old = product("Old", "1", "https://n.es/p/1");
    let new = product("New", "2", "https://n.es/p/2");

    let first = lookup.trigger("https://n.es/p/1").unwrap();
    let second = lookup.trigger("https://n.es/p/2").unwrap();

    let driver = async {
        second_tx.send(Ok(new.clone())).unwrap();
        tokio::task::yield_now().await;
        first_tx.send(Ok(old.clone())).unwrap();
    };

    let (second, first, ()) = tokio::join!(second, first, driver);

    assert_eq!(second, Settled::Applied);
    assert_eq!(first, Settled::Discarded);
    assert_eq!(lookup.current(), LifecycleState::Success(new));
}

#[tokio::test]
async fn trigger_rejects_bad_input_without_touching_lifecycle() {
    let gateway = Arc::new(ScriptedGateway::new());
    let fetcher = Arc::new(CatalogFetcher::new(Arc::clone(&gateway)));
    let lookup = Arc::new(DetailLookup::new(Arc::clone(&gateway)));

    assert!(matches!(
        fetcher.trigger(0, "es"),
        Err(InputError::NonPositiveLimit)
    ));
    assert!(matches!(
        fetcher.trigger(12, " "),
        Err(InputError::EmptyCountry)
    ));
    assert!(matches!(lookup.trigger(""), Err(InputError::EmptyUrl)));

    assert_eq!(gateway.total_calls(), 0);
    assert_eq!(fetcher.current(), LifecycleState::Idle);
    assert_eq!(lookup.current(), LifecycleState::Idle);
}

// ---------------------------------------------------------------------------
// Loading clears previous content
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_lookup_clears_displayed_detail_while_loading() {
    let gateway = Arc::new(ScriptedGateway::new());
    let first_tx = gateway.script_detail();
    let second_tx = gateway.script_detail();
    let lookup = DetailLookup::new(Arc::clone(&gateway));
    let mut rx = lookup.subscribe();

    first_tx
        .send(Ok(product("First", "5", "https://n.es/p/1")))
        .unwrap();
    lookup.lookup("https://n.es/p/1").await.unwrap();
    assert_eq!(rx.latest().phase(), Phase::Success);

    let observer = async {
        rx.changed().await.unwrap();
        let seen = rx.latest();
        second_tx
            .send(Ok(product("Second", "6", "https://n.es/p/2")))
            .unwrap();
        seen
    };

    let (settled, seen_while_loading) = tokio::join!(lookup.lookup("https://n.es/p/2"), observer);

    assert_eq!(settled, Ok(Settled::Applied));
    assert_eq!(seen_while_loading, LifecycleState::Loading);
    assert_eq!(seen_while_loading.data(), None);
    assert_eq!(lookup.current().data().map(|p| p.name.as_str()), Some("Second"));
}

#[tokio::test]
async fn reload_after_error_clears_message_while_loading() {
    let gateway = Arc::new(ScriptedGateway::new());
    let fail_tx = gateway.script_catalog();
    let ok_tx = gateway.script_catalog();
    let fetcher = CatalogFetcher::new(Arc::clone(&gateway));

    fail_tx
        .send(Err(FetchError::Http {
            status: 503,
            detail: None,
        }))
        .unwrap();
    fetcher.load(12, "es").await.unwrap();
    assert_eq!(fetcher.current().error_message(), Some("HTTP 503"));

    let mut rx = fetcher.subscribe();
    let observer = async {
        rx.changed().await.unwrap();
        let seen = rx.latest();
        ok_tx.send(Ok(Vec::new())).unwrap();
        seen
    };
    let (_, seen) = tokio::join!(fetcher.load(12, "es"), observer);

    assert_eq!(seen, LifecycleState::Loading);
    assert_eq!(seen.error_message(), None);
    assert_eq!(fetcher.current(), LifecycleState::Success(Vec::new()));
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_lookup_never_reaches_gateway() {
    let gateway = Arc::new(ScriptedGateway::new());
    let lookup = DetailLookup::new(Arc::clone(&gateway));

    assert_eq!(lookup.lookup("").await, Err(InputError::EmptyUrl));
    assert_eq!(lookup.lookup("   \t").await, Err(InputError::EmptyUrl));

    assert_eq!(gateway.total_calls(), 0);
    assert_eq!(lookup.current(), LifecycleState::Idle);
}

#[tokio::test]
async fn empty_lookup_keeps_previous_result() {
    let gateway = Arc::new(ScriptedGateway::new());
    let tx = gateway.script_detail();
    let lookup = DetailLookup::new(Arc::clone(&gateway));
    let shown = product("Shown", "9.9", "https://n.es/p/9");

    tx.send(Ok(shown.clone())).unwrap();
    lookup.lookup("https://n.es/p/9").await.unwrap();

    assert_eq!(lookup.lookup(" ").await, Err(InputError::EmptyUrl));
    assert_eq!(gateway.total_calls(), 1);
    assert_eq!(lookup.current(), LifecycleState::Success(shown));
}

#[tokio::test]
async fn lookup_trims_surrounding_whitespace() {
    let gateway = Arc::new(ScriptedGateway::new());
    let tx = gateway.script_detail();
    let lookup = DetailLookup::new(Arc::clone(&gateway));
    tx.send(Ok(product("X", "1", "https://n.es/p/1"))).unwrap();

    lookup.lookup("  https://n.es/p/1\n").await.unwrap();

    assert_eq!(
        *gateway.detail_calls.lock().unwrap(),
        vec!["https://n.es/p/1".to_string()]
    );
}

#[tokio::test]
async fn catalog_rejects_zero_limit_and_blank_country() {
    let gateway = Arc::new(ScriptedGateway::new());
    let fetcher = CatalogFetcher::new(Arc::clone(&gateway));

    assert_eq!(
        fetcher.load(0, "es").await,
        Err(InputError::NonPositiveLimit)
    );
    assert_eq!(fetcher.load(12, "  ").await, Err(InputError::EmptyCountry));

    assert_eq!(gateway.total_calls(), 0);
    assert_eq!(fetcher.current(), LifecycleState::Idle);
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retry_after_transport_error_replaces_error_state() {
    let gateway = Arc::new(ScriptedGateway::new());
    let down_tx = gateway.script_catalog();
    let up_tx = gateway.script_catalog();
    let fetcher = CatalogFetcher::new(Arc::clone(&gateway));

    down_tx
        .send(Err(FetchError::Transport {
            message: "connection refused".to_string(),
        }))
        .unwrap();
    fetcher.load(12, "es").await.unwrap();
    assert_eq!(
        fetcher.current().error_message(),
        Some("network error: connection refused")
    );

    let list = vec![product("Eau X", "45.5", "https://n.es/x")];
    up_tx.send(Ok(list.clone())).unwrap();
    fetcher.load(12, "es").await.unwrap();

    assert_eq!(fetcher.current(), LifecycleState::Success(list));
}

#[tokio::test]
async fn fetchers_share_one_gateway_but_not_state() {
    let gateway = Arc::new(ScriptedGateway::new());
    let catalog_tx = gateway.script_catalog();
    let detail_tx = gateway.script_detail();
    let fetcher = CatalogFetcher::new(Arc::clone(&gateway));
    let lookup = DetailLookup::new(Arc::clone(&gateway));

    catalog_tx
        .send(Err(FetchError::Parse {
            reason: "bad".to_string(),
        }))
        .unwrap();
    detail_tx
        .send(Ok(product("X", "1", "https://n.es/p/1")))
        .unwrap();

    fetcher.load(12, "es").await.unwrap();
    lookup.lookup("https://n.es/p/1").await.unwrap();

    assert_eq!(fetcher.current().phase(), Phase::Error);
    assert_eq!(lookup.current().phase(), Phase::Success);
}
