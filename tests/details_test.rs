//! Integration tests for in-place detail enrichment of listed records.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{title_body, TestHarness};
use moviedeck::catalog::{DetailRequest, OmdbClient, SearchService};
use moviedeck::state::ResultList;
use moviedeck::tasks::Background;
use moviedeck_common::Movie;
use tokio::sync::oneshot;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, ResponseTemplate};

fn service(h: &TestHarness, background: &Background) -> SearchService {
    let client = Arc::new(OmdbClient::new(&h.config.provider));
    SearchService::new(client, background.clone())
}

fn listed() -> ResultList {
    let list = ResultList::new();
    list.replace(
        vec![
            Movie::summary("tt0133093", "The Matrix", "1999"),
            Movie::summary("tt0078748", "Alien", "1979"),
        ],
        "Found 2 results",
    );
    list
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn details_are_applied_in_place() {
    let h = TestHarness::new().await;
    // Delayed so the in-flight flag is still observable after the request.
    Mock::given(method("GET"))
        .and(query_param("i", "tt0078748"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(title_body("tt0078748", "Alien", "1979", "Horror, Sci-Fi"))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&h.server)
        .await;
    let background = Background::current();
    let service = service(&h, &background);
    let list = listed();

    let (tx, rx) = oneshot::channel();
    let request = service.fetch_details(&list, "tt0078748", move |movie| {
        let _ = tx.send(movie);
    });
    assert_eq!(request, DetailRequest::Started);
    assert!(list.lock().find("tt0078748").unwrap().fetching);

    let delivered = rx.await.unwrap();
    assert!(delivered.has_details);
    assert!(!delivered.fetching);
    assert_eq!(delivered.genre, "Horror, Sci-Fi");

    let state = list.lock();
    let stored = state.find("tt0078748").unwrap();
    assert!(stored.has_details);
    assert!(!stored.fetching);
    assert_eq!(stored.plot, "The plot of Alien.");
    assert_eq!(stored.title, "Alien");
    assert!(!state.find("tt0133093").unwrap().has_details);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loaded_record_is_not_fetched_again() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;
    let background = Background::current();
    let service = service(&h, &background);
    let list = listed();
    list.update("tt0133093", |m| m.has_details = true);

    let request = service.fetch_details(&list, "tt0133093", |_| panic!("no callback expected"));
    assert_eq!(request, DetailRequest::AlreadyLoaded);
    background.drain().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_request_while_in_flight_is_ignored() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(query_param("i", "tt0133093"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(title_body("tt0133093", "The Matrix", "1999", "Action, Sci-Fi"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&h.server)
        .await;
    let background = Background::current();
    let service = service(&h, &background);
    let list = listed();

    let (tx, rx) = oneshot::channel();
    assert_eq!(
        service.fetch_details(&list, "tt0133093", move |m| {
            let _ = tx.send(m);
        }),
        DetailRequest::Started
    );
    assert_eq!(
        service.fetch_details(&list, "tt0133093", |_| panic!("no callback expected")),
        DetailRequest::InFlight
    );

    assert!(rx.await.unwrap().has_details);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_and_id_less_records_are_refused() {
    let h = TestHarness::new().await;
    let background = Background::current();
    let service = service(&h, &background);
    let list = listed();

    assert_eq!(
        service.fetch_details(&list, "tt0000000", |_| panic!("no callback expected")),
        DetailRequest::NotInList
    );

    list.replace(vec![Movie::default()], "");
    assert_eq!(
        service.fetch_details(&list, "", |_| panic!("no callback expected")),
        DetailRequest::MissingId
    );
    assert!(!list.snapshot()[0].fetching);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failure_clears_fetching_and_still_calls_back() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;
    let background = Background::current();
    let service = service(&h, &background);
    let list = listed();

    let (tx, rx) = oneshot::channel();
    service.fetch_details(&list, "tt0078748", move |m| {
        let _ = tx.send(m);
    });

    let delivered = rx.await.unwrap();
    assert!(!delivered.has_details);
    assert!(!delivered.fetching);
    let stored = list.lock().find("tt0078748").cloned().unwrap();
    assert!(!stored.has_details);
    assert!(!stored.fetching);

    // The record can be retried once the failed fetch has settled.
    assert_eq!(
        service.fetch_details(&list, "tt0078748", |_| {}),
        DetailRequest::Started
    );
    background.drain().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn record_removed_mid_flight_is_still_delivered() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(query_param("i", "tt0078748"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(title_body("tt0078748", "Alien", "1979", "Horror"))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&h.server)
        .await;
    let background = Background::current();
    let service = service(&h, &background);
    let list = listed();

    let (tx, rx) = oneshot::channel();
    service.fetch_details(&list, "tt0078748", move |m| {
        let _ = tx.send(m);
    });
    list.replace(Vec::new(), "");

    let delivered = rx.await.unwrap();
    assert_eq!(delivered.imdb_id, "tt0078748");
    assert!(delivered.has_details);
    assert!(!delivered.fetching);
    assert!(list.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropped_list_skips_callback() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(title_body("tt0078748", "Alien", "1979", "Horror"))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&h.server)
        .await;
    let background = Background::current();
    let service = service(&h, &background);
    let list = listed();

    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    service.fetch_details(&list, "tt0078748", move |_| flag.store(true, Ordering::SeqCst));
    drop(list);

    background.drain().await;
    assert!(!called.load(Ordering::SeqCst));
}
