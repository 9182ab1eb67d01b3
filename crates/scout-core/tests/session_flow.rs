//! End-to-end session scenarios on a paused clock.

mod common;

use std::time::Duration;

use common::{response, unavailable, GatedClient};
use scout_core::config::SearchConfig;
use scout_core::facet::ActiveFacet;
use scout_core::session::{RenderFrame, SearchSession, SessionHandle, View};
use tokio::sync::watch;

fn start(client: &GatedClient) -> (SessionHandle, watch::Receiver<RenderFrame>) {
    let handle = SearchSession::spawn(client.clone(), &SearchConfig::default());
    let frames = handle.frames();
    (handle, frames)
}

async fn until(
    frames: &mut watch::Receiver<RenderFrame>,
    pred: impl FnMut(&RenderFrame) -> bool,
) -> RenderFrame {
    frames.wait_for(pred).await.unwrap().clone()
}

fn loading(query: &'static str) -> impl FnMut(&RenderFrame) -> bool {
    move |f| matches!(&f.view, View::Loading { query: q } if q.as_str() == query)
}

fn ready(query: &'static str) -> impl FnMut(&RenderFrame) -> bool {
    move |f| matches!(&f.view, View::Ready(p) if p.query.as_str() == query)
}

/// Let spawned fetches and the session task run to quiescence.
async fn settle_all() {
    tokio::time::sleep(Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_resolution_shows_only_latest() {
    let client = GatedClient::new();
    let release_ab = client.gate("ab");
    let release_abc = client.gate("abc");
    let (handle, mut frames) = start(&client);

    handle.input("ab");
    until(&mut frames, loading("ab")).await;
    handle.input("abc");
    until(&mut frames, loading("abc")).await;

    release_abc
        .send(Ok(response(&["abc report"], &[], &[])))
        .unwrap();
    let shown = until(&mut frames, ready("abc")).await;

    release_ab
        .send(Ok(response(&["ab report"], &[], &[])))
        .unwrap();
    settle_all().await;

    assert_eq!(handle.current(), shown);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_stale_result_arriving_during_loading_is_ignored() {
    let client = GatedClient::new();
    let release_ab = client.gate("ab");
    let release_abc = client.gate("abc");
    let (handle, mut frames) = start(&client);

    handle.input("ab");
    until(&mut frames, loading("ab")).await;
    handle.input("abc");
    let pending = until(&mut frames, loading("abc")).await;

    release_ab.send(Ok(response(&["ab report"], &[], &[]))).unwrap();
    settle_all().await;
    assert_eq!(handle.current(), pending);

    release_abc.send(Ok(response(&[], &[], &[]))).unwrap();
    let frame = until(&mut frames, ready("abc")).await;
    assert_eq!(frame.generation, pending.generation);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shrinking_query_goes_idle_and_drops_inflight() {
    let client = GatedClient::new();
    let release_ab = client.gate("ab");
    let (handle, mut frames) = start(&client);

    handle.input("ab");
    until(&mut frames, loading("ab")).await;
    handle.input("a");
    let idle = until(&mut frames, |f| f.view == View::Idle && f.generation > 0).await;

    release_ab.send(Ok(response(&["ab report"], &[], &[]))).unwrap();
    settle_all().await;

    assert_eq!(handle.current(), idle);
    assert_eq!(client.calls(), vec!["ab"]);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_stays_idle_without_fetch() {
    let client = GatedClient::new();
    let (handle, mut frames) = start(&client);

    handle.input("");
    let frame = until(&mut frames, |f| f.generation == 1).await;
    assert_eq!(frame.view, View::Idle);
    assert!(client.calls().is_empty());
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_facet_change_after_ready_filters_without_fetch() {
    let client = GatedClient::new();
    client
        .gate("apollo")
        .send(Ok(response(
            &["Apollo launch checklist"],
            &["Apollo"],
            &["apollo-bot"],
        )))
        .unwrap();
    let (handle, mut frames) = start(&client);

    handle.input("apollo");
    let all = until(&mut frames, ready("apollo")).await;
    let View::Ready(all_projection) = &all.view else {
        unreachable!()
    };
    assert_eq!(all_projection.sections.len(), 3);

    handle.set_facet(ActiveFacet::Tasks);
    let tasks = until(&mut frames, |f| f.facet == ActiveFacet::Tasks).await;
    let View::Ready(tasks_projection) = &tasks.view else {
        panic!("facet change must keep the Ready state");
    };
    assert_eq!(tasks_projection.sections.len(), 1);
    assert_eq!(tasks_projection.sections[0], all_projection.sections[0]);
    assert_eq!(tasks.generation, all.generation);
    assert_eq!(client.calls(), vec!["apollo"]);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_then_new_query_is_ready() {
    let client = GatedClient::new();
    client.gate("beta").send(Err(unavailable())).unwrap();
    let (handle, mut frames) = start(&client);

    handle.input("beta");
    let failed = until(&mut frames, |f| matches!(f.view, View::Failed { .. })).await;
    let View::Failed { query, reason } = failed.view.clone() else {
        unreachable!()
    };
    assert_eq!(query.as_str(), "beta");
    assert!(reason.contains("503"));

    let release_gamma = client.gate("gamma");
    handle.input("gamma");
    let pending = until(&mut frames, loading("gamma")).await;
    assert!(pending.generation > failed.generation);

    release_gamma
        .send(Ok(response(&["gamma rollout"], &[], &[])))
        .unwrap();
    let shown = until(&mut frames, ready("gamma")).await;
    assert_eq!(shown.generation, pending.generation);
    assert_eq!(client.calls(), vec!["beta", "gamma"]);
    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_facet_set_while_loading_is_kept_for_ready() {
    let client = GatedClient::new();
    let release = client.gate("delta");
    let (handle, mut frames) = start(&client);

    handle.input("delta");
    until(&mut frames, loading("delta")).await;
    handle.set_facet(ActiveFacet::Users);
    until(&mut frames, |f| f.facet == ActiveFacet::Users).await;

    release
        .send(Ok(response(&["delta"], &[], &[])))
        .unwrap();
    let frame = until(&mut frames, ready("delta")).await;
    assert_eq!(frame.facet, ActiveFacet::Users);
    let View::Ready(projection) = frame.view else {
        unreachable!()
    };
    assert_eq!(projection.sections.len(), 1);
    assert!(projection.sections[0].is_empty());
    handle.shutdown().await;
}
