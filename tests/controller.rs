mod common;

use cartsync::binder::PageEvent;
use cartsync::controller::CartController;
use cartsync::error::SyncError;
use cartsync::model::{ActionKind, CartActionRequest};
use cartsync::page::{Element, ElementId};
use cartsync::view::format_currency;
use common::*;
use serde_json::json;
use std::sync::Arc;

const ADD_BUTTON: ElementId = ElementId(5);
const QUANTITY_INPUT: ElementId = ElementId(8);
const REMOVE_BUTTON: ElementId = ElementId(9);

#[tokio::test]
async fn binds_controls_found_at_startup() {
    let ctl = CartController::new(&config(), page(), Arc::new(ScriptedService::default()));
    let intents: Vec<_> = ctl.bindings().iter().map(|b| (b.element, b.intent)).collect();
    assert_eq!(
        intents,
        vec![
            (ADD_BUTTON, ActionKind::Add),
            (QUANTITY_INPUT, ActionKind::Update),
            (REMOVE_BUTTON, ActionKind::Remove),
        ]
    );
}

#[tokio::test]
async fn attributes_are_read_at_fire_time() {
    let page = page();
    let service = Arc::new(ScriptedService::new(vec![
        Ok(snapshot(5, 500.0)),
        Ok(json!({"success": true, "cart_count": 4, "cart_total": 400.0, "item_total": 400.0})),
    ]));
    let ctl = CartController::new(&config(), page.clone(), service.clone());

    page.with(|p| p.set_data(ADD_BUTTON, "quantity", "5"));
    let result = ctl.dispatch(PageEvent::click(ADD_BUTTON)).unwrap().await.unwrap();
    assert!(result.is_success());

    page.with(|p| p.set_value(QUANTITY_INPUT, "4"));
    let result = ctl.dispatch(PageEvent::change(QUANTITY_INPUT)).unwrap().await.unwrap();
    assert!(result.is_success());

    let requests: Vec<_> = service.calls().into_iter().map(|(req, _)| req).collect();
    assert_eq!(
        requests,
        vec![CartActionRequest::add("3", 5), CartActionRequest::update("3", 4)]
    );
    assert_eq!(texts(&page, "item-total-3"), vec!["KSh 400.00"]);
}

#[tokio::test]
async fn removed_bound_element_no_longer_dispatches() {
    let page = page();
    let service = Arc::new(ScriptedService::default());
    let ctl = CartController::new(&config(), page.clone(), service.clone());

    page.with(|p| p.remove(ADD_BUTTON));
    assert!(ctl.dispatch(PageEvent::click(ADD_BUTTON)).is_none());
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn add_click_dispatches_add_with_data_quantity() {
    let page = page();
    let service = Arc::new(ScriptedService::new(vec![Ok(snapshot(2, 200.0))]));
    let ctl = CartController::new(&config(), page.clone(), service.clone());

    let result = ctl.dispatch(PageEvent::click(ADD_BUTTON)).unwrap().await.unwrap();
    assert!(result.is_success());
    assert_eq!(service.calls()[0].0, CartActionRequest::add("3", 2));
    assert_eq!(texts(&page, "cart-count"), vec!["2", "2"]);
}

#[tokio::test]
async fn unbound_targets_and_wrong_events_are_ignored() {
    let page = page();
    let service = Arc::new(ScriptedService::default());
    let ctl = CartController::new(&config(), page.clone(), service.clone());

    let late = page.with(|p| {
        p.insert(
            Element::new("button")
                .with_class("add-to-cart-btn")
                .with_data("product-id", "8"),
        )
    });
    assert!(ctl.dispatch(PageEvent::click(late)).is_none());
    assert!(ctl.dispatch(PageEvent::change(ADD_BUTTON)).is_none());
    assert!(ctl.dispatch(PageEvent::click(ElementId(1))).is_none());
    assert!(service.calls().is_empty());
}

#[tokio::test]
async fn failure_does_not_block_an_immediate_retry() {
    let page = page();
    let service = Arc::new(ScriptedService::new(vec![
        Err(SyncError::Transport("offline".to_string())),
        Ok(snapshot(1, 100.0)),
    ]));
    let ctl = CartController::new(&config(), page.clone(), service.clone());

    let first = ctl.dispatch(PageEvent::click(REMOVE_BUTTON)).unwrap().await.unwrap();
    let second = ctl.dispatch(PageEvent::click(REMOVE_BUTTON)).unwrap().await.unwrap();
    assert!(!first.is_success());
    assert!(second.is_success());
    assert_eq!(service.calls().len(), 2);
    assert!(page.with(|p| p.select_class("cart-item-3").is_empty()));
    assert_eq!(page.with(|p| p.select_class("cart-notification").len()), 2);
}

#[tokio::test]
async fn overlapping_updates_last_reply_wins() {
    let page = page();
    let (service, mut pending) = GatedService::new();
    let ctl = CartController::new(&config(), page.clone(), Arc::new(service));

    page.with(|p| p.set_value(QUANTITY_INPUT, "2"));
    let first = ctl.dispatch(PageEvent::change(QUANTITY_INPUT)).unwrap();
    page.with(|p| p.set_value(QUANTITY_INPUT, "5"));
    let second = ctl.dispatch(PageEvent::change(QUANTITY_INPUT)).unwrap();

    let mut replies = Vec::new();
    for _ in 0..2 {
        replies.push(pending.recv().await.unwrap());
    }
    let (first_reply, second_reply) = {
        let idx = replies
            .iter()
            .position(|(req, _)| req.quantity == Some(2))
            .unwrap();
        let first = replies.remove(idx);
        (first, replies.remove(0))
    };
    assert_eq!(second_reply.0.quantity, Some(5));

    // the later request is answered first
    second_reply
        .1
        .send(Ok(json!({"success": true, "cart_count": 5, "cart_total": 500.0, "item_total": 500.0})))
        .unwrap();
    assert!(second.await.unwrap().is_success());
    assert_eq!(texts(&page, "cart-total"), vec!["KSh 500.00", "KSh 500.00"]);

    first_reply
        .1
        .send(Ok(json!({"success": true, "cart_count": 2, "cart_total": 200.0, "item_total": 200.0})))
        .unwrap();
    assert!(first.await.unwrap().is_success());

    assert_eq!(texts(&page, "cart-total"), vec!["KSh 200.00", "KSh 200.00"]);
    assert_eq!(texts(&page, "cart-count"), vec!["2", "2"]);
    assert_eq!(texts(&page, "item-total-3"), vec!["KSh 200.00"]);
    assert_eq!(ctl.view_state().snapshot.map(|s| s.cart_total), Some(200.0));
    assert_eq!(ctl.view_state().revision, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_replies_leave_page_and_view_state_in_agreement() {
    for round in 0..200u32 {
        let page = page();
        let (service, mut pending) = GatedService::new();
        let ctl = CartController::new(&config(), page.clone(), Arc::new(service));

        page.with(|p| p.set_value(QUANTITY_INPUT, "2"));
        let first = ctl.dispatch(PageEvent::change(QUANTITY_INPUT)).unwrap();
        page.with(|p| p.set_value(QUANTITY_INPUT, "5"));
        let second = ctl.dispatch(PageEvent::change(QUANTITY_INPUT)).unwrap();

        let mut replies = Vec::new();
        for _ in 0..2 {
            replies.push(pending.recv().await.unwrap());
        }
        // both replies released together so the two settle on different workers
        for (request, reply) in replies {
            let qty = request.quantity.unwrap() as f64;
            let total = qty * 100.0;
            reply
                .send(Ok(json!({
                    "success": true,
                    "cart_count": qty as u32,
                    "cart_total": total,
                    "item_total": total
                })))
                .unwrap();
        }
        assert!(first.await.unwrap().is_success());
        assert!(second.await.unwrap().is_success());

        let view = ctl.view_state();
        let snapshot = view.snapshot.expect("a snapshot was applied");
        let shown = format_currency("KSh", snapshot.cart_total);
        assert_eq!(view.revision, 2, "round {}", round);
        assert_eq!(texts(&page, "cart-total"), vec![shown.clone(), shown.clone()], "round {}", round);
        assert_eq!(texts(&page, "item-total-3"), vec![shown], "round {}", round);
        assert_eq!(
            texts(&page, "cart-count"),
            vec![snapshot.item_count.to_string(); 2],
            "round {}",
            round
        );
    }
}
