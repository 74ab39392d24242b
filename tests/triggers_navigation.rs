//! Trigger timing phases and the navigation/history flows.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use hxcmd::{
    CommandProcessor, Document, FakeNavigator, SessionHistory, UrlChange,
};

fn recorder(document: &Arc<Document>, names: &[&str]) -> Arc<Mutex<Vec<String>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    for name in names {
        let log = log.clone();
        document.add_listener(name, move |event| {
            log.lock().push(event.name.clone());
        });
    }
    log
}

#[tokio::test]
async fn bare_trigger_fires_once_with_no_detail() {
    let document = Arc::new(Document::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .build();

    let count = Arc::new(AtomicUsize::new(0));
    let detail_seen = Arc::new(Mutex::new(None));
    {
        let count = count.clone();
        let detail_seen = detail_seen.clone();
        document.add_listener("done", move |event| {
            count.fetch_add(1, Ordering::SeqCst);
            *detail_seen.lock() = event.detail.clone();
        });
    }

    let (_, handle) = processor.transform("<htmx trigger=\"done\"></htmx>").unwrap();
    handle.wait().await.unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(detail_seen.lock().is_none());
}

#[tokio::test]
async fn comma_list_fires_each_named_event() {
    let document = Arc::new(Document::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .build();
    let log = recorder(&document, &["a", "b"]);

    let (_, handle) = processor.transform("<htmx trigger=\"a, b\"></htmx>").unwrap();
    handle.wait().await.unwrap();

    assert_eq!(*log.lock(), vec!["a", "b"]);
}

#[tokio::test]
async fn json_trigger_carries_detail() {
    let document = Arc::new(Document::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .build();

    let detail = Arc::new(Mutex::new(None));
    {
        let detail = detail.clone();
        document.add_listener("a", move |event| {
            *detail.lock() = event.detail.clone();
        });
    }

    let (_, handle) = processor
        .transform("<htmx trigger='{\"a\":{\"x\":1}}'></htmx>")
        .unwrap();
    handle.wait().await.unwrap();

    assert_eq!(*detail.lock(), Some(serde_json::json!({"x": 1})));
}

#[tokio::test]
async fn trigger_target_override_hits_resolved_node() {
    let document = Arc::new(Document::from_html("<div id=\"zone\"></div>").unwrap());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .build();

    let target_hit = Arc::new(Mutex::new(None));
    {
        let target_hit = target_hit.clone();
        document.add_listener("ping", move |event| {
            *target_hit.lock() = Some(event.target);
        });
    }

    let (_, handle) = processor
        .transform("<htmx trigger='{\"ping\":{\"target\":\"#zone\"}}'></htmx>")
        .unwrap();
    handle.wait().await.unwrap();

    assert_eq!(*target_hit.lock(), document.query("#zone"));
}

#[tokio::test]
async fn timing_phases_fire_in_order() {
    let document = Arc::new(Document::from_html("<div id=\"t\">Old</div>").unwrap());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .build();
    let log = recorder(&document, &["after-swap", "after-settle", "immediate"]);

    let (_, handle) = processor
        .transform(
            "<htmx target=\"#t\" swap=\"innerHTML settle:20ms\" \
                   trigger-after-swap=\"after-swap\" \
                   trigger-after-settle=\"after-settle\" \
                   trigger=\"immediate\">New</htmx>",
        )
        .unwrap();
    handle.wait().await.unwrap();

    assert_eq!(
        *log.lock(),
        vec!["after-swap", "after-settle", "immediate"]
    );
}

#[tokio::test]
async fn timing_triggers_still_fire_without_a_swap_job() {
    let document = Arc::new(Document::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .build();
    let log = recorder(&document, &["as", "ast"]);

    let (_, handle) = processor
        .transform("<htmx trigger-after-swap=\"as\" trigger-after-settle=\"ast\"></htmx>")
        .unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.completed(), 1);
    assert_eq!(*log.lock(), vec!["as", "ast"]);
}

#[tokio::test]
async fn redirect_is_terminal_but_isolated() {
    let document = Arc::new(Document::new());
    let navigator = Arc::new(FakeNavigator::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .navigator(navigator.clone())
        .collect_events(true)
        .build();
    let log = recorder(&document, &["after-redirect"]);

    let (_, handle) = processor
        .transform(
            "<htmx redirect=\"/away\"></htmx>\
             <htmx trigger=\"after-redirect\"></htmx>",
        )
        .unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(navigator.redirects(), vec!["/away".to_string()]);
    // the marker after the redirect still ran
    assert_eq!(*log.lock(), vec!["after-redirect"]);
    assert_eq!(summary.completed(), 2);

    // no post-command event for the redirect marker (index 0)
    let mut rx = processor.take_events().unwrap();
    let mut completed_indices = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let hxcmd::ProcessorEvent::CommandCompleted { index, .. } = event {
            completed_indices.push(index);
        }
    }
    assert_eq!(completed_indices, vec![1]);
}

#[tokio::test]
async fn refresh_is_terminal_unless_false() {
    let document = Arc::new(Document::new());
    let navigator = Arc::new(FakeNavigator::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .navigator(navigator.clone())
        .collect_events(true)
        .build();

    let (_, handle) = processor
        .transform(
            "<htmx refresh=\"false\"></htmx>\
             <htmx refresh></htmx>",
        )
        .unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(navigator.refresh_count(), 1);
    assert_eq!(summary.completed(), 2);

    // refresh="false" completes normally, the bare refresh skips its
    // post-command event
    let mut rx = processor.take_events().unwrap();
    let mut completed_indices = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let hxcmd::ProcessorEvent::CommandCompleted { index, .. } = event {
            completed_indices.push(index);
        }
    }
    assert_eq!(completed_indices, vec![0]);
}

#[tokio::test]
async fn push_url_snapshots_then_pushes() {
    let document = Arc::new(Document::from_html("<p>page one</p>").unwrap());
    let history = Arc::new(SessionHistory::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .history_store(history.clone())
        .initial_path("/one")
        .build();

    let (_, handle) = processor.transform("<htmx push-url=\"/two\"></htmx>").unwrap();
    handle.wait().await.unwrap();

    assert_eq!(history.changes(), vec![UrlChange::Push("/two".into())]);
    let snapshots = history.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].path, "/one");
    assert!(snapshots[0].html.contains("page one"));
    assert_eq!(processor.history_state().get(), "/two");
}

#[tokio::test]
async fn replace_url_records_replacement() {
    let document = Arc::new(Document::new());
    let history = Arc::new(SessionHistory::new());
    let processor = CommandProcessor::builder()
        .document(document)
        .history_store(history.clone())
        .initial_path("/one")
        .build();

    let (_, handle) = processor
        .transform("<htmx replace-url=\"/fixed\"></htmx>")
        .unwrap();
    handle.wait().await.unwrap();

    assert_eq!(history.changes(), vec![UrlChange::Replace("/fixed".into())]);
    assert_eq!(processor.history_state().get(), "/fixed");
}

#[tokio::test]
async fn location_fetches_swaps_and_pushes_history() {
    let document = Arc::new(Document::from_html("<div id=\"main\">old</div>").unwrap());
    let navigator = Arc::new(FakeNavigator::new());
    navigator.route("/page/2", "<p>page two</p>");
    let history = Arc::new(SessionHistory::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .navigator(navigator)
        .history_store(history.clone())
        .initial_path("/page/1")
        .build();

    let (_, handle) = processor
        .transform("<htmx location='{\"path\":\"/page/2\",\"target\":\"#main\"}'></htmx>")
        .unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.completed(), 1);
    let main = document.query("#main").unwrap();
    assert_eq!(document.text_content(main), "page two");
    assert_eq!(history.changes(), vec![UrlChange::Push("/page/2".into())]);
    assert_eq!(processor.history_state().get(), "/page/2");
}

#[tokio::test]
async fn location_fetch_failure_is_isolated() {
    let document = Arc::new(Document::from_html("<div id=\"main\">old</div>").unwrap());
    let history = Arc::new(SessionHistory::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .history_store(history.clone())
        .build();
    let log = recorder(&document, &["next"]);

    let (_, handle) = processor
        .transform(
            "<htmx location=\"/unrouted\"></htmx>\
             <htmx trigger=\"next\"></htmx>",
        )
        .unwrap();
    let summary = handle.wait().await.unwrap();

    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.completed(), 1);
    assert_eq!(*log.lock(), vec!["next"]);
    assert!(history.changes().is_empty());
}

#[tokio::test]
async fn immediate_phase_runs_in_fixed_order() {
    // trigger fires before push-url regardless of attribute order
    let document = Arc::new(Document::new());
    let history = Arc::new(SessionHistory::new());
    let processor = CommandProcessor::builder()
        .document(document.clone())
        .history_store(history.clone())
        .build();

    let pushes_at_trigger_time = Arc::new(Mutex::new(None));
    {
        let history = history.clone();
        let pushes_at_trigger_time = pushes_at_trigger_time.clone();
        document.add_listener("now", move |_| {
            *pushes_at_trigger_time.lock() = Some(history.changes().len());
        });
    }

    let (_, handle) = processor
        .transform("<htmx push-url=\"/later\" trigger=\"now\"></htmx>")
        .unwrap();
    handle.wait().await.unwrap();

    assert_eq!(*pushes_at_trigger_time.lock(), Some(0));
    assert_eq!(history.changes(), vec![UrlChange::Push("/later".into())]);
}
