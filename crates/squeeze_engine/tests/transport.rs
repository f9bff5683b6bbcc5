use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use squeeze_engine::{
    CommandError, EngineClient, EngineEvent, EventHub, EventKind, ImportProgress, ListColumn,
    ProcessEngine, SortOrder,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};

/// Engine side of an in-memory connection.
struct FakeEngine {
    requests: Lines<BufReader<ReadHalf<DuplexStream>>>,
    replies: WriteHalf<DuplexStream>,
}

impl FakeEngine {
    async fn next_request(&mut self) -> Value {
        let line = self
            .requests
            .next_line()
            .await
            .unwrap()
            .expect("request line");
        serde_json::from_str(&line).unwrap()
    }

    async fn send(&mut self, frame: Value) {
        let mut line = frame.to_string();
        line.push('\n');
        self.replies.write_all(line.as_bytes()).await.unwrap();
    }

    async fn send_raw(&mut self, line: &str) {
        self.replies.write_all(line.as_bytes()).await.unwrap();
    }
}

fn connect(hub: EventHub) -> (Arc<ProcessEngine>, FakeEngine) {
    let (client_side, engine_side) = tokio::io::duplex(64 * 1024);
    let (client_read, client_write) = tokio::io::split(client_side);
    let engine = ProcessEngine::from_io(client_read, client_write, hub);

    let (engine_read, engine_write) = tokio::io::split(engine_side);
    let fake = FakeEngine {
        requests: BufReader::new(engine_read).lines(),
        replies: engine_write,
    };
    (Arc::new(engine), fake)
}

fn file_list(ids: &[&str], total: u64) -> Value {
    let files: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "id": id, "name": format!("{id}.jpg"), "status": 0 }))
        .collect();
    json!({ "files": files, "base_folder": "/photos", "total_files": total })
}

#[tokio::test]
async fn request_carries_command_and_args() {
    let (engine, mut fake) = connect(EventHub::new());
    let call = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sort_list(ListColumn::Size, SortOrder::Descending).await }
    });

    let request = fake.next_request().await;
    assert_eq!(request["command"], "sort_list");
    assert_eq!(
        request["args"],
        json!({ "column": "size", "order": "descending" })
    );
    fake.send(json!({ "type": "response", "id": request["id"], "ok": file_list(&["a"], 1) }))
        .await;

    let list = call.await.unwrap().unwrap();
    assert_eq!(list.total_files, 1);
    assert_eq!(list.files[0].id, "a");
    assert_eq!(list.base_folder, "/photos");
}

#[tokio::test]
async fn responses_match_requests_by_id_in_any_order() {
    let (engine, mut fake) = connect(EventHub::new());
    let page = tokio::spawn({
        let engine = engine.clone();
        async move { engine.change_page(2).await }
    });
    let filter = tokio::spawn({
        let engine = engine.clone();
        async move { engine.filter_list("cat").await }
    });

    let first = fake.next_request().await;
    let second = fake.next_request().await;
    for request in [second, first] {
        let ids: &[&str] = if request["command"] == "change_page" {
            &["p2"]
        } else {
            &["cat"]
        };
        fake.send(json!({ "type": "response", "id": request["id"], "ok": file_list(ids, 51) }))
            .await;
    }

    assert_eq!(page.await.unwrap().unwrap().files[0].id, "p2");
    assert_eq!(filter.await.unwrap().unwrap().files[0].id, "cat");
}

#[tokio::test]
async fn events_between_responses_are_published() {
    let hub = EventHub::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = hub.subscribe(EventKind::ImportProgress, move |event| {
        sink.lock().unwrap().push(event.clone());
    });
    let (engine, mut fake) = connect(hub);

    let call = tokio::spawn({
        let engine = engine.clone();
        async move {
            engine
                .import_paths(&["/photos".to_string()], true)
                .await
        }
    });
    let request = fake.next_request().await;
    assert_eq!(request["args"], json!({ "paths": ["/photos"], "recursive": true }));

    fake.send(json!({
        "type": "event",
        "event": "import:progress",
        "payload": { "progress": 50, "total": 2 }
    }))
    .await;
    fake.send_raw("this is not json\n").await;
    fake.send(json!({ "type": "response", "id": request["id"], "ok": null }))
        .await;

    call.await.unwrap().unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        vec![EngineEvent::ImportProgress(ImportProgress {
            progress: 50,
            total: 2
        })]
    );
}

#[tokio::test]
async fn error_response_becomes_rejection() {
    let (engine, mut fake) = connect(EventHub::new());
    let call = tokio::spawn({
        let engine = engine.clone();
        async move { engine.pause_compression().await }
    });
    let request = fake.next_request().await;
    fake.send(json!({ "type": "response", "id": request["id"], "error": "no job running" }))
        .await;

    assert_eq!(
        call.await.unwrap(),
        Err(CommandError::Rejected {
            command: "pause_compression",
            message: "no job running".into()
        })
    );
}

#[tokio::test]
async fn unexpected_reply_shape_is_malformed() {
    let (engine, mut fake) = connect(EventHub::new());
    let call = tokio::spawn({
        let engine = engine.clone();
        async move { engine.clear_list().await }
    });
    let request = fake.next_request().await;
    fake.send(json!({ "type": "response", "id": request["id"], "ok": "done" }))
        .await;

    assert!(matches!(
        call.await.unwrap(),
        Err(CommandError::Malformed {
            command: "clear_list",
            ..
        })
    ));
}

#[tokio::test]
async fn closed_stream_fails_pending_and_later_requests() {
    let (engine, mut fake) = connect(EventHub::new());
    let call = tokio::spawn({
        let engine = engine.clone();
        async move { engine.cancel_compression().await }
    });
    let _ = fake.next_request().await;
    drop(fake);

    assert_eq!(call.await.unwrap(), Err(CommandError::Disconnected));
    assert!(engine.is_closed());
    assert_eq!(
        engine.resume_compression().await,
        Err(CommandError::Disconnected)
    );
}
