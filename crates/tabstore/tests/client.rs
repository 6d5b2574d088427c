/*
 * Licensed to the Apache Software Foundation (ASF) under one
 * or more contributor license agreements.  See the NOTICE file
 * distributed with this work for additional information
 * regarding copyright ownership.  The ASF licenses this file
 * to you under the Apache License, Version 2.0 (the
 * "License"); you may not use this file except in compliance
 * with the License.  You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Client session protocol tests over the call-recording mock session.

use bytes::Bytes;
use tabstore::error::Error;
use tabstore::schema::{DataType, Schema, StorageMode};
use tabstore::test_utils::{connected_client, MockConnector, MockSession};
use tabstore::TabStoreClient;

fn events_schema() -> Schema {
    Schema::builder()
        .column("ts", DataType::Long)
        .column("value", DataType::Double)
        .build()
        .unwrap()
}

fn assert_illegal_state(result: Result<(), Error>) {
    match result {
        Err(Error::IllegalState { .. }) => {}
        other => panic!("expected IllegalState, got {other:?}"),
    }
}

#[tokio::test]
async fn table_scoped_ops_fail_without_selection_and_stay_local() {
    let (session, mut client) = connected_client().await;

    assert_illegal_state(client.remove_table().await);
    assert_illegal_state(client.add_index("ts").await);
    assert_illegal_state(client.add_index_with_bucket("ts", 10.0).await);
    assert_illegal_state(client.remove_index("ts").await);
    assert_illegal_state(client.add_filter("f", "value > 1.0").await);
    assert_illegal_state(client.remove_filter("f").await);
    assert_illegal_state(client.add_trigger("t", "f", "SUM(value) > 100").await);
    assert_illegal_state(client.remove_trigger("t").await);
    assert_illegal_state(client.write(&[0u8; 16]).await);
    assert_illegal_state(client.read(0).await.map(|_| ()));
    assert_illegal_state(client.read_batch(0, 10).await.map(|_| ()));
    assert_illegal_state(client.adhoc_filter("value > 1.0").await.map(|_| ()));
    assert_illegal_state(client.predef_filter("f", 0, 1000).await.map(|_| ()));
    assert_illegal_state(
        client
            .combined_filter("f", "value > 1.0", 0, 1000)
            .await
            .map(|_| ()),
    );
    assert_illegal_state(client.get_alerts(0, 1000).await.map(|_| ()));
    assert_illegal_state(client.num_records().await.map(|_| ()));

    assert!(
        session.calls().is_empty(),
        "no remote call may be issued before a table is selected, got {:?}",
        session.calls()
    );
}

#[tokio::test]
async fn write_validates_record_size_before_going_remote() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    client.write(&[0u8; 16]).await.unwrap();
    assert_eq!(session.call_count("append"), 1);

    let err = client.write(&[0u8; 10]).await.unwrap_err();
    match &err {
        Error::IllegalState { message } => {
            assert!(message.contains("expected=16"), "message: {message}");
            assert!(message.contains("got=10"), "message: {message}");
        }
        other => panic!("expected IllegalState, got {other:?}"),
    }
    assert_eq!(session.call_count("append"), 1);
}

#[tokio::test]
async fn create_table_selects_it_and_keeps_local_schema() {
    let (session, mut client) = connected_client().await;
    let schema = events_schema();

    client
        .create_table("events", &schema, StorageMode::Durable)
        .await
        .unwrap();

    assert!(client.table_id().is_some());
    assert_eq!(client.current_schema(), &schema);
    assert_eq!(session.call_count("create_table"), 1);
}

#[tokio::test]
async fn set_current_table_round_trips_schema_through_wire_form() {
    let (_session, mut client) = connected_client().await;
    let schema = events_schema();

    client
        .create_table("events", &schema, StorageMode::InMemory)
        .await
        .unwrap();
    let created_id = client.table_id();

    client.set_current_table("events").await.unwrap();
    assert_eq!(client.table_id(), created_id);
    assert_eq!(client.current_schema(), &schema);
    assert_eq!(client.current_schema().record_size(), 16);
}

#[tokio::test]
async fn set_current_table_propagates_unknown_table() {
    let (_session, mut client) = connected_client().await;
    let err = client.set_current_table("missing").await.unwrap_err();
    assert!(matches!(err, Error::Remote { .. }));
    assert!(client.table_id().is_none());
}

#[tokio::test]
async fn remove_table_returns_to_unselected_state() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    client.remove_table().await.unwrap();
    assert!(client.table_id().is_none());

    assert_illegal_state(client.write(&[0u8; 16]).await);
    assert_eq!(session.call_count("append"), 0);
}

#[tokio::test]
async fn ddl_ops_forward_to_the_selected_table() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    client.add_index("value").await.unwrap();
    client.add_index_with_bucket("ts", 100.0).await.unwrap();
    client.remove_index("value").await.unwrap();
    client.add_filter("hot", "value > 9000.0").await.unwrap();
    client
        .add_trigger("page", "hot", "COUNT(ts) > 10")
        .await
        .unwrap();
    client.remove_trigger("page").await.unwrap();
    client.remove_filter("hot").await.unwrap();

    assert_eq!(session.call_count("add_index"), 2);
    assert_eq!(session.call_count("remove_index"), 1);
    assert_eq!(session.call_count("add_filter"), 1);
    assert_eq!(session.call_count("remove_filter"), 1);
    assert_eq!(session.call_count("add_trigger"), 1);
    assert_eq!(session.call_count("remove_trigger"), 1);
}

#[tokio::test]
async fn remote_failures_propagate_and_leave_context_untouched() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    session.fail_on("add_filter");
    let err = client.add_filter("hot", "value > 1.0").await.unwrap_err();
    assert!(matches!(err, Error::Remote { .. }));

    client.write(&[0u8; 16]).await.unwrap();
    assert_eq!(client.current_schema(), &events_schema());
}

#[tokio::test]
async fn read_is_a_single_record_batch_read() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    session.set_read_result(Bytes::from_static(&[7u8; 16]));
    let blob = client.read(0).await.unwrap();
    assert_eq!(blob.len(), 16);

    let blob = client.read_batch(0, 4).await.unwrap();
    assert_eq!(blob.len(), 16);
    assert_eq!(session.call_count("read"), 2);
}

#[tokio::test]
async fn num_records_reports_the_server_count() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    session.set_num_records(42);
    assert_eq!(client.num_records().await.unwrap(), 42);
}

#[tokio::test]
async fn disconnect_is_idempotent_and_checks_the_transport() {
    let (session, mut client) = connected_client().await;

    client.disconnect().await;
    assert_eq!(session.call_count("deregister_handler"), 1);
    assert_eq!(session.call_count("close"), 1);

    client.disconnect().await;
    assert_eq!(session.call_count("deregister_handler"), 1);
    assert_eq!(session.call_count("close"), 1);
}

#[tokio::test]
async fn disconnect_on_a_never_connected_client_is_a_no_op() {
    let session = MockSession::new();
    let mut client = TabStoreClient::new(Box::new(MockConnector::new(session.clone())));
    client.disconnect().await;
    assert!(session.calls().is_empty());
}

#[tokio::test]
async fn connect_surfaces_transport_failure_as_connection_error() {
    let session = MockSession::new();
    let mut client = TabStoreClient::new(Box::new(MockConnector::refusing(session)));
    let err = client.connect("127.0.0.1", 9090).await.unwrap_err();
    assert!(matches!(err, Error::Connection { .. }));
}

#[tokio::test]
async fn connect_performs_the_registration_handshake() {
    let session = MockSession::new();
    let _client = TabStoreClient::connect_to(
        Box::new(MockConnector::new(session.clone())),
        "127.0.0.1",
        9090,
    )
    .await
    .unwrap();
    assert_eq!(session.call_count("register_handler"), 1);
}

#[tokio::test]
async fn query_open_is_lazy() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    let mut stream = client.predef_filter("hot", 1000, 2000).await.unwrap();
    assert_eq!(session.call_count("predef_filter"), 1);
    assert_eq!(session.call_count("fetch_record_page"), 0);

    session.script_record_pages(vec![Bytes::from(vec![1u8; 16])]);
    let record = stream.next().await.unwrap().unwrap();
    assert_eq!(record.len(), 16);
    assert_eq!(session.call_count("fetch_record_page"), 1);
}

#[tokio::test]
async fn record_stream_pages_lazily_and_latches_exhaustion() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    // Two pages of two records each; the mock then serves empty pages.
    session.script_record_pages(vec![Bytes::from(vec![1u8; 32]), Bytes::from(vec![2u8; 32])]);

    let mut stream = client.adhoc_filter("value > 1.0").await.unwrap();
    let mut records = Vec::new();
    while let Some(record) = stream.next().await.unwrap() {
        assert_eq!(record.len(), 16);
        records.push(record);
    }
    assert_eq!(records.len(), 4);
    assert!(stream.is_exhausted());

    // 2 data pages + 1 empty page; the empty page latches exhaustion.
    assert_eq!(session.call_count("fetch_record_page"), 3);
    assert!(stream.next().await.unwrap().is_none());
    assert!(stream.next().await.unwrap().is_none());
    assert_eq!(session.call_count("fetch_record_page"), 3);
}

#[tokio::test]
async fn record_stream_rejects_ragged_pages() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    session.script_record_pages(vec![Bytes::from(vec![1u8; 20])]);
    let mut stream = client.adhoc_filter("value > 1.0").await.unwrap();
    let err = stream.next().await.unwrap_err();
    assert!(matches!(err, Error::Unexpected { .. }));
}

#[tokio::test]
async fn alert_stream_pages_lazily_and_latches_exhaustion() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    session.script_alert_pages(vec![
        vec!["trigger=page value=101".to_string()],
        vec!["trigger=page value=250".to_string()],
    ]);

    let mut stream = client.get_alerts(1000, 2000).await.unwrap();
    assert_eq!(session.call_count("alerts_by_time"), 1);
    assert_eq!(session.call_count("fetch_alert_page"), 0);

    let mut alerts = Vec::new();
    while let Some(alert) = stream.next().await.unwrap() {
        alerts.push(alert);
    }
    assert_eq!(alerts.len(), 2);
    assert!(stream.is_exhausted());
    assert!(stream.next().await.unwrap().is_none());
    assert_eq!(session.call_count("fetch_alert_page"), 3);
}

#[tokio::test]
async fn each_query_gets_its_own_cursor() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();

    let _a = client.adhoc_filter("value > 1.0").await.unwrap();
    let _b = client.predef_filter("hot", 0, 1000).await.unwrap();
    let _c = client
        .combined_filter("hot", "value < 5.0", 0, 1000)
        .await
        .unwrap();

    assert_eq!(session.call_count("adhoc_filter"), 1);
    assert_eq!(session.call_count("predef_filter"), 1);
    assert_eq!(session.call_count("combined_filter"), 1);
    assert_eq!(session.call_count("fetch_record_page"), 0);
}

#[tokio::test]
async fn writes_reach_the_table_they_were_issued_against() {
    let (session, mut client) = connected_client().await;
    client
        .create_table("events", &events_schema(), StorageMode::InMemory)
        .await
        .unwrap();
    let table_id = client.table_id().unwrap();

    let record: Vec<u8> = (0u8..16).collect();
    client.write(&record).await.unwrap();

    let appended = session.appended();
    assert_eq!(appended.len(), 1);
    assert_eq!(appended[0].0, table_id);
    assert_eq!(&appended[0].1[..], &record[..]);
}
