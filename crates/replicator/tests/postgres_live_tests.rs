//! Copy tests against live Postgres databases.
//!
//! Run with:
//!   MOBIUS_TEST_SOURCE_URL=postgres://... MOBIUS_TEST_DEST_URL=postgres://... \
//!     cargo test -p mobius-replicator --test postgres_live_tests -- --ignored
//!
//! The two URLs must name different databases. Each test owns its own table
//! names, so the tests can run in parallel.

use mobius_replicator::postgres::connect;
use mobius_replicator::{CopyEvent, CopyOptions, ReplicateError, Side, TableRef, copy_between};
use secrecy::SecretString;
use tokio_postgres::Client;

const SOURCE_URL_VAR: &str = "MOBIUS_TEST_SOURCE_URL";
const DEST_URL_VAR: &str = "MOBIUS_TEST_DEST_URL";

struct LiveDatabases {
    source_url: SecretString,
    dest_url: SecretString,
    source: Client,
    dest: Client,
}

/// Connect to both test databases, or `None` when they are not configured.
async fn live_databases() -> Option<LiveDatabases> {
    let (Ok(source_url), Ok(dest_url)) = (std::env::var(SOURCE_URL_VAR), std::env::var(DEST_URL_VAR))
    else {
        eprintln!("skipping: {SOURCE_URL_VAR} and {DEST_URL_VAR} must both be set");
        return None;
    };
    let source_url = SecretString::from(source_url);
    let dest_url = SecretString::from(dest_url);
    let source = connect(&source_url, Side::Source).await.expect("connect source");
    let dest = connect(&dest_url, Side::Destination).await.expect("connect destination");
    Some(LiveDatabases {
        source_url,
        dest_url,
        source,
        dest,
    })
}

/// Order-independent fingerprint of a table's contents: `(md5, row count)`.
async fn fingerprint(client: &Client, table: &str) -> (Option<String>, i64) {
    let row = client
        .query_one(
            &format!(
                "SELECT md5(string_agg(t::text, '|' ORDER BY t::text)), count(*) FROM public.{table} t"
            ),
            &[],
        )
        .await
        .expect("fingerprint query");
    (row.get(0), row.get(1))
}

fn small_batches() -> CopyOptions {
    CopyOptions {
        fetch_size: 100,
        insert_page_size: 64,
        progress_every: 1000,
    }
}

#[tokio::test]
#[ignore] // needs two live databases
async fn test_mixed_types_copy_exactly() {
    let Some(db) = live_databases().await else {
        return;
    };
    let ddl = "DROP TABLE IF EXISTS public.mobius_live_types;
        CREATE TABLE public.mobius_live_types (
            id bigint PRIMARY KEY,
            doc jsonb,
            tags text[],
            blob bytea,
            amount numeric(14,4),
            note text
        );";
    db.source.batch_execute(ddl).await.unwrap();
    db.dest.batch_execute(ddl).await.unwrap();
    db.source
        .batch_execute(
            "INSERT INTO public.mobius_live_types
                SELECT g,
                       jsonb_build_object('n', g, 'quote', 'it''s', 'nested', jsonb_build_array(g, null)),
                       ARRAY['a', g::text, 'with \"quotes\"'],
                       decode(md5(g::text), 'hex'),
                       g / 7.0,
                       CASE WHEN g % 5 = 0 THEN NULL ELSE 'row ' || g END
                FROM generate_series(1, 2500) g;
             INSERT INTO public.mobius_live_types (id) VALUES (0);",
        )
        .await
        .unwrap();
    db.dest
        .batch_execute("INSERT INTO public.mobius_live_types (id, note) VALUES (999999, 'stale')")
        .await
        .unwrap();

    let table = TableRef::new("public", "mobius_live_types");
    let mut events = Vec::new();
    let report = copy_between(&db.source_url, &db.dest_url, &table, &small_batches(), |e| {
        events.push(e)
    })
    .await
    .unwrap();

    assert_eq!(report.source_rows, 2501);
    assert_eq!(report.dest_rows_before, 1);
    assert_eq!(report.copied_rows, 2501);
    assert_eq!(report.dest_rows_after, 2501);
    assert_eq!(
        fingerprint(&db.source, "mobius_live_types").await,
        fingerprint(&db.dest, "mobius_live_types").await
    );
    assert!(events.contains(&CopyEvent::Progress { copied_rows: 1000 }));
    assert!(!events.iter().any(|e| matches!(e, CopyEvent::SchemaNote { .. })));
}

#[tokio::test]
#[ignore] // needs two live databases
async fn test_constraint_failure_rolls_back_and_reports_server_message() {
    let Some(db) = live_databases().await else {
        return;
    };
    db.source
        .batch_execute(
            "DROP TABLE IF EXISTS public.mobius_live_rollback;
             CREATE TABLE public.mobius_live_rollback (id bigint, note text);
             INSERT INTO public.mobius_live_rollback
                SELECT g, 'row ' || g FROM generate_series(1, 3000) g;",
        )
        .await
        .unwrap();
    db.dest
        .batch_execute(
            "DROP TABLE IF EXISTS public.mobius_live_rollback;
             CREATE TABLE public.mobius_live_rollback (
                id bigint CONSTRAINT mobius_live_no_2000 CHECK (id <> 2000),
                note text
             );
             INSERT INTO public.mobius_live_rollback
                SELECT g, 'kept ' || g FROM generate_series(1, 5) g;",
        )
        .await
        .unwrap();
    let before = fingerprint(&db.dest, "mobius_live_rollback").await;

    let table = TableRef::new("public", "mobius_live_rollback");
    let err = copy_between(&db.source_url, &db.dest_url, &table, &small_batches(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ReplicateError::Database(_)), "{err:?}");
    let message = err.to_string();
    assert!(message.contains("violates check constraint"), "{message}");
    assert!(message.contains("constraint: mobius_live_no_2000"), "{message}");
    assert!(message.contains("SQLSTATE 23514"), "{message}");

    let after = fingerprint(&db.dest, "mobius_live_rollback").await;
    assert_eq!(before, after);
    assert_eq!(after.1, 5);
}

#[tokio::test]
#[ignore] // needs two live databases
async fn test_destination_only_column_is_rejected() {
    let Some(db) = live_databases().await else {
        return;
    };
    db.source
        .batch_execute(
            "DROP TABLE IF EXISTS public.mobius_live_extra;
             CREATE TABLE public.mobius_live_extra (id bigint, note text);
             INSERT INTO public.mobius_live_extra VALUES (1, 'a'), (2, 'b');",
        )
        .await
        .unwrap();
    db.dest
        .batch_execute(
            "DROP TABLE IF EXISTS public.mobius_live_extra;
             CREATE TABLE public.mobius_live_extra (id bigint, note text, extra_dst text);
             INSERT INTO public.mobius_live_extra VALUES (7, 'kept', 'x');",
        )
        .await
        .unwrap();

    let table = TableRef::new("public", "mobius_live_extra");
    let err = copy_between(&db.source_url, &db.dest_url, &table, &small_batches(), |_| {})
        .await
        .unwrap_err();

    match err {
        ReplicateError::SchemaMismatch { columns } => assert_eq!(columns, vec!["extra_dst"]),
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
    assert_eq!(fingerprint(&db.dest, "mobius_live_extra").await.1, 1);
}

#[tokio::test]
#[ignore] // needs two live databases
async fn test_source_only_column_is_skipped_in_destination_order() {
    let Some(db) = live_databases().await else {
        return;
    };
    db.source
        .batch_execute(
            "DROP TABLE IF EXISTS public.mobius_live_subset;
             CREATE TABLE public.mobius_live_subset (id bigint, note text, embedding real[]);
             INSERT INTO public.mobius_live_subset
                SELECT g, 'row ' || g, ARRAY[g::real, 0.5] FROM generate_series(1, 10) g;",
        )
        .await
        .unwrap();
    db.dest
        .batch_execute(
            "DROP TABLE IF EXISTS public.mobius_live_subset;
             CREATE TABLE public.mobius_live_subset (note text, id bigint);",
        )
        .await
        .unwrap();

    let table = TableRef::new("public", "mobius_live_subset");
    let options = CopyOptions {
        fetch_size: 1,
        ..small_batches()
    };
    let mut events = Vec::new();
    let report = copy_between(&db.source_url, &db.dest_url, &table, &options, |e| {
        events.push(e)
    })
    .await
    .unwrap();

    assert_eq!(report.columns, vec!["note", "id"]);
    assert_eq!(report.dest_rows_after, 10);
    assert_eq!(
        events.first(),
        Some(&CopyEvent::SchemaNote {
            source_only: vec!["embedding".to_string()],
        })
    );
    let row = db
        .dest
        .query_one(
            "SELECT note FROM public.mobius_live_subset WHERE id = 7",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(row.get::<_, String>(0), "row 7");
}
