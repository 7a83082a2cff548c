mod helpers;

use helpers::{test_conn, unit_vec, BagEmbedder};
use nongsa::advisory::search::rank;
use nongsa::advisory::writer::AdvisoryWriter;
use nongsa::advisory::{embedding_from_bytes, NewAdvisory, TagSets};
use nongsa::db::{self, StoreError};

fn sample_record() -> NewAdvisory {
    NewAdvisory {
        year: 2024,
        month: 6,
        title: "# [2024-06-1주차] 고추 탄저병 방제".to_string(),
        tags: TagSets {
            crop: vec!["고추".to_string()],
            task: vec!["방제".to_string()],
            env: Vec::new(),
            pest: vec!["탄저병".to_string()],
            admin: Vec::new(),
        },
        content: "고추 탄저병 방제 적기.\n집중호우 이후 과습에 유의.".to_string(),
    }
}

#[test]
fn written_record_reads_back_identically() {
    let mut conn = test_conn(8);
    let embedding = vec![0.5f32, -0.25, 0.0, 0.125, 1.0, -1.0, 0.75, 0.3];

    let mut writer = AdvisoryWriter::new(&mut conn, 8, 10).unwrap();
    writer.write(sample_record(), &embedding).unwrap();
    writer.finish().unwrap();

    // Read back through the query path
    let embedder = BagEmbedder::new(8);
    let results = rank(&conn, &embedder, "검증 질의", 1).unwrap();
    assert_eq!(results.len(), 1);

    let advisory = &results[0].advisory;
    let expected = sample_record();
    assert_eq!(advisory.year, expected.year);
    assert_eq!(advisory.month, expected.month);
    assert_eq!(advisory.title, expected.title);
    assert_eq!(advisory.tags, expected.tags);
    assert_eq!(advisory.content, expected.content);
    assert!(!advisory.created_at.is_empty());

    // And the embedding column byte-for-byte
    let blob: Vec<u8> = conn
        .query_row(
            "SELECT embedding FROM advisories WHERE id = ?1",
            [advisory.id],
            |r| r.get(0),
        )
        .unwrap();
    let stored = embedding_from_bytes(&blob);
    assert_eq!(stored.len(), embedding.len());
    for (a, b) in stored.iter().zip(embedding.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn store_dimension_is_locked_at_creation() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("advisories.db");

    {
        let mut conn = db::open_database(&db_path).unwrap();
        let mut writer = AdvisoryWriter::new(&mut conn, 768, 10).unwrap();
        writer.write(sample_record(), &unit_vec(768, 0)).unwrap();
        writer.finish().unwrap();
    }

    // Writing a 1024-wide vector into a 768 store must fail, never truncate
    {
        let mut conn = db::open_database(&db_path).unwrap();
        let mut writer = AdvisoryWriter::new(&mut conn, 768, 10).unwrap();
        let err = writer
            .write(sample_record(), &unit_vec(1024, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                stored: 768,
                actual: 1024
            }
        ));
    }

    // Re-initializing the store for a 1024-dim model must fail too
    {
        let mut conn = db::open_database(&db_path).unwrap();
        let err = AdvisoryWriter::new(&mut conn, 1024, 10).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                stored: 768,
                actual: 1024
            }
        ));
    }
}

#[test]
fn on_disk_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("advisories.db");

    {
        let mut conn = db::open_database(&db_path).unwrap();
        let mut writer = AdvisoryWriter::new(&mut conn, 8, 10).unwrap();
        writer.write(sample_record(), &unit_vec(8, 0)).unwrap();
        writer.finish().unwrap();
    }

    let conn = db::open_readonly(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM advisories", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(db::schema::stored_dimension(&conn).unwrap(), Some(8));

    let embedder = BagEmbedder::new(8);
    let results = rank(&conn, &embedder, "검증 질의", 5).unwrap();
    assert_eq!(results.len(), 1);
}

#[test]
fn readonly_connection_refuses_writes() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("advisories.db");

    {
        let mut conn = db::open_database(&db_path).unwrap();
        let mut writer = AdvisoryWriter::new(&mut conn, 8, 10).unwrap();
        writer.write(sample_record(), &unit_vec(8, 0)).unwrap();
        writer.finish().unwrap();
    }

    let conn = db::open_readonly(&db_path).unwrap();
    let result = conn.execute("DELETE FROM advisories", []);
    assert!(result.is_err());
}

#[test]
fn open_readonly_requires_an_existing_store() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nothing-here.db");
    assert!(db::open_readonly(&missing).is_err());
}
