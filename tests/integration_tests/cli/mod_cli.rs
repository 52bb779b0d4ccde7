use memdoc::cli::{Command, OutputMode, run, run_with_format};
use memdoc::config::AppConfig;
use memdoc::errors::DbError;
use memdoc::utils::json::read_ndjson;
use std::path::{Path, PathBuf};

fn write_data(dir: &Path) -> PathBuf {
    let p = dir.join("data.ndjson");
    std::fs::write(
        &p,
        concat!(
            "{\"name\":\"ann\",\"age\":31,\"tags\":[\"a\"]}\n",
            "{\"name\":\"bob\",\"age\":17,\"tags\":[]}\n",
            "{\"name\":\"cy\",\"age\":45,\"tags\":[\"a\",\"b\"]}\n",
        ),
    )
    .unwrap();
    p
}

fn output(cmd: Command) -> Result<String, DbError> {
    let mut buf = Vec::new();
    run(cmd, &AppConfig::default(), &mut buf)?;
    Ok(String::from_utf8(buf).unwrap())
}

#[test]
fn find_prints_sorted_projected_ndjson() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());
    let s = output(Command::Find {
        data,
        filter_json: r#"{"tags": "a"}"#.into(),
        project: Some("name".into()),
        sort: Some("-age".into()),
        limit: None,
        skip: None,
    })
    .unwrap();
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines, vec![r#"{"name":"cy"}"#, r#"{"name":"ann"}"#]);
}

#[test]
fn delete_with_write_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());
    let s = output(Command::Delete {
        data: data.clone(),
        filter_json: r#"{"age": {"$lt": 18}}"#.into(),
        one: false,
        write: true,
    })
    .unwrap();
    assert_eq!(s.trim(), r#"{"deleted":1}"#);
    let left = read_ndjson(&data).unwrap();
    assert_eq!(left.len(), 2);
    assert!(left.iter().all(|d| d.get_str("name").unwrap() != "bob"));
}

#[test]
fn update_many_plain_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());
    let mut buf = Vec::new();
    run_with_format(
        Command::Update {
            data: data.clone(),
            filter_json: r#"{"age": {"$gte": 18}}"#.into(),
            update_json: r#"{"$push": {"tags": {"$each": ["adult"]}}}"#.into(),
            one: false,
            write: true,
        },
        &AppConfig::default(),
        OutputMode::Plain,
        &mut buf,
    )
    .unwrap();
    assert_eq!(String::from_utf8(buf).unwrap().trim(), "matched=2 modified=2");
    let docs = read_ndjson(&data).unwrap();
    let cy = docs.iter().find(|d| d.get_str("name").unwrap() == "cy").unwrap();
    assert_eq!(cy.get_array("tags").unwrap().len(), 3);
}

#[test]
fn aggregate_writes_out_target_beside_data() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());
    let s = output(Command::Aggregate {
        data,
        pipeline_json: r#"[{"$match": {"age": {"$gt": 20}}}, {"$project": {"who": "$name"}}, {"$out": "adults"}]"#
            .into(),
        write: true,
    })
    .unwrap();
    assert_eq!(s.lines().count(), 2);
    let saved = read_ndjson(&dir.path().join("adults.ndjson")).unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].get_str("who").unwrap(), "ann");
}

#[test]
fn errors_surface_to_caller() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_data(dir.path());
    let err = output(Command::Count { data: data.clone(), filter_json: r#"{"$foo": 1}"#.into() }).unwrap_err();
    assert!(matches!(err, DbError::UnknownOperator(_)));
    let err = output(Command::Count { data: dir.path().join("missing.ndjson"), filter_json: "{}".into() })
        .unwrap_err();
    assert!(matches!(err, DbError::Io(_)));
    let err = output(Command::Update {
        data,
        filter_json: "{}".into(),
        update_json: r#"{"$rename": {"a": "b"}}"#.into(),
        one: false,
        write: false,
    })
    .unwrap_err();
    assert!(matches!(err, DbError::UnsupportedUpdateOperator(_)));
}
