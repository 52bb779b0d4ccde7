use crate::errors::DbError;
use bson::Document;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Parses one JSON object into a document. Extended JSON values such as
/// `{"$oid": ..}` or `{"$date": ..}` become the matching BSON values.
pub fn parse_json_document(json: &str) -> Result<Document, DbError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads newline-delimited JSON, one document per non-blank line.
pub fn read_ndjson(path: &Path) -> Result<Vec<Document>, DbError> {
    let file = std::fs::File::open(path)
        .map_err(|e| DbError::Io(format!("{}: {e}", path.display())))?;
    let mut docs = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = parse_json_document(&line)
            .map_err(|e| DbError::Io(format!("{}:{}: {e}", path.display(), n + 1)))?;
        docs.push(doc);
    }
    Ok(docs)
}

pub fn write_ndjson_to(mut out: impl Write, docs: &[Document]) -> Result<(), DbError> {
    for d in docs {
        let line = serde_json::to_string(d)?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Rewrites `path` with `docs`, through a temp file renamed into place.
pub fn write_ndjson(path: &Path, docs: &[Document]) -> Result<(), DbError> {
    let tmp = path.with_extension("ndjson.tmp");
    {
        let file = std::fs::File::create(&tmp)?;
        let mut w = std::io::BufWriter::new(file);
        write_ndjson_to(&mut w, docs)?;
        w.flush()?;
    }
    std::fs::rename(&tmp, path)?;
    Ok(())
}
