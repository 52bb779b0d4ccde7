use crate::errors::DbError;
use crate::query::{MAX_PROJECTION_FIELDS, MAX_SORT_FIELDS, Order, SortSpec};

/// Parses `-age,+name,city` into sort keys; a bare field sorts ascending.
pub fn parse_sort(s: &str) -> Result<Vec<SortSpec>, DbError> {
    let mut specs = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (order, field) = if let Some(rest) = part.strip_prefix('-') {
            (Order::Desc, rest)
        } else if let Some(rest) = part.strip_prefix('+') {
            (Order::Asc, rest)
        } else {
            (Order::Asc, part)
        };
        if field.is_empty() {
            return Err(DbError::QueryError(format!("empty sort field in '{s}'")));
        }
        specs.push(SortSpec { field: field.to_string(), order });
    }
    if specs.len() > MAX_SORT_FIELDS {
        return Err(DbError::QueryError(format!("at most {MAX_SORT_FIELDS} sort fields")));
    }
    Ok(specs)
}

pub fn parse_projection(s: &str) -> Result<Vec<String>, DbError> {
    let fields: Vec<String> =
        s.split(',').map(|f| f.trim().to_string()).filter(|f| !f.is_empty()).collect();
    if fields.len() > MAX_PROJECTION_FIELDS {
        return Err(DbError::QueryError(format!("at most {MAX_PROJECTION_FIELDS} projected fields")));
    }
    Ok(fields)
}
