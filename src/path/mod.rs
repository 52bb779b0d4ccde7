//! Dotted-path resolution over documents.
//!
//! A path such as `"orders.$.items.0.sku"` is split on `.` and walked segment by
//! segment. Against an array, `$` visits every element, a numeric segment addresses
//! one index, and any other segment fans out over every element as if `$` had been
//! written before it. Resolution yields a finite list of [`ResolvedPath`] addresses;
//! a mutable [`Location`] handle for one address is borrowed from the root only for as
//! long as the caller needs it.

use bson::{Bson, Document};
use std::fmt;

/// Paths with more segments than this resolve to nothing.
pub const MAX_PATH_DEPTH: usize = 32;

pub const POSITIONAL: &str = "$";

/// Largest segment treated as an array index. Longer digit runs are field names.
pub const MAX_ARRAY_INDEX: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// Concrete address of one field or element, from the root document down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    steps: Vec<Step>,
}

/// A resolved address together with the value currently stored there, if any.
#[derive(Debug, Clone)]
pub struct Resolved<'a> {
    pub path: ResolvedPath,
    pub value: Option<&'a Bson>,
}

/// A segment made only of ASCII digits and no larger than [`MAX_ARRAY_INDEX`].
pub fn array_index(seg: &str) -> Option<usize> {
    if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    seg.parse::<usize>().ok().filter(|i| *i <= MAX_ARRAY_INDEX)
}

pub fn split_path(path: &str) -> Vec<&str> {
    path.split('.').map(str::trim).collect()
}

/// Read-only resolution. Every reachable terminal produces an entry, including
/// document members that do not exist yet (`value == None`).
pub fn resolve<'a>(root: &'a Document, path: &str) -> Vec<Resolved<'a>> {
    let segs = split_path(path);
    let mut out = Vec::new();
    if segs.len() > MAX_PATH_DEPTH {
        return out;
    }
    let mut prefix = Vec::with_capacity(segs.len());
    walk_doc(root, &segs, &mut prefix, &mut out);
    out
}

/// Every value present at `path`, in document order.
pub fn values<'a>(root: &'a Document, path: &str) -> Vec<&'a Bson> {
    resolve(root, path).into_iter().filter_map(|r| r.value).collect()
}

/// First value present at `path`.
pub fn first_value<'a>(root: &'a Document, path: &str) -> Option<&'a Bson> {
    resolve(root, path).into_iter().find_map(|r| r.value)
}

/// Resolution for writes. With `auto_create`, missing intermediate members become
/// empty documents, and arrays indexed past their end are padded with `Null` (the
/// slot addressed by a non-terminal index becomes an empty document).
pub fn resolve_mut(root: &mut Document, path: &str, auto_create: bool) -> Vec<ResolvedPath> {
    if !auto_create {
        return resolve(root, path).into_iter().map(|r| r.path).collect();
    }
    let segs = split_path(path);
    let mut out = Vec::new();
    if segs.len() > MAX_PATH_DEPTH {
        return out;
    }
    let mut prefix = Vec::with_capacity(segs.len());
    create_doc(root, &segs, &mut prefix, &mut out);
    out
}

fn finish(prefix: &[Step], last: Step) -> ResolvedPath {
    let mut steps = prefix.to_vec();
    steps.push(last);
    ResolvedPath { steps }
}

fn walk_value<'a>(v: &'a Bson, segs: &[&str], prefix: &mut Vec<Step>, out: &mut Vec<Resolved<'a>>) {
    match v {
        Bson::Document(d) => walk_doc(d, segs, prefix, out),
        Bson::Array(a) => walk_array(a, segs, prefix, out),
        _ => {}
    }
}

fn walk_doc<'a>(doc: &'a Document, segs: &[&str], prefix: &mut Vec<Step>, out: &mut Vec<Resolved<'a>>) {
    let Some((seg, rest)) = segs.split_first() else { return };
    let child = doc.get(*seg);
    if rest.is_empty() {
        out.push(Resolved { path: finish(prefix, Step::Key((*seg).to_string())), value: child });
        return;
    }
    if let Some(child) = child {
        prefix.push(Step::Key((*seg).to_string()));
        walk_value(child, rest, prefix, out);
        prefix.pop();
    }
}

fn walk_array<'a>(arr: &'a [Bson], segs: &[&str], prefix: &mut Vec<Step>, out: &mut Vec<Resolved<'a>>) {
    let Some((seg, rest)) = segs.split_first() else { return };
    if *seg == POSITIONAL {
        for (i, el) in arr.iter().enumerate() {
            if rest.is_empty() {
                out.push(Resolved { path: finish(prefix, Step::Index(i)), value: Some(el) });
            } else {
                prefix.push(Step::Index(i));
                walk_value(el, rest, prefix, out);
                prefix.pop();
            }
        }
    } else if let Some(idx) = array_index(seg) {
        if rest.is_empty() {
            out.push(Resolved { path: finish(prefix, Step::Index(idx)), value: arr.get(idx) });
        } else if let Some(el) = arr.get(idx) {
            prefix.push(Step::Index(idx));
            walk_value(el, rest, prefix, out);
            prefix.pop();
        }
    } else {
        // implicit fan-out: same segment against every element
        for (i, el) in arr.iter().enumerate() {
            prefix.push(Step::Index(i));
            walk_value(el, segs, prefix, out);
            prefix.pop();
        }
    }
}

fn create_value(v: &mut Bson, segs: &[&str], prefix: &mut Vec<Step>, out: &mut Vec<ResolvedPath>) {
    match v {
        Bson::Document(d) => create_doc(d, segs, prefix, out),
        Bson::Array(a) => create_array(a, segs, prefix, out),
        _ => {}
    }
}

fn create_doc(doc: &mut Document, segs: &[&str], prefix: &mut Vec<Step>, out: &mut Vec<ResolvedPath>) {
    let Some((seg, rest)) = segs.split_first() else { return };
    if rest.is_empty() {
        out.push(finish(prefix, Step::Key((*seg).to_string())));
        return;
    }
    if !doc.contains_key(*seg) {
        doc.insert(*seg, Document::new());
    }
    if let Some(child) = doc.get_mut(*seg) {
        prefix.push(Step::Key((*seg).to_string()));
        create_value(child, rest, prefix, out);
        prefix.pop();
    }
}

fn create_array(arr: &mut Vec<Bson>, segs: &[&str], prefix: &mut Vec<Step>, out: &mut Vec<ResolvedPath>) {
    let Some((seg, rest)) = segs.split_first() else { return };
    if *seg == POSITIONAL {
        for (i, el) in arr.iter_mut().enumerate() {
            if rest.is_empty() {
                out.push(finish(prefix, Step::Index(i)));
            } else {
                prefix.push(Step::Index(i));
                create_value(el, rest, prefix, out);
                prefix.pop();
            }
        }
    } else if let Some(idx) = array_index(seg) {
        if rest.is_empty() {
            if idx >= arr.len() {
                arr.resize(idx + 1, Bson::Null);
            }
            out.push(finish(prefix, Step::Index(idx)));
            return;
        }
        if idx >= arr.len() {
            arr.resize(idx, Bson::Null);
            arr.push(Bson::Document(Document::new()));
        }
        prefix.push(Step::Index(idx));
        create_value(&mut arr[idx], rest, prefix, out);
        prefix.pop();
    } else {
        for (i, el) in arr.iter_mut().enumerate() {
            prefix.push(Step::Index(i));
            create_value(el, segs, prefix, out);
            prefix.pop();
        }
    }
}

impl ResolvedPath {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Current value at this address.
    pub fn get<'a>(&self, root: &'a Document) -> Option<&'a Bson> {
        let (first, rest) = self.steps.split_first()?;
        let Step::Key(k) = first else { return None };
        let mut cur = root.get(k)?;
        for step in rest {
            cur = match (step, cur) {
                (Step::Key(k), Bson::Document(d)) => d.get(k)?,
                (Step::Index(i), Bson::Array(a)) => a.get(*i)?,
                _ => return None,
            };
        }
        Some(cur)
    }

    /// Borrows a mutable handle on this address. `None` when the containing
    /// document or array no longer exists.
    pub fn locate<'a>(&self, root: &'a mut Document) -> Option<Location<'a>> {
        enum Node<'a> {
            Doc(&'a mut Document),
            Arr(&'a mut Vec<Bson>),
        }
        let (last, parents) = self.steps.split_last()?;
        let mut node = Node::Doc(root);
        for step in parents {
            let child = match (step, node) {
                (Step::Key(k), Node::Doc(d)) => d.get_mut(k)?,
                (Step::Index(i), Node::Arr(a)) => a.get_mut(*i)?,
                _ => return None,
            };
            node = match child {
                Bson::Document(d) => Node::Doc(d),
                Bson::Array(a) => Node::Arr(a),
                _ => return None,
            };
        }
        match (last, node) {
            (Step::Key(k), Node::Doc(parent)) => Some(Location::Field { parent, key: k.clone() }),
            (Step::Index(i), Node::Arr(parent)) => Some(Location::Element { parent, index: *i }),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, step) in self.steps.iter().enumerate() {
            if n > 0 {
                f.write_str(".")?;
            }
            match step {
                Step::Key(k) => f.write_str(k)?,
                Step::Index(i) => write!(f, "{i}")?,
            }
        }
        Ok(())
    }
}

/// Mutable handle on one document member or array element.
#[derive(Debug)]
pub enum Location<'a> {
    Field { parent: &'a mut Document, key: String },
    Element { parent: &'a mut Vec<Bson>, index: usize },
}

impl Location<'_> {
    pub fn has(&self) -> bool {
        match self {
            Self::Field { parent, key } => parent.contains_key(key),
            Self::Element { parent, index } => *index < parent.len(),
        }
    }

    pub fn get(&self) -> Option<&Bson> {
        match self {
            Self::Field { parent, key } => parent.get(key),
            Self::Element { parent, index } => parent.get(*index),
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut Bson> {
        match self {
            Self::Field { parent, key } => parent.get_mut(key.as_str()),
            Self::Element { parent, index } => parent.get_mut(*index),
        }
    }

    /// Stores `value`, growing an array with `Null` if the index is past its end.
    pub fn set(&mut self, value: Bson) {
        match self {
            Self::Field { parent, key } => {
                parent.insert(key.clone(), value);
            }
            Self::Element { parent, index } => {
                if *index >= parent.len() {
                    let Some(len) = index.checked_add(1).filter(|_| *index <= MAX_ARRAY_INDEX) else {
                        log::warn!("array index {index} is past the padding limit; value not set");
                        return;
                    };
                    parent.resize(len, Bson::Null);
                }
                parent[*index] = value;
            }
        }
    }

    /// Removes the member, or the element (shifting later elements down).
    pub fn remove(&mut self) -> Option<Bson> {
        match self {
            Self::Field { parent, key } => parent.remove(key.as_str()),
            Self::Element { parent, index } => {
                (*index < parent.len()).then(|| parent.remove(*index))
            }
        }
    }
}
