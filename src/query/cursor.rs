use bson::Document;

/// Materialised result of `find_docs`.
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    docs: Vec<Document>,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(docs: Vec<Document>) -> Self {
        Self { docs, pos: 0 }
    }

    pub fn advance(&mut self) -> Option<Document> {
        let d = self.docs.get(self.pos).cloned()?;
        self.pos += 1;
        Some(d)
    }

    /// Documents not yet consumed.
    pub fn remaining(&self) -> usize {
        self.docs.len() - self.pos
    }

    #[must_use]
    pub fn to_vec(mut self) -> Vec<Document> {
        self.docs.split_off(self.pos)
    }
}

impl Iterator for Cursor {
    type Item = Document;
    fn next(&mut self) -> Option<Self::Item> {
        self.advance()
    }
}
