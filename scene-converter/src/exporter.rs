//! In-memory export results

/// A blob containing exported scene data.
///
/// Multi-file formats (for example OBJ with its MTL) produce a chain: the
/// primary blob first, auxiliary blobs reachable through [`next`](Self::next).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBlob {
    name: String,
    data: Vec<u8>,
    next: Option<Box<ExportBlob>>,
}

impl ExportBlob {
    /// Create a single blob
    pub fn new<S: Into<String>>(name: S, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
            next: None,
        }
    }

    /// Append `blob` at the end of this chain
    pub fn push(&mut self, blob: ExportBlob) {
        let mut slot = &mut self.next;
        while let Some(node) = slot {
            slot = &mut node.next;
        }
        *slot = Some(Box::new(blob));
    }

    /// Get the data as a byte slice
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take ownership of the data
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the size of the data
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Name hint; empty for the primary blob
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if this blob has a next blob
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Get the next blob in the chain
    pub fn next(&self) -> Option<&ExportBlob> {
        self.next.as_deref()
    }

    /// Iterate over all blobs in the chain (primary + auxiliaries)
    pub fn iter(&self) -> ExportBlobIterator<'_> {
        ExportBlobIterator {
            current: Some(self),
        }
    }
}

/// Iterator over blobs in an export blob chain
#[derive(Debug)]
pub struct ExportBlobIterator<'a> {
    current: Option<&'a ExportBlob>,
}

impl<'a> Iterator for ExportBlobIterator<'a> {
    type Item = &'a ExportBlob;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = current.next();
        Some(current)
    }
}

impl<'a> IntoIterator for &'a ExportBlob {
    type Item = &'a ExportBlob;
    type IntoIter = ExportBlobIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
