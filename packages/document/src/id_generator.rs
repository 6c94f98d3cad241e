use crc32fast::Hasher;

use crate::NodeId;

/// Derive a short, stable seed from a document label using CRC32
pub fn document_seed(label: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(label.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for scene graph nodes
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(label: &str) -> Self {
        Self::from_seed(document_seed(label))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn next_id(&mut self) -> NodeId {
        self.count += 1;
        NodeId::new(format!("{}-{}", self.seed, self.count))
    }

    /// Generate the next ID that `taken` does not already claim
    pub fn next_free(&mut self, taken: impl Fn(&NodeId) -> bool) -> NodeId {
        loop {
            let id = self.next_id();
            if !taken(&id) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_stable_per_label() {
        assert_eq!(document_seed("desktop"), document_seed("desktop"));
        assert_ne!(document_seed("desktop"), document_seed("mobile"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("invitation");

        let id1 = gen.next_id();
        let id2 = gen.next_id();

        assert!(id1.as_str().ends_with("-1"));
        assert!(id2.as_str().ends_with("-2"));
        assert!(id1.as_str().starts_with(gen.seed()));
    }

    #[test]
    fn test_next_free_skips_taken_ids() {
        let mut gen = IdGenerator::from_seed("s".to_string());
        let id = gen.next_free(|id| id.as_str() == "s-1" || id.as_str() == "s-2");
        assert_eq!(id.as_str(), "s-3");
    }
}
