use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub label: String,
    // probability between 0.0 and 1.0
    pub confidence: f32,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Classifier output, always ordered by descending confidence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classifications(Vec<Classification>);

impl Classifications {
    /// Sorts by descending confidence. Non-finite confidences are dropped,
    /// the rest are clamped to `[0.0, 1.0]`.
    pub fn ranked(classifications: Vec<Classification>) -> Self {
        let mut ranked: Vec<Classification> = classifications
            .into_iter()
            .filter(|c| c.confidence.is_finite())
            .map(|mut c| {
                c.confidence = c.confidence.clamp(0.0, 1.0);
                c
            })
            .collect();
        ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Self(ranked)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn top(&self, n: usize) -> &[Classification] {
        &self.0[..n.min(self.0.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Classification> {
        self.0.iter()
    }
}

impl FromIterator<Classification> for Classifications {
    fn from_iter<I: IntoIterator<Item = Classification>>(iter: I) -> Self {
        Self::ranked(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_orders_by_confidence() {
        let ranked = Classifications::ranked(vec![
            Classification::new("cat", 0.2),
            Classification::new("crash helmet", 0.7),
            Classification::new("dog", 0.1),
        ]);
        let labels: Vec<_> = ranked.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["crash helmet", "cat", "dog"]);
    }

    #[test]
    fn malformed_confidences_are_sanitized() {
        let ranked: Classifications = vec![
            Classification::new("nan", f32::NAN),
            Classification::new("big", 3.0),
            Classification::new("negative", -1.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.top(1)[0], Classification::new("big", 1.0));
        assert_eq!(ranked.top(2)[1].confidence, 0.0);
    }

    #[test]
    fn top_is_bounded_by_length() {
        let ranked = Classifications::ranked(vec![Classification::new("only", 0.5)]);
        assert_eq!(ranked.top(2).len(), 1);
        assert!(Classifications::default().top(2).is_empty());
    }
}
