//! Time-ordered Dataset

use crate::Sample;
use serde::{Deserialize, Serialize};

/// Column names a dataset was loaded with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub time: String,
    pub right_speed: String,
    pub left_speed: String,
    /// Present only when the source carried the steering column
    pub steering: Option<String>,
}

impl Schema {
    /// Column names in output order
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.time.as_str(),
            self.right_speed.as_str(),
            self.left_speed.as_str(),
        ];
        if let Some(steering) = &self.steering {
            columns.push(steering.as_str());
        }
        columns
    }

    /// Whether the steering column is part of this schema
    pub fn has_steering(&self) -> bool {
        self.steering.is_some()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            time: "Time (s)".to_string(),
            right_speed: "Right Wheel Speed (RPM)".to_string(),
            left_speed: "Left Wheel Speed (RPM)".to_string(),
            steering: Some("Steering Angle (deg)".to_string()),
        }
    }
}

/// Ordered sequence of samples sharing one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    schema: Schema,
    samples: Vec<Sample>,
}

impl Dataset {
    /// Wrap samples. The caller is responsible for ordering.
    pub fn new(schema: Schema, samples: Vec<Sample>) -> Self {
        Self { schema, samples }
    }

    /// Empty dataset with the given schema
    pub fn empty(schema: Schema) -> Self {
        Self::new(schema, Vec::new())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// New dataset with the same schema and different samples
    pub fn with_samples(&self, samples: Vec<Sample>) -> Self {
        Self::new(self.schema.clone(), samples)
    }

    /// Keep the samples matching a predicate, preserving order
    pub fn retain_where<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Sample) -> bool,
    {
        self.with_samples(self.samples.iter().filter(|s| keep(s)).copied().collect())
    }

    /// Whether times are strictly ascending (sorted and unique)
    pub fn is_strictly_ascending(&self) -> bool {
        self.samples.windows(2).all(|w| w[0].time < w[1].time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_without_steering() -> Schema {
        Schema {
            steering: None,
            ..Default::default()
        }
    }

    #[test]
    fn test_schema_columns() {
        let schema = Schema::default();
        assert_eq!(schema.columns().len(), 4);
        assert!(schema.has_steering());

        let schema = schema_without_steering();
        assert_eq!(
            schema.columns(),
            vec!["Time (s)", "Right Wheel Speed (RPM)", "Left Wheel Speed (RPM)"]
        );
    }

    #[test]
    fn test_retain_preserves_order() {
        let dataset = Dataset::new(
            schema_without_steering(),
            (0..10).map(|i| Sample::new(i as f64, i as f64 * 10.0, 0.0)).collect(),
        );
        let even = dataset.retain_where(|s| (s.time as usize) % 2 == 0);
        assert_eq!(even.len(), 5);
        assert!(even.is_strictly_ascending());
        assert_eq!(even.samples()[1].right_speed, 20.0);
    }

    #[test]
    fn test_strictly_ascending_rejects_duplicates() {
        let dataset = Dataset::new(
            schema_without_steering(),
            vec![Sample::new(0.0, 1.0, 1.0), Sample::new(0.0, 2.0, 2.0)],
        );
        assert!(!dataset.is_strictly_ascending());
    }
}
