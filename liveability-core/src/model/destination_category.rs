use super::{distance, CategoryCode, CoreError};
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

/// a class of place of interest used as a routing target, such as
/// "supermarket" or "convenience".
///
/// one logical category may combine several raw destination datasets,
/// listed in `sources`. when `sources` is empty the category reads the
/// dataset tagged with its own code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationCategory {
    pub code: CategoryCode,
    pub name: String,
    pub domain: String,
    /// hard network distance limit for the closest-destination indicator
    pub cutoff_closest: Length,
    /// network radius within which destinations are counted
    pub cutoff_count: Length,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl DestinationCategory {
    /// the raw destination source tags feeding this category.
    pub fn source_tags(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![self.code.to_string()]
        } else {
            self.sources.clone()
        }
    }

    /// the distance the routing oracle must search to serve both indicators.
    pub fn search_cutoff(&self) -> Length {
        if self.cutoff_count > self.cutoff_closest {
            self.cutoff_count
        } else {
            self.cutoff_closest
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: &str| CoreError::InvalidCategory(self.code.to_string(), msg.to_string());
        if self.code.as_str().trim().is_empty() {
            return Err(invalid("category code is empty"));
        }
        for (name, cutoff) in [
            ("cutoff_closest", &self.cutoff_closest),
            ("cutoff_count", &self.cutoff_count),
        ] {
            let meters = distance::to_meters(cutoff);
            if !meters.is_finite() || meters <= 0.0 {
                return Err(invalid(&format!(
                    "{name} must be a positive distance, found {meters}"
                )));
            }
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(invalid("source tags must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::distance::{from_meters, to_meters};

    fn category(closest: f64, count: f64, sources: Vec<&str>) -> DestinationCategory {
        DestinationCategory {
            code: CategoryCode::from("convenience"),
            name: String::from("Convenience store"),
            domain: String::from("food"),
            cutoff_closest: from_meters(closest),
            cutoff_count: from_meters(count),
            sources: sources.into_iter().map(String::from).collect(),
        }
    }

    #[test]
    fn test_search_cutoff_is_larger_of_both() {
        let c = category(3200.0, 1600.0, vec![]);
        assert_eq!(to_meters(&c.search_cutoff()), 3200.0);
        let c = category(1000.0, 1600.0, vec![]);
        assert_eq!(to_meters(&c.search_cutoff()), 1600.0);
    }

    #[test]
    fn test_source_tags_default_to_code() {
        let c = category(1000.0, 1000.0, vec![]);
        assert_eq!(c.source_tags(), vec![String::from("convenience")]);
        let c = category(1000.0, 1000.0, vec!["petrolstation", "newsagent"]);
        assert_eq!(c.source_tags().len(), 2);
    }

    #[test]
    fn test_validate_rejects_bad_cutoff() {
        assert!(category(0.0, 1000.0, vec![]).validate().is_err());
        assert!(category(1000.0, f64::NAN, vec![]).validate().is_err());
        assert!(category(1000.0, 1000.0, vec![""]).validate().is_err());
        assert!(category(1000.0, 1000.0, vec!["osm"]).validate().is_ok());
    }
}
