use liveability_core::model::{distance, CategoryCode, DestinationCategory};
use serde::{Deserialize, Serialize};

/// a destination category as written in the categories CSV or inline in the
/// configuration file. `sources` is a `;`-separated list of raw destination
/// source tags, empty when the category reads only its own code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: String,
    pub cutoff_closest_m: f64,
    pub cutoff_count_m: f64,
    #[serde(default)]
    pub sources: String,
}

impl CategoryRow {
    pub fn source_tags(&self) -> Vec<String> {
        self.sources
            .split(';')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

impl From<&CategoryRow> for DestinationCategory {
    fn from(row: &CategoryRow) -> Self {
        let code = row.code.trim();
        let name = if row.name.trim().is_empty() {
            code.to_string()
        } else {
            row.name.clone()
        };
        DestinationCategory {
            code: CategoryCode::from(code),
            name,
            domain: row.domain.clone(),
            cutoff_closest: distance::from_meters(row.cutoff_closest_m),
            cutoff_count: distance::from_meters(row.cutoff_count_m),
            sources: row.source_tags(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_split_on_semicolon() {
        let row = CategoryRow {
            code: String::from("convenience"),
            name: String::new(),
            domain: String::from("food"),
            cutoff_closest_m: 1000.0,
            cutoff_count_m: 1600.0,
            sources: String::from("convenience_osm; petrolstation ;"),
        };
        let category = DestinationCategory::from(&row);
        assert_eq!(
            category.sources,
            vec![String::from("convenience_osm"), String::from("petrolstation")]
        );
        assert_eq!(category.name, "convenience");
    }
}
