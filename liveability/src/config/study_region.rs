use super::ConfigError;
use geo::{Contains, Geometry, Point};
use wkt::TryFromWkt;

/// the boundary of the area under study. origins outside it are not
/// imported.
#[derive(Debug, Clone)]
pub struct StudyRegion {
    geometry: Geometry<f64>,
}

impl StudyRegion {
    pub fn new(geometry: Geometry<f64>) -> StudyRegion {
        StudyRegion { geometry }
    }

    /// reads a file holding a single WKT polygon or multipolygon.
    pub fn from_file(filepath: &str) -> Result<StudyRegion, ConfigError> {
        let text = std::fs::read_to_string(filepath).map_err(|source| ConfigError::IoError {
            filepath: filepath.to_string(),
            source,
        })?;
        let geometry = Geometry::try_from_wkt_str(text.trim())
            .map_err(|e| ConfigError::InvalidStudyRegion(filepath.to_string(), e.to_string()))?;
        match geometry {
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Ok(StudyRegion::new(geometry)),
            _ => Err(ConfigError::InvalidStudyRegion(
                filepath.to_string(),
                String::from("expected a POLYGON or MULTIPOLYGON"),
            )),
        }
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.geometry.contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_filters_points_by_boundary() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "POLYGON((0 0, 10 0, 10 10, 0 10, 0 0))").expect("write");
        let region =
            StudyRegion::from_file(&file.path().to_string_lossy()).expect("valid region");
        assert!(region.contains(&Point::new(5.0, 5.0)));
        assert!(!region.contains(&Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_rejects_point_region() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "POINT(1 1)").expect("write");
        assert!(StudyRegion::from_file(&file.path().to_string_lossy()).is_err());
    }
}
