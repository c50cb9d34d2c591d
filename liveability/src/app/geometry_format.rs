use csv::StringRecord;
use geo::{Centroid, Geometry, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wkt::TryFromWkt;

/// where a CSV keeps the location of each row.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GeometryFormat {
    WktColumn { column_name: String },
    XYColumns { x_column: String, y_column: String },
}

impl GeometryFormat {
    pub fn new_wkt_format(column_name: String) -> GeometryFormat {
        GeometryFormat::WktColumn { column_name }
    }

    pub fn new_xy_format(x_column: String, y_column: String) -> GeometryFormat {
        GeometryFormat::XYColumns { x_column, y_column }
    }

    /// validates the provided column parameters and creates the matching
    /// [`GeometryFormat`]. with no parameters, uses a `geometry` column when
    /// the header has one and `x`/`y` columns otherwise.
    pub fn new(
        geometry_column: Option<&String>,
        x_column: Option<&String>,
        y_column: Option<&String>,
        headers: &HashMap<String, usize>,
    ) -> Result<GeometryFormat, String> {
        match (geometry_column, x_column, y_column) {
            (Some(col), None, None) => Ok(Self::new_wkt_format(col.clone())),
            (None, Some(x), Some(y)) => Ok(Self::new_xy_format(x.clone(), y.clone())),
            (None, None, None) if headers.contains_key("geometry") => {
                Ok(Self::new_wkt_format(String::from("geometry")))
            }
            (None, None, None) if headers.contains_key("x") && headers.contains_key("y") => {
                Ok(Self::new_xy_format(String::from("x"), String::from("y")))
            }
            (None, None, None) => Err(String::from(
                "file has neither a geometry column nor x and y columns",
            )),
            _ => Err(String::from(
                "specify only a geometry_column or provide x and y columns, not both",
            )),
        }
    }

    /// the columns this format reads, which are not kept as attributes.
    pub fn columns(&self) -> Vec<&str> {
        match self {
            GeometryFormat::WktColumn { column_name } => vec![column_name.as_str()],
            GeometryFormat::XYColumns { x_column, y_column } => {
                vec![x_column.as_str(), y_column.as_str()]
            }
        }
    }

    /// reads the row location as a point. polygon and line geometries are
    /// reduced to their centroid.
    pub fn get_point(
        &self,
        row: &StringRecord,
        column_index_lookup: &HashMap<String, usize>,
    ) -> Result<Point<f64>, String> {
        match self {
            GeometryFormat::WktColumn { column_name } => {
                let value = get_column(row, column_index_lookup, column_name)?;
                let g: Geometry<f64> = Geometry::try_from_wkt_str(value).map_err(|e| {
                    format!("failure reading geometry at column '{column_name}': {e}")
                })?;
                match g {
                    Geometry::Point(point) => Ok(point),
                    other => other
                        .centroid()
                        .ok_or_else(|| format!("empty geometry in column '{column_name}'")),
                }
            }
            GeometryFormat::XYColumns { x_column, y_column } => {
                let x = get_column(row, column_index_lookup, x_column)?
                    .parse::<f64>()
                    .map_err(|e| format!("failure reading number in column '{x_column}': {e}"))?;
                let y = get_column(row, column_index_lookup, y_column)?
                    .parse::<f64>()
                    .map_err(|e| format!("failure reading number in column '{y_column}': {e}"))?;
                Ok(Point::new(x, y))
            }
        }
    }
}

impl std::fmt::Display for GeometryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryFormat::WktColumn { column_name } => write!(f, "{column_name}"),
            GeometryFormat::XYColumns { x_column, y_column } => write!(f, "{x_column},{y_column}"),
        }
    }
}

pub(crate) fn get_column<'a>(
    row: &'a StringRecord,
    column_index_lookup: &HashMap<String, usize>,
    column_name: &str,
) -> Result<&'a str, String> {
    let idx = column_index_lookup
        .get(column_name)
        .ok_or_else(|| format!("file does not contain column '{column_name}'"))?;
    row.get(*idx)
        .map(|s| s.trim())
        .ok_or_else(|| format!("row is missing column '{column_name}' at index {idx}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cols: &[&str]) -> HashMap<String, usize> {
        cols.iter()
            .enumerate()
            .map(|(i, c)| (c.to_string(), i))
            .collect()
    }

    #[test]
    fn test_detects_format_from_headers() {
        let wkt = GeometryFormat::new(None, None, None, &headers(&["id", "geometry"]));
        assert_eq!(wkt, Ok(GeometryFormat::new_wkt_format(String::from("geometry"))));
        let xy = GeometryFormat::new(None, None, None, &headers(&["id", "x", "y"]));
        assert_eq!(
            xy,
            Ok(GeometryFormat::new_xy_format(String::from("x"), String::from("y")))
        );
        assert!(GeometryFormat::new(None, None, None, &headers(&["id"])).is_err());
    }

    #[test]
    fn test_polygon_reads_as_centroid() {
        let lookup = headers(&["id", "geometry"]);
        let format = GeometryFormat::new_wkt_format(String::from("geometry"));
        let row = StringRecord::from(vec!["p1", "POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))"]);
        let point = format.get_point(&row, &lookup).expect("centroid");
        assert_eq!(point, Point::new(1.0, 1.0));
    }
}
