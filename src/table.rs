//! Raw nested data → rectangular waterfall table, plus the parallel label and
//! color tables.

use log::{debug, warn};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::WaterfallError;
use crate::style::Rgba;
use crate::viz::util::format_value;

/// Padded numeric table with the derived running-sum columns.
///
/// Row `g` is bar group `g`; column `l` is stack level `l` (`Level{l+1}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallTable {
    rows: Vec<Vec<f64>>,
    total: Vec<f64>,
    cumulative: Vec<f64>,
    bottom: Vec<f64>,
}

/// One table row. Serializes with the same keys as the CSV columns:
/// `group`, `Level1..LevelN`, `Total`, `CumulativeTotal`, `Bottom`.
#[derive(Debug, Clone)]
pub struct TableRow<'a> {
    pub group: usize,
    pub levels: &'a [f64],
    pub total: f64,
    pub cumulative_total: f64,
    pub bottom: f64,
}

impl Serialize for TableRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.levels.len() + 4))?;
        map.serialize_entry("group", &self.group)?;
        for (i, v) in self.levels.iter().enumerate() {
            map.serialize_entry(&format!("Level{}", i + 1), v)?;
        }
        map.serialize_entry("Total", &self.total)?;
        map.serialize_entry("CumulativeTotal", &self.cumulative_total)?;
        map.serialize_entry("Bottom", &self.bottom)?;
        map.end()
    }
}

impl WaterfallTable {
    /// Pad ragged groups with zeros and compute `Total`, `CumulativeTotal`
    /// and `Bottom`. Non-finite values count as zero.
    pub fn prepare(raw: &[Vec<f64>]) -> Result<Self, WaterfallError> {
        if raw.is_empty() {
            return Err(WaterfallError::EmptyData);
        }
        if let Some(index) = raw.iter().position(|g| g.is_empty()) {
            return Err(WaterfallError::EmptyGroup { index });
        }
        let n_levels = raw.iter().map(Vec::len).max().unwrap_or(0);

        let rows: Vec<Vec<f64>> = raw
            .iter()
            .map(|group| {
                let mut row: Vec<f64> = group
                    .iter()
                    .map(|v| if v.is_finite() { *v } else { 0.0 })
                    .collect();
                row.resize(n_levels, 0.0);
                row
            })
            .collect();

        if rows.iter().flatten().any(|v| *v < 0.0) {
            warn!("negative segment values present; the running total will step down");
        }

        let total: Vec<f64> = rows.iter().map(|r| r.iter().sum()).collect();
        let mut cumulative = Vec::with_capacity(total.len());
        let mut bottom = Vec::with_capacity(total.len());
        let mut running = 0.0;
        for t in &total {
            bottom.push(running);
            running += t;
            cumulative.push(running);
        }

        debug!(
            "prepared waterfall table: {} groups x {} levels, grand total {}",
            rows.len(),
            n_levels,
            running
        );
        Ok(Self {
            rows,
            total,
            cumulative,
            bottom,
        })
    }

    pub fn n_groups(&self) -> usize {
        self.rows.len()
    }

    pub fn n_levels(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn value(&self, group: usize, level: usize) -> f64 {
        self.rows[group][level]
    }

    pub fn row(&self, group: usize) -> &[f64] {
        &self.rows[group]
    }

    /// Column `level` across all groups.
    pub fn level(&self, level: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[level]).collect()
    }

    pub fn totals(&self) -> &[f64] {
        &self.total
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn bottoms(&self) -> &[f64] {
        &self.bottom
    }

    /// Sum of every segment in the table (height of the total bar).
    pub fn grand_total(&self) -> f64 {
        self.total.iter().sum()
    }

    pub fn nonzero_count(&self) -> usize {
        self.rows.iter().flatten().filter(|v| **v != 0.0).count()
    }

    /// `Level1`, `Level2`, …
    pub fn level_names(&self) -> Vec<String> {
        (1..=self.n_levels()).map(|i| format!("Level{i}")).collect()
    }

    /// Where segment `(group, level)` starts: the group's bottom plus every
    /// lower level of that group.
    pub fn segment_base(&self, group: usize, level: usize) -> f64 {
        self.bottom[group] + self.rows[group][..level].iter().sum::<f64>()
    }

    pub fn rows(&self) -> Vec<TableRow<'_>> {
        (0..self.n_groups())
            .map(|g| TableRow {
                group: g,
                levels: &self.rows[g],
                total: self.total[g],
                cumulative_total: self.cumulative[g],
                bottom: self.bottom[g],
            })
            .collect()
    }
}

/// Display labels per segment. Supplied labels are padded with empty strings;
/// without labels every segment shows its own value.
pub fn arrange_labels(
    table: &WaterfallTable,
    labels: Option<&[Vec<String>]>,
    locale_tag: &str,
) -> Result<Vec<Vec<String>>, WaterfallError> {
    match labels {
        Some(given) => {
            check_shape("labels", table, given.len(), given.iter().map(Vec::len))?;
            Ok((0..table.n_groups())
                .map(|g| {
                    let mut row = given.get(g).cloned().unwrap_or_default();
                    row.resize(table.n_levels(), String::new());
                    row
                })
                .collect())
        }
        None => Ok((0..table.n_groups())
            .map(|g| {
                table
                    .row(g)
                    .iter()
                    .map(|v| format_value(*v, locale_tag))
                    .collect()
            })
            .collect()),
    }
}

/// Color overrides per segment; `None` means "use the palette".
pub fn arrange_colors(
    table: &WaterfallTable,
    colors: Option<&[Vec<Option<Rgba>>]>,
) -> Result<Vec<Vec<Option<Rgba>>>, WaterfallError> {
    let given = colors.unwrap_or(&[]);
    check_shape("colors", table, given.len(), given.iter().map(Vec::len))?;
    Ok((0..table.n_groups())
        .map(|g| {
            let mut row = given.get(g).cloned().unwrap_or_default();
            row.resize(table.n_levels(), None);
            row
        })
        .collect())
}

fn check_shape(
    what: &'static str,
    table: &WaterfallTable,
    groups: usize,
    mut levels: impl Iterator<Item = usize>,
) -> Result<(), WaterfallError> {
    if groups > table.n_groups() {
        return Err(WaterfallError::ShapeMismatch {
            what,
            detail: format!("{groups} groups given, data has {}", table.n_groups()),
        });
    }
    if let Some(n) = levels.find(|n| *n > table.n_levels()) {
        return Err(WaterfallError::ShapeMismatch {
            what,
            detail: format!("{n} levels given, data has {}", table.n_levels()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WaterfallTable {
        WaterfallTable::prepare(&[vec![1.0, 2.0], vec![3.0], vec![0.0, 4.0]]).unwrap()
    }

    #[test]
    fn pads_and_accumulates() {
        let t = sample();
        assert_eq!(t.row(1), &[3.0, 0.0]);
        assert_eq!(t.totals(), &[3.0, 3.0, 4.0]);
        assert_eq!(t.cumulative(), &[3.0, 6.0, 10.0]);
        assert_eq!(t.bottoms(), &[0.0, 3.0, 6.0]);
        assert_eq!(t.level(1), vec![2.0, 0.0, 4.0]);
        assert_eq!(t.level_names(), vec!["Level1", "Level2"]);
    }

    #[test]
    fn rows_serialize_with_column_names() {
        let t = sample();
        let v = serde_json::to_value(t.rows()).unwrap();
        let row = &v[2];
        assert_eq!(row["group"], 2);
        assert_eq!(row["Level1"], 0.0);
        assert_eq!(row["Level2"], 4.0);
        assert_eq!(row["CumulativeTotal"], 10.0);
        assert!(row.get("levels").is_none());
        let keys: Vec<&str> = row.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn segment_base_stacks_within_group() {
        let t = sample();
        assert_eq!(t.segment_base(0, 0), 0.0);
        assert_eq!(t.segment_base(0, 1), 1.0);
        assert_eq!(t.segment_base(2, 1), 6.0);
    }

    #[test]
    fn non_finite_values_are_zero() {
        let t = WaterfallTable::prepare(&[vec![f64::NAN, 2.0], vec![f64::INFINITY]]).unwrap();
        assert_eq!(t.totals(), &[2.0, 0.0]);
        assert_eq!(t.nonzero_count(), 1);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert_eq!(WaterfallTable::prepare(&[]), Err(WaterfallError::EmptyData));
        assert_eq!(
            WaterfallTable::prepare(&[vec![1.0], vec![]]),
            Err(WaterfallError::EmptyGroup { index: 1 })
        );
    }

    #[test]
    fn negative_values_step_down() {
        let t = WaterfallTable::prepare(&[vec![5.0], vec![-2.0, 1.0]]).unwrap();
        assert_eq!(t.cumulative(), &[5.0, 4.0]);
        assert_eq!(t.bottoms(), &[0.0, 5.0]);
    }

    #[test]
    fn default_labels_show_values() {
        let t = WaterfallTable::prepare(&[vec![1.5, 2.0], vec![1234.0]]).unwrap();
        let labels = arrange_labels(&t, None, "en").unwrap();
        assert_eq!(labels[0], vec!["1.5", "2"]);
        assert_eq!(labels[1], vec!["1,234", "0"]);
    }

    #[test]
    fn supplied_labels_are_padded() {
        let t = sample();
        let given = vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]];
        let labels = arrange_labels(&t, Some(&given), "en").unwrap();
        assert_eq!(labels[1], vec!["c", ""]);
        assert_eq!(labels[2], vec!["", ""]);
    }

    #[test]
    fn oversized_tables_are_rejected() {
        let t = sample();
        let given = vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]];
        assert!(matches!(
            arrange_labels(&t, Some(&given), "en"),
            Err(WaterfallError::ShapeMismatch { what: "labels", .. })
        ));
        let colors = vec![vec![None]; 4];
        assert!(matches!(
            arrange_colors(&t, Some(&colors)),
            Err(WaterfallError::ShapeMismatch { what: "colors", .. })
        ));
    }

    #[test]
    fn colors_default_to_none() {
        let t = sample();
        let given = vec![vec![Some(Rgba::BLACK)]];
        let colors = arrange_colors(&t, Some(&given)).unwrap();
        assert_eq!(colors[0], vec![Some(Rgba::BLACK), None]);
        assert!(arrange_colors(&t, None).unwrap().iter().flatten().all(Option::is_none));
    }
}
