use crate::models::FigureSpec;
use crate::table::WaterfallTable;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Read a JSON figure description.
pub fn load_figure_spec<P: AsRef<Path>>(path: P) -> Result<FigureSpec> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(spec)
}

/// Save the prepared table as CSV with header.
pub fn save_csv<P: AsRef<Path>>(
    table: &WaterfallTable,
    labels: Option<&[Vec<String>]>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, labels, f)
}

/// Write the table as CSV: `group, Level1..LevelN, Total, CumulativeTotal,
/// Bottom`, then one `label_LevelK` column per level when labels are given.
pub fn write_csv<W: Write>(
    table: &WaterfallTable,
    labels: Option<&[Vec<String>]>,
    out: W,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(out);

    let level_names = table.level_names();
    let mut header: Vec<String> = vec!["group".to_string()];
    header.extend(level_names.iter().cloned());
    header.extend(["Total", "CumulativeTotal", "Bottom"].map(String::from));
    if labels.is_some() {
        header.extend(level_names.iter().map(|n| format!("label_{n}")));
    }
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut rec: Vec<String> = vec![row.group.to_string()];
        rec.extend(row.levels.iter().map(|v| v.to_string()));
        rec.extend([row.total, row.cumulative_total, row.bottom].map(|v| v.to_string()));
        if let Some(labels) = labels {
            let cells = labels.get(row.group).map(Vec::as_slice).unwrap_or(&[]);
            for level in 0..table.n_levels() {
                let cell = cells.get(level).map(String::as_str).unwrap_or("");
                rec.push(sanitize_cell(cell).into_owned());
            }
        }
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the table as a pretty JSON array of row objects.
pub fn save_json<P: AsRef<Path>>(table: &WaterfallTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let s = serde_json::to_string_pretty(&table.rows())?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Prefix text cells that a spreadsheet would evaluate as a formula.
/// Plain negative numbers are left alone.
pub fn sanitize_cell(cell: &str) -> Cow<'_, str> {
    let risky = match cell.chars().next() {
        Some('=' | '+' | '@' | '\t' | '\r') => true,
        Some('-') => cell.trim().parse::<f64>().is_err(),
        _ => false,
    };
    if risky {
        Cow::Owned(format!("'{cell}"))
    } else {
        Cow::Borrowed(cell)
    }
}
