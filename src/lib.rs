//! stacked_waterfalls
//!
//! A small Rust library for rendering stacked waterfall charts with Plotters.
//! Pairs with the `waterfall` CLI.
//!
//! ### Features
//! - Stacked bar groups on a running total, joined by dashed step connectors
//! - Optional leading total bar, shaded span, tick names and bracket group labels
//! - Deterministic golden-ratio palette for segments without a color
//! - Legend built from the non-zero segments
//! - SVG/PNG output; several waterfalls can share one figure
//!
//! ### Example
//! ```no_run
//! use stacked_waterfalls::{RenderOptions, WaterfallChart};
//!
//! let chart = WaterfallChart::new(vec![vec![1.0, 2.0], vec![3.0], vec![0.0, 4.0]]);
//! let opts = RenderOptions {
//!     total: true,
//!     bar_names: vec!["Fuel".into(), "Crew".into(), "Fees".into()],
//!     group_label: Some("Operating cost".into()),
//!     ..RenderOptions::default()
//! };
//! let last_x = chart.plot(&opts, "costs.svg", 800, 500)?;
//! stacked_waterfalls::storage::save_csv(&chart.table()?, None, "costs.csv")?;
//! println!("next chart may start after x = {last_x}");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod chart;
pub mod error;
pub mod models;
pub mod palette;
pub mod storage;
pub mod style;
pub mod table;
pub mod viz;

pub use chart::WaterfallChart;
pub use error::WaterfallError;
pub use models::{ChartSpec, FigureSpec};
pub use style::Rgba;
pub use table::WaterfallTable;
pub use viz::{BracketStyle, Figure, RenderOptions, WaterfallLayout};
