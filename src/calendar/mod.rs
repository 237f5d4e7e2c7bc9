//! Calendar core: month grids and rating statistics. Neither part keeps
//! state between calls; "today" and the repository are passed in.

pub mod grid;
pub mod stats;

pub use grid::{build as build_grid, DayCell, MonthGrid, YearMonth, YearWindow};
pub use stats::{LifetimeSummary, StatsAggregator, StatsSummary};
