pub mod aggregate;
pub mod report;

pub use report::{build_page, outlier_sample, Page, PageReport, ReportOptions, ZoneRanking};
