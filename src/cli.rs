use clap::{Parser, ValueEnum};
use tracing::Level;

use taxi_report::{Page, ReportOptions, ZoneRanking};

/// Renders one page of the taxi summary report to stdout.
#[derive(Debug, Parser)]
#[command(name = "taxi-report", version, about)]
pub struct Args {
    /// Connection descriptor for the summary-view database.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Page to render.
    #[arg(long, value_enum, default_value_t = PageArg::Overview)]
    pub page: PageArg,

    /// Row cap for the zone leaderboards on the performance page.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..))]
    pub zone_top_n: u16,

    /// Ranking key for pickup/dropoff zone leaderboards.
    #[arg(long, value_enum, default_value_t = ZoneRankingArg::Trips)]
    pub rank_zones_by: ZoneRankingArg,

    /// Also print a sample of the optional outliers view (capped at 50 rows).
    #[arg(long)]
    pub include_outliers: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Verbose logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all logging.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PageArg {
    Overview,
    DailyTrends,
    PerformanceInsights,
    CustomerBehavior,
    Geography,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ZoneRankingArg {
    Trips,
    Revenue,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn page(&self) -> Page {
        match self.page {
            PageArg::Overview => Page::Overview,
            PageArg::DailyTrends => Page::DailyTrends,
            PageArg::PerformanceInsights => Page::PerformanceInsights,
            PageArg::CustomerBehavior => Page::CustomerBehavior,
            PageArg::Geography => Page::Geography,
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            zone_top_n: self.zone_top_n as usize,
            zone_ranking: match self.rank_zones_by {
                ZoneRankingArg::Trips => ZoneRanking::ByTrips,
                ZoneRankingArg::Revenue => ZoneRanking::ByRevenue,
            },
        }
    }

    pub fn log_level(&self) -> Option<Level> {
        if self.quiet {
            return None;
        }
        Some(match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["taxi-report", "--database-url", "taxi.db"]).unwrap();
        assert!(matches!(args.page(), Page::Overview));
        let options = args.report_options();
        assert_eq!(options.zone_top_n, 10);
        assert!(matches!(options.zone_ranking, ZoneRanking::ByTrips));
        assert_eq!(args.log_level(), Some(Level::INFO));
    }

    #[test]
    fn test_quiet_disables_logging() {
        let args = Args::try_parse_from(["taxi-report", "--quiet"]).unwrap();
        assert_eq!(args.log_level(), None);
    }

    #[test]
    fn test_zone_args() {
        let args = Args::try_parse_from([
            "taxi-report",
            "--page",
            "geography",
            "--rank-zones-by",
            "revenue",
            "--zone-top-n",
            "5",
        ])
        .unwrap();
        assert!(matches!(args.page(), Page::Geography));
        let options = args.report_options();
        assert_eq!(options.zone_top_n, 5);
        assert!(matches!(options.zone_ranking, ZoneRanking::ByRevenue));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        assert!(Args::try_parse_from(["taxi-report", "--zone-top-n", "0"]).is_err());
    }
}
