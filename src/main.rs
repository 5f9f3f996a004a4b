//! taxi-report — renders one page of the taxi summary report.
//!
//! This binary is the presentation layer: the library builds the report
//! snapshot, and everything below `render_*` is display glue.

mod cli;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::FmtSubscriber;

use cli::{Args, OutputFormat};
use taxi_report::{
    build_page, outlier_sample, DataSourceConfig, NamedTable, PageReport, ReportContext,
    SqliteTableLoader,
};

fn main() -> Result<()> {
    let args = Args::parse_args();
    init_logging(&args);

    if let Err(e) = run_report(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(args: &Args) {
    let Some(level) = args.log_level() else {
        return;
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    // A host embedding the library may have its own subscriber; losing the
    // race is fine.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run_report(args: &Args) -> Result<()> {
    // Configuration is resolved before any table load; a missing descriptor
    // is fatal at startup.
    let config = match &args.database_url {
        Some(url) => DataSourceConfig::new(url.clone()),
        None => DataSourceConfig::from_env(),
    }
    .context("no usable connection descriptor")?;
    debug!(path = config.database_path(), "opening data source");

    let loader = SqliteTableLoader::open(&config).context("failed to open data source")?;
    let ctx = ReportContext::build_standard(&loader).context("report build failed")?;
    info!("summary views loaded");

    let payload = build_page(&ctx, args.page(), &args.report_options())
        .context("page assembly failed")?;

    let outliers = if args.include_outliers {
        outlier_sample(&loader).context("outlier lookup failed")?
    } else {
        None
    };

    match args.format {
        OutputFormat::Json => render_json(&payload, outliers.as_ref())?,
        OutputFormat::Text => {
            render_text(&payload);
            if let Some(sample) = &outliers {
                println!("\nOutliers (first {} rows)", sample.row_count());
                print_table(sample);
            }
        }
    }
    Ok(())
}

fn render_json(payload: &PageReport, outliers: Option<&NamedTable>) -> Result<()> {
    let mut doc = serde_json::to_value(payload)?;
    if let (Some(sample), Some(obj)) = (outliers, doc.as_object_mut()) {
        obj.insert("outliers".to_string(), serde_json::to_value(sample)?);
    }
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn render_text(payload: &PageReport) {
    match payload {
        PageReport::Overview(r) => {
            println!("NYC Taxi Analytics — Overview");
            println!("  Total revenue   ${:>12.2}", r.total_revenue);
            println!("  Total trips     {:>13}", r.total_trips);
            println!("  Avg fare        ${:>12.2}", r.avg_fare);
            println!("  Avg distance    {:>10.2} mi", r.avg_distance);
            println!("  Avg tip         {:>11.2} %", r.avg_tip_pct);
            if let Some(p) = &r.top_payment {
                println!("  Top payment     {} ({:.1}%)", p.payment_type, p.share_pct);
            }
            if let Some(h) = &r.highlights {
                println!("\nHighlights");
                println!(
                    "  Peak revenue day  {} (${:.2})",
                    h.peak_revenue_date, h.peak_revenue
                );
                println!(
                    "  Peak trips day    {} ({} trips)",
                    h.peak_trips_date, h.peak_trips
                );
                if let Some(hour) = h.peak_hour {
                    println!("  Peak hour         {:02}:00", hour);
                }
                if let Some(zone) = &h.top_pickup_zone {
                    println!("  Top pickup zone   {}", zone);
                }
                if let Some(zone) = &h.top_dropoff_zone {
                    println!("  Top dropoff zone  {}", zone);
                }
            }
        }
        PageReport::DailyTrends(r) => {
            println!("Daily Trends");
            print_table(&r.days);
        }
        PageReport::PerformanceInsights(r) => {
            println!("Top {} Days by Revenue", r.top_days_by_revenue.row_count());
            print_table(&r.top_days_by_revenue);
            println!("\nTop {} Days by Trips", r.top_days_by_trips.row_count());
            print_table(&r.top_days_by_trips);
            println!("\nPeak Hours");
            print_table(&r.peak_hours);
            println!("\nTop Pickup Zones");
            print_table(&r.top_pickup_zones);
            println!("\nTop Dropoff Zones");
            print_table(&r.top_dropoff_zones);
            println!("\nRevenue per Trip");
            print_table(&r.revenue_per_trip);
        }
        PageReport::CustomerBehavior(r) => {
            println!("Revenue Share by Payment Type");
            print_table(&r.payment_share);
            println!("\nTrips by Passenger Count");
            print_table(&r.trips_by_passenger_count);
            println!("\nTrip Length Distribution");
            print_table(&r.trip_length_distribution);
        }
        PageReport::Geography(r) => {
            println!("Top Pickup Zones");
            print_table(&r.top_pickup_zones);
            println!("\nTop Dropoff Zones");
            print_table(&r.top_dropoff_zones);
        }
    }
}

fn print_table(table: &NamedTable) {
    let headers: Vec<&str> = table.column_names().collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(table.row_count());

    for i in 0..table.row_count() {
        let row: Vec<String> = table
            .columns()
            .iter()
            .map(|c| c.values[i].label())
            .collect();
        for (w, cell) in widths.iter_mut().zip(&row) {
            *w = (*w).max(cell.len());
        }
        rows.push(row);
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = w))
            .collect();
        println!("  {}", padded.join("  "));
    };

    line(&headers.iter().map(|h| h.to_string()).collect::<Vec<_>>());
    for row in rows {
        line(&row);
    }
}
