// Console shell over the dashboard core.
//
// Mirrors the page menu of the web dashboard:
// - Option [1] (re)loads the CSV export and prints load diagnostics.
// - Options [2]..[7] render one page each as Markdown tables and export
//   the full tables as CSV next to the chosen output directory.
use chrono::{Datelike, Local};
use clap::Parser;
use log::warn;
use once_cell::sync::Lazy;
use review_dashboard::loader::LoadWarning;
use review_dashboard::options::{
    available_months, available_review_months, available_review_years, available_years,
    default_selection, distinct_values,
};
use review_dashboard::output::{preview_table, write_csv, write_json};
use review_dashboard::types::{Dimension, WeekRange};
use review_dashboard::{
    apply_filters, filter::drop_canceled, reports, turnaround, util, weeks, Choice, ColumnConfig,
    FilterConfig, PeriodSource, Selection, Session, TimestampColumn,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;

// Only the session outlives a single page render, so re-rendering a page
// does not re-read the file unless it changed.
static APP_STATE: Lazy<Mutex<Session>> = Lazy::new(|| Mutex::new(Session::default()));

#[derive(Parser)]
#[command(name = "review-dashboard")]
#[command(about = "Review-workflow dashboard over a survey CSV export", long_about = None)]
struct Cli {
    /// CSV export of the review spreadsheet
    csv: PathBuf,
    /// JSON file overriding the expected column headers
    #[arg(long)]
    columns: Option<PathBuf>,
    /// Directory for exported tables
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Pre-select the current year and month when the data has them
    #[arg(long)]
    current_period: bool,
    #[arg(long, value_parser = parse_choice::<i32>)]
    year: Vec<Choice<i32>>,
    #[arg(long, value_parser = parse_choice::<u32>)]
    month: Vec<Choice<u32>>,
    #[arg(long, value_parser = parse_choice::<u32>)]
    week: Vec<Choice<u32>>,
    #[arg(long, value_parser = parse_choice::<String>)]
    kind: Vec<Choice<String>>,
    #[arg(long, value_parser = parse_choice::<String>)]
    process_type: Vec<Choice<String>>,
    #[arg(long, value_parser = parse_choice::<String>)]
    tech_info: Vec<Choice<String>>,
    #[arg(long, value_parser = parse_choice::<String>)]
    analyst: Option<Choice<String>>,
    #[arg(long, value_parser = parse_choice::<String>)]
    reviewer: Option<Choice<String>>,
}

fn parse_choice<T: FromStr>(s: &str) -> Result<Choice<T>, String> {
    if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case("todos") {
        return Ok(Choice::All);
    }
    s.parse::<T>()
        .map(Choice::Value)
        .map_err(|_| format!("invalid filter value: {s}"))
}

/// Repeated flags form a multiselect; no flag at all means every value.
fn selection<T: Ord>(choices: Vec<Choice<T>>) -> Selection<T> {
    if choices.is_empty() {
        Selection::All
    } else {
        Selection::from_choices(choices)
    }
}

fn build_filters(cli: &Cli, period: PeriodSource) -> FilterConfig {
    FilterConfig {
        period,
        year: selection(cli.year.clone()),
        month: selection(cli.month.clone()),
        week: selection(cli.week.clone()),
        submission_kind: selection(cli.kind.clone()),
        process_type: selection(cli.process_type.clone()),
        technical_info: selection(cli.tech_info.clone()),
        analyst: selection(cli.analyst.clone().into_iter().collect()),
        reviewer: selection(cli.reviewer.clone().into_iter().collect()),
    }
}

/// Read one menu choice from stdin.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        // end of input behaves like choosing "Exit"
        Ok(0) | Err(_) => "0".to_string(),
        Ok(_) => buf.trim().to_string(),
    }
}

/// Write one table as CSV into the output directory; failures are reported, not fatal.
fn export<T: Serialize>(out_dir: &Path, name: &str, rows: &[T]) {
    let path = out_dir.join(name);
    if let Err(e) = write_csv(&path, rows) {
        eprintln!("Write error: {}", e);
    }
}

/// Handle option [1]: (re)load the CSV into the session and print load diagnostics.
fn handle_load(cli: &Cli, cfg: &ColumnConfig) {
    let mut session = APP_STATE.lock().unwrap_or_else(|p| p.into_inner());
    match session.load(&cli.csv, cfg) {
        Ok(dataset) => {
            let report = &dataset.report;
            println!(
                "Processing dataset... ({} rows read, {} records loaded)",
                util::format_int(report.total_rows),
                util::format_int(dataset.records.len())
            );
            for w in &report.warnings {
                match w {
                    LoadWarning::Latin1Fallback => println!("Note: file decoded as Latin-1."),
                    LoadWarning::MissingColumn(c) => println!("Warning: column '{}' not found.", c),
                    LoadWarning::UnparsedTimestamps { column, count } => println!(
                        "Note: {} values in '{}' treated as missing.",
                        util::format_int(*count),
                        column
                    ),
                    LoadWarning::SkippedRows(n) => {
                        println!("Note: {} rows skipped due to parse errors.", util::format_int(*n))
                    }
                }
            }
            if report.missing_submission_timestamps(cfg) {
                println!("Time filters are unavailable for this file.");
            }
            println!();
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn print_week_options(label: &str, ranges: &[WeekRange]) {
    preview_table(label, Some("most recent first"), ranges, 8);
}

/// Handle options [2]..[7]: filter the cached dataset for the page, print
/// previews and export its tables.
fn handle_page(page: &str, cli: &Cli) {
    let session = APP_STATE.lock().unwrap_or_else(|p| p.into_inner());
    let Some(dataset) = session.dataset() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let today = Local::now().date_naive();
    let period = match page {
        "4" => PeriodSource::ReviewLog,
        "6" => PeriodSource::Bucket(TimestampColumn::Review),
        _ => PeriodSource::Bucket(TimestampColumn::Submission),
    };
    let mut filters = build_filters(cli, period);
    if cli.current_period && filters.year.is_all() && filters.month.is_all() {
        let base = drop_canceled(&dataset.records);
        let (years, months) = match period {
            PeriodSource::Bucket(column) => {
                (available_years(&base, column), available_months(&base, column))
            }
            PeriodSource::ReviewLog => (available_review_years(&base), available_review_months(&base)),
        };
        filters.year = default_selection(&years, today.year());
        filters.month = default_selection(&months, today.month());
    }
    let data = apply_filters(&dataset.records, &filters);
    if data.is_empty() {
        warn!("no records match the selected filters");
        println!("No records match the selected filters.\n");
        return;
    }
    let out = cli.out_dir.as_path();

    match page {
        "2" => {
            println!("Global overview ({} items sent)", util::format_int(data.len()));
            let kinds = reports::count_by(&data, Dimension::SimplifiedKind);
            let types = reports::count_by(&data, Dimension::ProcessType);
            let info = reports::count_by(&data, Dimension::TechnicalInfo);
            let monthly = reports::monthly_series(&data, TimestampColumn::Submission);
            let new_work = reports::weekly_new_work(&data, TimestampColumn::Submission);
            preview_table("Items by submission kind", None, &kinds, 10);
            preview_table("Items by process type", None, &types, 15);
            preview_table("Items by technical information", None, &info, 10);
            preview_table("Monthly submissions with trend", None, &monthly, 12);
            preview_table("Weekly new work with trend", Some("first submissions and priorities"), &new_work, 12);
            print_week_options(
                "Available submission weeks",
                &weeks::format_week_ranges(&data, TimestampColumn::Submission),
            );
            export(out, "global_by_kind.csv", &kinds);
            export(out, "global_by_process_type.csv", &types);
            export(out, "global_monthly.csv", &monthly);
            export(out, "global_weekly_new_work.csv", &new_work);
        }
        "3" => {
            let by_analyst = reports::count_by(&data, Dimension::Analyst);
            let by_kind = reports::cross_counts(&data, Dimension::Analyst, Dimension::SimplifiedKind);
            let repeats = reports::repeat_submissions(&data);
            println!("Analysts: {}", distinct_values(&data, Dimension::Analyst).join(", "));
            preview_table("Items by analyst", None, &by_analyst, 15);
            preview_table("Analyst × submission kind", None, &by_kind, 15);
            preview_table("Processes submitted more than once", None, &repeats, 10);
            export(out, "analyst_counts.csv", &by_analyst);
            export(out, "analyst_by_kind.csv", &by_kind);
            export(out, "analyst_repeats.csv", &repeats);
        }
        "4" => {
            let reviewed: Vec<_> = data.iter().filter(|r| r.reviewed_at.is_some()).cloned().collect();
            let by_reviewer = reports::count_by(&reviewed, Dimension::Reviewer);
            let by_kind = reports::cross_counts(&reviewed, Dimension::Reviewer, Dimension::SimplifiedKind);
            let by_type = reports::cross_counts(&reviewed, Dimension::Reviewer, Dimension::ProcessType);
            let corrections = reports::pending_corrections(&reviewed, today);
            preview_table("Reviews by reviewer", None, &by_reviewer, 15);
            preview_table("Reviewer × submission kind", None, &by_kind, 15);
            preview_table("Reviewer × process type", None, &by_type, 15);
            preview_table("Sent back for correction", Some("oldest first"), &corrections, 15);
            let years: Vec<String> = available_review_years(&reviewed).iter().map(|y| y.to_string()).collect();
            let months: Vec<String> = available_review_months(&reviewed).iter().map(|m| m.to_string()).collect();
            println!("Review years recorded: {}", years.join(", "));
            println!("Review months recorded: {}", months.join(", "));
            print_week_options("Available review weeks", &weeks::format_review_week_ranges(&reviewed));
            export(out, "reviewer_counts.csv", &by_reviewer);
            export(out, "reviewer_by_kind.csv", &by_kind);
            export(out, "reviewer_by_process_type.csv", &by_type);
            export(out, "reviewer_corrections.csv", &corrections);
        }
        "5" => {
            let weekly = reports::weekly_series(&data, TimestampColumn::Submission);
            let new_work = reports::weekly_new_work(&data, TimestampColumn::Submission);
            let types = reports::cross_counts(&data, Dimension::ProcessType, Dimension::SimplifiedKind);
            preview_table("Weekly submissions with trend", None, &weekly, 20);
            preview_table("Weekly new work with trend", Some("first submissions and priorities"), &new_work, 20);
            preview_table("Process type × submission kind", None, &types, 20);
            export(out, "submissions_weekly.csv", &weekly);
            export(out, "submissions_weekly_new_work.csv", &new_work);
            export(out, "submissions_by_process_type.csv", &types);
        }
        "6" => {
            let weekly = reports::weekly_series(&data, TimestampColumn::Review);
            let monthly = reports::monthly_series(&data, TimestampColumn::Review);
            preview_table("Weekly reviews with trend", None, &weekly, 20);
            preview_table("Monthly reviews with trend", None, &monthly, 12);
            export(out, "reviews_weekly.csv", &weekly);
            export(out, "reviews_monthly.csv", &monthly);
        }
        "7" => {
            let items = turnaround::compute_turnaround(&data);
            if items.is_empty() {
                println!("Not enough data to compute review turnaround.\n");
                return;
            }
            let summary = turnaround::summarize(&items);
            let tables = [
                ("Mean turnaround by week", "turnaround_weekly.csv", turnaround::mean_by_week(&items)),
                ("Mean turnaround by month", "turnaround_monthly.csv", turnaround::mean_by_month(&items)),
                ("Mean turnaround by process type", "turnaround_by_process_type.csv", turnaround::mean_by_dimension(&items, Dimension::ProcessType)),
                ("Mean turnaround by enterprise type", "turnaround_by_enterprise.csv", turnaround::mean_by_dimension(&items, Dimension::EnterpriseType)),
                ("Mean turnaround by submission kind", "turnaround_by_kind.csv", turnaround::mean_by_dimension(&items, Dimension::SimplifiedKind)),
                ("Mean turnaround by technical information", "turnaround_by_tech_info.csv", turnaround::mean_by_dimension(&items, Dimension::TechnicalInfo)),
            ];
            for (title, file, rows) in &tables {
                preview_table(title, None, rows, 12);
                export(out, file, rows);
            }
            if let Err(e) = write_json(&out.join("turnaround_summary.json"), &summary) {
                eprintln!("Write error: {}", e);
            }
            println!(
                "Turnaround: {} reviews, mean {} days, median {} days, range {}..{} days\n",
                util::format_int(summary.reviews),
                util::format_number(summary.mean_days, 2),
                util::format_number(summary.median_days, 2),
                summary.min_days,
                summary.max_days
            );
        }
        _ => {}
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let cfg = match &cli.columns {
        Some(path) => match ColumnConfig::from_json_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to read column configuration: {}", e);
                std::process::exit(2);
            }
        },
        None => ColumnConfig::default(),
    };

    loop {
        println!("Select page:");
        println!("[1] Load the file");
        println!("[2] Global overview");
        println!("[3] Analyst view");
        println!("[4] Reviewer view");
        println!("[5] Submission summary");
        println!("[6] Review summary");
        println!("[7] Turnaround statistics");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&cli, &cfg),
            page @ ("2" | "3" | "4" | "5" | "6" | "7") => {
                println!();
                handle_page(page, &cli);
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter a number from 0 to 7.\n"),
        }
    }
}
