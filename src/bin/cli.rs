use chrono::{Duration, NaiveDate};
use polars::prelude::{AnyValue, DataFrame};
use staffing_tool::{
    AllocationLedger, Dataset, ForecastFilter, StaffingEngine, financials_dataframe,
    forecast_dataframe, load_dataset_from_json, load_ledger_from_csv, save_dataset_to_json,
    save_ledger_to_csv, utilization_dataframe,
};
use std::io::{self, Write};

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_filter_args<'a, I: Iterator<Item = &'a str>>(parts: I) -> Result<ForecastFilter, String> {
    let mut filter = ForecastFilter::default();
    for part in parts {
        let Some((key, value)) = part.split_once('=') else {
            return Err(format!("expected key=value filter, got '{part}'"));
        };
        match key {
            "horizontal" => filter.horizontal = Some(value.to_string()),
            "client" => {
                filter.client_id = Some(value.parse().map_err(|_| "invalid client id")?);
            }
            "project" => {
                filter.project_id = Some(value.parse().map_err(|_| "invalid project id")?);
            }
            "wbs" => filter.wbs = Some(value.to_string()),
            other => return Err(format!("unknown filter '{other}'")),
        }
    }
    Ok(filter)
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let cell = |av: &AnyValue| -> String {
        match av {
            AnyValue::Null => String::new(),
            AnyValue::Int32(v) => v.to_string(),
            AnyValue::Int64(v) => v.to_string(),
            AnyValue::Float64(v) => format!("{v:.2}"),
            AnyValue::String(s) => s.to_string(),
            AnyValue::Date(days) => (epoch + Duration::days(*days as i64)).to_string(),
            other => other.to_string(),
        }
    };

    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                let s = cell(av);
                if s.len() > widths[ci] {
                    widths[ci] = s.len();
                }
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let s = col.get(row_idx).map(|av| cell(&av)).unwrap_or_default();
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                     Show this help\n  set <assignment_id> <date> <pct>         Write one allocation day (0 deletes)\n  range <assignment_id> <start> <end> <pct>\n                                           Write an inclusive date range\n  clear <assignment_id>                    Remove all entries for an assignment\n  daily <resource_id> <date>               Daily allocation total for a resource\n  avg <resource_id> <start> <end>          Average allocation over a window\n  util <start> <end>                       Utilization table for all resources\n  persondays <project_id> <start> <end>    Person-days booked on a project\n  cost <project_id> <start> <end>          Realized cost for a project window\n  revenue <project_id> <start> <end>       Revenue for a project window\n  forecast <start_month> <months> [k=v...] Capacity forecast (filters:\n                                           horizontal= client= project= wbs=)\n  financials <year> [k=v...]               Monthly revenue/cost/margin table\n  load <path>                              Load dataset snapshot from JSON\n  save <path>                              Save dataset snapshot to JSON\n  import <path>                            Import ledger from CSV\n  export <path>                            Export ledger to CSV\n  quit|exit                                Exit\n\nAll dates are YYYY-MM-DD."
    );
}

fn main() {
    let mut dataset = Dataset::default();
    let mut ledger = AllocationLedger::new();

    println!("Staffing Tool (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "set" => {
                let (id_s, date_s, pct_s) = (parts.next(), parts.next(), parts.next());
                match (id_s, date_s, pct_s) {
                    (Some(id_s), Some(date_s), Some(pct_s)) => {
                        let (Ok(id), Some(date), Ok(pct)) =
                            (id_s.parse::<i32>(), parse_date(date_s), pct_s.parse::<f64>())
                        else {
                            println!("Usage: set <assignment_id> <YYYY-MM-DD> <pct>");
                            continue;
                        };
                        match ledger.set_day(id, date, pct) {
                            Ok(()) => println!("Allocation written."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: set <assignment_id> <YYYY-MM-DD> <pct>"),
                }
            }
            "range" => {
                let (id_s, start_s, end_s, pct_s) =
                    (parts.next(), parts.next(), parts.next(), parts.next());
                match (id_s, start_s, end_s, pct_s) {
                    (Some(id_s), Some(start_s), Some(end_s), Some(pct_s)) => {
                        let (Ok(id), Some(start), Some(end), Ok(pct)) = (
                            id_s.parse::<i32>(),
                            parse_date(start_s),
                            parse_date(end_s),
                            pct_s.parse::<f64>(),
                        ) else {
                            println!("Usage: range <assignment_id> <start> <end> <pct>");
                            continue;
                        };
                        match ledger.set_range(id, start, end, pct) {
                            Ok(()) => println!("Range written."),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    _ => println!("Usage: range <assignment_id> <start> <end> <pct>"),
                }
            }
            "clear" => match parts.next().and_then(|s| s.parse::<i32>().ok()) {
                Some(id) => {
                    let removed = ledger.remove_assignment(id);
                    println!("Removed {removed} entries for assignment {id}.");
                }
                None => println!("Usage: clear <assignment_id>"),
            },
            "daily" => {
                let (id_s, date_s) = (parts.next(), parts.next());
                match (
                    id_s.and_then(|s| s.parse::<i32>().ok()),
                    date_s.and_then(parse_date),
                ) {
                    (Some(id), Some(date)) => {
                        let engine = StaffingEngine::new(&dataset, &ledger);
                        match engine.daily_total_for_resource(id, date) {
                            Some(total) => {
                                let flag = if engine.is_over_allocated(id, date) {
                                    " (over-allocated)"
                                } else {
                                    ""
                                };
                                println!("Resource {id} on {date}: {total:.1}%{flag}");
                            }
                            None => println!("Resource {id} on {date}: not applicable"),
                        }
                    }
                    _ => println!("Usage: daily <resource_id> <YYYY-MM-DD>"),
                }
            }
            "avg" => {
                let (id_s, start_s, end_s) = (parts.next(), parts.next(), parts.next());
                match (
                    id_s.and_then(|s| s.parse::<i32>().ok()),
                    start_s.and_then(parse_date),
                    end_s.and_then(parse_date),
                ) {
                    (Some(id), Some(start), Some(end)) => {
                        let engine = StaffingEngine::new(&dataset, &ledger);
                        let avg = engine.average_allocation(id, start, end);
                        println!("Average allocation for resource {id}: {avg:.1}%");
                    }
                    _ => println!("Usage: avg <resource_id> <start> <end>"),
                }
            }
            "util" => {
                let (start_s, end_s) = (parts.next(), parts.next());
                match (start_s.and_then(parse_date), end_s.and_then(parse_date)) {
                    (Some(start), Some(end)) => {
                        let engine = StaffingEngine::new(&dataset, &ledger);
                        match utilization_dataframe(&engine, start, end) {
                            Ok(df) => println!("{}", render_df_as_text_table(&df)),
                            Err(e) => println!("Error building table: {e}"),
                        }
                    }
                    _ => println!("Usage: util <start> <end>"),
                }
            }
            "persondays" | "cost" | "revenue" => {
                let (id_s, start_s, end_s) = (parts.next(), parts.next(), parts.next());
                match (
                    id_s.and_then(|s| s.parse::<i32>().ok()),
                    start_s.and_then(parse_date),
                    end_s.and_then(parse_date),
                ) {
                    (Some(id), Some(start), Some(end)) => {
                        let engine = StaffingEngine::new(&dataset, &ledger);
                        let value = match cmd {
                            "persondays" => engine.person_days_for_project(id, start, end),
                            "cost" => engine.cost_for_period(id, start, end),
                            _ => engine.revenue_for_period(id, start, end),
                        };
                        println!("{cmd} for project {id}: {value:.2}");
                    }
                    _ => println!("Usage: {cmd} <project_id> <start> <end>"),
                }
            }
            "forecast" => {
                let (start_s, months_s) = (parts.next(), parts.next());
                let (Some(start), Some(months)) = (
                    start_s.and_then(parse_date),
                    months_s.and_then(|s| s.parse::<u32>().ok()),
                ) else {
                    println!("Usage: forecast <start_month YYYY-MM-DD> <months> [k=v...]");
                    continue;
                };
                let filter = match parse_filter_args(parts) {
                    Ok(filter) => filter,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let engine = StaffingEngine::new(&dataset, &ledger);
                let rows = engine.forecast(start, months, &filter);
                match forecast_dataframe(&rows) {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Error building table: {e}"),
                }
            }
            "financials" => {
                let Some(year) = parts.next().and_then(|s| s.parse::<i32>().ok()) else {
                    println!("Usage: financials <year> [k=v...]");
                    continue;
                };
                let filter = match parse_filter_args(parts) {
                    Ok(filter) => filter,
                    Err(e) => {
                        println!("Error: {e}");
                        continue;
                    }
                };
                let engine = StaffingEngine::new(&dataset, &ledger);
                let rows = engine.monthly_financials(year, &filter);
                match financials_dataframe(&rows) {
                    Ok(df) => println!("{}", render_df_as_text_table(&df)),
                    Err(e) => println!("Error building table: {e}"),
                }
            }
            "load" => match parts.next() {
                Some(path) => match load_dataset_from_json(path) {
                    Ok((loaded_dataset, loaded_ledger)) => {
                        dataset = loaded_dataset;
                        ledger = loaded_ledger;
                        println!(
                            "Dataset loaded from {path} ({} resources, {} ledger entries).",
                            dataset.resources.len(),
                            ledger.entry_count()
                        );
                    }
                    Err(e) => println!("Error loading dataset: {e}"),
                },
                None => println!("Usage: load <path>"),
            },
            "save" => match parts.next() {
                Some(path) => match save_dataset_to_json(&dataset, &ledger, path) {
                    Ok(()) => println!("Dataset saved to {path}."),
                    Err(e) => println!("Error saving dataset: {e}"),
                },
                None => println!("Usage: save <path>"),
            },
            "import" => match parts.next() {
                Some(path) => match load_ledger_from_csv(path) {
                    Ok(loaded) => {
                        ledger = loaded;
                        println!("Ledger imported from {path} ({} entries).", ledger.entry_count());
                    }
                    Err(e) => println!("Error importing ledger: {e}"),
                },
                None => println!("Usage: import <path>"),
            },
            "export" => match parts.next() {
                Some(path) => match save_ledger_to_csv(&ledger, path) {
                    Ok(()) => println!("Ledger exported to {path}."),
                    Err(e) => println!("Error exporting ledger: {e}"),
                },
                None => println!("Usage: export <path>"),
            },
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
