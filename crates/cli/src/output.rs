// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal rendering for command results

use cw_engine::CommandOutcome;
use serde_json::Value;

/// Print a result envelope; returns the process exit code
pub fn print_outcome(outcome: &CommandOutcome, as_json: bool, columns: Option<&[&str]>) -> i32 {
    if !outcome.success {
        eprintln!(
            "error: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
        return 1;
    }

    let Some(data) = &outcome.data else {
        println!("ok");
        return 0;
    };

    if as_json {
        println!("{}", data);
        return 0;
    }

    match (columns, data) {
        (Some(columns), Value::Array(rows)) => print_table(columns, rows),
        _ => println!(
            "{}",
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
        ),
    }
    0
}

/// Render an array of objects as a fixed-column table
fn print_table(columns: &[&str], rows: &[Value]) {
    if rows.is_empty() {
        println!("(none)");
        return;
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| cell(row, c)).collect())
        .collect();
    for row in &cells {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(value.len());
        }
    }

    let header: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c.to_uppercase(), width = widths[i]))
        .collect();
    println!("{}", header.join("  "));

    for row in cells {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:<width$}", v, width = widths[i]))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn cell(row: &Value, column: &str) -> String {
    match &row[column] {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
