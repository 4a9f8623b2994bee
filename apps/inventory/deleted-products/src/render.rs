//! Text and JSON rendering of the derived view

use domain_inventory::{ItemRow, ViewQuery};

const HEADERS: [&str; 4] = ["Products", "Category", "SKU", "Price"];

/// Render rows as an aligned table
pub fn table(rows: &[ItemRow]) -> String {
    if rows.is_empty() {
        return "No deleted products\n".to_string();
    }

    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.name.clone(),
                row.category.clone().unwrap_or_else(|| "-".to_string()),
                row.sku.clone(),
                format_price(row.price),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for line in &cells {
        push_line(&mut out, line, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let last = cells.len() - 1;
    for (i, (cell, width)) in cells.iter().zip(widths.iter().copied()).enumerate() {
        if i == last {
            // Price column is right-aligned
            out.push_str(&format!("{cell:>width$}"));
        } else {
            out.push_str(&format!("{cell:<width$}  "));
        }
    }
    out.push('\n');
}

fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// One-line summary of the active selections
pub fn summary(query: &ViewQuery, shown: usize) -> String {
    let category = query
        .category
        .map(|c| c.to_string())
        .unwrap_or_else(|| "all".to_string());
    format!(
        "{shown} shown | search: {:?} | category: {category} | sort: {}",
        query.search_term, query.sort
    )
}

/// Pretty JSON array of rows
pub fn json(rows: &[ItemRow]) -> eyre::Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
