use crate::output::is_quiet;
use crate::ui::{error_theme, theme, Icons, TableBuilder};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn phase(name: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::GEAR.style(theme().info.clone()), name.style(theme().header.clone()));
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

/// Errors are printed even in quiet mode
pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(error_theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(error_theme().warn.clone()));
}

/// Print a titled two-column table of label/value rows
pub fn summary_table(title: &str, rows: &[(&str, String)]) {
    if is_quiet() || rows.is_empty() {
        return;
    }
    let mut builder = TableBuilder::new();
    for (label, value) in rows {
        builder.add_row(label, value);
    }
    println!();
    println!("{} {}", Icons::STATS, title.style(theme().header.clone()));
    println!("{}", builder.build());
}
