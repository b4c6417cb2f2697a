use std::collections::BTreeSet;
use std::time::Duration;

use crate::domain::entities::company::Company;

mod app;
mod domain;
mod infra;
mod ui;
mod usecase;

#[cfg(test)]
mod tests;

use app::App;

pub const PAGE_SIZE: usize = 10;

pub const VIEWPORT_WIDTH: f64 = 1280.0;
pub const VIEWPORT_HEIGHT: f64 = 800.0;
pub const TOOLTIP_WIDTH: f64 = 340.0;
pub const TOOLTIP_HEIGHT: f64 = 330.0;

pub const TOAST_STAGGER_MS: u64 = 250;
pub const TOAST_DISMISS_MS: u64 = 12_000;
pub const TOAST_FADE_MS: u64 = 300;
pub const FLASH_DISMISS_MS: u64 = 10_000;
pub const SYNC_ERROR_RESET_MS: u64 = 1_200;
pub const SYNC_DONE_RESET_MS: u64 = 800;
pub const PAGINATION_SCROLL_DELAY_MS: u64 = 180;
pub const TOOLTIP_GRACE_MS: u64 = 120;
pub const TOOLTIP_FADE_MS: u64 = 150;
pub const REPORT_PROGRESS_ROTATE_MS: u64 = 2_000;

pub const REPORT_PROGRESS_MESSAGES: [&str; 4] = [
    "Формируем отчёт…",
    "Собираем данные по компаниям…",
    "Считаем агрегаты…",
    "Почти готово…",
];

fn main() {
    dioxus::logger::initialize_default();

    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new().with_window(
                dioxus::desktop::WindowBuilder::new().with_title("Метрика — реестр компаний"),
            ),
        )
        .launch(App);
}

pub fn progress_message(tick: usize) -> &'static str {
    REPORT_PROGRESS_MESSAGES[tick % REPORT_PROGRESS_MESSAGES.len()]
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

pub fn pluralize<'a>(count: usize, one: &'a str, few: &'a str, many: &'a str) -> &'a str {
    let tail = count % 100;
    if (11..=14).contains(&tail) {
        return many;
    }
    match count % 10 {
        1 => one,
        2..=4 => few,
        _ => many,
    }
}

pub fn selection_counter(count: usize) -> String {
    let verb = if count % 100 != 11 && count % 10 == 1 {
        "Выбрана"
    } else {
        "Выбрано"
    };
    let noun = pluralize(count, "компания", "компании", "компаний");
    format!("{verb} {count} {noun}")
}

pub fn selection_summary(count: usize, names: &[String]) -> String {
    if count == 0 {
        return "Компании не выбраны".to_string();
    }
    let preview: Vec<&str> = names.iter().take(3).map(|name| name.as_str()).collect();
    if preview.is_empty() {
        return selection_counter(count);
    }
    let remainder = count.saturating_sub(preview.len());
    if remainder > 0 {
        format!(
            "{}: {} и ещё {}",
            selection_counter(count),
            preview.join(", "),
            remainder
        )
    } else {
        format!("{}: {}", selection_counter(count), preview.join(", "))
    }
}

pub fn preview_names(rows: &[Company], inns: &[String]) -> Vec<String> {
    rows.iter()
        .filter(|row| inns.iter().any(|inn| *inn == row.inn))
        .take(3)
        .map(|row| row.display_name().to_string())
        .collect()
}

pub fn format_amount(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

pub fn format_money(value: Option<i64>) -> String {
    match value {
        Some(amount) => format!("{} ₽", format_amount(amount)),
        None => domain::entities::company::UNKNOWN_VALUE.to_string(),
    }
}

pub fn format_opt_i64(value: Option<i64>) -> String {
    match value {
        Some(number) => number.to_string(),
        None => domain::entities::company::UNKNOWN_VALUE.to_string(),
    }
}

pub fn format_avg(value: Option<f64>) -> String {
    match value {
        Some(number) => format!("{number:.0}"),
        None => domain::entities::company::UNKNOWN_VALUE.to_string(),
    }
}

pub fn format_share(value: Option<f64>) -> String {
    match value {
        Some(number) => format!("{number:.1}%"),
        None => domain::entities::company::UNKNOWN_VALUE.to_string(),
    }
}

pub fn usn_display(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Да",
        Some(false) => "Нет",
        None => domain::entities::company::UNKNOWN_VALUE,
    }
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if total == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

pub fn all_selected(selected: usize, total: usize) -> bool {
    total > 0 && selected == total
}

pub fn is_indeterminate(selected: usize, total: usize) -> bool {
    selected > 0 && selected < total
}

pub fn collect_page_inns(rows: &[Company]) -> Vec<String> {
    rows.iter()
        .filter(|row| !row.inn.trim().is_empty())
        .map(|row| row.inn.clone())
        .collect()
}

pub fn count_selected_on_page(page_inns: &[String], selected: &BTreeSet<String>) -> usize {
    page_inns.iter().filter(|inn| selected.contains(*inn)).count()
}

// Card prefers the right side of the pointer and is clamped to the viewport
// in each direction independently.
pub fn tooltip_position(
    x: f64,
    y: f64,
    card_width: f64,
    card_height: f64,
    viewport_width: f64,
    viewport_height: f64,
) -> (f64, f64) {
    let margin = 8.0;

    let mut left = x + 16.0;
    if left + card_width > viewport_width - margin {
        left = x - 16.0 - card_width;
    }
    if left < margin {
        left = margin;
    }
    if left + card_width > viewport_width - margin {
        left = (viewport_width - card_width - margin).max(margin);
    }

    let mut top = y + 12.0;
    if top + card_height > viewport_height - margin {
        top = y - 12.0 - card_height;
    }
    if top < margin {
        top = margin;
    }
    if top + card_height > viewport_height - margin {
        top = (viewport_height - card_height - margin).max(margin);
    }

    (left, top)
}
