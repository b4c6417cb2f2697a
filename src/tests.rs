use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::entities::company::{Accreditation, Company, CompanyInfo, UNKNOWN_VALUE};
use crate::domain::entities::filters::{
    apply_filters, available_filter_options, describe_active_filters, matches_live_query,
    parse_amount, parse_tri_state, FilterForm, FilterSet, QuickFilter, PRESET_MIN_REVENUE,
    PRESET_MIN_STAFF,
};
use crate::domain::entities::notification::parse_toast_payload;
use crate::domain::entities::sorting::{
    next_sort, sort_indicator, sort_rows, text_sort_key, SortColumn, SortDirection, SortSpec,
};
use crate::domain::entities::stats::calculate_stats;
use crate::infra::config::{load_config, AppConfig};
use crate::infra::import::csv::{clean_str, load_companies, parse_bool, parse_int, parse_money};
use crate::ui::state::app_state::{
    validate_send_form, RecipientMode, SendReportForm, SyncPhase,
};
use crate::usecase::ports::source::SyncOutcome;
use crate::usecase::services::directory_service::{apply_sync_results, collect_selected};
use crate::usecase::services::report_service::{build_report, write_report_csv};
use crate::*;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("metrika-{prefix}-{nanos}"))
}

fn sample_company(name: &str, inn: &str) -> Company {
    Company {
        full_name: format!("ООО «{name}»"),
        short_name: name.to_string(),
        inn: inn.to_string(),
        ..Company::default()
    }
}

fn company_with_revenue(name: &str, inn: &str, revenue: i64) -> Company {
    Company {
        revenue: Some(revenue),
        ..sample_company(name, inn)
    }
}

fn accredited(mut company: Company) -> Company {
    company.accreditation = Some(Accreditation {
        status: "Действует".to_string(),
        decision_number: String::new(),
        decision_date: None,
        registry_record_date: None,
    });
    company
}

#[test]
fn pluralize_follows_russian_rule() {
    let forms = |count| pluralize(count, "компания", "компании", "компаний");

    assert_eq!(forms(1), "компания");
    assert_eq!(forms(2), "компании");
    assert_eq!(forms(4), "компании");
    assert_eq!(forms(5), "компаний");
    assert_eq!(forms(11), "компаний");
    assert_eq!(forms(14), "компаний");
    assert_eq!(forms(19), "компаний");
    assert_eq!(forms(21), "компания");
    assert_eq!(forms(22), "компании");
    assert_eq!(forms(100), "компаний");
    assert_eq!(forms(101), "компания");
    assert_eq!(forms(111), "компаний");
}

#[test]
fn selection_counter_agrees_with_count() {
    assert_eq!(selection_counter(1), "Выбрана 1 компания");
    assert_eq!(selection_counter(2), "Выбрано 2 компании");
    assert_eq!(selection_counter(5), "Выбрано 5 компаний");
    assert_eq!(selection_counter(11), "Выбрано 11 компаний");
    assert_eq!(selection_counter(21), "Выбрана 21 компания");
}

#[test]
fn selection_summary_names_up_to_three_companies() {
    let names = vec![
        "Альфа".to_string(),
        "Бета".to_string(),
        "Гамма".to_string(),
    ];

    assert_eq!(
        selection_summary(5, &names),
        "Выбрано 5 компаний: Альфа, Бета, Гамма и ещё 2"
    );
    assert_eq!(
        selection_summary(2, &names[..2].to_vec()),
        "Выбрано 2 компании: Альфа, Бета"
    );
    assert_eq!(selection_summary(0, &[]), "Компании не выбраны");
}

#[test]
fn preview_names_keeps_table_order_and_limit() {
    let rows = vec![
        sample_company("Альфа", "1"),
        sample_company("Бета", "2"),
        sample_company("Гамма", "3"),
        sample_company("Дельта", "4"),
    ];
    let inns = vec![
        "4".to_string(),
        "2".to_string(),
        "1".to_string(),
        "3".to_string(),
    ];

    let names = preview_names(&rows, &inns);

    assert_eq!(names, vec!["Альфа", "Бета", "Гамма"]);
}

#[test]
fn live_query_matches_substring_case_insensitively() {
    let row = company_with_revenue("Альфа", "7701234567", 1_200_000);
    let text = row.row_text();

    assert!(matches_live_query(&text, "альфа"));
    assert!(matches_live_query(&text, "  АЛЬФА  "));
    assert!(matches_live_query(&text, "7701"));
    assert!(matches_live_query(&text, ""));
    assert!(!matches_live_query(&text, "бета"));
}

#[test]
fn live_query_empty_shows_all_rows() {
    let rows = vec![
        sample_company("Альфа", "1"),
        sample_company("Бета", "2"),
    ];

    let visible = rows
        .iter()
        .filter(|row| matches_live_query(&row.row_text(), ""))
        .count();

    assert_eq!(visible, rows.len());
}

#[test]
fn numeric_sort_is_ascending_on_first_click() {
    let mut rows = vec![
        company_with_revenue("А", "1", 300),
        company_with_revenue("Б", "2", 10),
        company_with_revenue("В", "3", 2000),
    ];

    let spec = next_sort(None, SortColumn::Revenue);
    assert_eq!(spec.direction, SortDirection::Ascending);

    sort_rows(&mut rows, spec);
    let revenues: Vec<i64> = rows.iter().map(|row| row.revenue.unwrap()).collect();
    assert_eq!(revenues, vec![10, 300, 2000]);
}

#[test]
fn numeric_sort_does_not_toggle_on_repeated_clicks() {
    let first = next_sort(None, SortColumn::Revenue);
    let second = next_sort(Some(first), SortColumn::Revenue);

    assert_eq!(second.direction, SortDirection::Ascending);
}

#[test]
fn text_sort_toggles_on_same_column_and_resets_on_other() {
    let first = next_sort(None, SortColumn::Name);
    assert_eq!(first.direction, SortDirection::Ascending);

    let second = next_sort(Some(first), SortColumn::Name);
    assert_eq!(second.direction, SortDirection::Descending);

    let third = next_sort(Some(second), SortColumn::Name);
    assert_eq!(third.direction, SortDirection::Ascending);

    let other = next_sort(Some(second), SortColumn::Okved);
    assert_eq!(other.column, SortColumn::Okved);
    assert_eq!(other.direction, SortDirection::Ascending);
}

#[test]
fn missing_numeric_values_sort_as_zero() {
    let mut rows = vec![
        company_with_revenue("А", "1", 500),
        sample_company("Б", "2"),
    ];

    sort_rows(
        &mut rows,
        SortSpec {
            column: SortColumn::Revenue,
            direction: SortDirection::Ascending,
        },
    );

    assert_eq!(rows[0].short_name, "Б", "unknown revenue should sort first");
}

#[test]
fn text_sort_key_folds_case_and_yo() {
    assert_eq!(text_sort_key(&sample_company("Ёлка", "1"), SortColumn::Name), "елка");
    assert_eq!(text_sort_key(&sample_company("  ЕЖИ ", "1"), SortColumn::Name), "ежи");
}

#[test]
fn sort_indicator_marks_only_active_column() {
    let spec = Some(SortSpec {
        column: SortColumn::Name,
        direction: SortDirection::Descending,
    });

    assert_eq!(sort_indicator(spec, SortColumn::Name), " ↓");
    assert_eq!(sort_indicator(spec, SortColumn::Inn), "");
    assert_eq!(sort_indicator(None, SortColumn::Name), "");
}

#[test]
fn select_all_state_reflects_selection() {
    assert!(!all_selected(0, 5));
    assert!(!is_indeterminate(0, 5));

    assert!(all_selected(5, 5));
    assert!(!is_indeterminate(5, 5));

    assert!(!all_selected(2, 5));
    assert!(is_indeterminate(2, 5));

    assert!(!all_selected(0, 0));
    assert!(!is_indeterminate(0, 0));
}

#[test]
fn select_all_toggle_covers_every_page_row() {
    let rows = vec![
        sample_company("А", "1"),
        sample_company("Б", "2"),
        sample_company("В", "3"),
        sample_company("Г", "4"),
        sample_company("Д", "5"),
    ];
    let page_inns = collect_page_inns(&rows);
    let mut selected = BTreeSet::new();

    for inn in &page_inns {
        selected.insert(inn.clone());
    }
    assert!(all_selected(count_selected_on_page(&page_inns, &selected), page_inns.len()));
    assert!(!is_indeterminate(count_selected_on_page(&page_inns, &selected), page_inns.len()));

    selected.clear();
    selected.insert("1".to_string());
    selected.insert("3".to_string());
    assert!(is_indeterminate(count_selected_on_page(&page_inns, &selected), page_inns.len()));
}

#[test]
fn collect_page_inns_skips_rows_without_inn() {
    let rows = vec![sample_company("А", "1"), sample_company("Б", "")];

    assert_eq!(collect_page_inns(&rows), vec!["1".to_string()]);
}

#[test]
fn sync_outcome_decodes_failure_with_message() {
    let outcome: SyncOutcome =
        serde_json::from_str(r#"{"success": false, "message": "X"}"#).expect("should decode");

    assert!(!outcome.success);
    assert_eq!(outcome.message.as_deref(), Some("X"));
    assert!(outcome.results.is_empty());
}

#[test]
fn sync_outcome_decodes_per_inn_results() {
    let raw = r#"{
        "success": true,
        "results": [
            {"inn": "7701234567", "success": true, "status": "Действует"},
            {"inn": "7730000000", "success": false, "error": "timeout"}
        ]
    }"#;

    let outcome: SyncOutcome = serde_json::from_str(raw).expect("should decode");

    assert!(outcome.success);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].status.as_deref(), Some("Действует"));
    assert_eq!(outcome.results[1].error.as_deref(), Some("timeout"));
}

#[test]
fn apply_sync_results_updates_only_successful_inns() {
    let raw = r#"{
        "success": true,
        "results": [
            {"inn": "1", "success": true, "status": "Действует"},
            {"inn": "2", "success": false, "error": "timeout"}
        ]
    }"#;
    let outcome: SyncOutcome = serde_json::from_str(raw).expect("should decode");
    let mut rows = vec![sample_company("А", "1"), sample_company("Б", "2")];

    apply_sync_results(&mut rows, &outcome.results);

    assert!(rows[0].is_accredited());
    assert!(rows[1].accreditation.is_none());
}

#[test]
fn sync_phase_labels_are_distinct() {
    let labels = [
        SyncPhase::Idle.label(),
        SyncPhase::Pending.label(),
        SyncPhase::Done.label(),
        SyncPhase::Failed.label(),
    ];

    for (idx, label) in labels.iter().enumerate() {
        for other in labels.iter().skip(idx + 1) {
            assert_ne!(label, other, "phase labels should differ");
        }
    }
}

#[test]
fn malformed_toast_payload_is_rejected() {
    assert!(parse_toast_payload("{not json").is_err());
    assert!(parse_toast_payload(r#"{"type": "report"}"#).is_err());
}

#[test]
fn toast_payload_parses_with_optional_fields_defaulted() {
    let raw = r#"[
        {"type": "report", "title": "Отчёт готов", "message": "Документ сформирован",
         "count": 3, "companies_preview": ["Альфа", "Бета"], "download_url": "/report/1/"},
        {"type": "data", "title": "Данные обновлены", "message": "Реестр перечитан"}
    ]"#;

    let payloads = parse_toast_payload(raw).expect("should parse payload");

    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].count, Some(3));
    assert_eq!(payloads[0].companies_preview, vec!["Альфа", "Бета"]);
    assert_eq!(payloads[0].download_url.as_deref(), Some("/report/1/"));
    assert_eq!(payloads[1].count, None);
    assert!(payloads[1].companies_preview.is_empty());
    assert_eq!(payloads[1].download_url, None);
}

#[test]
fn parse_money_cleans_currency_formatting() {
    assert_eq!(parse_money("1 200 000 ₽"), Some(1_200_000));
    assert_eq!(parse_money("1\u{a0}500"), Some(1500));
    assert_eq!(parse_money("12,5"), Some(13), "half-up rounding");
    assert_eq!(parse_money("нет данных"), None);
    assert_eq!(parse_money("Нет данных о выручке"), None);
    assert_eq!(parse_money(""), None);
    assert_eq!(parse_money("abc"), None);
}

#[test]
fn parse_int_and_bool_follow_dataset_conventions() {
    assert_eq!(parse_int("2023"), Some(2023));
    assert_eq!(parse_int(" 150 "), Some(150));
    assert_eq!(parse_int("много"), None);

    assert_eq!(parse_bool("Да"), Some(true));
    assert_eq!(parse_bool("нет"), Some(false));
    assert_eq!(parse_bool("yes"), Some(true));
    assert_eq!(parse_bool("no"), Some(false));
    assert_eq!(parse_bool("неизвестно"), None);
    assert_eq!(parse_bool(""), None);
}

#[test]
fn clean_str_drops_placeholders() {
    assert_eq!(clean_str("  значение  "), Some("значение".to_string()));
    assert_eq!(clean_str("нет данных"), None);
    assert_eq!(clean_str("Нет данных за период"), None);
    assert_eq!(clean_str("   "), None);
}

#[test]
fn load_companies_reads_semicolon_csv_with_bom() {
    let temp_dir = unique_test_dir("load-csv");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let csv_path = temp_dir.join("companies.csv");

    let header = "Полное наименование;Сокращенное наименование;ИНН;Дата постановки на учёт;ИНН, ФИО руководителя;Основной ОКВЭД;Выручка, руб.;Расходы, руб.;Сумма уплаченных налогов, руб.;Год уплаты налогов;Среднесписочная численность;Год данных о численности;Применяет УСН;Дата включения в реестр МСП";
    let row_a = "ООО «Альфа»;Альфа;7701234567;01.02.2010;Иванов И.И.;62.01;1 200 000 ₽;800 000;нет данных;2023;150;2023;Да;10.08.2016";
    let row_b = "ООО «Бета»;Бета;7730000000;нет данных;Петров П.П.;нет данных;;;;;;;Нет;";
    fs::write(&csv_path, format!("\u{feff}{header}\n{row_a}\n{row_b}\n"))
        .expect("should write csv fixture");

    let companies = load_companies(&csv_path).expect("load should succeed");

    assert_eq!(companies.len(), 2);

    let alfa = &companies[0];
    assert_eq!(alfa.short_name, "Альфа");
    assert_eq!(alfa.inn, "7701234567");
    assert_eq!(alfa.okved.as_deref(), Some("62.01"));
    assert_eq!(alfa.revenue, Some(1_200_000));
    assert_eq!(alfa.expenses, Some(800_000));
    assert_eq!(alfa.taxes, None, "'нет данных' should read as unknown");
    assert_eq!(alfa.staff, Some(150));
    assert_eq!(alfa.uses_usn, Some(true));
    assert_eq!(alfa.financial_result(), Some(400_000));

    let beta = &companies[1];
    assert_eq!(beta.okved, None);
    assert_eq!(beta.revenue, None);
    assert_eq!(beta.uses_usn, Some(false));
    assert_eq!(beta.financial_result(), None);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn apply_filters_checks_every_predicate() {
    let rows = vec![
        accredited(Company {
            revenue: Some(600_000_000),
            taxes: Some(5_000_000),
            staff: Some(120),
            uses_usn: Some(true),
            okved: Some("62.01".to_string()),
            tax_year: Some(2023),
            staff_year: Some(2023),
            ..sample_company("Альфа", "1")
        }),
        Company {
            revenue: Some(1_000_000),
            taxes: Some(10_000),
            staff: Some(5),
            uses_usn: Some(false),
            okved: Some("47.11".to_string()),
            tax_year: Some(2022),
            staff_year: Some(2022),
            ..sample_company("Бета", "2")
        },
        sample_company("Гамма", "3"),
    ];

    let all = apply_filters(&rows, &FilterSet::default());
    assert_eq!(all.len(), 3);

    let by_search = apply_filters(
        &rows,
        &FilterSet {
            search: "альфа".to_string(),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_search.len(), 1);
    assert_eq!(by_search[0].short_name, "Альфа");

    let by_revenue = apply_filters(
        &rows,
        &FilterSet {
            min_revenue: Some(500_000_000),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_revenue.len(), 1, "unknown revenue must not match a minimum");

    let by_max_revenue = apply_filters(
        &rows,
        &FilterSet {
            max_revenue: Some(2_000_000),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_max_revenue.len(), 1);
    assert_eq!(by_max_revenue[0].short_name, "Бета");

    let by_usn = apply_filters(
        &rows,
        &FilterSet {
            uses_usn: Some(true),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_usn.len(), 1);

    let by_accredited = apply_filters(
        &rows,
        &FilterSet {
            is_accredited: Some(true),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_accredited.len(), 1);

    let by_not_accredited = apply_filters(
        &rows,
        &FilterSet {
            is_accredited: Some(false),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_not_accredited.len(), 2);

    let by_okved = apply_filters(
        &rows,
        &FilterSet {
            okved: Some("47.11".to_string()),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_okved.len(), 1);

    let by_staff = apply_filters(
        &rows,
        &FilterSet {
            min_staff: Some(100),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_staff.len(), 1);

    let by_year = apply_filters(
        &rows,
        &FilterSet {
            tax_year: Some(2022),
            ..FilterSet::default()
        },
    );
    assert_eq!(by_year.len(), 1);
}

#[test]
fn quick_filters_write_preset_values_into_the_form() {
    let mut form = FilterForm::default();
    QuickFilter::HighRevenue.write_into(&mut form);
    QuickFilter::LargeStaff.write_into(&mut form);
    QuickFilter::UsnOnly.write_into(&mut form);

    assert_eq!(form.min_revenue, PRESET_MIN_REVENUE.to_string());
    assert_eq!(form.min_staff, PRESET_MIN_STAFF.to_string());
    assert_eq!(form.uses_usn, "yes");

    let filters = form.to_filter_set("");
    assert_eq!(filters.min_revenue, Some(500_000_000));
    assert_eq!(filters.min_staff, Some(100));
    assert_eq!(filters.uses_usn, Some(true));
}

#[test]
fn filter_form_parses_raw_field_values() {
    let form = FilterForm {
        min_revenue: "500 000 000".to_string(),
        max_revenue: "не число".to_string(),
        uses_usn: "no".to_string(),
        is_accredited: "yes".to_string(),
        tax_year: "2023".to_string(),
        ..FilterForm::default()
    };

    let filters = form.to_filter_set("  альфа  ");

    assert_eq!(filters.search, "альфа");
    assert_eq!(filters.min_revenue, Some(500_000_000));
    assert_eq!(filters.max_revenue, None);
    assert_eq!(filters.uses_usn, Some(false));
    assert_eq!(filters.is_accredited, Some(true));
    assert_eq!(filters.tax_year, Some(2023));
    assert_eq!(filters.okved, None);
}

#[test]
fn parse_amount_and_tri_state_handle_edge_values() {
    assert_eq!(parse_amount("500000000"), Some(500_000_000));
    assert_eq!(parse_amount("500 000 000 ₽"), Some(500_000_000));
    assert_eq!(parse_amount(""), None);
    assert_eq!(parse_amount("abc"), None);

    assert_eq!(parse_tri_state("yes"), Some(true));
    assert_eq!(parse_tri_state("NO"), Some(false));
    assert_eq!(parse_tri_state(""), None);
    assert_eq!(parse_tri_state("maybe"), None);
}

#[test]
fn active_filters_are_described_in_words() {
    let filters = FilterSet {
        search: "альфа".to_string(),
        uses_usn: Some(true),
        min_revenue: Some(500_000_000),
        min_staff: Some(100),
        ..FilterSet::default()
    };

    let described = describe_active_filters(&filters);

    assert_eq!(
        described,
        vec![
            "Поиск: \"альфа\"".to_string(),
            "Только компании на УСН".to_string(),
            "Выручка ≥ 500 000 000 ₽".to_string(),
            "Численность ≥ 100".to_string(),
        ]
    );
    assert!(describe_active_filters(&FilterSet::default()).is_empty());
}

#[test]
fn available_filter_options_are_unique_and_ordered() {
    let rows = vec![
        Company {
            okved: Some("62.01".to_string()),
            tax_year: Some(2022),
            staff_year: Some(2022),
            ..sample_company("А", "1")
        },
        Company {
            okved: Some("47.11".to_string()),
            tax_year: Some(2023),
            staff_year: Some(2023),
            ..sample_company("Б", "2")
        },
        Company {
            okved: Some("62.01".to_string()),
            tax_year: Some(2023),
            ..sample_company("В", "3")
        },
    ];

    let options = available_filter_options(&rows);

    assert_eq!(options.okveds, vec!["47.11".to_string(), "62.01".to_string()]);
    assert_eq!(options.tax_years, vec![2023, 2022]);
    assert_eq!(options.staff_years, vec![2023, 2022]);
}

#[test]
fn stats_aggregate_known_values_only() {
    let rows = vec![
        accredited(Company {
            revenue: Some(200),
            expenses: Some(50),
            taxes: Some(20),
            staff: Some(10),
            uses_usn: Some(true),
            ..sample_company("Альфа", "1")
        }),
        Company {
            revenue: Some(100),
            staff: Some(20),
            uses_usn: Some(false),
            ..sample_company("Бета", "2")
        },
        sample_company("Гамма", "3"),
    ];

    let stats = calculate_stats(&rows);

    assert_eq!(stats.count, 3);
    assert_eq!(stats.total_revenue, Some(300));
    assert_eq!(stats.total_expenses, Some(50));
    assert_eq!(stats.total_taxes, Some(20));
    assert_eq!(stats.avg_staff, Some(15.0));
    let usn_share = stats.usn_share.expect("usn share should exist");
    assert!((usn_share - 100.0 / 3.0).abs() < 0.01);
    assert_eq!(stats.accredited, 1);
    assert_eq!(stats.top_company.as_deref(), Some("Альфа"));
}

#[test]
fn stats_on_empty_dataset_are_unknown() {
    let stats = calculate_stats(&[]);

    assert_eq!(stats.count, 0);
    assert_eq!(stats.total_revenue, None);
    assert_eq!(stats.avg_staff, None);
    assert_eq!(stats.usn_share, None);
    assert_eq!(stats.top_company, None);
}

#[test]
fn tooltip_prefers_right_side_of_pointer() {
    let (left, top) = tooltip_position(100.0, 100.0, 340.0, 330.0, 1280.0, 800.0);

    assert_eq!(left, 116.0);
    assert_eq!(top, 112.0);
}

#[test]
fn tooltip_falls_back_left_on_right_overflow() {
    let (left, _top) = tooltip_position(1200.0, 100.0, 340.0, 330.0, 1280.0, 800.0);

    assert_eq!(left, 1200.0 - 16.0 - 340.0);
}

#[test]
fn tooltip_flips_above_pointer_on_bottom_overflow() {
    let (_left, top) = tooltip_position(100.0, 700.0, 340.0, 330.0, 1280.0, 800.0);

    assert_eq!(top, 700.0 - 12.0 - 330.0);
}

#[test]
fn tooltip_clamps_inside_small_viewports() {
    let (left, top) = tooltip_position(200.0, 150.0, 340.0, 330.0, 300.0, 200.0);

    assert_eq!(left, 8.0);
    assert_eq!(top, 8.0);
}

#[test]
fn company_info_shows_dash_for_unknown_values() {
    let info = CompanyInfo::from_company(&Company::default());

    assert_eq!(info.inn, UNKNOWN_VALUE);
    assert_eq!(info.okved, UNKNOWN_VALUE);
    assert_eq!(info.revenue, UNKNOWN_VALUE);
    assert_eq!(info.uses_usn, UNKNOWN_VALUE);
    assert_eq!(info.ceo, UNKNOWN_VALUE);
    assert_eq!(info.financial_result, UNKNOWN_VALUE);
    assert_eq!(info.accreditation_status, UNKNOWN_VALUE);
    assert_eq!(info.accreditation_decision, UNKNOWN_VALUE);
    assert_eq!(info.rows().len(), 16, "hover card shows the full record");
}

#[test]
fn company_info_formats_known_values() {
    let company = Company {
        revenue: Some(1_200_000),
        expenses: Some(200_000),
        uses_usn: Some(true),
        ceo: "Иванов И.И.".to_string(),
        ..accredited(sample_company("Альфа", "7701234567"))
    };

    let info = CompanyInfo::from_company(&company);

    assert_eq!(info.revenue, "1 200 000 ₽");
    assert_eq!(info.financial_result, "1 000 000 ₽");
    assert_eq!(info.uses_usn, "Да");
    assert_eq!(info.accreditation_status, "Действует");
}

#[test]
fn company_info_survives_json_round_trip() {
    let info = CompanyInfo::from_company(&company_with_revenue("Альфа", "1", 500));

    let raw = serde_json::to_string(&info).expect("should serialize");
    let parsed: CompanyInfo = serde_json::from_str(&raw).expect("should deserialize");

    assert_eq!(parsed, info);
}

#[test]
fn report_includes_only_selected_companies() {
    let rows = vec![
        company_with_revenue("Альфа", "1", 100),
        company_with_revenue("Бета", "2", 200),
        company_with_revenue("Гамма", "3", 300),
    ];
    let mut selected = BTreeSet::new();
    selected.insert("1".to_string());
    selected.insert("3".to_string());

    let report = build_report(&rows, &selected);

    assert_eq!(report.companies.len(), 2);
    assert_eq!(report.stats.count, 2);
    assert_eq!(report.stats.total_revenue, Some(400));
    assert!(!report.created_at.is_empty());
}

#[test]
fn report_csv_contains_rows_and_summary() {
    let temp_dir = unique_test_dir("report-csv");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("otchet.csv");

    let rows = vec![
        company_with_revenue("Альфа", "1", 100),
        company_with_revenue("Бета", "2", 200),
    ];
    let selected: BTreeSet<String> = ["1".to_string(), "2".to_string()].into_iter().collect();
    let report = build_report(&rows, &selected);

    write_report_csv(&report, &path).expect("report should be written");

    let contents = fs::read_to_string(&path).expect("should read report back");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4, "header, two rows and a summary");
    assert!(lines[0].starts_with("Название;ИНН"));
    assert!(contents.contains("Альфа"));
    assert!(lines[3].starts_with("Итого;2"));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn collect_selected_preserves_table_order() {
    let rows = vec![
        sample_company("Альфа", "1"),
        sample_company("Бета", "2"),
        sample_company("Гамма", "3"),
    ];
    let selected: BTreeSet<String> = ["3".to_string(), "1".to_string()].into_iter().collect();

    let picked = collect_selected(&rows, &selected);

    assert_eq!(picked.len(), 2);
    assert_eq!(picked[0].short_name, "Альфа");
    assert_eq!(picked[1].short_name, "Гамма");
}

#[test]
fn send_form_requires_field_for_active_mode() {
    let mut form = SendReportForm {
        inns: vec!["1".to_string()],
        ..SendReportForm::default()
    };

    assert!(matches!(form.mode, RecipientMode::User));
    let err = validate_send_form(&form).expect_err("empty user should be rejected");
    assert_eq!(err, "Выберите получателя отчёта.");

    form.username = "director".to_string();
    assert!(validate_send_form(&form).is_ok());

    form.mode = RecipientMode::Email;
    let err = validate_send_form(&form).expect_err("empty email should be rejected");
    assert_eq!(err, "Укажите email получателя.");

    form.email = "boss@example.com".to_string();
    assert!(validate_send_form(&form).is_ok());
}

#[test]
fn send_form_mode_switch_keeps_entered_values() {
    let mut form = SendReportForm {
        username: "director".to_string(),
        email: "boss@example.com".to_string(),
        ..SendReportForm::default()
    };

    form.mode = RecipientMode::Email;
    assert_eq!(form.username, "director");

    form.mode = RecipientMode::User;
    assert_eq!(form.email, "boss@example.com");
}

#[test]
fn progress_messages_rotate_in_a_cycle() {
    assert_eq!(progress_message(0), REPORT_PROGRESS_MESSAGES[0]);
    assert_eq!(progress_message(1), REPORT_PROGRESS_MESSAGES[1]);
    assert_eq!(progress_message(3), REPORT_PROGRESS_MESSAGES[3]);
    assert_eq!(progress_message(4), REPORT_PROGRESS_MESSAGES[0]);
    assert_eq!(progress_message(9), REPORT_PROGRESS_MESSAGES[1]);
}

#[test]
fn page_count_rounds_up() {
    assert_eq!(page_count(0, 10), 1);
    assert_eq!(page_count(10, 10), 1);
    assert_eq!(page_count(11, 10), 2);
    assert_eq!(page_count(25, 10), 3);
}

#[test]
fn money_formatting_groups_thousands() {
    assert_eq!(format_amount(500), "500");
    assert_eq!(format_amount(1_234_567), "1 234 567");
    assert_eq!(format_amount(-1_234), "-1 234");
    assert_eq!(format_money(Some(1_000)), "1 000 ₽");
    assert_eq!(format_money(None), UNKNOWN_VALUE);
}

#[test]
fn load_config_defaults_when_file_is_missing() {
    let temp_dir = unique_test_dir("config-missing");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");

    let config = load_config(&temp_dir.join("config.json")).expect("missing file should default");

    assert_eq!(config, AppConfig::default());
    assert!(!config.sync_url.is_empty());
    assert_eq!(config.start_page, 1);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn load_config_rejects_malformed_json() {
    let temp_dir = unique_test_dir("config-broken");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("config.json");
    fs::write(&path, "{broken").expect("should write fixture");

    let result = load_config(&path);

    assert!(result.is_err(), "malformed config should surface an error");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn load_config_reads_recipients_and_urls() {
    let temp_dir = unique_test_dir("config-full");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("config.json");
    fs::write(
        &path,
        r#"{
            "sync_url": "http://dashboard.local/accreditation/sync/",
            "csrf_token": "token123",
            "start_page": 2,
            "recipients": [
                {"username": "director", "display_name": "Директор", "email": "dir@metrika.com"}
            ]
        }"#,
    )
    .expect("should write fixture");

    let config = load_config(&path).expect("config should parse");

    assert_eq!(config.sync_url, "http://dashboard.local/accreditation/sync/");
    assert_eq!(config.csrf_token, "token123");
    assert_eq!(config.start_page, 2);
    assert_eq!(config.recipients.len(), 1);
    assert_eq!(config.recipients[0].username, "director");
    assert_eq!(
        config.send_url,
        AppConfig::default().send_url,
        "omitted fields keep defaults"
    );

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}
