use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::document;
use dioxus::logger::tracing;
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

use crate::domain::entities::company::CompanyInfo;
use crate::domain::entities::filters::{
    apply_filters, available_filter_options, describe_active_filters, matches_live_query,
    FilterForm, FilterSet, QUICK_FILTERS,
};
use crate::domain::entities::notification::{parse_toast_payload, FlashLevel, FlashMessage, Toast, ToastPayload};
use crate::domain::entities::sorting::{next_sort, sort_indicator, sort_rows, SortColumn};
use crate::domain::entities::stats::calculate_stats;
use crate::infra::config::{
    default_config_path, default_data_path, default_notifications_path, load_config,
    read_notifications_payload, AppConfig, Recipient,
};
use crate::infra::http::sync::{SendReportRequest, SyncClient};
use crate::infra::import::csv::CsvCompanySource;
use crate::ui::state::app_state::{
    validate_send_form, AppState, RecipientMode, SendReportForm, SyncPhase, TooltipState,
};
use crate::usecase::services::directory_service::{apply_sync_results, DirectoryService};
use crate::usecase::services::report_service::{build_report, write_report_csv};
use crate::{
    all_selected, collect_page_inns, count_selected_on_page, format_avg, format_money,
    format_opt_i64, format_share, is_indeterminate, page_count, preview_names, progress_message,
    selection_counter, selection_summary, sleep_ms, tooltip_position,
    FLASH_DISMISS_MS, PAGE_SIZE, PAGINATION_SCROLL_DELAY_MS, REPORT_PROGRESS_ROTATE_MS,
    SYNC_DONE_RESET_MS, SYNC_ERROR_RESET_MS, TOAST_DISMISS_MS, TOAST_FADE_MS, TOAST_STAGGER_MS,
    TOOLTIP_FADE_MS, TOOLTIP_GRACE_MS, TOOLTIP_HEIGHT, TOOLTIP_WIDTH, VIEWPORT_HEIGHT,
    VIEWPORT_WIDTH,
};

const TABLE_COLUMNS: [SortColumn; 7] = [
    SortColumn::Name,
    SortColumn::Inn,
    SortColumn::Okved,
    SortColumn::Revenue,
    SortColumn::Taxes,
    SortColumn::Staff,
    SortColumn::Accreditation,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DropdownId {
    Okved,
    UsesUsn,
    Accredited,
    TaxYear,
    StaffYear,
    Recipient,
}

#[derive(Clone, Debug, PartialEq)]
struct DropdownOption {
    value: String,
    label: String,
}

fn dropdown_label(options: &[DropdownOption], selected: Option<&str>) -> String {
    selected
        .and_then(|value| options.iter().find(|opt| opt.value == value))
        .map(|opt| opt.label.clone())
        .unwrap_or_else(|| "(не выбрано)".to_string())
}

#[component]
fn DropdownSelect(
    id: DropdownId,
    label: &'static str,
    options: Vec<DropdownOption>,
    selected: Option<String>,
    mut open_dropdown: Signal<Option<DropdownId>>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_select: EventHandler<String>,
) -> Element {
    let is_open = open_dropdown() == Some(id);
    let selected_label = dropdown_label(&options, selected.as_deref());
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));

    rsx! {
        div {
            style: "position: relative; display: inline-flex; align-items: center; gap: 6px;",
            span { style: "color: #495057;", "{label}" }
            button {
                style: "border: 1px solid #ced4da; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                onclick: move |event| {
                    event.stop_propagation();
                    if open_dropdown() == Some(id) {
                        open_dropdown.set(None);
                        return;
                    }
                    let point = event.client_coordinates();
                    dropdown_pos.set(Some((point.x, point.y + 24.0)));
                    open_dropdown.set(Some(id));
                },
                "{selected_label}"
            }
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 220px; max-height: 320px; overflow-y: auto; background: #fff; border: 1px solid #ced4da; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;",
                onclick: move |event| event.stop_propagation(),
                {options.iter().map(|opt| {
                    let value = opt.value.clone();
                    let label = opt.label.clone();
                    let is_selected = selected.as_deref() == Some(value.as_str());
                    let background = if is_selected { "#edf2ff" } else { "transparent" };
                    rsx!(
                        div {
                            style: "padding: 8px 10px; cursor: pointer; background: {background};",
                            onclick: move |_| {
                                on_select.call(value.clone());
                                open_dropdown.set(None);
                            },
                            "{label}"
                        }
                    )
                })}
            }
        }
    }
}

struct Boot {
    config_error: Option<String>,
    recipients: Vec<Recipient>,
    start_page: usize,
    sync_client: Option<Arc<SyncClient>>,
    directory: Option<Arc<DirectoryService>>,
    notifications_path: Option<PathBuf>,
}

fn bootstrap() -> Boot {
    let (config, config_error) = match default_config_path().and_then(|path| load_config(&path)) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err.to_string())),
    };

    let sync_client = match SyncClient::new(
        config.sync_url.clone(),
        config.send_url.clone(),
        config.csrf_token.clone(),
    ) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            tracing::warn!("не удалось создать HTTP-клиент: {err}");
            None
        }
    };

    let data_path = config.data_file.clone().or_else(|| default_data_path().ok());
    let directory =
        data_path.map(|path| Arc::new(DirectoryService::new(Arc::new(CsvCompanySource { path }))));
    let notifications_path = config
        .notifications_file
        .clone()
        .or_else(|| default_notifications_path().ok());

    Boot {
        config_error,
        recipients: config.recipients,
        start_page: config.start_page.max(1),
        sync_client,
        directory,
        notifications_path,
    }
}

fn scroll_to_table() {
    let _ = document::eval(
        "document.getElementById('company-table')?.scrollIntoView({ behavior: 'smooth' });",
    );
}

fn bump_flash_epoch(mut epochs: Signal<HashMap<u64, u64>>, id: u64) -> u64 {
    let mut map = epochs.write();
    let next = map.get(&id).copied().unwrap_or(0) + 1;
    map.insert(id, next);
    next
}

fn schedule_flash_dismiss(
    mut flashes: Signal<Vec<FlashMessage>>,
    epochs: Signal<HashMap<u64, u64>>,
    id: u64,
) {
    let epoch = bump_flash_epoch(epochs, id);
    spawn(async move {
        sleep_ms(FLASH_DISMISS_MS).await;
        if epochs().get(&id).copied() == Some(epoch) {
            flashes.write().retain(|message| message.id != id);
        }
    });
}

fn dismiss_flash(
    mut flashes: Signal<Vec<FlashMessage>>,
    epochs: Signal<HashMap<u64, u64>>,
    id: u64,
) {
    bump_flash_epoch(epochs, id);
    flashes.write().retain(|message| message.id != id);
}

fn push_flash(
    mut flashes: Signal<Vec<FlashMessage>>,
    epochs: Signal<HashMap<u64, u64>>,
    mut next_flash_id: Signal<u64>,
    level: FlashLevel,
    text: String,
) {
    let id = next_flash_id();
    next_flash_id.set(id + 1);
    flashes.write().push(FlashMessage { id, level, text });
    schedule_flash_dismiss(flashes, epochs, id);
}

fn mark_toast_closing(mut toasts: Signal<Vec<Toast>>, id: u64) -> bool {
    let mut list = toasts.write();
    match list.iter_mut().find(|toast| toast.id == id) {
        Some(toast) if !toast.closing => {
            toast.closing = true;
            true
        }
        _ => false,
    }
}

fn remove_toast(mut toasts: Signal<Vec<Toast>>, id: u64) {
    toasts.write().retain(|toast| toast.id != id);
}

fn close_toast(toasts: Signal<Vec<Toast>>, id: u64) {
    if !mark_toast_closing(toasts, id) {
        return;
    }
    spawn(async move {
        sleep_ms(TOAST_FADE_MS).await;
        remove_toast(toasts, id);
    });
}

fn spawn_toasts(mut toasts: Signal<Vec<Toast>>, payloads: Vec<ToastPayload>) {
    for (index, payload) in payloads.into_iter().enumerate() {
        let id = index as u64;
        spawn(async move {
            sleep_ms(TOAST_STAGGER_MS * index as u64).await;
            toasts.write().push(Toast {
                id,
                payload,
                closing: false,
            });
            sleep_ms(TOAST_DISMISS_MS).await;
            if mark_toast_closing(toasts, id) {
                sleep_ms(TOAST_FADE_MS).await;
                remove_toast(toasts, id);
            }
        });
    }
}

#[component]
pub fn App() -> Element {
    let AppState {
        mut companies,
        mut filters,
        mut filter_form,
        mut header_search,
        mut sidebar_search,
        mut live_query,
        mut sort_spec,
        mut selected_inns,
        mut page,
        mut busy,
        mut status,
        mut generating_report,
        mut progress_tick,
        mut sync_phase,
        mut show_send_modal,
        mut sending_report,
        mut send_form,
        mut toasts,
        mut flash_messages,
        mut flash_epochs,
        mut next_flash_id,
        mut tooltip,
        mut tooltip_epoch,
    } = AppState::new();

    let mut open_dropdown = use_signal(|| None::<DropdownId>);
    let dropdown_pos = use_signal(|| None::<(f64, f64)>);

    let boot = use_hook(|| Rc::new(bootstrap()));
    let recipients = boot.recipients.clone();
    let sync_client = boot.sync_client.clone();

    let boot_for_init = boot.clone();
    use_effect(move || {
        *busy.write() = true;
        if let Some(err) = boot_for_init.config_error.clone() {
            *status.write() = format!("Не удалось прочитать настройки: {err}");
        }
        match boot_for_init.directory.as_ref().map(|d| d.load_companies()) {
            Some(Ok(list)) => {
                let loaded = list.len();
                companies.set(list);
                *status.write() = format!("Загружено компаний: {loaded}");
            }
            Some(Err(err)) => {
                companies.set(Vec::new());
                *status.write() = format!("Не удалось загрузить данные: {err}");
            }
            None => {
                *status.write() = "Файл с данными не настроен".to_string();
            }
        }

        if let Some(path) = boot_for_init.notifications_path.clone() {
            if let Some(raw) = read_notifications_payload(&path) {
                match parse_toast_payload(&raw) {
                    Ok(payloads) => spawn_toasts(toasts, payloads),
                    Err(err) => {
                        tracing::warn!("не удалось разобрать уведомления: {err}");
                    }
                }
            }
        }

        if boot_for_init.start_page > 1 {
            page.set(boot_for_init.start_page);
            spawn(async move {
                sleep_ms(PAGINATION_SCROLL_DELAY_MS).await;
                scroll_to_table();
            });
        }
        *busy.write() = false;
    });

    let apply_filter_form = Rc::new(RefCell::new(move || {
        let query = header_search();
        if sidebar_search() != query {
            sidebar_search.set(query.clone());
        }
        filters.set(filter_form().to_filter_set(&query));
        page.set(1);
        selected_inns.write().clear();
        *status.write() = "Фильтры применены".to_string();
    }));

    let companies_snapshot = companies();
    let filters_snapshot = filters();
    let form_snapshot = filter_form();
    let mut visible_rows = apply_filters(&companies_snapshot, &filters_snapshot);
    let sort_snapshot = sort_spec();
    if let Some(spec) = sort_snapshot {
        sort_rows(&mut visible_rows, spec);
    }

    let dataset_stats = calculate_stats(&companies_snapshot);
    let selection_stats = calculate_stats(&visible_rows);
    let filter_options = available_filter_options(&companies_snapshot);
    let active_filter_chips = describe_active_filters(&filters_snapshot);

    let total_pages = page_count(visible_rows.len(), PAGE_SIZE);
    let current_page = page().min(total_pages);
    let page_rows: Vec<_> = visible_rows
        .iter()
        .skip((current_page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();

    let selected_snapshot = selected_inns();
    let page_inns = collect_page_inns(&page_rows);
    let selected_on_page = count_selected_on_page(&page_inns, &selected_snapshot);
    let all_checked = all_selected(selected_on_page, page_inns.len());
    let partial = is_indeterminate(selected_on_page, page_inns.len());
    let counter_label = selection_counter(selected_snapshot.len());
    let selection_empty = selected_snapshot.is_empty();

    let live_query_snapshot = live_query();
    let toasts_snapshot = toasts();
    let flash_snapshot = flash_messages();
    let tooltip_snapshot = tooltip();
    let send_form_snapshot = send_form();
    let sync_phase_snapshot = sync_phase();
    let generating = generating_report();
    let progress_label = progress_message(progress_tick());

    let okved_options: Vec<DropdownOption> = std::iter::once(DropdownOption {
        value: String::new(),
        label: "Все ОКВЭД".to_string(),
    })
    .chain(filter_options.okveds.iter().map(|okved| DropdownOption {
        value: okved.clone(),
        label: okved.clone(),
    }))
    .collect();
    let usn_options = vec![
        DropdownOption {
            value: String::new(),
            label: "Все".to_string(),
        },
        DropdownOption {
            value: "yes".to_string(),
            label: "На УСН".to_string(),
        },
        DropdownOption {
            value: "no".to_string(),
            label: "Без УСН".to_string(),
        },
    ];
    let accredited_options = vec![
        DropdownOption {
            value: String::new(),
            label: "Все".to_string(),
        },
        DropdownOption {
            value: "yes".to_string(),
            label: "Аккредитованные".to_string(),
        },
        DropdownOption {
            value: "no".to_string(),
            label: "Неаккредитованные".to_string(),
        },
    ];
    let tax_year_options: Vec<DropdownOption> = std::iter::once(DropdownOption {
        value: String::new(),
        label: "Любой год".to_string(),
    })
    .chain(filter_options.tax_years.iter().map(|year| DropdownOption {
        value: year.to_string(),
        label: year.to_string(),
    }))
    .collect();
    let staff_year_options: Vec<DropdownOption> = std::iter::once(DropdownOption {
        value: String::new(),
        label: "Любой год".to_string(),
    })
    .chain(filter_options.staff_years.iter().map(|year| DropdownOption {
        value: year.to_string(),
        label: year.to_string(),
    }))
    .collect();
    let recipient_options: Vec<DropdownOption> = recipients
        .iter()
        .map(|recipient| DropdownOption {
            value: recipient.username.clone(),
            label: format!("{} <{}>", recipient.display_name, recipient.email),
        })
        .collect();

    let modal_summary = selection_summary(
        send_form_snapshot.inns.len(),
        &preview_names(&companies_snapshot, &send_form_snapshot.inns),
    );

    let apply_for_header = apply_filter_form.clone();
    let apply_for_sidebar = apply_filter_form.clone();
    let apply_for_button = apply_filter_form.clone();
    let apply_for_min_revenue = apply_filter_form.clone();
    let apply_for_max_revenue = apply_filter_form.clone();
    let apply_for_min_taxes = apply_filter_form.clone();
    let apply_for_min_staff = apply_filter_form.clone();

    let sync_client_for_accreditation = sync_client.clone();
    let sync_client_for_send = sync_client.clone();
    let sync_client_for_send_check = sync_client.clone();

    rsx! {
        div {
            style: "font-family: 'PT Sans', 'Noto Sans', sans-serif; padding: 12px; background: #f8f9fa; min-height: 100vh;",
            onclick: move |_| {
                open_dropdown.set(None);
            },

            header {
                style: "display: flex; gap: 16px; align-items: center; margin-bottom: 12px; position: sticky; top: 0; background: #f8f9fa; z-index: 900; padding: 8px 0;",
                h2 { style: "margin: 0;", "Метрика" }
                input {
                    style: "flex: 1; max-width: 420px; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px;",
                    placeholder: "Поиск по названию, руководителю, ОКВЭД",
                    value: header_search(),
                    oninput: move |event| {
                        let value = event.value();
                        if sidebar_search() != value {
                            sidebar_search.set(value.clone());
                        }
                        header_search.set(value);
                    },
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            event.prevent_default();
                            apply_for_header.borrow_mut()();
                        }
                    },
                }
                span { style: "color: #868e96;", " {status}" }
            }

            div {
                style: "display: flex; gap: 16px; flex-wrap: wrap; margin-bottom: 12px; color: #495057;",
                span { "Всего компаний: {dataset_stats.count}" }
                span { "Выручка: {format_money(dataset_stats.total_revenue)}" }
                span { "Налоги: {format_money(dataset_stats.total_taxes)}" }
                span { "Средний штат: {format_avg(dataset_stats.avg_staff)}" }
                span { "Доля УСН: {format_share(dataset_stats.usn_share)}" }
                span { "Аккредитовано: {dataset_stats.accredited}" }
                if let Some(top) = dataset_stats.top_company.clone() {
                    span { "Лидер по выручке: {top}" }
                }
            }

            div {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap; margin-bottom: 12px; padding: 10px; background: #fff; border: 1px solid #dee2e6; border-radius: 8px;",
                input {
                    style: "padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px;",
                    placeholder: "Поиск (фильтр)",
                    value: sidebar_search(),
                    oninput: move |event| {
                        let value = event.value();
                        if header_search() != value {
                            header_search.set(value.clone());
                        }
                        sidebar_search.set(value);
                    },
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            event.prevent_default();
                            apply_for_sidebar.borrow_mut()();
                        }
                    },
                }
                DropdownSelect {
                    id: DropdownId::Okved,
                    label: "ОКВЭД",
                    options: okved_options.clone(),
                    selected: Some(form_snapshot.okved.clone()),
                    open_dropdown: open_dropdown,
                    dropdown_pos: dropdown_pos,
                    on_select: move |value: String| {
                        let mut form = filter_form();
                        form.okved = value;
                        filter_form.set(form);
                    }
                }
                DropdownSelect {
                    id: DropdownId::UsesUsn,
                    label: "УСН",
                    options: usn_options.clone(),
                    selected: Some(form_snapshot.uses_usn.clone()),
                    open_dropdown: open_dropdown,
                    dropdown_pos: dropdown_pos,
                    on_select: move |value: String| {
                        let mut form = filter_form();
                        form.uses_usn = value;
                        filter_form.set(form);
                    }
                }
                DropdownSelect {
                    id: DropdownId::Accredited,
                    label: "Аккредитация",
                    options: accredited_options.clone(),
                    selected: Some(form_snapshot.is_accredited.clone()),
                    open_dropdown: open_dropdown,
                    dropdown_pos: dropdown_pos,
                    on_select: move |value: String| {
                        let mut form = filter_form();
                        form.is_accredited = value;
                        filter_form.set(form);
                    }
                }
                DropdownSelect {
                    id: DropdownId::TaxYear,
                    label: "Год налогов",
                    options: tax_year_options.clone(),
                    selected: Some(form_snapshot.tax_year.clone()),
                    open_dropdown: open_dropdown,
                    dropdown_pos: dropdown_pos,
                    on_select: move |value: String| {
                        let mut form = filter_form();
                        form.tax_year = value;
                        filter_form.set(form);
                    }
                }
                DropdownSelect {
                    id: DropdownId::StaffYear,
                    label: "Год численности",
                    options: staff_year_options.clone(),
                    selected: Some(form_snapshot.staff_year.clone()),
                    open_dropdown: open_dropdown,
                    dropdown_pos: dropdown_pos,
                    on_select: move |value: String| {
                        let mut form = filter_form();
                        form.staff_year = value;
                        filter_form.set(form);
                    }
                }
                input {
                    style: "width: 130px; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px;",
                    placeholder: "Выручка от",
                    value: form_snapshot.min_revenue.clone(),
                    oninput: move |event| {
                        let mut form = filter_form();
                        form.min_revenue = event.value();
                        filter_form.set(form);
                    },
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            event.prevent_default();
                            apply_for_min_revenue.borrow_mut()();
                        }
                    },
                }
                input {
                    style: "width: 130px; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px;",
                    placeholder: "Выручка до",
                    value: form_snapshot.max_revenue.clone(),
                    oninput: move |event| {
                        let mut form = filter_form();
                        form.max_revenue = event.value();
                        filter_form.set(form);
                    },
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            event.prevent_default();
                            apply_for_max_revenue.borrow_mut()();
                        }
                    },
                }
                input {
                    style: "width: 130px; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px;",
                    placeholder: "Налоги от",
                    value: form_snapshot.min_taxes.clone(),
                    oninput: move |event| {
                        let mut form = filter_form();
                        form.min_taxes = event.value();
                        filter_form.set(form);
                    },
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            event.prevent_default();
                            apply_for_min_taxes.borrow_mut()();
                        }
                    },
                }
                input {
                    style: "width: 110px; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px;",
                    placeholder: "Штат от",
                    value: form_snapshot.min_staff.clone(),
                    oninput: move |event| {
                        let mut form = filter_form();
                        form.min_staff = event.value();
                        filter_form.set(form);
                    },
                    onkeydown: move |event| {
                        if event.key() == Key::Enter {
                            event.prevent_default();
                            apply_for_min_staff.borrow_mut()();
                        }
                    },
                }
                button {
                    style: "padding: 6px 14px; border: 1px solid #4c6ef5; background: #4c6ef5; color: #fff; border-radius: 6px; cursor: pointer;",
                    disabled: busy(),
                    onclick: move |_| {
                        apply_for_button.borrow_mut()();
                    },
                    "Применить"
                }
                button {
                    style: "padding: 6px 14px; border: 1px solid #ced4da; background: #fff; border-radius: 6px; cursor: pointer;",
                    disabled: busy(),
                    onclick: move |_| {
                        filter_form.set(FilterForm::default());
                        header_search.set(String::new());
                        sidebar_search.set(String::new());
                        filters.set(FilterSet::default());
                        page.set(1);
                        selected_inns.write().clear();
                        *status.write() = "Фильтры сброшены".to_string();
                    },
                    "Сбросить"
                }
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; margin-bottom: 12px;",
                span { style: "color: #495057;", "Быстрые фильтры:" }
                for preset in QUICK_FILTERS {
                    button {
                        style: "padding: 4px 12px; border: 1px solid #ced4da; background: #fff; border-radius: 14px; cursor: pointer;",
                        onclick: {
                            let apply_for_preset = apply_filter_form.clone();
                            move |_| {
                                let mut form = filter_form();
                                preset.write_into(&mut form);
                                filter_form.set(form);
                                apply_for_preset.borrow_mut()();
                            }
                        },
                        "{preset.label()}"
                    }
                }
            }

            if !active_filter_chips.is_empty() {
                div {
                    style: "display: flex; gap: 6px; flex-wrap: wrap; margin-bottom: 12px;",
                    for chip in active_filter_chips.clone() {
                        span {
                            style: "padding: 2px 10px; background: #edf2ff; border: 1px solid #bac8ff; border-radius: 12px; font-size: 13px;",
                            "{chip}"
                        }
                    }
                }
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; margin-bottom: 12px;",
                span { "{counter_label}" }
                button {
                    style: "padding: 6px 14px; border: 1px solid #4c6ef5; background: #fff; color: #4c6ef5; border-radius: 6px; cursor: pointer;",
                    disabled: selection_empty || generating,
                    onclick: move |_| {
                        let selection = selected_inns();
                        if selection.is_empty() {
                            push_flash(
                                flash_messages,
                                flash_epochs,
                                next_flash_id,
                                FlashLevel::Warning,
                                "Выберите хотя бы одну компанию для отчёта.".to_string(),
                            );
                            return;
                        }
                        let Some(path) = FileDialog::new()
                            .add_filter("CSV", &["csv"])
                            .set_file_name("otchet.csv")
                            .save_file() else {
                            *status.write() = "Формирование отчёта отменено".to_string();
                            return;
                        };
                        let report = build_report(&companies(), &selection);
                        generating_report.set(true);
                        progress_tick.set(0);
                        spawn(async move {
                            let mut tick = 0usize;
                            while generating_report() {
                                progress_tick.set(tick);
                                sleep_ms(REPORT_PROGRESS_ROTATE_MS).await;
                                tick += 1;
                            }
                        });
                        spawn(async move {
                            match write_report_csv(&report, &path) {
                                Ok(()) => {
                                    push_flash(
                                        flash_messages,
                                        flash_epochs,
                                        next_flash_id,
                                        FlashLevel::Success,
                                        format!(
                                            "Отчёт от {} сохранён: {}",
                                            report.created_at,
                                            path.display()
                                        ),
                                    );
                                }
                                Err(err) => {
                                    push_flash(
                                        flash_messages,
                                        flash_epochs,
                                        next_flash_id,
                                        FlashLevel::Error,
                                        format!("Не удалось сохранить отчёт: {err}"),
                                    );
                                }
                            }
                            generating_report.set(false);
                        });
                    },
                    if generating { "Формируем отчёт…" } else { "Сформировать отчёт" }
                }
                button {
                    style: "padding: 6px 14px; border: 1px solid #ced4da; background: #fff; border-radius: 6px; cursor: pointer;",
                    disabled: sync_phase_snapshot != SyncPhase::Idle
                        || selection_empty
                        || sync_client_for_accreditation.is_none(),
                    onclick: move |_| {
                        let Some(client) = sync_client_for_accreditation.clone() else {
                            return;
                        };
                        if sync_phase() != SyncPhase::Idle {
                            return;
                        }
                        let inns: Vec<String> = selected_inns().iter().cloned().collect();
                        if inns.is_empty() {
                            return;
                        }
                        sync_phase.set(SyncPhase::Pending);
                        spawn(async move {
                            match client.sync_accreditations(&inns).await {
                                Ok(outcome) if outcome.success => {
                                    let failed: Vec<_> = outcome
                                        .results
                                        .iter()
                                        .filter(|result| !result.success)
                                        .collect();
                                    for result in &failed {
                                        tracing::warn!(
                                            "ошибка запроса аккредитации {}: {}",
                                            result.inn,
                                            result.error.clone().unwrap_or_default()
                                        );
                                    }
                                    if !failed.is_empty() {
                                        push_flash(
                                            flash_messages,
                                            flash_epochs,
                                            next_flash_id,
                                            FlashLevel::Warning,
                                            format!("Не удалось обновить: {}", failed.len()),
                                        );
                                    }
                                    apply_sync_results(&mut companies.write(), &outcome.results);
                                    sync_phase.set(SyncPhase::Done);
                                    push_flash(
                                        flash_messages,
                                        flash_epochs,
                                        next_flash_id,
                                        FlashLevel::Success,
                                        outcome.message.unwrap_or_else(|| {
                                            "Статусы аккредитации обновлены".to_string()
                                        }),
                                    );
                                    sleep_ms(SYNC_DONE_RESET_MS).await;
                                    sync_phase.set(SyncPhase::Idle);
                                }
                                Ok(outcome) => {
                                    tracing::warn!(
                                        "сервер отклонил обновление аккредитации: {:?}",
                                        outcome.message
                                    );
                                    if let Some(message) = outcome.message {
                                        push_flash(
                                            flash_messages,
                                            flash_epochs,
                                            next_flash_id,
                                            FlashLevel::Error,
                                            message,
                                        );
                                    }
                                    sync_phase.set(SyncPhase::Failed);
                                    sleep_ms(SYNC_ERROR_RESET_MS).await;
                                    sync_phase.set(SyncPhase::Idle);
                                }
                                Err(err) => {
                                    tracing::warn!("ошибка запроса аккредитации: {err}");
                                    sync_phase.set(SyncPhase::Failed);
                                    sleep_ms(SYNC_ERROR_RESET_MS).await;
                                    sync_phase.set(SyncPhase::Idle);
                                }
                            }
                        });
                    },
                    "{sync_phase_snapshot.label()}"
                }
                button {
                    style: "padding: 6px 14px; border: 1px solid #ced4da; background: #fff; border-radius: 6px; cursor: pointer;",
                    disabled: selection_empty || sync_client_for_send_check.is_none(),
                    onclick: move |_| {
                        let selection = selected_inns();
                        if selection.is_empty() {
                            return;
                        }
                        let mut form = send_form();
                        form.inns = selection.iter().cloned().collect();
                        send_form.set(form);
                        show_send_modal.set(true);
                    },
                    "Отправить отчёт"
                }
            }

            div {
                style: "margin-bottom: 8px;",
                input {
                    style: "width: 280px; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px;",
                    placeholder: "Быстрый поиск по таблице",
                    value: live_query_snapshot.clone(),
                    oninput: move |event| live_query.set(event.value()),
                    onkeydown: move |event| {
                        if event.key() == Key::Escape {
                            live_query.set(String::new());
                        }
                    },
                }
            }

            table {
                id: "company-table",
                style: "border-collapse: collapse; width: 100%; background: #fff; border: 1px solid #dee2e6;",
                thead {
                    tr {
                        th {
                            style: "border: 1px solid #dee2e6; padding: 6px; background: #f1f3f5; width: 32px;",
                            input {
                                r#type: "checkbox",
                                checked: all_checked,
                                style: if partial { "outline: 2px solid #4c6ef5; outline-offset: 1px;" } else { "" },
                                title: if partial { "Выбрана часть компаний" } else { "Выбрать все" },
                                onclick: {
                                    let page_inns_for_toggle = page_inns.clone();
                                    move |_| {
                                        let mut selected = selected_inns.write();
                                        let everyone = !page_inns_for_toggle.is_empty()
                                            && page_inns_for_toggle.iter().all(|inn| selected.contains(inn));
                                        if everyone {
                                            for inn in &page_inns_for_toggle {
                                                selected.remove(inn);
                                            }
                                        } else {
                                            for inn in &page_inns_for_toggle {
                                                selected.insert(inn.clone());
                                            }
                                        }
                                    }
                                }
                            }
                        }
                        for column in TABLE_COLUMNS {
                            th {
                                style: "border: 1px solid #dee2e6; padding: 6px; background: #f1f3f5; cursor: pointer; text-align: left; user-select: none;",
                                onclick: move |_| {
                                    sort_spec.set(Some(next_sort(sort_spec(), column)));
                                },
                                "{column.title()}{sort_indicator(sort_snapshot, column)}"
                            }
                        }
                    }
                }
                tbody {
                    if page_rows.is_empty() {
                        tr {
                            td {
                                style: "border: 1px solid #dee2e6; padding: 12px; text-align: center; color: #868e96;",
                                colspan: TABLE_COLUMNS.len() + 1,
                                "Компании не найдены"
                            }
                        }
                    } else {
                        {page_rows.iter().map(|row| {
                            let row = row.clone();
                            let row_visible = matches_live_query(&row.row_text(), &live_query_snapshot);
                            let inn = row.inn.clone();
                            let is_selected = selected_inns().contains(&inn);
                            let inn_for_toggle = inn.clone();
                            let info_for_enter = CompanyInfo::from_company(&row);
                            let row_style = if is_selected { "background: #edf2ff;" } else { "" };
                            rsx!(
                                tr {
                                    hidden: !row_visible,
                                    style: "{row_style}",
                                    td {
                                        style: "border: 1px solid #dee2e6; padding: 4px; text-align: center;",
                                        input {
                                            r#type: "checkbox",
                                            checked: is_selected,
                                            disabled: inn.trim().is_empty(),
                                            onclick: move |_| {
                                                if inn_for_toggle.trim().is_empty() {
                                                    return;
                                                }
                                                let mut selected = selected_inns.write();
                                                if selected.contains(&inn_for_toggle) {
                                                    selected.remove(&inn_for_toggle);
                                                } else {
                                                    selected.insert(inn_for_toggle.clone());
                                                }
                                            }
                                        }
                                    }
                                    td {
                                        style: "border: 1px solid #dee2e6; padding: 6px;",
                                        span {
                                            style: "cursor: help; border-bottom: 1px dotted #868e96;",
                                            onmouseenter: move |event| {
                                                let point = event.client_coordinates();
                                                tooltip_epoch.set(tooltip_epoch() + 1);
                                                tooltip.set(Some(TooltipState {
                                                    info: info_for_enter.clone(),
                                                    x: point.x,
                                                    y: point.y,
                                                    closing: false,
                                                }));
                                            },
                                            onmousemove: move |event| {
                                                let point = event.client_coordinates();
                                                if let Some(mut current) = tooltip() {
                                                    if !current.closing {
                                                        current.x = point.x;
                                                        current.y = point.y;
                                                        tooltip.set(Some(current));
                                                    }
                                                }
                                            },
                                            onmouseleave: move |_| {
                                                let epoch = tooltip_epoch() + 1;
                                                tooltip_epoch.set(epoch);
                                                spawn(async move {
                                                    sleep_ms(TOOLTIP_GRACE_MS).await;
                                                    if tooltip_epoch() != epoch {
                                                        return;
                                                    }
                                                    if let Some(mut current) = tooltip() {
                                                        current.closing = true;
                                                        tooltip.set(Some(current));
                                                    }
                                                    sleep_ms(TOOLTIP_FADE_MS).await;
                                                    if tooltip_epoch() == epoch {
                                                        tooltip.set(None);
                                                    }
                                                });
                                            },
                                            "{row.display_name()}"
                                        }
                                    }
                                    td { style: "border: 1px solid #dee2e6; padding: 6px;", "{row.inn}" }
                                    td { style: "border: 1px solid #dee2e6; padding: 6px;", "{row.okved.clone().unwrap_or_default()}" }
                                    td { style: "border: 1px solid #dee2e6; padding: 6px; text-align: right;", "{format_money(row.revenue)}" }
                                    td { style: "border: 1px solid #dee2e6; padding: 6px; text-align: right;", "{format_money(row.taxes)}" }
                                    td { style: "border: 1px solid #dee2e6; padding: 6px; text-align: right;", "{format_opt_i64(row.staff)}" }
                                    td { style: "border: 1px solid #dee2e6; padding: 6px;", "{row.accreditation_status()}" }
                                }
                            )
                        })}
                    }
                }
            }

            div {
                style: "display: flex; gap: 16px; flex-wrap: wrap; margin-top: 8px; color: #868e96; font-size: 13px;",
                span { "В выборке: {selection_stats.count}" }
                span { "Выручка выборки: {format_money(selection_stats.total_revenue)}" }
                span { "УСН в выборке: {format_share(selection_stats.usn_share)}" }
            }

            if total_pages > 1 {
                div {
                    style: "display: flex; gap: 6px; margin-top: 12px;",
                    for target in 1..=total_pages {
                        button {
                            style: if target == current_page {
                                "padding: 4px 10px; border: 1px solid #4c6ef5; background: #edf2ff; border-radius: 6px;"
                            } else {
                                "padding: 4px 10px; border: 1px solid #ced4da; background: #fff; border-radius: 6px; cursor: pointer;"
                            },
                            disabled: target == current_page,
                            onclick: move |_| {
                                scroll_to_table();
                                spawn(async move {
                                    sleep_ms(PAGINATION_SCROLL_DELAY_MS).await;
                                    page.set(target);
                                    selected_inns.write().clear();
                                });
                            },
                            "{target}"
                        }
                    }
                }
            }

            if !toasts_snapshot.is_empty() {
                div {
                    style: "position: fixed; top: 16px; right: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 1300; width: 320px;",
                    for toast in toasts_snapshot.clone() {
                        {
                            let id = toast.id;
                            let opacity = if toast.closing { "0" } else { "1" };
                            let accent = toast.payload.accent();
                            let preview = toast.payload.companies_preview.join(", ");
                            rsx!(
                                div {
                                    style: "background: #fff; border: 1px solid #dee2e6; border-left: 4px solid {accent}; border-radius: 8px; padding: 10px 12px; box-shadow: 0 6px 16px rgba(0,0,0,0.12); opacity: {opacity}; transition: opacity 300ms;",
                                    div {
                                        style: "display: flex; justify-content: space-between; align-items: center; gap: 8px;",
                                        span { style: "font-weight: 600;", "{toast.payload.title}" }
                                        button {
                                            style: "border: none; background: transparent; cursor: pointer; font-size: 16px; color: #868e96;",
                                            onclick: move |_| close_toast(toasts, id),
                                            "×"
                                        }
                                    }
                                    p { style: "margin: 6px 0 0; font-size: 13px;", "{toast.payload.message}" }
                                    if let Some(count) = toast.payload.count {
                                        p { style: "margin: 4px 0 0; font-size: 12px; color: #868e96;", "Компаний: {count}" }
                                    }
                                    if !preview.is_empty() {
                                        p { style: "margin: 4px 0 0; font-size: 12px; color: #868e96;", "{preview}" }
                                    }
                                    if let Some(url) = toast.payload.download_url.clone() {
                                        a {
                                            style: "display: inline-block; margin-top: 6px; font-size: 13px; color: #4c6ef5;",
                                            href: "{url}",
                                            "Скачать отчёт"
                                        }
                                    }
                                }
                            )
                        }
                    }
                }
            }

            if !flash_snapshot.is_empty() {
                div {
                    style: "position: fixed; bottom: 16px; right: 16px; display: flex; flex-direction: column; gap: 8px; z-index: 1300; width: 320px;",
                    for message in flash_snapshot.clone() {
                        {
                            let id = message.id;
                            let accent = message.level.accent();
                            rsx!(
                                div {
                                    style: "display: flex; justify-content: space-between; align-items: center; gap: 8px; background: #fff; border: 1px solid #dee2e6; border-left: 4px solid {accent}; border-radius: 8px; padding: 10px 12px; box-shadow: 0 6px 16px rgba(0,0,0,0.12);",
                                    onmouseenter: move |_| {
                                        bump_flash_epoch(flash_epochs, id);
                                    },
                                    onmouseleave: move |_| {
                                        schedule_flash_dismiss(flash_messages, flash_epochs, id);
                                    },
                                    span { style: "font-size: 13px;", "{message.text}" }
                                    button {
                                        style: "border: none; background: transparent; cursor: pointer; font-size: 16px; color: #868e96;",
                                        onclick: move |_| dismiss_flash(flash_messages, flash_epochs, id),
                                        "×"
                                    }
                                }
                            )
                        }
                    }
                }
            }

            if generating {
                div {
                    style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1400;",
                    div {
                        style: "background: #fff; padding: 24px 32px; border-radius: 10px; min-width: 320px; text-align: center;",
                        div { style: "font-weight: 600; margin-bottom: 8px;", "Формирование отчёта" }
                        div { style: "color: #495057;", "{progress_label}" }
                    }
                }
            }

            if show_send_modal() {
                div {
                    style: "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1400;",
                    div {
                        style: "background: #fff; padding: 20px; border-radius: 10px; min-width: 420px; max-width: 540px;",
                        tabindex: "0",
                        autofocus: true,
                        onkeydown: move |event| {
                            if event.key() == Key::Escape {
                                show_send_modal.set(false);
                                send_form.set(SendReportForm::default());
                            }
                        },
                        div {
                            style: "display: flex; justify-content: space-between; align-items: center; margin-bottom: 8px;",
                            span { style: "font-weight: 600;", "Отправка отчёта" }
                            button {
                                style: "border: none; background: transparent; cursor: pointer; font-size: 18px; color: #868e96;",
                                onclick: move |_| {
                                    show_send_modal.set(false);
                                    send_form.set(SendReportForm::default());
                                },
                                "×"
                            }
                        }
                        p { style: "margin: 0 0 12px; color: #495057;", "{modal_summary}" }
                        div {
                            style: "display: flex; gap: 16px; margin-bottom: 12px;",
                            label {
                                style: "display: flex; align-items: center; gap: 6px; cursor: pointer;",
                                input {
                                    r#type: "radio",
                                    checked: send_form_snapshot.mode == RecipientMode::User,
                                    onclick: move |_| {
                                        let mut form = send_form();
                                        form.mode = RecipientMode::User;
                                        send_form.set(form);
                                    }
                                }
                                "Пользователю системы"
                            }
                            label {
                                style: "display: flex; align-items: center; gap: 6px; cursor: pointer;",
                                input {
                                    r#type: "radio",
                                    checked: send_form_snapshot.mode == RecipientMode::Email,
                                    onclick: move |_| {
                                        let mut form = send_form();
                                        form.mode = RecipientMode::Email;
                                        send_form.set(form);
                                    }
                                }
                                "На произвольный email"
                            }
                        }
                        if send_form_snapshot.mode == RecipientMode::User {
                            div {
                                style: "margin-bottom: 12px;",
                                DropdownSelect {
                                    id: DropdownId::Recipient,
                                    label: "Получатель",
                                    options: recipient_options.clone(),
                                    selected: Some(send_form_snapshot.username.clone()),
                                    open_dropdown: open_dropdown,
                                    dropdown_pos: dropdown_pos,
                                    on_select: move |value: String| {
                                        let mut form = send_form();
                                        form.username = value;
                                        send_form.set(form);
                                    }
                                }
                            }
                        } else {
                            div {
                                style: "margin-bottom: 12px;",
                                input {
                                    style: "width: 100%; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px; box-sizing: border-box;",
                                    placeholder: "name@example.com",
                                    value: send_form_snapshot.email.clone(),
                                    oninput: move |event| {
                                        let mut form = send_form();
                                        form.email = event.value();
                                        send_form.set(form);
                                    },
                                }
                            }
                        }
                        div {
                            style: "margin-bottom: 16px;",
                            input {
                                style: "width: 100%; padding: 6px 10px; border: 1px solid #ced4da; border-radius: 6px; box-sizing: border-box;",
                                placeholder: "Тема письма",
                                value: send_form_snapshot.subject.clone(),
                                oninput: move |event| {
                                    let mut form = send_form();
                                    form.subject = event.value();
                                    send_form.set(form);
                                },
                            }
                        }
                        div {
                            style: "display: flex; gap: 8px; justify-content: flex-end;",
                            button {
                                style: "padding: 6px 14px; border: 1px solid #ced4da; background: #fff; border-radius: 6px; cursor: pointer;",
                                onclick: move |_| {
                                    show_send_modal.set(false);
                                    send_form.set(SendReportForm::default());
                                },
                                "Отмена"
                            }
                            button {
                                style: "padding: 6px 14px; border: 1px solid #4c6ef5; background: #4c6ef5; color: #fff; border-radius: 6px; cursor: pointer;",
                                disabled: sending_report(),
                                onclick: move |_| {
                                    let form = send_form();
                                    if let Err(message) = validate_send_form(&form) {
                                        MessageDialog::new()
                                            .set_level(MessageLevel::Warning)
                                            .set_title("Отправка отчёта")
                                            .set_description(message)
                                            .set_buttons(MessageButtons::Ok)
                                            .show();
                                        return;
                                    }
                                    let Some(client) = sync_client_for_send.clone() else {
                                        return;
                                    };
                                    let request = SendReportRequest {
                                        inns: form.inns.clone(),
                                        recipient_mode: match form.mode {
                                            RecipientMode::User => "user".to_string(),
                                            RecipientMode::Email => "email".to_string(),
                                        },
                                        recipient: match form.mode {
                                            RecipientMode::User => form.username.clone(),
                                            RecipientMode::Email => form.email.clone(),
                                        },
                                        subject: form.subject.clone(),
                                    };
                                    sending_report.set(true);
                                    spawn(async move {
                                        match client.send_report(&request).await {
                                            Ok(outcome) if outcome.success => {
                                                push_flash(
                                                    flash_messages,
                                                    flash_epochs,
                                                    next_flash_id,
                                                    FlashLevel::Success,
                                                    outcome
                                                        .message
                                                        .unwrap_or_else(|| "Отчёт отправлен".to_string()),
                                                );
                                                show_send_modal.set(false);
                                                send_form.set(SendReportForm::default());
                                            }
                                            Ok(outcome) => {
                                                push_flash(
                                                    flash_messages,
                                                    flash_epochs,
                                                    next_flash_id,
                                                    FlashLevel::Error,
                                                    outcome.message.unwrap_or_else(|| {
                                                        "Не удалось отправить отчёт".to_string()
                                                    }),
                                                );
                                            }
                                            Err(err) => {
                                                tracing::warn!("ошибка отправки отчёта: {err}");
                                                push_flash(
                                                    flash_messages,
                                                    flash_epochs,
                                                    next_flash_id,
                                                    FlashLevel::Error,
                                                    "Не удалось отправить отчёт".to_string(),
                                                );
                                            }
                                        }
                                        sending_report.set(false);
                                    });
                                },
                                if sending_report() { "Отправляем…" } else { "Отправить" }
                            }
                        }
                    }
                }
            }

            if let Some(tip) = tooltip_snapshot.clone() {
                {
                    let (left, top) = tooltip_position(
                        tip.x,
                        tip.y,
                        TOOLTIP_WIDTH,
                        TOOLTIP_HEIGHT,
                        VIEWPORT_WIDTH,
                        VIEWPORT_HEIGHT,
                    );
                    let opacity = if tip.closing { "0" } else { "1" };
                    rsx!(
                        div {
                            style: "position: fixed; left: {left}px; top: {top}px; width: {TOOLTIP_WIDTH}px; background: #fff; border: 1px solid #dee2e6; border-radius: 10px; box-shadow: 0 10px 28px rgba(0,0,0,0.18); padding: 12px 14px; z-index: 1500; pointer-events: none; opacity: {opacity}; transition: opacity 150ms; font-size: 13px;",
                            div { style: "font-weight: 600; margin-bottom: 8px;", "{tip.info.name}" }
                            {tip.info.rows().into_iter().map(|(label, value)| rsx!(
                                div {
                                    style: "display: flex; justify-content: space-between; gap: 12px; padding: 1px 0;",
                                    span { style: "color: #868e96;", "{label}" }
                                    span { "{value}" }
                                }
                            ))}
                        }
                    )
                }
            }
        }
    }
}
