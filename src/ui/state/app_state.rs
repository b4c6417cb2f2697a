use std::collections::{BTreeSet, HashMap};

use dioxus::prelude::{use_signal, Signal};

use crate::domain::entities::company::{Company, CompanyInfo};
use crate::domain::entities::filters::{FilterForm, FilterSet};
use crate::domain::entities::notification::{FlashMessage, Toast};
use crate::domain::entities::sorting::SortSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Pending,
    Done,
    Failed,
}

impl SyncPhase {
    pub fn label(self) -> &'static str {
        match self {
            SyncPhase::Idle => "Обновить аккредитацию",
            SyncPhase::Pending => "Обновляем статусы…",
            SyncPhase::Done => "Статусы обновлены ✓",
            SyncPhase::Failed => "Ошибка обновления",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientMode {
    User,
    Email,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendReportForm {
    pub inns: Vec<String>,
    pub mode: RecipientMode,
    pub username: String,
    pub email: String,
    pub subject: String,
}

impl Default for SendReportForm {
    fn default() -> Self {
        Self {
            inns: Vec::new(),
            mode: RecipientMode::User,
            username: String::new(),
            email: String::new(),
            subject: "Отчёт по компаниям".to_string(),
        }
    }
}

pub fn validate_send_form(form: &SendReportForm) -> Result<(), String> {
    match form.mode {
        RecipientMode::User if form.username.trim().is_empty() => {
            Err("Выберите получателя отчёта.".to_string())
        }
        RecipientMode::Email if form.email.trim().is_empty() => {
            Err("Укажите email получателя.".to_string())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipState {
    pub info: CompanyInfo,
    pub x: f64,
    pub y: f64,
    pub closing: bool,
}

pub struct AppState {
    pub companies: Signal<Vec<Company>>,
    pub filters: Signal<FilterSet>,
    pub filter_form: Signal<FilterForm>,
    pub header_search: Signal<String>,
    pub sidebar_search: Signal<String>,
    pub live_query: Signal<String>,
    pub sort_spec: Signal<Option<SortSpec>>,
    pub selected_inns: Signal<BTreeSet<String>>,
    pub page: Signal<usize>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
    pub generating_report: Signal<bool>,
    pub progress_tick: Signal<usize>,
    pub sync_phase: Signal<SyncPhase>,
    pub show_send_modal: Signal<bool>,
    pub sending_report: Signal<bool>,
    pub send_form: Signal<SendReportForm>,
    pub toasts: Signal<Vec<Toast>>,
    pub flash_messages: Signal<Vec<FlashMessage>>,
    pub flash_epochs: Signal<HashMap<u64, u64>>,
    pub next_flash_id: Signal<u64>,
    pub tooltip: Signal<Option<TooltipState>>,
    pub tooltip_epoch: Signal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            companies: use_signal(Vec::<Company>::new),
            filters: use_signal(FilterSet::default),
            filter_form: use_signal(FilterForm::default),
            header_search: use_signal(String::new),
            sidebar_search: use_signal(String::new),
            live_query: use_signal(String::new),
            sort_spec: use_signal(|| None::<SortSpec>),
            selected_inns: use_signal(BTreeSet::<String>::new),
            page: use_signal(|| 1_usize),
            busy: use_signal(|| false),
            status: use_signal(|| "Готово".to_string()),
            generating_report: use_signal(|| false),
            progress_tick: use_signal(|| 0_usize),
            sync_phase: use_signal(|| SyncPhase::Idle),
            show_send_modal: use_signal(|| false),
            sending_report: use_signal(|| false),
            send_form: use_signal(SendReportForm::default),
            toasts: use_signal(Vec::<Toast>::new),
            flash_messages: use_signal(Vec::<FlashMessage>::new),
            flash_epochs: use_signal(HashMap::<u64, u64>::new),
            next_flash_id: use_signal(|| 0_u64),
            tooltip: use_signal(|| None::<TooltipState>),
            tooltip_epoch: use_signal(|| 0_u64),
        }
    }
}
