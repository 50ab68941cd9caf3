use std::time::Instant;

use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace};

use crate::domain::{ColumnSpec, HELP_TEXT, JtvError, Message, ViewConfig};
use crate::engine::{self, Record};
use crate::inputter::{InputState, SearchInput};

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy)]
enum Modus {
    TABLE,
    SEARCHINPUT,
    POPUP,
}

/// Render snapshot consumed by the UI. Rebuilt after every state change.
pub struct UIData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub filtered_count: usize,
    pub total_pages: usize,
    pub page_index: usize,
    pub filter_options: Vec<String>,
    pub category_filter: String,
    pub search_text: String,
    pub loading: bool,
    pub show_popup: bool,
    pub popup_message: String,
    pub active_input: bool,
    pub input: InputState,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            title: String::new(),
            headers: Vec::new(),
            rows: Vec::new(),
            filtered_count: 0,
            total_pages: 0,
            page_index: 1,
            filter_options: Vec::new(),
            category_filter: String::new(),
            search_text: String::new(),
            loading: true,
            show_popup: false,
            popup_message: String::new(),
            active_input: false,
            input: InputState::default(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

pub struct Model {
    config: ViewConfig,
    pub status: Status,
    modus: Modus,
    records: Vec<Record>,
    columns: Vec<ColumnSpec>,
    search_text: String,
    category_filter: String,
    page_index: usize,
    filter_options: Vec<String>,
    input: SearchInput,
    input_backup: String,
    show_popup: bool,
    popup_message: String,
    uidata: UIData,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &ViewConfig) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            records: Vec::new(),
            columns: config.columns.clone(),
            search_text: String::new(),
            category_filter: String::new(),
            page_index: 1,
            filter_options: Vec::new(),
            input: SearchInput::default(),
            input_backup: String::new(),
            show_popup: false,
            popup_message: String::new(),
            uidata: UIData::empty(),
            status_message: format!("Fetching {} ...", config.endpoint),
            last_status_message_update: Instant::now(),
        };
        model.recompute_view();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    // The controller forwards key events unmapped while the search box is open.
    pub fn raw_keyevents(&self) -> bool {
        matches!(self.modus, Modus::SEARCHINPUT)
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Message) -> Result<(), JtvError> {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match message {
            Message::Quit => self.quit(),
            // Load settlement applies in any modus.
            Message::DataLoaded(records) => self.data_loaded(records),
            Message::LoadFailed(reason) => self.load_failed(reason),
            msg => match self.modus {
                Modus::TABLE => match msg {
                    Message::NextPage => self.next_page(),
                    Message::PrevPage => self.prev_page(),
                    Message::JumpPage(n) => self.jump_page(n),
                    Message::CycleFilter => self.cycle_filter(),
                    Message::Search => self.enter_search(),
                    Message::Help => self.show_help(),
                    _ => (),
                },
                Modus::SEARCHINPUT => {
                    if let Message::RawKey(key) = msg {
                        self.raw_input(key)
                    }
                }
                Modus::POPUP => {
                    if let Message::Exit = msg {
                        self.close_popup()
                    }
                }
            },
        }
        Ok(())
    }

    // -------------------- Message handlers ---------------------- //

    fn data_loaded(&mut self, records: Vec<Record>) {
        info!("Loaded {} records", records.len());
        if self.columns.is_empty() {
            self.columns = Self::derive_columns(&records);
            debug!("Derived columns: {:?}", self.columns);
        }
        // Options span ALL loaded records, never the filtered subset. A
        // previously selected category missing from the new payload is kept
        // as-is; the table then shows zero rows until the user cycles.
        self.filter_options = engine::compute_filter_options(&records);
        self.records = records;
        self.status = Status::READY;
        self.set_status_message(format!("Loaded {} records", self.records.len()));
        self.recompute_view();
    }

    fn load_failed(&mut self, reason: String) {
        error!("Error fetching data: {}", reason);
        self.records = Vec::new();
        self.status = Status::READY;
        self.set_status_message(format!("Load failed: {}", reason));
        self.recompute_view();
    }

    fn next_page(&mut self) {
        // No-op at total_pages == 0, leaving page_index at 1.
        if self.page_index < self.uidata.total_pages {
            self.page_index += 1;
        }
        self.recompute_view();
    }

    fn prev_page(&mut self) {
        self.page_index = std::cmp::max(1, self.page_index - 1);
        self.recompute_view();
    }

    fn jump_page(&mut self, n: usize) {
        // Unlike rendered page buttons, digit keys can name pages that do
        // not exist; those jumps are ignored.
        if (1..=self.uidata.total_pages).contains(&n) {
            self.page_index = n;
            self.recompute_view();
        } else {
            trace!("Ignoring jump to page {} of {}", n, self.uidata.total_pages);
        }
    }

    fn cycle_filter(&mut self) {
        let next = {
            let mut options = vec![String::new()];
            options.extend(self.filter_options.iter().cloned());
            let pos = options
                .iter()
                .position(|o| *o == self.category_filter)
                .map(|i| (i + 1) % options.len())
                // A stale selection is not in the option list; restart at "All".
                .unwrap_or(0);
            options[pos].clone()
        };
        self.apply_filter(next);
        self.recompute_view();
    }

    fn enter_search(&mut self) {
        self.modus = Modus::SEARCHINPUT;
        self.input_backup = self.search_text.clone();
        self.input.begin(&self.search_text);
        self.recompute_view();
    }

    // The search applies live on every keystroke; Enter keeps the query,
    // Esc reverts to the one active before the box was opened.
    fn raw_input(&mut self, key: KeyEvent) {
        let state = self.input.read(key);
        if state.canceled {
            let backup = self.input_backup.clone();
            self.apply_search(backup);
            self.modus = Modus::TABLE;
        } else {
            self.apply_search(state.text.clone());
            if state.finished {
                self.modus = Modus::TABLE;
            }
        }
        self.recompute_view();
    }

    fn show_help(&mut self) {
        self.modus = Modus::POPUP;
        self.show_popup = true;
        self.popup_message = HELP_TEXT.to_string();
        self.recompute_view();
    }

    fn close_popup(&mut self) {
        self.modus = Modus::TABLE;
        self.show_popup = false;
        self.popup_message.clear();
        self.recompute_view();
    }

    // -------------------- State transitions ---------------------- //

    fn apply_search(&mut self, text: String) {
        if text != self.search_text {
            trace!("Search text {:?} -> {:?}", self.search_text, text);
            self.search_text = text;
            self.page_index = 1;
        }
    }

    fn apply_filter(&mut self, category: String) {
        debug!("Category filter {:?} -> {:?}", self.category_filter, category);
        self.category_filter = category;
        self.page_index = 1;
        let message = if self.category_filter.is_empty() {
            "Filter: All".to_string()
        } else {
            format!("Filter: {}", self.category_filter)
        };
        self.set_status_message(message);
    }

    fn derive_columns(records: &[Record]) -> Vec<ColumnSpec> {
        records
            .first()
            .map(|record| {
                record
                    .keys()
                    .map(|key| ColumnSpec::new(key.clone(), key.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    // Re-runs the engine and rebuilds the UIData snapshot. The dependency
    // set is {records, columns, search_text, category_filter} for filtering
    // and {page_index, page_size} for the slice.
    fn recompute_view(&mut self) {
        let page = engine::compute_visible_rows(
            &self.records,
            &self.columns,
            &self.search_text,
            &self.category_filter,
            self.page_index,
            self.config.page_size,
        );

        let rows = page
            .visible_rows
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|col| engine::cell_text(record, &col.accessor))
                    .collect()
            })
            .collect();

        self.uidata = UIData {
            title: self.config.endpoint.clone(),
            headers: self.columns.iter().map(|c| c.header.clone()).collect(),
            rows,
            filtered_count: page.filtered_count,
            total_pages: page.total_pages,
            page_index: self.page_index,
            filter_options: self.filter_options.clone(),
            category_filter: self.category_filter.clone(),
            search_text: self.search_text.clone(),
            loading: self.status == Status::LOADING,
            show_popup: self.show_popup,
            popup_message: self.popup_message.clone(),
            active_input: matches!(self.modus, Modus::SEARCHINPUT),
            input: self.input.state(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyCode;
    use serde_json::json;

    fn products() -> Vec<Record> {
        json!([
            { "id": 1, "name": "Product A", "price": 100, "category": "Electronics" },
            { "id": 2, "name": "Product B", "price": 200, "category": "Clothing" },
            { "id": 3, "name": "Product C", "price": 150, "category": "Electronics" },
            { "id": 4, "name": "Product D", "price": 190, "category": "Electronics" },
            { "id": 5, "name": "Product E", "price": 250, "category": "Clothing" },
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect()
    }

    fn config(page_size: usize) -> ViewConfig {
        ViewConfig::default()
            .endpoint("http://localhost:5000/products")
            .columns(vec![
                ColumnSpec::new("ID", "id"),
                ColumnSpec::new("Name", "name"),
                ColumnSpec::new("Price", "price"),
                ColumnSpec::new("Category", "category"),
            ])
            .page_size(page_size)
    }

    fn loaded_model(page_size: usize) -> Model {
        let mut model = Model::init(&config(page_size));
        model.update(Message::DataLoaded(products())).unwrap();
        model
    }

    fn visible_names(model: &Model) -> Vec<String> {
        model
            .get_uidata()
            .rows
            .iter()
            .map(|row| row[1].clone())
            .collect()
    }

    fn type_search(model: &mut Model, s: &str) {
        model.update(Message::Search).unwrap();
        for c in s.chars() {
            model
                .update(Message::RawKey(KeyEvent::from(KeyCode::Char(c))))
                .unwrap();
        }
    }

    #[test]
    fn starts_loading_then_ready_after_data_arrives() {
        let mut model = Model::init(&config(2));
        assert!(model.get_uidata().loading);
        model.update(Message::DataLoaded(products())).unwrap();
        assert_eq!(model.status, Status::READY);
        assert!(!model.get_uidata().loading);
        assert_eq!(model.get_uidata().total_pages, 3);
        assert_eq!(visible_names(&model), ["Product A", "Product B"]);
    }

    #[test]
    fn next_page_advances_and_clamps_at_the_last_page() {
        let mut model = loaded_model(2);
        model.update(Message::NextPage).unwrap();
        assert_eq!(visible_names(&model), ["Product C", "Product D"]);
        model.update(Message::NextPage).unwrap();
        model.update(Message::NextPage).unwrap();
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().page_index, 3);
        assert_eq!(visible_names(&model), ["Product E"]);
    }

    #[test]
    fn prev_page_clamps_at_one() {
        let mut model = loaded_model(2);
        model.update(Message::PrevPage).unwrap();
        assert_eq!(model.get_uidata().page_index, 1);
        model.update(Message::NextPage).unwrap();
        model.update(Message::PrevPage).unwrap();
        assert_eq!(model.get_uidata().page_index, 1);
    }

    #[test]
    fn next_page_is_a_noop_on_an_empty_set() {
        let mut model = Model::init(&config(2));
        model.update(Message::DataLoaded(Vec::new())).unwrap();
        assert_eq!(model.get_uidata().total_pages, 0);
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().page_index, 1);
        assert!(model.get_uidata().rows.is_empty());
    }

    #[test]
    fn jump_page_accepts_valid_and_ignores_invalid_targets() {
        let mut model = loaded_model(2);
        model.update(Message::JumpPage(3)).unwrap();
        assert_eq!(model.get_uidata().page_index, 3);
        model.update(Message::JumpPage(7)).unwrap();
        assert_eq!(model.get_uidata().page_index, 3);
        model.update(Message::JumpPage(0)).unwrap();
        assert_eq!(model.get_uidata().page_index, 3);
    }

    #[test]
    fn cycle_filter_walks_all_then_each_category_and_resets_the_page() {
        let mut model = loaded_model(2);
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().page_index, 2);

        model.update(Message::CycleFilter).unwrap();
        assert_eq!(model.get_uidata().category_filter, "Electronics");
        assert_eq!(model.get_uidata().page_index, 1);

        model.update(Message::CycleFilter).unwrap();
        assert_eq!(model.get_uidata().category_filter, "Clothing");
        assert_eq!(visible_names(&model), ["Product B", "Product E"]);
        assert_eq!(model.get_uidata().total_pages, 1);

        model.update(Message::CycleFilter).unwrap();
        assert_eq!(model.get_uidata().category_filter, "");
    }

    #[test]
    fn typing_a_search_applies_live_and_resets_the_page() {
        let mut model = loaded_model(2);
        model.update(Message::NextPage).unwrap();
        type_search(&mut model, "product b");
        assert_eq!(model.get_uidata().page_index, 1);
        assert_eq!(visible_names(&model), ["Product B"]);
        model
            .update(Message::RawKey(KeyEvent::from(KeyCode::Enter)))
            .unwrap();
        assert!(!model.get_uidata().active_input);
        assert_eq!(model.get_uidata().search_text, "product b");
    }

    #[test]
    fn escaping_the_search_box_reverts_to_the_previous_query() {
        let mut model = loaded_model(5);
        type_search(&mut model, "product b");
        model
            .update(Message::RawKey(KeyEvent::from(KeyCode::Enter)))
            .unwrap();

        type_search(&mut model, "zzz");
        assert!(model.get_uidata().rows.is_empty());
        model
            .update(Message::RawKey(KeyEvent::from(KeyCode::Esc)))
            .unwrap();
        assert_eq!(model.get_uidata().search_text, "product b");
        assert_eq!(visible_names(&model), ["Product B"]);
    }

    #[test]
    fn load_failure_settles_into_an_empty_ready_state() {
        let mut model = Model::init(&config(5));
        model
            .update(Message::LoadFailed("connection refused".into()))
            .unwrap();
        assert_eq!(model.status, Status::READY);
        let uidata = model.get_uidata();
        assert!(!uidata.loading);
        assert_eq!(uidata.filtered_count, 0);
        assert_eq!(uidata.total_pages, 0);
        assert!(uidata.status_message.contains("Load failed"));
    }

    #[test]
    fn stale_filter_selection_survives_a_reload() {
        let mut model = loaded_model(5);
        model.update(Message::CycleFilter).unwrap();
        assert_eq!(model.get_uidata().category_filter, "Electronics");

        let replacement: Vec<Record> = json!([
            { "id": 9, "name": "Product Z", "price": 10, "category": "Food" },
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        model.update(Message::DataLoaded(replacement)).unwrap();

        let uidata = model.get_uidata();
        assert_eq!(uidata.category_filter, "Electronics");
        assert_eq!(uidata.filter_options, ["Food"]);
        assert_eq!(uidata.filtered_count, 0);

        // Cycling from a stale selection restarts at "All".
        model.update(Message::CycleFilter).unwrap();
        assert_eq!(model.get_uidata().category_filter, "");
    }

    #[test]
    fn columns_are_derived_from_the_first_record_when_unconfigured() {
        let cfg = ViewConfig::default()
            .endpoint("http://localhost:5000/products")
            .page_size(5usize);
        let mut model = Model::init(&cfg);
        model.update(Message::DataLoaded(products())).unwrap();
        assert_eq!(
            model.get_uidata().headers,
            ["id", "name", "price", "category"]
        );
        assert_eq!(visible_names(&model)[0], "Product A");
    }

    #[test]
    fn help_popup_opens_and_esc_closes_it() {
        let mut model = loaded_model(5);
        model.update(Message::Help).unwrap();
        assert!(model.get_uidata().show_popup);
        // Table keys are inert while the popup is up.
        model.update(Message::NextPage).unwrap();
        assert_eq!(model.get_uidata().page_index, 1);
        model.update(Message::Exit).unwrap();
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn quit_message_stops_the_loop() {
        let mut model = loaded_model(5);
        model.update(Message::Quit).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }
}
