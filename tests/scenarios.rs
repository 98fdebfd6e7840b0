use std::time::{Duration, Instant};

use lov::debounce::DebouncedInput;
use lov::view::visible_rows;
use lov::{
    ColumnId, FilterState, FilterValue, LOVConfig, Message, Model, RecordStore, SortDirection,
    SortState, default_columns,
};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn orders(model: &Model) -> Vec<u32> {
    model.visible_records().iter().map(|r| r.order_number).collect()
}

#[test]
fn laboratory_and_delivery_range_narrow_to_jane_doe() {
    let store = RecordStore::sample();
    let mut model = Model::init(&LOVConfig::default(), store.list_all().to_vec(), 120, 30)
        .expect("model");

    model
        .set_filter(ColumnId::Laboratory, FilterValue::Text("Lab 2".into()))
        .expect("lab filter");
    let visible = model.visible_records();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].patient.first_name, "Jane");
    assert_eq!(visible[0].patient.last_name, "Doe");
    assert_eq!(visible[0].delivery_date.to_string(), "2022-12-11");

    model
        .set_filter(
            ColumnId::DeliveryDate,
            FilterValue::Range("2022-12-01".into(), "2022-12-31".into()),
        )
        .expect("range filter");
    assert_eq!(orders(&model), vec![2]);

    model
        .set_filter(
            ColumnId::DeliveryDate,
            FilterValue::Range("2022-01-01".into(), "2022-01-31".into()),
        )
        .expect("range filter");
    assert!(model.visible_records().is_empty());
    assert_eq!(model.get_uidata().rows.len(), 0);
}

#[test]
fn sorting_by_order_date_ascending() {
    let store = RecordStore::sample();
    let mut sorting = SortState::default();
    sorting.set(ColumnId::Date, SortDirection::Ascending);
    let rows = visible_rows(
        store.list_all(),
        &default_columns(),
        &FilterState::default(),
        &sorting,
    );
    let orders: Vec<u32> = rows.iter().map(|&i| store.list_all()[i].order_number).collect();
    assert_eq!(orders, vec![1, 4, 3, 2]);
}

#[test]
fn clearing_one_filter_restores_its_rows_only() {
    let store = RecordStore::sample();
    let mut model = Model::init(&LOVConfig::default(), store.list_all().to_vec(), 120, 30)
        .expect("model");
    model
        .set_filter(ColumnId::Patient, FilterValue::Text("doe".into()))
        .expect("patient");
    model
        .set_filter(ColumnId::Status, FilterValue::Text("progress".into()))
        .expect("status");
    model
        .set_filter(ColumnId::OrderNumber, FilterValue::Text("1".into()))
        .expect("order");
    assert_eq!(orders(&model), vec![1]);

    model
        .set_filter(ColumnId::OrderNumber, FilterValue::Text(String::new()))
        .expect("clear order");
    assert_eq!(orders(&model), vec![1, 2]);
}

#[test]
fn debounced_burst_commits_last_value_once() {
    let quiet = Duration::from_millis(500);
    let t0 = Instant::now();
    let mut input = DebouncedInput::new("", quiet);
    let mut commits = Vec::new();
    for (i, draft) in ["M", "Ma", "Max"].iter().enumerate() {
        let at = t0 + Duration::from_millis(150 * i as u64);
        input.edit(*draft, at);
        if let Some(v) = input.poll(at) {
            commits.push(v);
        }
    }
    let last_edit = t0 + Duration::from_millis(300);
    let mut at = last_edit;
    while at < last_edit + Duration::from_secs(2) {
        if let Some(v) = input.poll(at) {
            assert!(at >= last_edit + quiet);
            commits.push(v);
        }
        at += Duration::from_millis(50);
    }
    assert_eq!(commits, vec!["Max".to_string()]);
}

#[test]
fn typing_into_patient_filter_through_the_model() {
    let config = LOVConfig::default().with_debounce(200);
    let store = RecordStore::sample();
    let mut model = Model::init(&config, store.list_all().to_vec(), 120, 30).expect("model");
    let t0 = Instant::now();

    model.update_at(Some(Message::MoveRight), t0).expect("move");
    model.update_at(Some(Message::MoveRight), t0).expect("move");
    model.update_at(Some(Message::EditFilter), t0).expect("edit");
    for (i, c) in "must".chars().enumerate() {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        let at = t0 + Duration::from_millis(100 * i as u64);
        model.update_at(Some(Message::RawKey(key)), at).expect("key");
        assert_eq!(orders(&model), vec![1, 2, 3, 4]);
    }
    let last = t0 + Duration::from_millis(300);
    model.update_at(None, last + Duration::from_millis(199)).expect("tick");
    assert_eq!(orders(&model), vec![1, 2, 3, 4]);
    model.update_at(None, last + Duration::from_millis(200)).expect("tick");
    assert_eq!(orders(&model), vec![3, 4]);
    assert_eq!(model.filters().text(ColumnId::Patient), "must");
}
