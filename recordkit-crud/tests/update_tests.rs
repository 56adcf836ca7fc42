mod common;

use common::{blog_store, obj, panel, tags_field, Recording};
use pretty_assertions::assert_eq;
use recordkit_crud::{CrudConfig, CrudError};
use recordkit_model::{Entity, FieldDescriptor, StoreError};
use serde_json::{json, Value};

fn article_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::text("title"),
        FieldDescriptor::text("body"),
        tags_field(),
    ]
}

// ── Attribute merge ──────────────────────────────────────────────

#[test]
fn update_merges_attributes() {
    let store = blog_store();
    let panel = panel(&store, article_fields());

    let updated = panel
        .update(&json!(1), obj(json!({"title": "Renamed"})))
        .unwrap();

    assert_eq!(updated.attribute("title"), json!("Renamed"));
    assert_eq!(updated.attribute("body"), json!("First post"));
    let stored = store.get("article", &json!(1)).unwrap();
    assert_eq!(stored.attribute("title"), json!("Renamed"));
}

#[test]
fn update_accepts_string_key() {
    let store = blog_store();
    let panel = panel(&store, article_fields());
    let updated = panel.update(&json!("1"), obj(json!({"body": "Edited"}))).unwrap();
    assert_eq!(updated.attribute("body"), json!("Edited"));
}

#[test]
fn update_with_empty_data_is_a_no_op() {
    let store = blog_store();
    let panel = panel(&store, article_fields());
    let before = store.get("article", &json!(1)).unwrap().to_value();
    let updated = panel.update(&json!(1), obj(json!({}))).unwrap();
    assert_eq!(updated.to_value(), before);
}

// ── Missing entries ──────────────────────────────────────────────

#[test]
fn update_missing_entry_fails_before_any_write() {
    let recording = Recording::new(blog_store());
    let panel = recording.panel(article_fields());

    let err = panel
        .update(&json!(999), obj(json!({"title": "x"})))
        .unwrap_err();

    assert!(matches!(err, CrudError::EntityNotFound(ref key) if key.contains("999")));
    assert!(recording.call_names().is_empty());
}

// ── Relation persistence ─────────────────────────────────────────

#[test]
fn relations_are_applied_before_persist() {
    let recording = Recording::new(blog_store());
    let panel = recording.panel(article_fields());

    panel.update(&json!(1), obj(json!({"title": "x"}))).unwrap();

    assert_eq!(recording.call_names(), vec!["apply", "persist"]);
}

#[test]
fn pivot_field_reaches_persister_but_not_merge() {
    let recording = Recording::new(blog_store());
    let panel = recording.panel(article_fields());
    let tags = json!([{"tags": 7, "weight": 1, "note": "z"}]).to_string();

    panel
        .update(&json!(1), obj(json!({"title": "x", "tags": tags})))
        .unwrap();

    let applied = recording.data_for("apply").unwrap();
    assert_eq!(applied.get("tags"), Some(&Value::String(tags)));
    let persisted = recording.data_for("persist").unwrap();
    assert!(!persisted.contains_key("tags"));
    assert_eq!(persisted.get("title"), Some(&json!("x")));
}

#[test]
fn pivot_rows_are_synced() {
    let store = blog_store();
    let panel = panel(&store, article_fields());
    let tags = json!([{"tags": 7, "weight": 1, "note": "z"}]).to_string();

    panel.update(&json!(1), obj(json!({"tags": tags}))).unwrap();

    let article = store.get("article", &json!(1)).unwrap();
    let tags = article.relation("tags").unwrap().into_vec();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].key(), json!(7));
    assert_eq!(tags[0].pivot("weight"), json!(1));
}

#[test]
fn has_many_relation_is_synced() {
    let store = blog_store();
    let mut fields = article_fields();
    fields.push(FieldDescriptor::relation("comments", "comments"));
    let panel = panel(&store, fields);

    panel.update(&json!(1), obj(json!({"comments": [51]}))).unwrap();

    let article = store.get("article", &json!(1)).unwrap();
    let comments = article.relation("comments").unwrap().into_vec();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].key(), json!(51));
}

#[test]
fn has_one_relation_is_saved() {
    let store = blog_store().scoped("author");
    let panel = panel(
        &store,
        vec![
            FieldDescriptor::text("name"),
            FieldDescriptor::relation("profile", "profile"),
        ],
    );

    panel
        .update(&json!(10), obj(json!({"name": "Ada L.", "profile": {"bio": "Writer"}})))
        .unwrap();

    let author = store.get("author", &json!(10)).unwrap();
    assert_eq!(author.attribute("name"), json!("Ada L."));
    assert_eq!(author.attribute("profile"), Value::Null);
    let profile = store.get("profile", &json!(100)).unwrap();
    assert_eq!(profile.attribute("bio"), json!("Writer"));
}

#[test]
fn belongs_to_relation_is_reassigned() {
    let store = blog_store();
    store
        .insert("author", obj(json!({"id": 11, "name": "Grace"})))
        .unwrap();
    let mut fields = article_fields();
    fields.push(FieldDescriptor::relation("name", "author"));
    let panel = panel(&store, fields);

    let updated = panel.update(&json!(1), obj(json!({"author": 11}))).unwrap();

    assert_eq!(updated.attribute("author_id"), json!(11));
    let stored = store.get("article", &json!(1)).unwrap();
    assert_eq!(stored.attribute("author_id"), json!(11));
    let form = panel.get_update_fields(Some(&json!(1))).unwrap();
    assert_eq!(form.get("name").unwrap().value, Some(json!("Grace")));
}

#[test]
fn composite_pivot_field_names_are_all_excluded() {
    let recording = Recording::new(blog_store());
    let mut labelled = FieldDescriptor::new(vec!["tags", "labels"]);
    labelled.entity = Some("tags".into());
    labelled.pivot = true;
    let panel = recording.panel(vec![FieldDescriptor::text("title"), labelled]);

    panel
        .update(
            &json!(1),
            obj(json!({"title": "x", "tags": "[]", "labels": "featured"})),
        )
        .unwrap();

    let applied = recording.data_for("apply").unwrap();
    assert!(applied.contains_key("tags"));
    assert!(applied.contains_key("labels"));
    let persisted = recording.data_for("persist").unwrap();
    assert!(!persisted.contains_key("tags"));
    assert!(!persisted.contains_key("labels"));
    assert_eq!(persisted.get("title"), Some(&json!("x")));
}

#[test]
fn relation_failure_aborts_update() {
    let recording = Recording::failing(blog_store());
    let panel = recording.panel(article_fields());

    let err = panel
        .update(&json!(1), obj(json!({"title": "never"})))
        .unwrap_err();

    assert!(matches!(err, CrudError::Store(StoreError::Backend(_))));
    assert_eq!(recording.call_names(), vec!["apply"]);
    let stored = recording.inner.get("article", &json!(1)).unwrap();
    assert_eq!(stored.attribute("title"), json!("Hello"));
}

// ── Input normalization ──────────────────────────────────────────

#[test]
fn fake_fields_are_packed_before_persist() {
    let recording = Recording::new(blog_store());
    let mut fields = article_fields();
    fields.push(FieldDescriptor::fake("color", None));
    fields.push(FieldDescriptor::fake("size", Some("options")));
    let panel = recording.panel(fields);

    panel
        .update(&json!(1), obj(json!({"color": "red", "size": "L"})))
        .unwrap();

    let persisted = recording.data_for("persist").unwrap();
    assert!(!persisted.contains_key("color"));
    assert!(!persisted.contains_key("size"));
    assert_eq!(persisted.get("extras"), Some(&json!(r#"{"color":"red"}"#)));
    assert_eq!(persisted.get("options"), Some(&json!(r#"{"size":"L"}"#)));
}

#[test]
fn json_cast_attributes_are_decoded() {
    let store = blog_store();
    let mut fields = article_fields();
    fields.push(FieldDescriptor::text("meta"));
    let config = CrudConfig {
        json_columns: vec!["meta".into()],
        ..CrudConfig::default()
    };
    let panel = panel(&store, fields).with_config(config.clone());
    assert_eq!(panel.config(), &config);

    let updated = panel
        .update(&json!(1), obj(json!({"meta": r#"{"draft":true}"#})))
        .unwrap();

    assert_eq!(updated.attribute("meta"), json!({"draft": true}));
}

#[test]
fn undecodable_json_cast_becomes_empty_list() {
    let store = blog_store();
    let mut fields = article_fields();
    fields.push(FieldDescriptor::text("meta"));
    let config = CrudConfig {
        json_columns: vec!["meta".into()],
        ..CrudConfig::default()
    };
    let panel = panel(&store, fields).with_config(config);

    let updated = panel
        .update(&json!(1), obj(json!({"meta": "{not json"})))
        .unwrap();

    assert_eq!(updated.attribute("meta"), json!([]));
}
