//! Behavior of the editable map-version table.

use chrono::Utc;
use mapconsole_business::maps::{
    EditState, Field, MapListCompute, MapListResult, MapPage, MapStatus, MapVersion,
    NotificationLevel, RowPatch, TableError, VersionTable,
};

fn version(key: &str, path: &str, name: &str) -> MapVersion {
    MapVersion {
        map_file_path: Some(path.to_string()),
        map_file_name: Some(name.to_string()),
        ..MapVersion::placeholder(key)
    }
}

fn table_with(keys: &[&str]) -> VersionTable {
    let mut table = VersionTable::new(10);
    table.apply_page(MapPage {
        rows: keys
            .iter()
            .map(|key| version(key, "/maps", &format!("{key}.map")))
            .collect(),
        total: keys.len() as u64,
    });
    table
}

fn keys(table: &VersionTable) -> Vec<String> {
    table
        .rows()
        .iter()
        .map(|row| row.map_version_id.clone())
        .collect()
}

fn assert_unique_keys(table: &VersionTable) {
    let mut all = keys(table);
    let count = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), count, "duplicate mapVersionId in {:?}", keys(table));
}

mod edit_gate_tests {
    use super::*;

    #[test]
    fn test_begin_edit_seeds_draft_from_row() {
        let mut table = table_with(&["v1", "v2"]);

        table.begin_edit("v1").unwrap();

        assert!(table.edit_state().is_editing("v1"));
        let draft = table.draft().unwrap();
        assert_eq!(draft.get(Field::MapFilePath), Some("/maps"));
        assert_eq!(draft.get(Field::MapFileName), Some("v1.map"));
        assert_eq!(draft.get(Field::MapFileSize), Some(""));
    }

    #[test]
    fn test_begin_edit_while_other_row_editing_fails_without_change() {
        let mut table = table_with(&["v1", "v2"]);
        table.begin_edit("v1").unwrap();
        table.set_draft_field(Field::MapFileName, "typed.map").unwrap();
        let before = table.edit_state().clone();

        let err = table.begin_edit("v2").unwrap_err();

        assert!(matches!(err, TableError::ConcurrentEdit { editing } if editing.as_str() == "v1"));
        assert!(err.to_string().contains("save current edit first"));
        assert_eq!(table.edit_state(), &before);
    }

    #[test]
    fn test_begin_edit_same_row_keeps_draft() {
        let mut table = table_with(&["v1"]);
        table.begin_edit("v1").unwrap();
        table.set_draft_field(Field::MapFileName, "typed.map").unwrap();

        table.begin_edit("v1").unwrap();

        assert_eq!(
            table.draft().unwrap().get(Field::MapFileName),
            Some("typed.map")
        );
    }

    #[test]
    fn test_begin_edit_unknown_row() {
        let mut table = table_with(&["v1"]);

        assert_eq!(
            table.begin_edit("nope"),
            Err(TableError::RowNotFound("nope".to_string()))
        );
        assert_eq!(table.edit_state(), &EditState::Idle);
    }

    #[test]
    fn test_add_row_while_editing_fails_without_change() {
        let mut table = table_with(&["v1"]);
        table.begin_edit("v1").unwrap();

        assert!(matches!(
            table.add_row(),
            Err(TableError::ConcurrentEdit { .. })
        ));
        assert_eq!(keys(&table), vec!["v1"]);
    }
}

mod commit_tests {
    use super::*;

    #[test]
    fn test_commit_with_empty_required_field_keeps_row_and_edit() {
        let mut table = table_with(&["v1"]);
        table.begin_edit("v1").unwrap();
        let original = table.row("v1").unwrap().clone();

        let err = table
            .commit_edit("v1", &RowPatch::new().with(Field::MapFilePath, "  "))
            .unwrap_err();

        assert_eq!(
            err,
            TableError::Required {
                field: Field::MapFilePath
            }
        );
        assert_eq!(err.field(), Some(Field::MapFilePath));
        assert_eq!(table.row("v1"), Some(&original));
        assert!(table.edit_state().is_editing("v1"));
        assert_eq!(table.commit_error(), Some(&err));
        // what the user typed is still in the draft
        assert_eq!(table.draft().unwrap().get(Field::MapFilePath), Some("  "));
    }

    #[test]
    fn test_commit_merges_only_provided_fields() {
        let mut table = table_with(&["v1", "v2"]);
        set_first_row_size(&mut table);
        table.begin_edit("v1").unwrap();

        table
            .commit_edit("v1", &RowPatch::new().with(Field::ManifestFileName, "v1.json"))
            .unwrap();

        let row = table.row("v1").unwrap();
        assert_eq!(row.manifest_file_name.as_deref(), Some("v1.json"));
        assert_eq!(row.map_file_path.as_deref(), Some("/maps"));
        assert_eq!(row.map_file_name.as_deref(), Some("v1.map"));
        assert_eq!(row.map_file_size.as_deref(), Some("2048"));
        assert_eq!(table.row("v2").unwrap().manifest_file_name, None);
        assert_eq!(table.edit_state(), &EditState::Idle);
        assert!(table.commit_error().is_none());
    }

    #[test]
    fn test_commit_applies_draft_edits() {
        let mut table = table_with(&["v1"]);
        table.begin_edit("v1").unwrap();
        if let Some(value) = table
            .draft_mut()
            .and_then(|draft| draft.get_mut(Field::MapFileName))
        {
            value.push_str(".bak");
        }

        table.commit_edit("v1", &RowPatch::new()).unwrap();

        assert_eq!(
            table.row("v1").unwrap().map_file_name.as_deref(),
            Some("v1.map.bak")
        );
    }

    #[test]
    fn test_commit_rejects_duplicate_key() {
        let mut table = table_with(&["v1", "v2"]);
        table.begin_edit("v2").unwrap();

        let err = table
            .commit_edit("v2", &RowPatch::new().with(Field::MapVersionId, "v1"))
            .unwrap_err();

        assert_eq!(
            err,
            TableError::DuplicateKey {
                key: "v1".to_string()
            }
        );
        assert!(err.is_validation());
        assert_unique_keys(&table);
        assert!(table.edit_state().is_editing("v2"));
    }

    #[test]
    fn test_commit_can_rename_key() {
        let mut table = table_with(&["v1", "v2"]);
        table.begin_edit("v2").unwrap();

        table
            .commit_edit("v2", &RowPatch::new().with(Field::MapVersionId, "v3"))
            .unwrap();

        assert_eq!(keys(&table), vec!["v1", "v3"]);
    }

    #[test]
    fn test_commit_for_row_not_editing() {
        let mut table = table_with(&["v1", "v2"]);
        table.begin_edit("v1").unwrap();

        assert_eq!(
            table.commit_edit("v2", &RowPatch::new()),
            Err(TableError::NotEditing("v2".to_string()))
        );
        assert!(table.edit_state().is_editing("v1"));
    }

    #[test]
    fn test_draft_field_without_edit() {
        let mut table = table_with(&["v1"]);

        let err = table.set_draft_field(Field::MapFileName, "x.map").unwrap_err();

        assert_eq!(err, TableError::NoActiveEdit);
        assert_eq!(err.to_string(), "no row is being edited");
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut table = table_with(&["v1"]);
        table.begin_edit("v1").unwrap();
        table.set_draft_field(Field::MapFileName, "other.map").unwrap();

        table.cancel_edit("v1").unwrap();

        assert_eq!(table.edit_state(), &EditState::Idle);
        assert_eq!(
            table.row("v1").unwrap().map_file_name.as_deref(),
            Some("v1.map")
        );
    }

    fn set_first_row_size(table: &mut VersionTable) {
        table.begin_edit("v1").unwrap();
        table
            .commit_edit("v1", &RowPatch::new().with(Field::MapFileSize, "2048"))
            .unwrap();
    }
}

mod row_tests {
    use super::*;

    #[test]
    fn test_add_row_then_commit_empty_path_stays_editing() {
        let mut table = table_with(&["v1"]);

        let key = table.add_row().unwrap();
        assert_eq!(keys(&table), vec!["v1".to_string(), key.to_string()]);

        let err = table
            .commit_edit(
                key.as_str(),
                &RowPatch::new()
                    .with(Field::MapVersionId, "v2")
                    .with(Field::MapFileName, "v2.map")
                    .with(Field::MapFilePath, ""),
            )
            .unwrap_err();

        assert_eq!(
            err,
            TableError::Required {
                field: Field::MapFilePath
            }
        );
        assert!(table.edit_state().is_editing(key.as_str()));
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn test_add_row_commit_then_cancel_is_noop() {
        let mut table = table_with(&["v1"]);
        let key = table.add_row().unwrap();
        table
            .commit_edit(
                key.as_str(),
                &RowPatch::new()
                    .with(Field::MapVersionId, "v2")
                    .with(Field::MapFilePath, "/maps")
                    .with(Field::MapFileName, "v2.map"),
            )
            .unwrap();

        assert_eq!(keys(&table), vec!["v1", "v2"]);
        assert!(table.cancel_edit("v2").is_err());
    }

    #[test]
    fn test_cancel_new_row_removes_placeholder() {
        let mut table = table_with(&["v1"]);
        let key = table.add_row().unwrap();

        table.cancel_edit(key.as_str()).unwrap();

        assert_eq!(keys(&table), vec!["v1"]);
        assert_eq!(table.edit_state(), &EditState::Idle);
    }

    #[test]
    fn test_placeholder_keys_skip_taken_ids() {
        let mut table = table_with(&["new-1", "new-2"]);

        let key = table.add_row().unwrap();

        assert_eq!(key.as_str(), "new-3");
        assert_unique_keys(&table);
    }

    #[test]
    fn test_delete_row_removes_exactly_one_and_keeps_order() {
        let mut table = table_with(&["v1", "v2", "v3", "v4"]);

        let removed = table.delete_row("v2").unwrap();

        assert_eq!(removed.map_version_id, "v2");
        assert_eq!(keys(&table), vec!["v1", "v3", "v4"]);
        assert!(table.delete_row("v2").is_err());
        assert_eq!(table.rows().len(), 3);
    }

    #[test]
    fn test_delete_editing_row_clears_edit() {
        let mut table = table_with(&["v1", "v2"]);
        table.begin_edit("v2").unwrap();

        table.delete_row("v2").unwrap();

        assert_eq!(table.edit_state(), &EditState::Idle);
        table.begin_edit("v1").unwrap();
    }

    #[test]
    fn test_keys_stay_unique_across_operations() {
        let mut table = table_with(&["v1", "v2"]);

        let first = table.add_row().unwrap();
        table
            .commit_edit(
                first.as_str(),
                &RowPatch::new()
                    .with(Field::MapVersionId, "v2")
                    .with(Field::MapFilePath, "/maps")
                    .with(Field::MapFileName, "dup.map"),
            )
            .unwrap_err();
        table.cancel_edit(first.as_str()).unwrap();
        assert_unique_keys(&table);

        let second = table.add_row().unwrap();
        table
            .commit_edit(
                second.as_str(),
                &RowPatch::new()
                    .with(Field::MapVersionId, "v3")
                    .with(Field::MapFilePath, "/maps")
                    .with(Field::MapFileName, "v3.map"),
            )
            .unwrap();
        table.delete_row("v1").unwrap();
        let third = table.add_row().unwrap();
        assert_unique_keys(&table);

        table.cancel_edit(third.as_str()).unwrap();
        assert_eq!(keys(&table), vec!["v2", "v3"]);
    }

    #[test]
    fn test_publish_and_take_offline() {
        let mut table = table_with(&["v1"]);

        table.publish("v1").unwrap();
        assert_eq!(table.row("v1").unwrap().map_status, Some(MapStatus::Online));

        table.take_offline("v1").unwrap();
        assert_eq!(table.row("v1").unwrap().map_status, Some(MapStatus::Offline));

        assert!(table.publish("missing").is_err());
    }
}

mod resize_tests {
    use super::*;

    #[test]
    fn test_resize_keeps_last_width_and_leaves_others() {
        let mut table = table_with(&["v1"]);

        table.resize_column(0, 120.0).unwrap();
        table.resize_column(0, 200.0).unwrap();

        assert_eq!(table.widths().width(0), Some(200.0));
        assert!(!table.widths().is_overridden(1));
    }

    #[test]
    fn test_resize_rejects_bad_input() {
        let mut table = table_with(&["v1"]);

        assert_eq!(
            table.resize_column(99, 100.0),
            Err(TableError::ColumnOutOfRange { index: 99 })
        );
        assert!(table.resize_column(0, f32::NAN).is_err());
        assert!(!table.widths().is_overridden(0));

        assert_eq!(table.resize_column(0, 5.0), Ok(40.0));
    }
}

mod load_tests {
    use super::*;

    fn loaded(generation: u64, rows: Vec<MapVersion>, total: u64) -> MapListCompute {
        MapListCompute {
            result: MapListResult::Loaded {
                generation,
                page: MapPage { rows, total },
            },
        }
    }

    #[test]
    fn test_load_replaces_rows_and_total() {
        let mut table = table_with(&["old"]);
        table.begin_load(table.params().clone().with_page(2));

        let changed = table.reconcile(
            &loaded(1, vec![version("v1", "/a", "a.map"), version("v2", "/b", "b.map")], 12),
            Utc::now(),
        );

        assert!(changed);
        assert!(!table.is_loading());
        assert_eq!(keys(&table), vec!["v1", "v2"]);
        assert_eq!(table.pagination().total, 12);
        assert_eq!(table.pagination().current, 2);
        assert_eq!(table.pagination().page_count(), 2);
    }

    #[test]
    fn test_failed_load_keeps_rows_and_notifies() {
        let mut table = table_with(&["v1"]);
        table.begin_load(table.params().clone());

        let changed = table.reconcile(
            &MapListCompute {
                result: MapListResult::Error {
                    generation: 1,
                    message: "server responded with status 500".to_string(),
                },
            },
            Utc::now(),
        );

        assert!(changed);
        assert!(!table.is_loading());
        assert_eq!(keys(&table), vec!["v1"]);
        let notification = &table.notifications()[0];
        assert_eq!(notification.level, NotificationLevel::Error);
        assert!(notification.message.contains("status 500"));
    }

    #[test]
    fn test_stale_result_never_reaches_table() {
        let mut table = VersionTable::new(10);
        assert!(table.reconcile(&loaded(3, vec![version("new", "/n", "n.map")], 1), Utc::now()));

        assert!(!table.reconcile(&loaded(2, vec![version("old", "/o", "o.map")], 1), Utc::now()));
        assert!(!table.reconcile(&loaded(3, vec![version("old", "/o", "o.map")], 1), Utc::now()));

        assert_eq!(keys(&table), vec!["new"]);
    }

    #[test]
    fn test_status_label_of_loaded_row() {
        let rows: Vec<MapVersion> = serde_json::from_str(
            r#"[{"mapVersionId": "v1", "mapFileName": "a.map", "mapStatus": 0}]"#,
        )
        .unwrap();
        let mut table = VersionTable::new(10);

        table.reconcile(&loaded(1, rows, 1), Utc::now());

        assert_eq!(table.rows().len(), 1);
        let status = table.row("v1").unwrap().map_status.unwrap();
        assert_eq!(status.label(), "已上线");
    }

    #[test]
    fn test_reload_discards_unsaved_new_row_with_same_key() {
        let mut table = table_with(&["v1"]);
        let key = table.add_row().unwrap();
        assert_eq!(key.as_str(), "new-1");

        table.reconcile(
            &loaded(1, vec![version("new-1", "/srv", "srv.map"), version("v9", "/b", "b.map")], 2),
            Utc::now(),
        );

        assert_eq!(table.edit_state(), &EditState::Idle);
        assert!(table.cancel_edit("new-1").is_err());
        assert_eq!(keys(&table), vec!["new-1", "v9"]);
        assert_eq!(
            table.row("new-1").unwrap().map_file_name.as_deref(),
            Some("srv.map")
        );
    }

    #[test]
    fn test_reload_keeps_edit_of_surviving_row() {
        let mut table = table_with(&["v1", "v2"]);
        table.begin_edit("v2").unwrap();

        table.reconcile(
            &loaded(1, vec![version("v2", "/b", "b.map")], 1),
            Utc::now(),
        );

        assert_eq!(table.editing_key().map(|key| key.to_string()), Some("v2".to_string()));
    }
}
