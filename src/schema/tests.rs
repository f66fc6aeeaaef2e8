//! Class inference and emission tests

use super::*;
use crate::error::Error;
use crate::prompt::ScriptedPrompter;
use crate::types::{BuildOptions, FieldMapping};
use pretty_assertions::assert_eq;
use serde_json::json;

fn build_auto(sample: serde_json::Value, name: &str, options: &BuildOptions) -> crate::types::EmittedUnit {
    let mut prompter = ScriptedPrompter::auto();
    build(&mut prompter, &sample, FieldMapping::named(name), options).unwrap()
}

#[test]
fn test_emit_flat_class() {
    let unit = build_auto(json!({"id": 1, "user_name": "a"}), "Tiny", &BuildOptions::default());

    let expected = r#"/// {@tool json2dart --name Tiny}
/// * id: `1`
/// * userName(user_name): `"a"`
/// {@end-tool}
class Tiny {
  num? id;
  String? userName;

  Tiny({
    this.id,
    this.userName,
  });

  Tiny.fromJson(Map<String, dynamic> json) {
    id = json["id"] as num?;
    userName = json["user_name"] as String?;
  }

  Map<String, dynamic> toJson() {
    final json = <String, dynamic>{};
    json["id"] = id;
    json["user_name"] = userName;
    return json;
  }
}
"#;
    assert_eq!(unit.code, expected);
    assert_eq!(unit.name, "Tiny");
    assert!(unit.map.map.is_empty());
}

#[test]
fn test_emit_empty_class() {
    let unit = build_auto(json!({}), "Empty", &BuildOptions::default());
    assert!(unit.code.contains("  Empty();\n"));
    assert!(unit.code.contains("/// {@tool json2dart --name Empty}\n/// {@end-tool}\n"));
}

#[test]
fn test_nested_classes_in_discovery_order() {
    let unit = build_auto(
        json!({"profile": {"age": 2, "address": {"city": "x"}}, "tags": ["a"]}),
        "User",
        &BuildOptions::default(),
    );

    let user = unit.code.find("class User {").unwrap();
    let profile = unit.code.find("class UserProfile {").unwrap();
    let address = unit.code.find("class UserProfileAddress {").unwrap();
    assert!(user < profile && profile < address);

    assert!(unit.code.contains("  UserProfile? profile;"));
    assert!(unit.code.contains("/// * profile: `UserProfile()`"));
    assert!(unit.code.contains(
        "    profile = json[\"profile\"] != null ? UserProfile.fromJson(json[\"profile\"]) : null;"
    ));
    assert!(unit.code.contains("  List<String>? tags;"));
    assert!(unit.code.contains("/// * tags: `[\"a\"]`"));

    assert_eq!(unit.map.map["profile"].name.as_deref(), Some("UserProfile"));
    assert_eq!(
        unit.map.map["profile"].map["address"].name.as_deref(),
        Some("UserProfileAddress")
    );
    assert!(!unit.map.map.contains_key("tags"));
}

#[test]
fn test_array_item_naming() {
    let unit = build_auto(
        json!({"items": [{"id": 1}, {"id": 2, "label": "b"}]}),
        "Order",
        &BuildOptions::default(),
    );

    let items = &unit.map.map["items"];
    assert_eq!(items.name.as_deref(), Some("OrderItemsItem"));
    assert_eq!(items.name_trim.as_deref(), Some("Item"));
    assert!(unit.code.contains("  List<OrderItemsItem>? items;"));
    assert!(unit.code.contains("/// * items: `<OrderItemsItem>[]`"));
    // merged item carries the union of keys
    assert!(unit.code.contains("  String? label;"));
}

#[test]
fn test_array_item_children_use_trimmed_stem() {
    let unit = build_auto(
        json!({"items": [{"meta": {"a": 1}}]}),
        "Order",
        &BuildOptions::default(),
    );
    assert_eq!(
        unit.map.map["items"].map["meta"].name.as_deref(),
        Some("OrderItemsMeta")
    );
}

#[test]
fn test_array_alias_and_no_suffix() {
    let options = BuildOptions::default().with_array_aliases(["list"]);
    let unit = build_auto(json!({"list": [{"id": 1}]}), "Page", &options);
    assert_eq!(unit.map.map["list"].name.as_deref(), Some("PageItem"));

    let options = BuildOptions {
        suffix: false,
        ..BuildOptions::default()
    };
    let unit = build_auto(json!({"rows": [{"id": 1}]}), "Page", &options);
    assert_eq!(unit.map.map["rows"].name.as_deref(), Some("PageRows"));
    assert!(unit.map.map["rows"].name_trim.is_none());
}

#[test]
fn test_no_concat_with_prefix() {
    let options = BuildOptions::default().with_concat(false).with_prefix("Api");
    let unit = build_auto(
        json!({"owner": {"team": {"id": 1}}, "repos": [{"id": 1}]}),
        "Org",
        &options,
    );
    assert_eq!(unit.map.map["owner"].name.as_deref(), Some("ApiOwner"));
    assert_eq!(unit.map.map["owner"].map["team"].name.as_deref(), Some("ApiTeam"));
    assert_eq!(unit.map.map["repos"].name.as_deref(), Some("ApiReposItem"));
}

#[test]
fn test_prefix_not_repeated_when_concatenating() {
    let options = BuildOptions::default().with_prefix("Api");
    let unit = build_auto(json!({"owner": {"team": {"id": 1}}}), "Org", &options);
    assert_eq!(unit.map.map["owner"].name.as_deref(), Some("ApiOrgOwner"));
    assert_eq!(
        unit.map.map["owner"].map["team"].name.as_deref(),
        Some("ApiOrgOwnerTeam")
    );
}

#[test]
fn test_strict_numeric_split() {
    let options = BuildOptions::default().with_strict(true);
    let unit = build_auto(json!({"a": 1, "b": 1.5, "c": [1, 2]}), "Num", &options);

    assert!(unit.code.contains("/// {@tool json2dart --name Num}"));
    assert!(unit.code.contains("  int? a;"));
    assert!(unit.code.contains("    a = (json[\"a\"] as num?)?.toInt();"));
    assert!(unit.code.contains("  double? b;"));
    assert!(unit.code.contains("    b = (json[\"b\"] as num?)?.toDouble();"));
    assert!(unit.code.contains("/// * b: `1.5`"));
    assert!(unit.code.contains("  List<int>? c;"));
    assert!(unit
        .code
        .contains("    c = (json[\"c\"] as List?)?.map((v) => (v as num).toInt()).toList();"));
}

#[test]
fn test_non_strict_uses_num() {
    let unit = build_auto(json!({"a": 1, "b": 1.5}), "Num", &BuildOptions::default());
    assert!(unit.code.contains("  num? a;"));
    assert!(unit.code.contains("  num? b;"));
    assert!(!unit.code.contains("int?"));
}

#[test]
fn test_class_strict_is_marked() {
    let mut prompter = ScriptedPrompter::auto();
    let map = FieldMapping {
        strict: true,
        ..FieldMapping::named("Num")
    };
    let unit = build(&mut prompter, &json!({"a": 2}), map, &BuildOptions::default()).unwrap();
    assert!(unit.code.contains("/// {@tool json2dart --name Num --strict}"));
    assert!(unit.code.contains("  int? a;"));
}

#[test]
fn test_null_is_dynamic() {
    let unit = build_auto(json!({"gone": null}), "N", &BuildOptions::default());
    assert!(unit.code.contains("  dynamic gone;"));
    assert!(unit.code.contains("    gone = json[\"gone\"];"));
    assert!(unit.code.contains("/// * gone: `null`"));
}

#[test]
fn test_invalid_key_containment() {
    let unit = build_auto(
        json!({"bad-key": 1, "child": {"x": 1}}),
        "Top",
        &BuildOptions::default(),
    );
    assert!(!unit.code.contains("class Top {"));
    assert!(unit.code.contains("class TopChild {"));
    assert!(unit.code.starts_with("/// {@tool json2dart --name TopChild}"));
}

#[test]
fn test_blockless_class_literal_is_never_elided() {
    let unit = build_auto(
        json!({"c": {"bad-key": 1, "inner": {"z": 1}}, "p": {"x": 1}, "k": 1}),
        "Root",
        &BuildOptions::default(),
    );
    assert!(unit
        .code
        .contains("/// * c: `RootC({\"bad-key\":1,\"inner\":{\"z\":1}})`"));
    assert!(unit.code.contains("/// * p: `RootP()`"));
    assert!(!unit.code.contains("class RootC {"));
    assert!(unit.code.contains("class RootCInner {"));
}

#[test]
fn test_invalid_class_name_emits_nothing_for_node() {
    let mut prompter = ScriptedPrompter::new(["9lives"]);
    let unit = build(
        &mut prompter,
        &json!({"cat": {"lives": 9}}),
        FieldMapping::named("Home"),
        &BuildOptions::default(),
    )
    .unwrap();
    assert!(unit.code.contains("class Home {"));
    assert!(!unit.code.contains("class 9lives"));
    assert!(unit.code.contains("/// * cat: `{\"lives\":9}`"));
}

#[test]
fn test_prompt_order_and_answers() {
    let mut prompter = ScriptedPrompter::new(["", "Row"]);
    let unit = build(
        &mut prompter,
        &json!({"a": {"x": 1}, "b": [{"y": 1}]}),
        FieldMapping::named("Top"),
        &BuildOptions::default(),
    )
    .unwrap();

    let asked = prompter.asked();
    assert_eq!(asked.len(), 2);
    assert!(asked[0].contains("  0. The default object name (TopA)"));
    assert!(asked[0].ends_with("Enter a new name or the number above (0): "));
    assert_eq!(asked[1], "Enter name of item of array (TopBItem): ");
    assert!(prompter.output().contains("detected(Top.b[])"));

    assert_eq!(unit.map.map["a"].name.as_deref(), Some("TopA"));
    assert_eq!(unit.map.map["b"].name.as_deref(), Some("Row"));
    assert!(unit.code.contains("class Row {"));
}

#[test]
fn test_previous_answers_are_defaults() {
    let mut map = FieldMapping::named("Top");
    map.map.insert("a".to_string(), FieldMapping::named("Kept"));
    let mut prompter = ScriptedPrompter::new([""]);
    let unit = build(&mut prompter, &json!({"a": {"x": 1}}), map, &BuildOptions::default()).unwrap();
    assert!(prompter.asked()[0].contains("(Kept)"));
    assert!(unit.code.contains("class Kept {"));
}

#[test]
fn test_mapped_field_elaborates_first_value_only() {
    let mut prompter = ScriptedPrompter::new(["1", "Member"]);
    let unit = build(
        &mut prompter,
        &json!({"users": {"u1": {"age": 1}, "u2": {"age": 2, "extra": true}}}),
        FieldMapping::named("Team"),
        &BuildOptions::default(),
    )
    .unwrap();

    assert_eq!(prompter.asked().len(), 2);
    assert!(prompter.output().contains("detected(TeamUsers.u1)"));

    let users = &unit.map.map["users"];
    assert!(users.mapped);
    assert_eq!(users.map.len(), 1);
    assert_eq!(users.map["u1"].name.as_deref(), Some("Member"));
    assert!(!users.map["u1"].suffix);

    assert!(unit.code.contains("  Map<String, Member>? users;"));
    assert!(unit.code.contains("/// * users: `<String, Member>{\"u1\":{}}`"));
    assert!(unit.code.contains("class Member {"));
    assert!(!unit.code.contains("extra"));
}

#[test]
fn test_mapped_scalar_values_become_dynamic() {
    let mut prompter = ScriptedPrompter::new(["map"]);
    let unit = build(
        &mut prompter,
        &json!({"scores": {"a": 1, "b": 2}}),
        FieldMapping::named("Game"),
        &BuildOptions::default(),
    )
    .unwrap();
    assert!(unit.map.map["scores"].dynamic);
    assert!(!unit.map.map["scores"].mapped);
    assert!(unit.code.contains("/// * scores: `<String, dynamic>{\"a\":1,\"b\":2}`"));
}

#[test]
fn test_dynamic_field_keeps_literal() {
    let mut prompter = ScriptedPrompter::new(["2"]);
    let unit = build(
        &mut prompter,
        &json!({"meta": {"k": {"deep": 1}}}),
        FieldMapping::named("Doc"),
        &BuildOptions::default(),
    )
    .unwrap();

    assert!(unit.map.map["meta"].dynamic);
    assert!(unit.code.contains("  Map<String, dynamic>? meta;"));
    assert!(unit.code.contains("/// * meta: `<String, dynamic>{\"k\":{\"deep\":1}}`"));
    assert_eq!(unit.code.matches("class ").count(), 1);
    assert_eq!(prompter.asked().len(), 1);
}

#[test]
fn test_ignored_field_is_plain() {
    let mut map = FieldMapping::named("Doc");
    map.map.insert(
        "raw".to_string(),
        FieldMapping {
            ignore: true,
            ..Default::default()
        },
    );
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let unit = build(&mut prompter, &json!({"raw": {"a": [1]}}), map, &BuildOptions::default()).unwrap();
    assert!(prompter.asked().is_empty());
    assert!(unit.code.contains("  Map<String, dynamic>? raw;"));
    assert!(unit.code.contains("/// * raw: `{\"a\":[1]}`"));
}

#[test]
fn test_max_comment_keeps_short_literals() {
    let options = BuildOptions::default().with_max_comment(100);
    let unit = build_auto(
        json!({"p": {"a": 1}, "l": [{"b": 2}, {"c": 3}]}),
        "T",
        &options,
    );
    assert!(unit.code.contains("/// * p: `TP({\"a\":1})`"));
    assert!(unit.code.contains("/// * l: `<TLItem>[{\"b\":2,\"c\":3}]`"));
}

#[test]
fn test_variable_name_avoids_keys() {
    let unit = build_auto(json!({"json": 1, "d": 2}), "V", &BuildOptions::default());
    assert!(unit.code.contains("  V.fromJson(Map<String, dynamic> v) {"));
    assert!(unit.code.contains("    final r = <String, dynamic>{};"));
    assert!(unit.code.contains("    json = v[\"json\"] as num?;"));
}

#[test]
fn test_variable_name_exhausted() {
    let options = BuildOptions::default().with_variables(["a"]);
    let mut prompter = ScriptedPrompter::auto();
    let err = build(
        &mut prompter,
        &json!({"json": 1, "a": 2}),
        FieldMapping::named("V"),
        &options,
    )
    .unwrap_err();
    match &err {
        Error::VariableNameExhausted { class, method, .. } => {
            assert_eq!(class, "V");
            assert_eq!(method, "fromJson");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.raw().unwrap().contains("\"json\": 1"));
}

#[test]
fn test_name_collision_widens_first_class() {
    let mut prompter = ScriptedPrompter::new(["Same", "Same"]);
    let unit = build(
        &mut prompter,
        &json!({"a": {"x": 1}, "b": {"y": "s", "x": 5}}),
        FieldMapping::named("Top"),
        &BuildOptions::default().with_max_comment(100),
    )
    .unwrap();

    assert_eq!(unit.code.matches("class Same {").count(), 1);
    let block = &unit.code[unit.code.find("--name Same").unwrap()..];
    assert!(block.contains("/// * x: `1`\n/// * y: `\"s\"`"));
}

#[test]
fn test_top_array_is_collapsed() {
    let unit = build_auto(json!([{"a": 1}, {"b": true}]), "Row", &BuildOptions::default());
    assert!(unit.code.contains("  num? a;"));
    assert!(unit.code.contains("  bool? b;"));
}

#[test]
fn test_top_scalar_is_rejected() {
    let mut prompter = ScriptedPrompter::auto();
    let err = build(&mut prompter, &json!(3), FieldMapping::named("X"), &BuildOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSample { .. }));
}

#[test]
fn test_missing_top_name_is_rejected() {
    let mut prompter = ScriptedPrompter::auto();
    let err = build(&mut prompter, &json!({}), FieldMapping::default(), &BuildOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSample { .. }));
}

#[test]
fn test_prompt_closed_surfaces() {
    let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
    let err = build(
        &mut prompter,
        &json!({"a": {"b": 1}}),
        FieldMapping::named("T"),
        &BuildOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::PromptClosed { .. }));
}

#[test]
fn test_classify() {
    let named = FieldMapping::named("Item");
    assert_eq!(classify(&json!(1), None), FieldKind::Scalar);
    assert_eq!(classify(&json!([1]), Some(&named)), FieldKind::PlainList);
    assert_eq!(classify(&json!([]), Some(&named)), FieldKind::PlainList);
    assert_eq!(classify(&json!([{"a": 1}]), Some(&named)), FieldKind::ClassList("Item"));
    assert_eq!(classify(&json!({"a": 1}), None), FieldKind::PlainMap);
    assert_eq!(classify(&json!({"a": 1}), Some(&named)), FieldKind::Class("Item"));

    let invalid = FieldMapping::named("1x");
    assert_eq!(classify(&json!({"a": 1}), Some(&invalid)), FieldKind::PlainMap);

    let mut mapped = FieldMapping {
        mapped: true,
        ..FieldMapping::named("Box")
    };
    assert_eq!(classify(&json!({"a": {}}), Some(&mapped)), FieldKind::Dynamic);
    mapped.map.insert("k".to_string(), named.clone());
    assert_eq!(
        classify(&json!({"k": {}}), Some(&mapped)),
        FieldKind::Mapped {
            class: "Item",
            key: "k"
        }
    );
}
