use gbp_catalog::*;

#[test]
fn all_is_in_dependency_order() {
    for (i, kind) in EntityKind::ALL.iter().enumerate() {
        for relation in kind.relations() {
            let target_pos = EntityKind::ALL
                .iter()
                .position(|k| *k == relation.target)
                .unwrap();
            assert!(
                target_pos < i,
                "{} relates to {} which is seeded later",
                kind,
                relation.target
            );
        }
    }
}

#[test]
fn naming_table_is_consistent() {
    for kind in EntityKind::ALL {
        assert_eq!(EntityKind::from_collection(kind.collection()), Some(kind));
        assert!(!kind.dump_table().is_empty());
        assert!(
            kind.collection()
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'),
            "collection '{}' is not snake_case",
            kind.collection()
        );
    }
}

#[test]
fn collection_names_are_unique() {
    let mut names: Vec<_> = EntityKind::ALL.iter().map(|k| k.collection()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), EntityKind::ALL.len());
}

#[test]
fn parse_kind_from_label_or_collection() {
    let parse = |s: &str| s.parse::<EntityKind>().unwrap();
    assert_eq!(parse("WeaponType"), EntityKind::WeaponType);
    assert_eq!(parse("weapon_types"), EntityKind::WeaponType);
    assert_eq!(parse("characters"), EntityKind::Character);
    assert!("teams".parse::<EntityKind>().is_err());
}

#[test]
fn icon_and_relation_layout() {
    assert!(!EntityKind::Special.has_icon());
    assert!(EntityKind::Weapon.has_icon());

    let weapon = EntityKind::Weapon.relations();
    assert_eq!(weapon.len(), 2);
    assert_eq!(weapon[0].field, "weapon_type");
    assert!(weapon[0].required);
    assert_eq!(weapon[1].field, "special");
    assert!(!weapon[1].required);

    let artifact_type = EntityKind::ArtifactType.relations();
    assert_eq!(artifact_type[0].target, EntityKind::Special);
    assert!(artifact_type[0].many);
}

#[test]
fn collection_rules() {
    let public = CollectionInfo {
        id: "pbc_1".to_string(),
        name: "weapons".to_string(),
        collection_type: CollectionType::Base,
        list_rule: Some(String::new()),
        view_rule: Some(String::new()),
    };
    assert!(public.is_publicly_listable());

    let locked = CollectionInfo {
        list_rule: None,
        ..public.clone()
    };
    assert!(!locked.is_publicly_listable());
}

#[test]
fn live_records_serialize_with_snake_case_fields() {
    let weapon = Weapon {
        id: "w1".to_string(),
        name: "Iron Blade".to_string(),
        rarity: 3,
        weapon_type: "wt1".to_string(),
        special: None,
        icon: String::new(),
    };
    let json = serde_json::to_value(&weapon).unwrap();
    assert_eq!(json["weapon_type"], "wt1");
    assert!(json["special"].is_null());
}
