use scenariogen_schema::prelude::*;

fn sample_schema() -> EventSchema {
    let mut types = TypeRegistry::new();
    types.insert(TypeDefinition::structure(
        "TermValues",
        vec![
            RawField::new("annual_rate", "AnnualRatePct"),
            RawField::new("duration", "FacilityDuration"),
            RawField::new("fees", "Vec<Fee>"),
        ],
    ));
    types.insert(
        TypeDefinition::enumeration(
            "FacilityDuration",
            vec![
                RawVariant::structure("Months", vec![RawField::new("count", "u32")]),
                RawVariant::unit("Open"),
            ],
        )
        .with_serde(TaggingMode::Internal, Some(RenameRule::Snake)),
    );
    types.insert(TypeDefinition::newtype("AnnualRatePct", "Decimal"));
    types.insert(TypeDefinition::structure(
        "Fee",
        vec![
            RawField::new("amount", "UsdCents"),
            RawField::new("parent", "Option<Box<Fee>>").optional(true),
        ],
    ));

    let raw = RawEventEnum::new(
        "CreditFacilityEvent",
        vec![
            RawEventVariant::new(
                "Initialized",
                vec![
                    RawField::new("id", "CreditFacilityId"),
                    RawField::new("terms", "TermValues"),
                    RawField::new("amount", "UsdCents"),
                ],
            ),
            RawEventVariant::new(
                "ApprovalProcessConcluded",
                vec![
                    RawField::new("approved", "bool"),
                    RawField::new("concluded_at", "Option<DateTime<Utc>>"),
                ],
            ),
        ],
    )
    .with_rename_rule(Some(RenameRule::Snake));

    let naming = TableNaming::default();
    EventSchema::build(
        types,
        [raw],
        SchemaContext {
            naming: &naming,
            classifier: Classifier::default(),
        },
        Provenance::now("/src/lana"),
    )
}

#[test]
fn save_then_load_reproduces_records_and_trees() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("schema.json");
    let schema = sample_schema();

    schema.save(&path).expect("save");
    let loaded = EventSchema::load(&path).expect("load");

    assert_eq!(loaded, schema);
    assert_eq!(loaded.parsed_at, schema.parsed_at);

    let terms = &loaded
        .variant("CreditFacilityEvent", "Initialized")
        .expect("variant")
        .fields[1];
    assert_eq!(terms.category, Category::Config);
    assert_eq!(
        terms.resolved,
        schema.events["CreditFacilityEvent"].variants[0].fields[1].resolved
    );
}

#[test]
fn loaded_registry_resolves_like_the_original() {
    let schema = sample_schema();
    let loaded = EventSchema::from_json(&schema.to_json().expect("json")).expect("parse");

    assert_eq!(loaded.types.cache_len(), 0, "memo cache is not persisted");
    assert_eq!(
        *loaded.types.resolve("TermValues"),
        *schema.types.resolve("TermValues")
    );
    assert_eq!(
        loaded.types.resolve("Fee").cycle_targets().into_iter().collect::<Vec<_>>(),
        vec!["Fee".to_string()]
    );
}

#[test]
fn artifact_layout_is_stable() {
    let schema = sample_schema();
    let value: serde_json::Value =
        serde_json::from_str(&schema.to_json().expect("json")).expect("parse");

    assert!(value["parsed_at"].is_string());
    assert_eq!(value["source_path"], "/src/lana");
    assert_eq!(value["types"]["AnnualRatePct"]["kind"], "newtype");

    let field = &value["events"]["CreditFacilityEvent"]["variants"][1]["fields"][1];
    assert_eq!(field["name"], "concluded_at");
    assert_eq!(field["type"], "DateTime<Utc>");
    assert_eq!(field["category"], "temporal");
    assert_eq!(field["optional"], true);
    assert_eq!(field["resolved"]["kind"], "scalar");
    assert_eq!(field["resolved"]["origin"], "foreign");
}
