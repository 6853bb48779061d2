use supplygrid::state::data_model::{
    Field, FieldKind, FieldValue, Row, SupplierStatus, ValidationError,
};

#[test]
fn test_field_kinds_and_columns() {
    assert_eq!(Field::Website.kind(), FieldKind::Url);
    assert_eq!(Field::Preferred.kind(), FieldKind::Boolean);
    assert_eq!(Field::Status.column_index(), Some(3));
    assert_eq!(Field::Preferred.column_index(), None);
    assert_eq!(Field::from_column_index(1), Some(Field::Website));
    assert_eq!(Field::from_column_index(4), None);
}

#[test]
fn test_from_input_builds_typed_values() {
    assert_eq!(
        FieldValue::from_input(Field::Phone, "555 0100"),
        Ok(FieldValue::Phone("555 0100".into()))
    );
    assert_eq!(
        FieldValue::from_input(Field::Status, "onHold"),
        Ok(FieldValue::Enum(SupplierStatus::OnHold))
    );
    assert_eq!(
        FieldValue::from_input(Field::Preferred, "on"),
        Ok(FieldValue::Boolean(true))
    );
    assert_eq!(
        FieldValue::from_input(Field::Preferred, ""),
        Ok(FieldValue::Boolean(false))
    );
}

#[test]
fn test_from_input_rejects_unknown_codes() {
    assert_eq!(
        FieldValue::from_input(Field::Status, "paused"),
        Err(ValidationError::UnknownStatus("paused".into()))
    );
    assert!(matches!(
        FieldValue::from_input(Field::Preferred, "maybe"),
        Err(ValidationError::KindMismatch { field: Field::Preferred, .. })
    ));
}

#[test]
fn test_name_must_not_be_blank() {
    assert_eq!(
        FieldValue::Text("  ".into()).validate_for(Field::Name),
        Err(ValidationError::EmptyName)
    );
    assert!(FieldValue::Text("Acme".into()).validate_for(Field::Name).is_ok());
}

#[test]
fn test_website_validation() {
    for ok in ["", "acme.example.com", "https://acme.example.com/path?q=1", "http://localhost.test:8080"] {
        assert!(FieldValue::Url(ok.into()).validate_for(Field::Website).is_ok(), "{ok}");
    }
    for bad in ["acme", "acme example.com", "https://.example.com", "ftp//x"] {
        assert!(FieldValue::Url(bad.into()).validate_for(Field::Website).is_err(), "{bad}");
    }
}

#[test]
fn test_phone_validation() {
    for ok in ["", "+1 (555) 010-0001", "555.010.0001", "5550100"] {
        assert!(FieldValue::Phone(ok.into()).validate_for(Field::Phone).is_ok(), "{ok}");
    }
    for bad in ["555", "call me", "555-010-ABCD"] {
        assert!(FieldValue::Phone(bad.into()).validate_for(Field::Phone).is_err(), "{bad}");
    }
}

#[test]
fn test_kind_mismatch_is_invalid() {
    let err = FieldValue::Boolean(true).validate_for(Field::Name).unwrap_err();
    assert_eq!(err.to_string(), "value 'true' does not fit the Name column");
}

#[test]
fn test_row_set_refuses_wrong_kind() {
    let mut row = Row::new("R1", "Acme");
    assert!(!row.set(Field::Name, FieldValue::Boolean(true)));
    assert_eq!(row.name, "Acme");
    assert!(row.set(Field::Preferred, FieldValue::Boolean(true)));
    assert!(row.preferred);
}

#[test]
fn test_display_and_input_text() {
    let status = FieldValue::Enum(SupplierStatus::OnHold);
    assert_eq!(status.display(), "On hold");
    assert_eq!(status.input_text(), "onHold");
    assert_eq!(Row::new("R1", "Acme").get(Field::Status), FieldValue::Enum(SupplierStatus::Active));
}

#[test]
fn test_row_json_shape() {
    let row = Row::new("R1", "Acme").with_status(SupplierStatus::OnHold);
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["id"], "R1");
    assert_eq!(json["status"], "onHold");
    assert_eq!(json["preferred"], false);

    let parsed: Row = serde_json::from_str(r#"{"id":"R2","name":"Beta"}"#).unwrap();
    assert_eq!(parsed, Row::new("R2", "Beta"));
}
