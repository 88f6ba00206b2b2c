use lighting_savings::input::Input;
use schemars::schema_for;

#[test]
fn test_generate_json_schema() {
    let schema = schema_for!(Input);
    assert!(serde_json::to_string_pretty(&schema).is_ok());
}

#[test]
fn test_schema_describes_policy_and_proposal_sections() {
    let schema = serde_json::to_value(schema_for!(Input)).unwrap();
    let properties = &schema["properties"];

    assert!(properties["policy"].is_object());
    assert!(properties["proposals"].is_object());
    assert!(properties["operation_schedule"].is_object());
}
