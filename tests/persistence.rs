use led_gauge::{
    Color, ColorScaleRecord, Dimmer, LedPointer, LedRecord, Length, LinearColorScale, Prop, Scene,
    SettingValue,
};

#[test]
fn record_skips_derived_parameter() {
    let mut pointer = LedPointer::new(Scene::new());
    pointer.set_gap("2%").set_size(8.0).set_count(12);
    let record = pointer.record();
    assert_eq!(record.gap, None);
    assert_eq!(record.size, Some(SettingValue::Number(8.0)));
    assert_eq!(record.count, Some(SettingValue::Number(12.0)));

    let json = record.to_json_string().unwrap();
    assert!(!json.contains("\"gap\""));
    assert!(json.contains("\"colorScale\""));
}

#[test]
fn percent_values_survive_a_round_trip() {
    let mut pointer = LedPointer::new(Scene::new());
    pointer.set_gap("1.5%").set_size("4%");
    let json = pointer.record().to_json_string().unwrap();
    assert!(json.contains("\"1.5%\""));

    let mut restored = LedPointer::new(Scene::new());
    restored.apply_record(&LedRecord::from_json_str(&json).unwrap());
    assert_eq!(restored.gap(), Some(Length::Percent(1.5)));
    assert_eq!(restored.size(), Some(Length::Percent(4.0)));
    assert_eq!(restored.count(), None);
}

#[test]
fn restore_replays_setters_in_fixed_order() {
    // Live pair built as count then gap; replay order is gap, size, count.
    let mut pointer = LedPointer::new(Scene::new());
    pointer.set_count(6).set_gap(3.0);
    let record = pointer.record();

    let mut restored = LedPointer::new(Scene::new());
    restored.apply_record(&record);
    assert_eq!(restored.gap(), pointer.gap());
    assert_eq!(restored.count(), pointer.count());
    assert_eq!(restored.size(), None);
    let history: Vec<Prop> = restored.constraints().history().collect();
    assert_eq!(history, vec![Prop::Gap, Prop::Count]);
}

#[test]
fn literal_dimmer_and_color_scale_are_persisted() {
    let mut pointer = LedPointer::new(Scene::new());
    let colors = vec![Color::new(0, 0, 0), Color::new(255, 255, 255)];
    pointer
        .set_count(4)
        .set_size(2.0)
        .set_dimmer(Dimmer::Literal(None))
        .set_color_scale(Box::new(LinearColorScale::new(colors.clone()).with_range(0.0, 50.0)));

    let record = pointer.record();
    assert_eq!(record.dimmer, Some(None));
    assert_eq!(
        record.color_scale,
        ColorScaleRecord::Linear {
            colors,
            minimum: Some(0.0),
            maximum: Some(50.0)
        }
    );

    let json = record.to_json_string().unwrap();
    assert!(json.contains("\"dimmer\": \"none\""));
    let back = LedRecord::from_json_str(&json).unwrap();
    assert_eq!(back, record);

    let mut restored = LedPointer::new(Scene::new());
    restored.apply_record(&back);
    assert_eq!(restored.dimmer().literal(), Some(None));
    assert_eq!(restored.color_scale().record(), record.color_scale);
}

#[test]
fn function_dimmer_is_not_persisted() {
    let pointer = LedPointer::new(Scene::new());
    assert_eq!(pointer.record().dimmer, None);
}

#[test]
fn invalid_values_in_record_are_ignored() {
    let json = r#"{
        "colorScale": {"type": "ordinal", "ranges": []},
        "gap": -1,
        "size": "abc",
        "count": 7
    }"#;
    let record = LedRecord::from_json_str(json).unwrap();
    let mut pointer = LedPointer::new(Scene::new());
    pointer.set_size(5.0);
    pointer.apply_record(&record);
    assert_eq!(pointer.gap(), None);
    assert_eq!(pointer.size(), Some(Length::Absolute(5.0)));
    assert_eq!(pointer.count(), Some(7));
}
