use hypercube_system_interpolation::{
    score_from, tunable_from, InterpolationTable, TableError, FALLBACK_SCORE,
};

#[derive(Clone, Debug, Default, PartialEq)]
enum Grade {
    #[default]
    Unset,
    A,
    B,
    C,
}

#[test]
fn tunable_lookup_uses_previous_value_for_first_exceeding_bound() {
    let bounds = [0.0, 0.5, 1.0];
    let values = [Grade::A, Grade::B, Grade::C];

    assert_eq!(tunable_from(0.2, &bounds, &values), Grade::A);
    assert_eq!(tunable_from(0.6, &bounds, &values), Grade::B);
    assert_eq!(tunable_from(1.5, &bounds, &values), Grade::C);
}

#[test]
fn tunable_lookup_treats_bounds_as_inclusive_lower_edges() {
    let bounds = [0.0, 0.5, 1.0];
    let values = [Grade::A, Grade::B, Grade::C];

    assert_eq!(tunable_from(0.5, &bounds, &values), Grade::B);
    assert_eq!(tunable_from(1.0, &bounds, &values), Grade::C);
}

#[test]
fn tunable_lookup_falls_back_to_default_for_malformed_tables() {
    assert_eq!(
        tunable_from(0.4, &[0.0, 0.5], &[Grade::A]),
        Grade::Unset,
        "length mismatch must return the default"
    );
    assert_eq!(
        tunable_from(0.4, &[1.0, 0.5, 0.0], &[Grade::A, Grade::B, Grade::C]),
        Grade::Unset,
        "descending bounds must return the default"
    );
    assert_eq!(tunable_from::<Grade>(0.4, &[], &[]), Grade::Unset);
}

#[test]
fn single_entry_tables_return_their_value() {
    assert_eq!(tunable_from(0.9, &[0.0], &[Grade::B]), Grade::B);
    assert_eq!(score_from(12.0_f32, &[5.0], &[0.3]), 0.3);
}

#[test]
fn score_lookup_with_ascending_bounds() {
    let bounds = [1, 3, 5, 10];
    let scores = [1.0, 0.7, 0.5, 0.3];

    assert_eq!(score_from(0, &bounds, &scores), 1.0);
    assert_eq!(score_from(1, &bounds, &scores), 0.7);
    assert_eq!(score_from(4, &bounds, &scores), 0.5);
    assert_eq!(score_from(9, &bounds, &scores), 0.3);
    assert_eq!(
        score_from(10, &bounds, &scores),
        0.0,
        "crossing every bound with descending scores yields zero"
    );
}

#[test]
fn score_lookup_with_descending_bounds() {
    let bounds = [600.0_f32, 300.0, 60.0];
    let scores = [0.7, 0.5, 0.3];

    assert_eq!(score_from(900.0, &bounds, &scores), 0.7);
    assert_eq!(score_from(400.0, &bounds, &scores), 0.5);
    assert_eq!(score_from(61.0, &bounds, &scores), 0.3);
    assert_eq!(score_from(30.0, &bounds, &scores), 0.0);
}

#[test]
fn score_lookup_with_ascending_scores_saturates_at_one() {
    let bounds = [2, 4];
    let scores = [0.2, 0.6];

    assert_eq!(score_from(7, &bounds, &scores), 1.0);
}

#[test]
fn score_is_non_decreasing_in_rank_for_ascending_tables() {
    let bounds = [1, 3, 5, 10];
    let scores = [0.1, 0.4, 0.6, 0.9];

    let mut previous = f32::MIN;
    for value in 0..15 {
        let score = score_from(value, &bounds, &scores);
        assert!(
            score >= previous,
            "score for {value} dropped from {previous} to {score}"
        );
        previous = score;
    }
}

#[test]
fn score_lookup_falls_back_for_malformed_tables() {
    assert_eq!(score_from(2, &[1, 3], &[1.0]), FALLBACK_SCORE);
    assert_eq!(score_from(2, &[1, 5, 3], &[1.0, 0.7, 0.5]), FALLBACK_SCORE);
    assert_eq!(score_from(2, &[1, 3, 5], &[1.0, 0.2, 0.5]), FALLBACK_SCORE);
    assert_eq!(score_from::<u32>(2, &[], &[]), FALLBACK_SCORE);
}

#[test]
fn tables_deserialize_and_validate() {
    let table: InterpolationTable<u32, f32> = toml::from_str(
        r#"
        bounds = [20, 15, 10, 5]
        values = [1.0, 0.7, 0.5, 0.3]
        "#,
    )
    .expect("table parses");

    assert_eq!(table.validate(), Ok(()));
    assert_eq!(table.score(12), 0.5);
}

#[test]
fn validation_explains_malformed_tables() {
    let mismatched = InterpolationTable::new(vec![0.0_f32, 1.0], vec![1.0_f32]);
    assert_eq!(
        mismatched.validate(),
        Err(TableError::LengthMismatch {
            bounds: 2,
            values: 1
        })
    );

    let descending = InterpolationTable::new(vec![1.0_f32, 0.0], vec![1.0_f32, 2.0]);
    assert_eq!(
        descending.validate_tunable(),
        Err(TableError::BoundsNotAscending)
    );
    assert_eq!(descending.tunable(0.5), 0.0);
}
