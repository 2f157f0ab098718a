use std::cell::Cell;

use layer_sql::prelude::*;
use layer_sql::search::{expect_sequence, is_group, is_whitespace, keyword, remove_matching};
use pretty_assertions::assert_eq;

fn parse(sql: &str) -> Option<AnnotationFunction> {
    layer_sql::parse(sql).expect("parse should not fail")
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_predict_statement() {
    let parsed = parse("create or replace table out as (select a, b, layer.predict('m1', c, d) from src)");

    assert_eq!(
        parsed,
        Some(AnnotationFunction::Predict(PredictFunction {
            source_name: "src".to_string(),
            target_name: "out".to_string(),
            model_name: "m1".to_string(),
            select_columns: strings(&["a", "b"]),
            predict_columns: strings(&["c", "d"]),
            prediction_column: "prediction".to_string(),
            rebuilt_sql: "select a, b, c, d from src".to_string(),
        }))
    );
}

#[test]
fn test_train_wildcard_statement() {
    let parsed = parse("create or replace table out as (select layer.train(*) from src)");

    assert_eq!(
        parsed,
        Some(AnnotationFunction::Train(TrainFunction {
            source_name: "src".to_string(),
            target_name: "out".to_string(),
            train_columns: strings(&["*"]),
        }))
    );
}

#[test]
fn test_train_columns_in_order_with_duplicates() {
    let parsed = parse("create table model as (select layer.train(c3, c1, c2, c1) from features)").unwrap();
    let train = parsed.as_train().unwrap();
    assert_eq!(train.train_columns, strings(&["c3", "c1", "c2", "c1"]));
    assert!(!train.is_wildcard());
}

#[test]
fn test_plain_sql_is_not_matched() {
    for sql in [
        "select * from src",
        "create or replace table out as (select a, b from src)",
        "create or replace table out as (select other.predict('m', a) from src)",
        "insert into t values (1, 2)",
        "",
        "   \n  ",
    ] {
        assert_eq!(parse(sql), None, "{sql:?}");
    }
}

#[test]
fn test_predict_without_columns_is_an_error() {
    let err = layer_sql::parse("create or replace table out as (select a, layer.predict('m1') from src)")
        .unwrap_err();
    match err {
        LayerSqlError::MalformedAnnotationArguments { function, .. } => {
            assert_eq!(function, "layer.predict('m1')");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_train_with_bad_arguments_is_an_error() {
    for sql in [
        "create or replace table out as (select layer.train() from src)",
        "create or replace table out as (select layer.train('a', 'b') from src)",
        "create or replace table out as (select layer.train(*, a) from src)",
    ] {
        assert!(
            matches!(
                layer_sql::parse(sql),
                Err(LayerSqlError::MalformedAnnotationArguments { .. })
            ),
            "{sql:?}"
        );
    }
}

#[test]
fn test_suffix_is_kept_and_keywords_lowercased() {
    let parsed = parse(
        "CREATE OR REPLACE TABLE out AS (SELECT a, layer.predict('m1', a, c) FROM src WHERE x > 1 LIMIT 10)",
    )
    .unwrap();
    let predict = parsed.as_predict().unwrap();
    assert_eq!(predict.select_columns, strings(&["a"]));
    assert_eq!(predict.rebuilt_sql, "select a, c from src where x > 1 limit 10");
}

#[test]
fn test_multiline_statement_with_comments() {
    let sql = r#"
        create or replace table scored as (
            select
                id,
                -- the model output
                layer.predict('churn', age, plan) as churn_score
            from analytics.customers
            where active = true
            order by id
        );
    "#;

    let predict = parse(sql).unwrap().as_predict().cloned().unwrap();
    assert_eq!(predict.target_name, "scored");
    assert_eq!(predict.source_name, "analytics.customers");
    assert_eq!(predict.model_name, "churn");
    assert_eq!(predict.select_columns, strings(&["id"]));
    assert_eq!(predict.predict_columns, strings(&["age", "plan"]));
    assert_eq!(predict.prediction_column, "churn_score");
    assert_eq!(
        predict.rebuilt_sql,
        "select id, age, plan from analytics.customers where active = true order by id"
    );
}

#[test]
fn test_names_keep_their_case() {
    let parsed = parse("CREATE TABLE Scores AS (SELECT Id, LAYER.PREDICT('Model', Age) FROM Users)").unwrap();
    let predict = parsed.as_predict().unwrap();
    assert_eq!(predict.target_name, "Scores");
    assert_eq!(predict.source_name, "Users");
    assert_eq!(predict.model_name, "Model");
    assert_eq!(predict.rebuilt_sql, "select Id, Age from Users");
}

#[test]
fn test_rebuilt_sql_has_select_from_shape() {
    let parsed = parse(
        "create or replace table o as (select a, b as bee, layer.predict('m', c) from s group by a)",
    )
    .unwrap();
    let predict = parsed.as_predict().unwrap();
    assert_eq!(predict.select_columns, strings(&["a", "b as bee"]));

    let tree = SqlTokenizer.tokenize(&predict.rebuilt_sql).unwrap();
    let clean = remove_matching(tree.children(), is_whitespace());
    let tail = expect_sequence(
        &clean,
        &[
            &keyword("select"),
            &is_group(GroupKind::IdentifierList),
            &keyword("from"),
            &is_group(GroupKind::Identifier),
        ],
    );
    assert!(tail.is_some(), "{}", predict.rebuilt_sql);
    assert!(!predict.rebuilt_sql.contains("layer"));
}

#[test]
fn test_custom_prediction_column_default() {
    let config = LayerSqlConfig::builder()
        .default_prediction_column("score")
        .build()
        .unwrap();
    let parser = LayerSqlParser::with_config(config);
    let parsed = parser
        .parse("create or replace table o as (select layer.predict('m', c) from s)")
        .unwrap()
        .unwrap();
    assert_eq!(parsed.as_predict().unwrap().prediction_column, "score");
}

#[test]
fn test_result_serializes_to_json() {
    let parsed = parse("create or replace table out as (select a, layer.predict('m1', c) from src)").unwrap();
    let json = serde_json::to_value(&parsed).unwrap();
    assert_eq!(json["function"], "predict");
    assert_eq!(json["model_name"], "m1");
    assert_eq!(json["rebuilt_sql"], "select a, c from src");
}

/// Delegates to the built-in tokenizer and counts calls.
struct CountingTokenizer {
    calls: Cell<usize>,
}

impl Tokenize for CountingTokenizer {
    fn tokenize(&self, sql: &str) -> LayerSqlResult<TokenNode> {
        self.calls.set(self.calls.get() + 1);
        SqlTokenizer.tokenize(sql)
    }
}

#[test]
fn test_custom_tokenizer_is_used_for_every_pass() {
    let tokenizer = CountingTokenizer { calls: Cell::new(0) };
    let parser = LayerSqlParser::with_tokenizer(LayerSqlConfig::default(), &tokenizer);

    parser
        .parse("create or replace table o as (select layer.train(*) from s)")
        .unwrap();
    // outer statement, inner select
    assert_eq!(tokenizer.calls.get(), 2);

    parser
        .parse("create or replace table o as (select layer.predict('m', c) from s)")
        .unwrap();
    // plus the rebuilt query
    assert_eq!(tokenizer.calls.get(), 5);
}

#[test]
fn test_tokenize_is_lossless() {
    let sql = "create or replace table o as (select a, /* c */ layer.predict('it''s', b) x from s) ;";
    let tree = LayerSqlParser::new().tokenize(sql).unwrap();
    assert_eq!(tree.text(), sql);
}

#[test]
fn test_as_on_its_own_line() {
    let parsed = parse("create or replace table out\nas (select layer.train(*) from src)").unwrap();
    assert_eq!(parsed.target_name(), "out");

    let sql = "CREATE OR REPLACE TABLE analytics.scored\n    AS (\n        SELECT id, layer.predict('m', a) FROM src\n    )";
    let parsed = parse(sql).unwrap();
    assert_eq!(parsed.target_name(), "analytics.scored");
    assert_eq!(parsed.source_name(), "src");
}

#[test]
fn test_numeric_literals_in_suffix() {
    let cases = [
        ("where score > .5", "where score > .5"),
        ("where score > 1e5", "where score > 1e5"),
        ("WHERE score BETWEEN 0.25 AND 2.5E-3 LIMIT 10", "where score between 0.25 and 2.5E-3 limit 10"),
    ];
    for (suffix, expected) in cases {
        let sql = format!("create or replace table out as (select a, layer.predict('m1', c) from src {suffix})");
        let parsed = parse(&sql).unwrap();
        assert_eq!(
            parsed.as_predict().unwrap().rebuilt_sql,
            format!("select a, c from src {expected}")
        );
    }
}

#[test]
fn test_expression_select_items() {
    let parsed = parse(
        "create or replace table out as (select a + 1 as x, b, layer.predict('m', c) from src)",
    )
    .unwrap();
    let predict = parsed.as_predict().unwrap();
    assert_eq!(predict.select_columns, strings(&["a + 1 as x", "b"]));
    assert_eq!(predict.rebuilt_sql, "select a + 1 as x, b, c from src");

    let parsed = parse("create table out as (select a::int, a * 2 doubled, layer.train(a) from src)").unwrap();
    assert_eq!(parsed.as_train().unwrap().train_columns, strings(&["a"]));
}

#[test]
fn test_unrecognized_select_list_is_not_matched() {
    let sql = "create or replace table out as (select case when a then 1 end, b, layer.predict('m', c) from src)";
    assert_eq!(parse(sql), None);
}

#[test]
fn test_column_like_words_are_columns() {
    let parsed = parse(
        "create or replace table out as (select first, layer.predict('m', last, window, left) from src)",
    )
    .unwrap();
    let predict = parsed.as_predict().unwrap();
    assert_eq!(predict.select_columns, strings(&["first"]));
    assert_eq!(predict.predict_columns, strings(&["last", "window", "left"]));
    assert_eq!(predict.rebuilt_sql, "select first, last, window, left from src");
}

