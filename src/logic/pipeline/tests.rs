use super::*;
use crate::config::FeatureSet;
use crate::error::ErrorKind;
use crate::logic::dataset::from_csv_bytes;

const MERCHANTS: [(&str, &str); 4] = [
    ("Supermarket X", "Groceries"),
    ("Coffee Shop Z", "Dining"),
    ("Online Store Y", "Shopping"),
    ("Taxi Co", "Transport"),
];

/// 20 ordinary transactions (500..1450) plus one at 150,000 as the last row
fn ledger_csv() -> String {
    let mut csv = String::from("Date, Merchant ,CATEGORY,Amount,Notes\n");
    for i in 0..20 {
        let (merchant, category) = MERCHANTS[i % 4];
        csv.push_str(&format!(
            "2024-03-{:02},{},{},{:.2},row {}\n",
            i + 1,
            merchant,
            category,
            500.0 + 50.0 * i as f64,
            i
        ));
    }
    csv.push_str("2024-03-21,Supermarket X,Groceries,\"150,000.00\",wire\n");
    csv
}

fn ledger() -> Dataset {
    from_csv_bytes(ledger_csv().as_bytes()).unwrap()
}

fn config() -> AnalysisConfig {
    AnalysisConfig::default()
}

#[test]
fn test_large_transaction_ranks_first() {
    let report = analyze(ledger(), &config()).unwrap();

    let top = &report.anomalies[0];
    assert_eq!(top.ordinal, 20);
    assert_eq!(top.anomaly_score, 1.0);
    assert!(top.is_anomaly);
    assert_eq!(top.fields.get("Amount").map(String::as_str), Some("150,000.00"));

    assert_eq!(report.total_transactions, 21);
    assert_eq!(report.scored_transactions, 21);
    assert_eq!(report.returned_transactions, 20);
    assert!(report.flagged_transactions >= 1);
}

#[test]
fn test_scores_bounded_and_sorted() {
    let report = analyze(ledger(), &config().with_top_n(0)).unwrap();

    assert_eq!(report.anomalies.len(), 21);
    assert!(report
        .anomalies
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.anomaly_score)));
    assert!(report
        .anomalies
        .windows(2)
        .all(|w| w[0].anomaly_score >= w[1].anomaly_score));
}

#[test]
fn test_top_n_semantics() {
    let returned = |top_n| analyze(ledger(), &config().with_top_n(top_n)).unwrap().returned_transactions;

    assert_eq!(returned(0), 21);
    assert_eq!(returned(-5), 21);
    assert_eq!(returned(500), 21);
    assert_eq!(returned(3), 3);
}

#[test]
fn test_analysis_is_deterministic() {
    let a = analyze(ledger(), &config().with_top_n(0)).unwrap();
    let b = analyze(ledger(), &config().with_top_n(0)).unwrap();

    let key = |r: &AnalysisReport| -> Vec<(usize, u64)> {
        r.anomalies
            .iter()
            .map(|s| (s.ordinal, s.anomaly_score.to_bits()))
            .collect()
    };
    assert_eq!(key(&a), key(&b));
}

#[test]
fn test_malformed_date_is_kept() {
    let csv = ledger_csv().replacen("2024-03-05", "not-a-date", 1);
    let report = analyze(from_csv_bytes(csv.as_bytes()).unwrap(), &config().with_top_n(0)).unwrap();

    assert_eq!(report.scored_transactions, 21);
    let kept = report.anomalies.iter().find(|r| r.ordinal == 4).unwrap();
    assert_eq!(kept.fields.get("Date").map(String::as_str), Some("not-a-date"));
}

#[test]
fn test_thousands_separator_amount_is_scored() {
    let csv = "date,merchant,category,amount\n\
               2024-01-02,Vendor A,Office,\"1,250.00\"\n\
               2024-01-02,Vendor A,Office,300\n\
               2024-01-02,Vendor A,Office,310\n";
    let report = analyze(from_csv_bytes(csv.as_bytes()).unwrap(), &config()).unwrap();

    assert!(report.dropped_rows.is_empty());
    assert_eq!(report.anomalies[0].ordinal, 0);
}

#[test]
fn test_unparsable_amounts_are_reported() {
    let csv = ledger_csv().replacen("600.00", "n/a", 1);
    let report = analyze(from_csv_bytes(csv.as_bytes()).unwrap(), &config()).unwrap();

    assert_eq!(report.total_transactions, 21);
    assert_eq!(report.scored_transactions, 20);
    assert_eq!(report.dropped_rows.len(), 1);
    assert_eq!(report.dropped_rows[0].ordinal, 2);
    assert_eq!(report.dropped_rows[0].raw_amount, "n/a");
}

#[test]
fn test_all_amounts_unparsable_is_data_error() {
    let csv = "date,merchant,category,amount\n2024-01-01,A,B,abc\n2024-01-02,A,B,\n";
    let err = analyze(from_csv_bytes(csv.as_bytes()).unwrap(), &config()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Data);
    assert!(err.is_client_error());
}

#[test]
fn test_bad_contamination_fails_before_validation() {
    // Missing columns would be a schema error; config must be checked first
    let dataset = Dataset::from_rows(["unrelated"], [["1"]]);
    let err = analyze(dataset, &config().with_contamination(0.6)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_missing_fields_are_all_listed() {
    let dataset = Dataset::from_rows(["date", "memo"], [["2024-01-01", "x"]]);
    let err = analyze(dataset, &config()).unwrap_err();

    match err {
        AnalysisError::MissingFields { missing } => {
            assert_eq!(missing, vec!["merchant", "category", "amount"]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_empty_dataset_is_schema_error() {
    let dataset = Dataset::new(["date", "merchant", "category", "amount"]);
    let err = analyze(dataset, &config()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn test_constant_batch_scores_zero() {
    let rows: Vec<[&str; 4]> = (0..6).map(|_| ["2024-01-01", "Same", "Same", "10.00"]).collect();
    let dataset = Dataset::from_rows(["date", "merchant", "category", "amount"], rows);
    let report = analyze(dataset, &config().with_top_n(0)).unwrap();

    assert!(report.anomalies.iter().all(|r| r.anomaly_score == 0.0));
    // Equal scores keep dataset order
    let order: Vec<usize> = report.anomalies.iter().map(|r| r.ordinal).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_train_then_score_new_batch() {
    let model = train(ledger(), &config()).unwrap();

    let fresh = "date,merchant,category,amount\n\
                 2024-04-01,Brand New Shop,Unseen,700\n\
                 2024-04-02,Taxi Co,Transport,95000\n";
    let batch = score(&model, from_csv_bytes(fresh.as_bytes()).unwrap(), &config()).unwrap();

    assert_eq!(batch.records.len(), 2);
    assert_eq!(batch.total, 2);
    assert!(batch.records[1].anomaly_score > batch.records[0].anomaly_score);
    assert_eq!(model.contamination(), 0.05);
}

#[test]
fn test_amount_only_feature_set() {
    let config = config().with_feature_set(FeatureSet::AmountOnly);
    let model = train(ledger(), &config).unwrap();
    assert_eq!(model.layout().feature_count, 2);

    let report = analyze(ledger(), &config).unwrap();
    assert_eq!(report.anomalies[0].ordinal, 20);
}

#[test]
fn test_report_serializes_flat_records() {
    let report = analyze(ledger(), &config().with_top_n(1)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let top = &json["anomalies"][0];
    assert_eq!(top["Merchant"], "Supermarket X");
    assert_eq!(top["Notes"], "wire");
    assert_eq!(top["anomaly_score"], 1.0);
    assert_eq!(top["is_anomaly"], true);
    assert_eq!(json["returned_transactions"], 1);
}

#[test]
fn test_train_and_score_matches_separate_calls() {
    let (model, batch) = train_and_score(ledger(), &config()).unwrap();
    let rescored = score(&model, ledger(), &config()).unwrap();

    assert_eq!(batch.total, 21);
    assert_eq!(batch.records, rescored.records);
    assert_eq!(batch.stats, rescored.stats);
}

#[test]
fn test_train_and_score_validates_config_first() {
    let dataset = Dataset::from_rows(["unrelated"], [["1"]]);
    let err = train_and_score(dataset, &config().with_contamination(0.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_unique_merchants_stay_compact() {
    let mut csv = String::from("date,merchant,category,amount\n");
    for i in 0..3000 {
        csv.push_str(&format!("2024-06-{:02},Payee {},Transfers,{}.50\n", i % 28 + 1, i, 100 + i % 400));
    }
    let dataset = from_csv_bytes(csv.as_bytes()).unwrap();

    let config = config().with_top_n(10);
    let (model, batch) = train_and_score(dataset, &config).unwrap();

    // amount, weekday, 3000 merchants, 1 category
    assert_eq!(model.layout().feature_count, 3003);
    assert_eq!(batch.records.len(), 3000);
    assert!(batch
        .records
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.anomaly_score)));
    assert_eq!(report(batch, config.contamination, config.top_n).returned_transactions, 10);
}
