//! End-to-end pipeline tests: JSON request -> attribution -> feature table -> CSV

use ormscope::attribution::{attribute_request, AttributorConfig, FLUSH_SENTINEL};
use ormscope::csv_output::feature_table_to_csv;
use ormscope::feature_table::build_feature_table;
use ormscope::trace_model::Request;
use serde_json::json;

/// The /report scenario: one ORM frame whose child issues two I/O queries
fn report_request_json() -> serde_json::Value {
    json!({
        "sourceInfo": { "type": "http", "url": "/report" },
        "trace": {
            "packageName": "org.apache.catalina",
            "className": "StandardWrapperValve",
            "methodName": "invoke",
            "traces": [
                {
                    "packageName": "br.com.ggas.relatorio",
                    "className": "ReportService",
                    "methodName": "fetchRows",
                    "ormQueryId": 10,
                    "traces": [
                        {
                            "packageName": "org.hibernate.loader",
                            "className": "Loader",
                            "methodName": "doQuery",
                            "ioQueryIdList": [1, 2]
                        }
                    ]
                }
            ]
        },
        "queries": [
            { "id": 1, "numRowsProcessed": 10, "duration": 2000000, "tableNames": ["A"] },
            { "id": 2, "numRowsProcessed": 20, "duration": 3000000, "tableNames": ["A", "B"] }
        ],
        "ormQueries": [
            { "id": 10, "rawQuery": "SELECT r FROM Report r" }
        ]
    })
}

#[test]
fn test_report_scenario_produces_expected_row() {
    let request: Request = serde_json::from_value(report_request_json()).unwrap();
    let methods = attribute_request(&request, &AttributorConfig::default())
        .unwrap()
        .expect("page request");

    let rows = build_feature_table(&methods);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].method_name, "br.com.ggas.relatorio.ReportService.fetchRows");
    assert_eq!(rows[0].query_count, 2);
    assert_eq!(rows[0].total_rows, 30);
    assert!((rows[0].total_duration_secs - 5.0).abs() < 1e-9);
    assert_eq!(rows[0].distinct_tables, 2);
}

#[test]
fn test_flush_sentinel_scenario_produces_empty_table() {
    let mut raw = report_request_json();
    raw["ormQueries"][0]["rawQuery"] = json!(FLUSH_SENTINEL);

    let request: Request = serde_json::from_value(raw).unwrap();
    let methods = attribute_request(&request, &AttributorConfig::default())
        .unwrap()
        .expect("page request");

    let rows = build_feature_table(&methods);
    assert!(rows.is_empty());
    assert_eq!(
        feature_table_to_csv(&rows),
        "method,query_count,rows_processed,duration_secs,distinct_tables\n"
    );
}

#[test]
fn test_non_page_request_yields_no_table() {
    let mut raw = report_request_json();
    raw["sourceInfo"]["url"] = json!("/static/app.css");

    let request: Request = serde_json::from_value(raw).unwrap();
    let result = attribute_request(&request, &AttributorConfig::default()).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_orphan_queries_excluded_from_totals() {
    // Same tree plus a sibling frame that issues a query outside any ORM
    // context; its rows must not leak into any method's aggregate.
    let mut raw = report_request_json();
    raw["trace"]["traces"].as_array_mut().unwrap().push(json!({
        "packageName": "org.apache.catalina",
        "className": "AccessLogValve",
        "methodName": "log",
        "ioQueryIdList": [3]
    }));
    raw["queries"].as_array_mut().unwrap().push(json!(
        { "id": 3, "numRowsProcessed": 1000, "duration": 50, "tableNames": ["access_log"] }
    ));

    let request: Request = serde_json::from_value(raw).unwrap();
    let methods = attribute_request(&request, &AttributorConfig::default())
        .unwrap()
        .expect("page request");
    let rows = build_feature_table(&methods);

    let total_rows: u64 = rows.iter().map(|r| r.total_rows).sum();
    assert_eq!(total_rows, 30, "orphan query rows leaked into the table");
    assert!(rows.iter().all(|r| !r.method_name.contains("AccessLogValve")));
}

#[test]
fn test_rerun_yields_byte_identical_csv() {
    let request: Request = serde_json::from_value(report_request_json()).unwrap();
    let config = AttributorConfig::default();

    let csv_a = feature_table_to_csv(&build_feature_table(
        &attribute_request(&request, &config).unwrap().unwrap(),
    ));
    let csv_b = feature_table_to_csv(&build_feature_table(
        &attribute_request(&request, &config).unwrap().unwrap(),
    ));

    assert_eq!(csv_a, csv_b);
}

#[test]
fn test_query_count_consistent_with_attributed_queries() {
    let request: Request = serde_json::from_value(report_request_json()).unwrap();
    let methods = attribute_request(&request, &AttributorConfig::default())
        .unwrap()
        .unwrap();
    let rows = build_feature_table(&methods);

    for (method, row) in methods.iter().zip(rows.iter()) {
        assert_eq!(row.query_count, method.queries.len());
        let rows_sum: u64 = method.queries.iter().map(|q| q.num_rows_processed).sum();
        assert_eq!(row.total_rows, rows_sum);
        let duration_us: u64 = method.queries.iter().map(|q| q.duration).sum();
        assert!((row.total_duration_secs - duration_us as f64 / 1e6).abs() < 1e-12);
    }
}

#[test]
fn test_nested_orm_under_flush_attributes_to_outer_context() {
    // flush frame nested under a meaningful ORM frame: descendant queries
    // still attribute to the outer point.
    let raw = json!({
        "sourceInfo": { "type": "http", "url": "/save" },
        "trace": {
            "packageName": "org.apache.catalina",
            "className": "StandardWrapperValve",
            "methodName": "invoke",
            "traces": [
                {
                    "packageName": "br.com.ggas.cadastro",
                    "className": "CustomerService",
                    "methodName": "save",
                    "ormQueryId": 1,
                    "traces": [
                        {
                            "packageName": "org.hibernate.impl",
                            "className": "SessionImpl",
                            "methodName": "flush",
                            "ormQueryId": 2,
                            "traces": [
                                {
                                    "packageName": "org.hibernate.persister",
                                    "className": "EntityPersister",
                                    "methodName": "update",
                                    "ioQueryIdList": [1]
                                }
                            ]
                        }
                    ]
                }
            ]
        },
        "queries": [
            { "id": 1, "numRowsProcessed": 1, "duration": 300, "tableNames": ["customer"] }
        ],
        "ormQueries": [
            { "id": 1, "rawQuery": "update Customer" },
            { "id": 2, "rawQuery": "Session.flush" }
        ]
    });

    let request: Request = serde_json::from_value(raw).unwrap();
    let methods = attribute_request(&request, &AttributorConfig::default())
        .unwrap()
        .unwrap();

    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "br.com.ggas.cadastro.CustomerService.save");
    assert_eq!(methods[0].queries.len(), 1);
}
