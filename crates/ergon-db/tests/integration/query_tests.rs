use ergon_db::{Ingester, QueryService};

use crate::integration::common::{execute, record, setup_test_db};

#[tokio::test]
async fn average_salary_rounds_to_two_decimals() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config);

    let batch = vec![
        record("Initech", "Junior", Some(100), "https://jobs.example.com/1"),
        record("Initech", "Middle", Some(200), "https://jobs.example.com/2"),
        record("Initech", "Senior", Some(300), "https://jobs.example.com/3"),
    ];
    ingester.fill(&batch).await.unwrap();

    let avg = queries.average_salary().await.unwrap();
    assert_eq!(avg, Some(200.00));
}

#[tokio::test]
async fn average_salary_of_empty_table_is_none() {
    let (config, _container) = setup_test_db().await;
    let queries = QueryService::new(config);

    assert_eq!(queries.average_salary().await.unwrap(), None);
}

#[tokio::test]
async fn vacancies_above_average_returns_strictly_greater() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config);

    let batch = vec![
        record("Initech", "Junior", Some(100), "https://jobs.example.com/1"),
        record("Initech", "Middle", Some(200), "https://jobs.example.com/2"),
        record("Initech", "Senior", Some(300), "https://jobs.example.com/3"),
    ];
    ingester.fill(&batch).await.unwrap();

    // Average is 200.00; only the 300 row strictly exceeds it.
    let above = queries.vacancies_above_average().await.unwrap();
    assert_eq!(above.len(), 1);
    assert_eq!(above[0].vacancy_name, "Senior");
    assert_eq!(above[0].salary, 300);
}

#[tokio::test]
async fn vacancies_above_average_orders_by_company_then_salary() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config);

    let batch = vec![
        record("Zenith", "Lead", Some(900), "https://jobs.example.com/1"),
        record("Acme", "Lead", Some(800), "https://jobs.example.com/2"),
        record("Acme", "Principal", Some(1000), "https://jobs.example.com/3"),
        record("Acme", "Intern", Some(10), "https://jobs.example.com/4"),
        record("Zenith", "Intern", Some(20), "https://jobs.example.com/5"),
    ];
    ingester.fill(&batch).await.unwrap();

    let above = queries.vacancies_above_average().await.unwrap();
    let rows: Vec<_> = above
        .iter()
        .map(|v| (v.company_name.as_str(), v.salary))
        .collect();
    assert_eq!(rows, [("Acme", 1000), ("Acme", 800), ("Zenith", 900)]);
}

#[tokio::test]
async fn vacancies_matching_finds_substring_anywhere() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config);

    let batch = vec![
        record("Initech", "Engineer", Some(100), "https://jobs.example.com/1"),
        record("Initech", "Manager", Some(200), "https://jobs.example.com/2"),
        record("Globex", "Sales", Some(300), "https://jobs.example.com/3"),
    ];
    ingester.fill(&batch).await.unwrap();

    let hits = queries.vacancies_matching("Eng").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].vacancy_name, "Engineer");

    let hits = queries.vacancies_matching("age").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].vacancy_name, "Manager");
}

#[tokio::test]
async fn vacancies_matching_is_case_sensitive() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config);

    let batch = vec![record(
        "Initech",
        "Engineer",
        Some(100),
        "https://jobs.example.com/1",
    )];
    ingester.fill(&batch).await.unwrap();

    assert!(queries.vacancies_matching("eng").await.unwrap().is_empty());
    assert_eq!(queries.vacancies_matching("Eng").await.unwrap().len(), 1);
}

#[tokio::test]
async fn vacancies_matching_treats_like_metacharacters_literally() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config);

    let batch = vec![
        record("Initech", "100% Remote QA", Some(100), "https://jobs.example.com/1"),
        record("Initech", "Engineer", Some(200), "https://jobs.example.com/2"),
    ];
    ingester.fill(&batch).await.unwrap();

    // "%" must match only the literal character, not act as a wildcard.
    let hits = queries.vacancies_matching("100%").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].vacancy_name, "100% Remote QA");
}

#[tokio::test]
async fn company_counts_use_inner_join_semantics() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config.clone());

    let batch = vec![
        record("Initech", "Engineer", Some(100), "https://jobs.example.com/1"),
        record("Initech", "Analyst", Some(200), "https://jobs.example.com/2"),
        record("Initech", "Manager", Some(300), "https://jobs.example.com/3"),
    ];
    ingester.fill(&batch).await.unwrap();

    // A company with zero vacancies must not appear in the report.
    execute(
        &config,
        "INSERT INTO companies (company_name) VALUES ('Hooli')",
    )
    .await;

    let counts = queries.companies_and_vacancy_counts().await.unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].company_name, "Initech");
    assert_eq!(counts[0].vacancy_count, 3);
}

#[tokio::test]
async fn all_vacancies_joins_company_names() {
    let (config, _container) = setup_test_db().await;
    let ingester = Ingester::new(config.clone());
    let queries = QueryService::new(config);

    let batch = vec![
        record("Initech", "Engineer", Some(100), "https://jobs.example.com/1"),
        record("Globex", "Manager", None, "https://jobs.example.com/2"),
    ];
    ingester.fill(&batch).await.unwrap();

    let mut all = queries.all_vacancies().await.unwrap();
    all.sort_by(|a, b| a.company_name.cmp(&b.company_name));

    assert_eq!(all.len(), 2);
    assert_eq!(all[0].company_name, "Globex");
    assert_eq!(all[0].vacancy_name, "Manager");
    assert_eq!(all[0].salary, 0);
    assert_eq!(all[1].company_name, "Initech");
    assert_eq!(all[1].link, "https://jobs.example.com/1");
}

#[tokio::test]
async fn queries_on_empty_tables_return_empty_results() {
    let (config, _container) = setup_test_db().await;
    let queries = QueryService::new(config);

    assert!(queries.companies_and_vacancy_counts().await.unwrap().is_empty());
    assert!(queries.all_vacancies().await.unwrap().is_empty());
    assert!(queries.vacancies_above_average().await.unwrap().is_empty());
    assert!(queries.vacancies_matching("x").await.unwrap().is_empty());
}
