//! Load testing for the download proxy.

use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use serde_json::json;

mod common;

#[tokio::test]
async fn test_concurrent_downloads() {
    // 1. Stub file host and link API
    let payload: &'static str = "0123456789abcdef";
    let files = common::spawn_router(Router::new().route("/files/{name}", get(move || async move { payload }))).await;
    let (api, calls) = common::link_api(move |path| {
        common::link_ok(&format!("http://{files}/files{path}"), json!({}))
    });
    let upstream = common::spawn_router(api).await;

    // 2. Start Proxy
    let (proxy_addr, shutdown) = common::start_proxy(upstream, None).await;

    // 3. Run Load Test
    let concurrency = 20;
    let requests_per_task = 10;
    let total_requests = concurrency * requests_per_task;

    let client = common::client();
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task_id in 0..concurrency {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for i in 0..requests_per_task {
                let path = format!("/file-{task_id}-{i}.bin");
                let req_start = Instant::now();
                let res = client
                    .get(format!("http://{proxy_addr}{path}"))
                    .query(&[("sign", common::sign(&path))])
                    .send()
                    .await
                    .expect("Proxy unreachable");
                assert!(res.status().is_success(), "{path}: {}", res.status());
                assert_eq!(res.text().await.unwrap(), payload);
                latencies.push(req_start.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies: Vec<Duration> = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    assert_eq!(all_latencies.len(), total_requests);
    assert_eq!(calls.lock().unwrap().len(), total_requests);

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", total_requests as f64 / duration.as_secs_f64());
    println!("P50 Latency:    {:?}", p50);
    println!("P99 Latency:    {:?}", p99);
    println!("-------------------------\n");

    shutdown.trigger();
}
