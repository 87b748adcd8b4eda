use anyhow::Result;
use httpmock::prelude::*;
use nyc_heat_index::{
    EtlEngine, HtmlRenderer, HttpFetcher, IssuePipeline, LocalStorage, TomlConfig,
};
use std::path::Path;
use tempfile::TempDir;

const RESY_PAGE: &str = r#"
<html><body>
<article>
  <h2>1. Carbone</h2>
  <p>Still the hardest table in town.</p>
  <p><a href="https://resy.com/cities/ny/carbone">Book on Resy</a></p>
  <h2>2. Kabawa</h2>
  <p>Caribbean tasting menu.</p>
</article>
</body></html>
"#;

const EATER_PAGE: &str = r#"
<html><body>
<article>
  <h2>Carbone NYC</h2>
  <p>Red sauce glamour.</p>
  <h2>Cafe Zaffri</h2>
  <p>Palestinian all-day cafe.</p>
</article>
</body></html>
"#;

fn config(server: &MockServer, output_path: &str) -> Result<TomlConfig> {
    config_with_og(server, output_path, false)
}

fn config_with_og(server: &MockServer, output_path: &str, og: bool) -> Result<TomlConfig> {
    let content = format!(
        r#"
[issue]
title = "NYC Heat Index"

[[sources]]
name = "Resy Hit List (NYC)"
url = "{resy}"
trust_weight = 1.0
rule = "resy_hit_list"

[[sources]]
name = "Eater Heatmap (Manhattan)"
url = "{eater}"
trust_weight = 0.8
ranked = false
rule = "eater_heatmap"

[fetch]
timeout_seconds = 5
retry_attempts = 1
retry_delay_seconds = 0
og_image_fallback = {og}

[load]
output_path = "{output}"
write_json = true
"#,
        resy = server.url("/the-hit-list/nyc-restaurants/"),
        eater = server.url("/maps/heatmap"),
        output = output_path,
        og = og,
    );
    Ok(TomlConfig::from_toml_str(&content)?)
}

fn dated_file(dir: &Path, extension: &str) -> Option<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .find(|path| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            name.starts_with("issue-") && name.ends_with(extension)
        })
}

#[tokio::test]
async fn test_end_to_end_issue_with_real_http() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let resy_mock = server.mock(|when, then| {
        when.method(GET).path("/the-hit-list/nyc-restaurants/");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(RESY_PAGE);
    });
    let eater_mock = server.mock(|when, then| {
        when.method(GET).path("/maps/heatmap");
        then.status(200)
            .header("Content-Type", "text/html; charset=utf-8")
            .body(EATER_PAGE);
    });

    let config = config(&server, &output_path)?;
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let pipeline = IssuePipeline::new(
        fetcher,
        HtmlRenderer::new()?,
        LocalStorage::new(output_path.clone()),
        config,
    );

    let result = EtlEngine::new(pipeline).run().await?;

    resy_mock.assert();
    eater_mock.assert();
    assert!(result.ends_with("index.html"));

    let index = std::fs::read_to_string(temp_dir.path().join("index.html"))?;
    assert!(index.contains("NYC Heat Index"));
    assert!(index.contains("Carbone"));
    assert!(index.contains("Cafe Zaffri"));
    assert!(index.contains("https://resy.com/cities/ny/carbone"));

    let dated_html = dated_file(temp_dir.path(), ".html").expect("dated html issue");
    assert_eq!(std::fs::read_to_string(dated_html)?, index);

    let json_path = dated_file(temp_dir.path(), ".json").expect("json payload");
    let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(json_path)?)?;
    assert_eq!(payload["entities"][0]["display_name"], "Carbone");
    assert_eq!(payload["entities"][0]["cross_source_count"], 2);
    assert_eq!(payload["stats"]["total_entities"], 3);
    assert_eq!(payload["stats"]["total_mentions"], 4);
    assert!(payload["stats"]["warnings"].as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_second_run_reads_history_and_fills_thumbnails() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    let venue_url = server.url("/venues/kabawa");
    let resy_page = format!(
        r#"<html><body><article>
  <h2>1. Carbone</h2>
  <p>Still the hardest table in town.</p>
  <img src="/img/carbone-logo.svg" alt="">
  <img src="/img/carbone-rigatoni.jpg" alt="Carbone's spicy rigatoni">
  <h2>2. Kabawa</h2>
  <p>Caribbean tasting menu.</p>
  <p><a href="{venue}">Website</a></p>
</article></body></html>"#,
        venue = venue_url
    );
    server.mock(|when, then| {
        when.method(GET).path("/the-hit-list/nyc-restaurants/");
        then.status(200).body(resy_page.as_str());
    });
    server.mock(|when, then| {
        when.method(GET).path("/maps/heatmap");
        then.status(200).body(EATER_PAGE);
    });
    let venue_mock = server.mock(|when, then| {
        when.method(GET).path("/venues/kabawa");
        then.status(200)
            .body(r#"<html><head><meta property="og:image" content="https://img.test/kabawa.jpg"></head></html>"#);
    });

    std::fs::write(
        temp_dir.path().join("state.json"),
        r#"{"last_issue_names": ["Cafe Zaffri"]}"#,
    )?;

    let config = config_with_og(&server, &output_path, true)?;
    let pipeline = IssuePipeline::new(
        HttpFetcher::new(&config.fetch)?,
        HtmlRenderer::new()?,
        LocalStorage::new(output_path.clone()),
        config,
    );
    EtlEngine::new(pipeline).run().await?;

    venue_mock.assert_hits(1);

    let json_path = dated_file(temp_dir.path(), ".json").expect("json payload");
    let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(json_path)?)?;
    let entity = |name: &str| {
        payload["entities"]
            .as_array()
            .and_then(|all| all.iter().find(|e| e["display_name"] == name).cloned())
            .unwrap_or_default()
    };
    assert_eq!(entity("Carbone")["image_url"], server.url("/img/carbone-rigatoni.jpg"));
    assert_eq!(entity("Kabawa")["image_url"], "https://img.test/kabawa.jpg");
    assert_eq!(entity("Cafe Zaffri")["carried_over"], true);
    assert_eq!(entity("Carbone")["carried_over"], false);

    let history: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("state.json"))?)?;
    let names = history["last_issue_names"].as_array().unwrap();
    assert_eq!(names.len(), 3);
    assert_eq!(names[0], "Carbone");

    Ok(())
}

#[tokio::test]
async fn test_failed_source_is_reported_not_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/the-hit-list/nyc-restaurants/");
        then.status(200).body(RESY_PAGE);
    });
    let eater_mock = server.mock(|when, then| {
        when.method(GET).path("/maps/heatmap");
        then.status(503);
    });

    let config = config(&server, &output_path)?;
    let pipeline = IssuePipeline::new(
        HttpFetcher::new(&config.fetch)?,
        HtmlRenderer::new()?,
        LocalStorage::new(output_path.clone()),
        config,
    );

    EtlEngine::new(pipeline).run().await?;

    // 非 2xx 不重試
    eater_mock.assert_hits(1);

    let json_path = dated_file(temp_dir.path(), ".json").expect("json payload");
    let payload: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(json_path)?)?;
    let warnings = payload["stats"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0]
        .as_str()
        .unwrap()
        .starts_with("Eater Heatmap (Manhattan): fetch failed"));
    assert_eq!(payload["entities"].as_array().unwrap().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_all_sources_down_still_writes_issue() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(500);
    });

    let config = config(&server, &output_path)?;
    let pipeline = IssuePipeline::new(
        HttpFetcher::new(&config.fetch)?,
        HtmlRenderer::new()?,
        LocalStorage::new(output_path.clone()),
        config,
    );

    EtlEngine::new(pipeline).run().await?;

    let index = std::fs::read_to_string(temp_dir.path().join("index.html"))?;
    assert!(index.contains("No restaurants this month"));

    Ok(())
}
