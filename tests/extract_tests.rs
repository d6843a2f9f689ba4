//! Extraction and normalization over rendered page fixtures

use errata_locator::config::PageSpec;
use errata_locator::pipeline::records_from_page;
use errata_locator::{ErrataConfig, PageContext, RenderedPage, extract, normalize};
use scraper::Html;
use tempfile::TempDir;

mod common;

use common::{errata_page_html, processing_time, three_row_page};

fn first_page(config: &ErrataConfig) -> PageSpec {
    config.page_specs().unwrap().remove(0)
}

fn rendered(url: &str, html: String) -> RenderedPage {
    RenderedPage {
        url: url.to_string(),
        title: None,
        html,
    }
}

#[test]
fn test_three_rows_with_one_bad_date() {
    let temp_dir = TempDir::new().unwrap();
    let config = common::config_for("https://curriculum.example.com", &["/errata/grade-6"], temp_dir.path());
    let page = first_page(&config);

    let result = records_from_page(
        &page,
        &rendered(page.url().as_str(), three_row_page("Grade 6 Errata")),
        processing_time(),
    );

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.dropped, 1);

    let first = &result.records[0];
    assert_eq!(first.unit(), "Unit 2: Ratios");
    assert_eq!(first.resource(), "Teacher Guide");
    assert_eq!(first.location(), "Lesson 3 Section A");
    assert_eq!(first.page_numbers(), "12-15");
    assert_eq!(first.improvement_description(), "Corrected the answer to problem 4");
    assert_eq!(first.date_updated(), "2024-03-14");
    assert_eq!(first.date_extracted(), "2024-05-01 09:30:00");

    let second = &result.records[1];
    assert_eq!(second.resource(), "Student Workbook");
    assert_eq!(second.date_updated(), "2024-04-01");
}

#[test]
fn test_extraction_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let config = common::config_for("https://curriculum.example.com", &["/errata"], temp_dir.path());
    let page = first_page(&config);
    let html = three_row_page("Errata");

    let a = records_from_page(&page, &rendered(page.url().as_str(), html.clone()), processing_time());
    let b = records_from_page(&page, &rendered(page.url().as_str(), html), processing_time());
    assert_eq!(a, b);
}

#[test]
fn test_unrecognised_component_lands_in_location() {
    let temp_dir = TempDir::new().unwrap();
    let config = common::config_for("https://curriculum.example.com", &["/errata"], temp_dir.path());
    let page = first_page(&config);
    let html = errata_page_html(
        "Errata",
        &[("Miscellaneous notes", "Clarified wording", "2024-02-02")],
    );

    let result = records_from_page(&page, &rendered(page.url().as_str(), html), processing_time());
    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.location(), "Miscellaneous notes");
    assert_eq!(record.resource(), "");
    assert_eq!(record.page_numbers(), "");
}

fn config_without_unit_selector(temp_dir: &TempDir, explicit_unit: Option<&str>) -> ErrataConfig {
    let builder = ErrataConfig::builder()
        .base_url("https://curriculum.example.com")
        .selector("errata_container", ".errata-section")
        .selector("table_rows", "tbody tr")
        .csv_path(temp_dir.path().join("out.csv"));
    let builder = match explicit_unit {
        Some(unit) => builder.page_with_unit("/errata/grade-3", unit),
        None => builder.page("/errata/grade-3"),
    };
    builder.build().unwrap()
}

#[test]
fn test_unit_falls_back_to_title_label() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_without_unit_selector(&temp_dir, None);
    let page = first_page(&config);
    let html = errata_page_html("Geometry Errata | Curriculum", &[("Glossary", "Added term", "")]);

    let rendered = RenderedPage {
        url: page.url().to_string(),
        title: Some("Geometry Errata | Curriculum".to_string()),
        html,
    };
    let result = records_from_page(&page, &rendered, processing_time());
    assert_eq!(result.records[0].unit(), "Geometry");
    // empty source date is kept empty
    assert_eq!(result.records[0].date_updated(), "");
}

#[test]
fn test_unit_falls_back_to_url_label() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_without_unit_selector(&temp_dir, None);
    let page = first_page(&config);
    let html = errata_page_html("Errata", &[("Glossary", "Added term", "2024-01-01")]);

    let result = records_from_page(&page, &rendered(page.url().as_str(), html), processing_time());
    assert_eq!(result.records[0].unit(), "Grade 3");
}

#[test]
fn test_configured_unit_wins_over_derived_label() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_without_unit_selector(&temp_dir, Some("Grade 3 Accelerated"));
    let page = first_page(&config);
    let html = errata_page_html("Errata", &[("Glossary", "Added term", "2024-01-01")]);

    let result = records_from_page(&page, &rendered(page.url().as_str(), html), processing_time());
    assert_eq!(result.records[0].unit(), "Grade 3 Accelerated");
}

#[test]
fn test_container_mode_reads_named_fields() {
    let config = ErrataConfig::builder()
        .base_url("https://curriculum.example.com")
        .page("/errata")
        .selector("errata_container", "article.erratum")
        .selector("unit_field", ".unit")
        .selector("resource_field", ".resource")
        .selector("location_field", ".location")
        .selector("page_numbers", ".pages")
        .selector("improvement_description", ".description")
        .selector("improvement_type", ".kind")
        .selector("date_updated", "time")
        .build()
        .unwrap();
    let page = first_page(&config);

    let html = Html::parse_document(
        r#"<main>
          <article class="erratum">
            <span class="unit">Unit 1</span>
            <span class="resource">Student  Edition</span>
            <span class="location">Lesson 2</span>
            <span class="pages">pp. 4,6</span>
            <p class="description">Swapped the
              figure labels</p>
            <span class="kind">Correction</span>
            <time>March 3, 2024</time>
          </article>
          <article class="erratum">
            <span class="unit">Unit 1</span>
            <p class="description"></p>
          </article>
        </main>"#,
    );

    let raws: Vec<_> = extract(&html, page.selectors()).collect();
    assert_eq!(raws.len(), 2);

    let context = PageContext::new(page.id(), "fallback");
    let record = normalize(&raws[0], &context, processing_time()).unwrap();
    assert_eq!(record.resource(), "Student Edition");
    assert_eq!(record.page_numbers(), "4, 6");
    assert_eq!(record.improvement_description(), "Swapped the figure labels");
    assert_eq!(record.improvement_type(), "Correction");
    assert_eq!(record.date_updated(), "2024-03-03");

    let err = normalize(&raws[1], &context, processing_time()).unwrap_err();
    assert_eq!(err.field(), "Improvement_Description");
}
