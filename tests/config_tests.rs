//! Tests against the catalog shipped in config/

use pretty_assertions::assert_eq;
use report_normalizer::config::{ModelCatalog, NormalizerConfig};
use report_normalizer::core::dates::RunMonth;
use report_normalizer::request::plan_requests;
use std::path::PathBuf;

fn shipped_catalog() -> ModelCatalog {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/models.yaml");
    ModelCatalog::load(&path).unwrap()
}

#[test]
fn test_shipped_catalog_loads() {
    let catalog = shipped_catalog();
    assert_eq!(
        catalog.model_names(),
        vec!["Spyder3", "NTPP2", "us_gpl_v2_rmr2_bq"]
    );
    assert_eq!(catalog.model("Spyder3").unwrap().segments.len(), 10);
    assert_eq!(catalog.normalizer, NormalizerConfig::default());
}

#[test]
fn test_shipped_catalog_plans_every_segment() {
    let catalog = shipped_catalog();
    let run = RunMonth::parse("202403").unwrap();
    let planned = plan_requests(&catalog, None, run).unwrap();

    assert_eq!(planned.len(), 14);
    assert!(planned.iter().all(|p| p.error.is_none()));
}

#[test]
fn test_shipped_catalog_months() {
    let catalog = shipped_catalog();
    let run = RunMonth::parse("202403").unwrap();
    let planned = plan_requests(&catalog, Some("us_gpl_v2_rmr2_bq"), run).unwrap();
    let request = planned[0].request.as_ref().unwrap();

    // 30 DOB / 10 DPD + 1 = 4 months back
    assert_eq!(request.approved_month1, "202311");
    assert_eq!(request.psi_month, "202402");
    assert_eq!(request.tag1, "model_bad_tag");
}
